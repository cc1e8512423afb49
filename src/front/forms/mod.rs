pub mod pet;
pub mod photo;
pub mod tag;
pub mod user;
