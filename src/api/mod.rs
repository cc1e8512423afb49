//! # API Module
//!
//! Domain operations of the chipdog client. Each function takes the boxed
//! services it talks to, so the front end and the tests decide which
//! implementation runs behind them.
//!
//! ## Modules
//!
//! - [`pet`] - Owner pets: list, detail, creation, lost status and profile
//! - [`photo`] - Pet pictures upload and the signed url cache
//! - [`tag`] - Linking QR/NFC tags and the public lookup for finders
//! - [`user`] - Login, logout and restoring the previous session

pub mod pet;
pub mod photo;
pub mod tag;
pub mod user;
