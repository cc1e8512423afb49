//! Query strings for the rest layer of the backend.
//!
//! Filters follow the `column=operator.value` convention, values are escaped
//! by `reqwest` when the pairs are added to the url.

use crate::consts;
use uuid::Uuid;

pub type QueryPairs = Vec<(&'static str, String)>;

pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

pub fn is_null() -> String {
    "is.null".to_string()
}

pub fn owner_pets(owner_id: Uuid) -> QueryPairs {
    vec![
        ("select", consts::PET_LIST_COLUMNS.to_string()),
        ("owner_id", eq(owner_id)),
        ("order", "created_at.desc".to_string()),
    ]
}

pub fn owner_pet_by_id(pet_id: i64, owner_id: Uuid) -> QueryPairs {
    vec![
        ("select", consts::PET_DETAIL_COLUMNS.to_string()),
        ("id", eq(pet_id)),
        ("owner_id", eq(owner_id)),
    ]
}

pub fn pet_by_id(pet_id: i64, select: &str) -> QueryPairs {
    vec![("id", eq(pet_id)), ("select", select.to_string())]
}

pub fn unlinked_tag_by_code(code: &str) -> QueryPairs {
    vec![
        ("code", eq(code)),
        ("pet_id", is_null()),
        ("select", consts::TAG_COLUMNS.to_string()),
    ]
}
