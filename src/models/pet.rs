use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Row of the `pets` table. List queries only fill the first columns, the
/// rest keep their defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub is_lost: bool,
    /// Storage path of the main picture, not a displayable url
    #[serde(default)]
    pub photo_url: Option<String>,

    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,

    #[serde(default)]
    pub owner_phone: Option<String>,
    #[serde(default)]
    pub owner_whatsapp: Option<String>,
    #[serde(default)]
    pub public_notes: Option<String>,

    #[serde(default)]
    pub allergies: Option<String>,
    #[serde(default)]
    pub medications: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,

    #[serde(default)]
    pub vet_name: Option<String>,
    #[serde(default)]
    pub vet_phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_extra_info")]
    pub extra_info: Vec<ExtraInfo>,
    #[serde(default, deserialize_with = "lenient_secondary_contacts")]
    pub extra_contacts: Vec<SecondaryContact>,
}

impl Pet {
    pub fn status_label(&self) -> &'static str {
        if self.is_lost { "Perdido" } else { "En casa" }
    }

    /// "Perro · Labrador" or just the species
    pub fn subtitle(&self) -> String {
        match self.breed.as_deref().map(str::trim) {
            Some(breed) if !breed.is_empty() => format!("{} · {}", self.species, breed),
            _ => self.species.clone(),
        }
    }
}

/// Free label/value pair shown in the pet profile
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ExtraInfo {
    pub label: String,
    pub value: String,
}

/// Additional person to call besides the owner
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SecondaryContact {
    pub name: String,
    pub phone: String,
}

/// Insert payload for a new pet
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPet {
    pub owner_id: uuid::Uuid,
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Update payload of the profile editor. Every field is sent, `None` clears
/// the column.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PetProfileUpdate {
    pub color: Option<String>,
    pub birth_year: Option<i32>,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<String>,
    pub weight_kg: Option<f64>,

    pub owner_phone: Option<String>,
    pub owner_whatsapp: Option<String>,
    pub public_notes: Option<String>,

    pub allergies: Option<String>,
    pub medications: Option<String>,
    pub conditions: Option<String>,

    pub vet_name: Option<String>,
    pub vet_phone: Option<String>,

    pub extra_info: Vec<ExtraInfo>,
    pub extra_contacts: Vec<SecondaryContact>,
}

/// Accepts a json array, a string holding a json array, or anything else as empty
fn value_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => items,
            _ => vec![],
        },
        _ => vec![],
    }
}

/// Coerces scalars to a trimmed, non empty string
fn coerce_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

fn first_text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| coerce_text(item.get(key)))
}

pub fn parse_extra_info(value: Value) -> Vec<ExtraInfo> {
    value_items(value)
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| {
            Some(ExtraInfo {
                label: first_text(item, &["label", "key", "title"])?,
                value: first_text(item, &["value"]).unwrap_or_default(),
            })
        })
        .collect()
}

pub fn parse_secondary_contacts(value: Value) -> Vec<SecondaryContact> {
    value_items(value)
        .iter()
        .filter(|item| item.is_object())
        .filter_map(|item| {
            Some(SecondaryContact {
                phone: first_text(item, &["phone", "value", "number"])?,
                name: first_text(item, &["name", "label"]).unwrap_or_default(),
            })
        })
        .collect()
}

fn lenient_extra_info<'de, D>(deserializer: D) -> Result<Vec<ExtraInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_extra_info(Value::deserialize(deserializer)?))
}

fn lenient_secondary_contacts<'de, D>(deserializer: D) -> Result<Vec<SecondaryContact>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_secondary_contacts(Value::deserialize(deserializer)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_row_uses_defaults() {
        let pet: Pet = serde_json::from_value(json!({
            "id": 7,
            "name": "Toby",
            "species": "Perro",
            "breed": null,
            "is_lost": true,
            "photo_url": "u/7/main.jpg"
        }))
        .unwrap();

        assert_eq!(pet.id, 7);
        assert!(pet.is_lost);
        assert!(pet.extra_info.is_empty() && pet.extra_contacts.is_empty());
        assert_eq!(pet.subtitle(), "Perro");
        assert_eq!(pet.status_label(), "Perdido");
    }

    #[test]
    fn test_extra_info_is_parsed_leniently() {
        let pet: Pet = serde_json::from_value(json!({
            "id": 1,
            "name": "Mishi",
            "species": "Gato",
            "extra_info": [
                {"label": "Chip", "value": 981020},
                {"key": "Castrado", "value": true},
                {"label": "   ", "value": "ignored"},
                "not an object",
                {"value": "no label"}
            ],
            "extra_contacts": "[{\"name\": \"Ana\", \"phone\": \"+56911111111\"}, {\"name\": \"sin telefono\"}]"
        }))
        .unwrap();

        assert_eq!(
            pet.extra_info,
            vec![
                ExtraInfo {
                    label: "Chip".into(),
                    value: "981020".into()
                },
                ExtraInfo {
                    label: "Castrado".into(),
                    value: "true".into()
                },
            ]
        );
        assert_eq!(
            pet.extra_contacts,
            vec![SecondaryContact {
                name: "Ana".into(),
                phone: "+56911111111".into()
            }]
        );
    }

    #[test]
    fn test_broken_extensions_become_empty() {
        assert!(parse_extra_info(json!("{not json")).is_empty());
        assert!(parse_extra_info(json!({"label": "x"})).is_empty());
        assert!(parse_secondary_contacts(Value::Null).is_empty());
    }

    #[test]
    fn test_new_pet_skips_missing_optionals() {
        let payload = NewPet {
            owner_id: uuid::Uuid::nil(),
            name: "Toby".into(),
            species: "Perro".into(),
            breed: None,
            color: Some("Negro".into()),
            birth_year: None,
            birth_date: None,
            photo_url: None,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "owner_id": "00000000-0000-0000-0000-000000000000",
                "name": "Toby",
                "species": "Perro",
                "color": "Negro"
            })
        );
    }

    #[test]
    fn test_profile_update_sends_nulls() {
        let value = serde_json::to_value(PetProfileUpdate::default()).unwrap();

        assert_eq!(value["color"], Value::Null);
        assert_eq!(value["weight_kg"], Value::Null);
        assert_eq!(value["extra_info"], json!([]));
    }
}
