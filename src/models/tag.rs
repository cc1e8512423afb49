use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum TagStatus {
    #[default]
    #[display("unlinked")]
    #[serde(rename = "unlinked")]
    Unlinked,
    #[display("linked")]
    #[serde(rename = "linked")]
    Linked,
    /// Any status the backend knows and this client does not
    #[display("other")]
    #[serde(other)]
    Other,
}

/// Row of the `tags` table
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub pet_id: Option<i64>,
    #[serde(default)]
    pub status: TagStatus,
}

/// Reader the tag code came from
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TagSource {
    #[display("QR")]
    Qr,
    #[display("NFC")]
    Nfc,
}

/// Redacted record returned to whoever scans the tag of a lost pet
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PublicPet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub public_notes: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_whatsapp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_status_serde() {
        let tag: Tag = serde_json::from_value(json!({
            "id": 3,
            "code": "AB12",
            "pet_id": 9,
            "status": "linked"
        }))
        .unwrap();
        assert_eq!(tag.status, TagStatus::Linked);

        let tag: Tag =
            serde_json::from_value(json!({"id": 4, "code": "X", "status": "retired"})).unwrap();
        assert_eq!(tag.status, TagStatus::Other);
        assert_eq!(tag.pet_id, None);

        assert_eq!(serde_json::to_value(TagStatus::Linked).unwrap(), json!("linked"));
    }

    #[test]
    fn test_public_pet_tolerates_missing_fields() {
        let pet: PublicPet = serde_json::from_value(json!({
            "name": "Toby",
            "species": "Perro",
            "contact_whatsapp": "+56 9 1234 5678"
        }))
        .unwrap();

        assert_eq!(pet.breed, None);
        assert_eq!(pet.contact_whatsapp.as_deref(), Some("+56 9 1234 5678"));
    }
}
