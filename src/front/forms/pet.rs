use crate::{
    consts,
    front::{calendar, errors::UserError, utils},
    models,
};
use chrono::{Datelike, NaiveDate};
use derive_more::Display;
use std::str::FromStr;
use uuid::Uuid;

fn invalid(msg: &str) -> UserError {
    UserError::FormInputValueError(msg.to_string())
}

/// Add pet form that passed validation, still without owner
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPet {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub birth_year: Option<i32>,
    pub birth_date: Option<NaiveDate>,
}

impl ValidatedPet {
    pub fn into_new_pet(self, owner_id: Uuid) -> models::pet::NewPet {
        models::pet::NewPet {
            owner_id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            color: self.color,
            birth_year: self.birth_year,
            birth_date: self.birth_date,
            photo_url: None,
        }
    }
}

/// Form of the "add pet" screen
#[derive(Debug, Clone, PartialEq)]
pub struct AddPetForm {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub color: String,
    pub show_species_dropdown: bool,
    pub birth_date: calendar::DatePicker,
}

impl AddPetForm {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            species: consts::SPECIES_OPTIONS[0].to_string(),
            breed: String::new(),
            color: String::new(),
            show_species_dropdown: false,
            birth_date: calendar::DatePicker::new(today),
        }
    }

    /// Picks one of the species options, matched without case
    pub fn select_species(&mut self, option: &str) -> Result<(), UserError> {
        let option = consts::SPECIES_OPTIONS
            .iter()
            .find(|o| o.eq_ignore_ascii_case(option.trim()))
            .ok_or_else(|| invalid("Especie no disponible"))?;

        self.species = option.to_string();
        self.show_species_dropdown = false;
        Ok(())
    }

    /// Checks the form like the shared add pet schema, first failing rule wins
    pub fn validate(&self, current_year: i32) -> Result<ValidatedPet, UserError> {
        let name = self.name.trim();
        if name.chars().count() < consts::MIN_PET_TEXT_LEN {
            return Err(invalid("El nombre es obligatorio"));
        }

        let species = self.species.trim();
        if species.chars().count() < consts::MIN_PET_TEXT_LEN {
            return Err(invalid("La especie es obligatoria"));
        }

        let birth_date = self.birth_date.selected;
        let birth_year = birth_date.map(|d| d.year());
        if let Some(year) = birth_year {
            if !(consts::MIN_BIRTH_YEAR..=current_year).contains(&year) {
                return Err(invalid("Año de nacimiento inválido"));
            }
        }

        Ok(ValidatedPet {
            name: name.to_string(),
            species: species.to_string(),
            breed: utils::normalize_string_or_null(&self.breed),
            color: utils::normalize_string_or_null(&self.color),
            birth_year,
            birth_date,
        })
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }
}

/// Editable field of the profile draft
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    #[display("color")]
    Color,
    #[display("birth_year")]
    BirthYear,
    #[display("birth_date")]
    BirthDate,
    #[display("sex")]
    Sex,
    #[display("weight")]
    Weight,
    #[display("phone")]
    OwnerPhone,
    #[display("whatsapp")]
    OwnerWhatsapp,
    #[display("notes")]
    PublicNotes,
    #[display("allergies")]
    Allergies,
    #[display("medications")]
    Medications,
    #[display("conditions")]
    Conditions,
    #[display("vet")]
    VetName,
    #[display("vet_phone")]
    VetPhone,
}

impl ProfileField {
    pub const ALL: [ProfileField; 13] = [
        ProfileField::Color,
        ProfileField::BirthYear,
        ProfileField::BirthDate,
        ProfileField::Sex,
        ProfileField::Weight,
        ProfileField::OwnerPhone,
        ProfileField::OwnerWhatsapp,
        ProfileField::PublicNotes,
        ProfileField::Allergies,
        ProfileField::Medications,
        ProfileField::Conditions,
        ProfileField::VetName,
        ProfileField::VetPhone,
    ];
}

impl FromStr for ProfileField {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        ProfileField::ALL
            .into_iter()
            .find(|field| field.to_string() == key)
            .ok_or_else(|| invalid(&format!("Campo desconocido: {key}")))
    }
}

/// Local copy of the profile while it is edited, every value as typed
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PetProfileDraft {
    pub color: String,
    pub birth_year: String,
    pub birth_date: String,
    pub sex: String,
    pub weight_kg: String,
    pub owner_phone: String,
    pub owner_whatsapp: String,
    pub public_notes: String,
    pub allergies: String,
    pub medications: String,
    pub conditions: String,
    pub vet_name: String,
    pub vet_phone: String,
    pub extra_info: Vec<models::pet::ExtraInfo>,
    pub extra_contacts: Vec<models::pet::SecondaryContact>,
}

impl From<&models::pet::Pet> for PetProfileDraft {
    fn from(pet: &models::pet::Pet) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        PetProfileDraft {
            color: text(&pet.color),
            birth_year: pet
                .birth_year
                .filter(|y| *y != 0)
                .map(|y| y.to_string())
                .unwrap_or_default(),
            birth_date: pet
                .birth_date
                .map(calendar::format_birth_date)
                .unwrap_or_default(),
            sex: text(&pet.sex),
            weight_kg: pet.weight_kg.map(|w| w.to_string()).unwrap_or_default(),
            owner_phone: text(&pet.owner_phone),
            owner_whatsapp: text(&pet.owner_whatsapp),
            public_notes: text(&pet.public_notes),
            allergies: text(&pet.allergies),
            medications: text(&pet.medications),
            conditions: text(&pet.conditions),
            vet_name: text(&pet.vet_name),
            vet_phone: text(&pet.vet_phone),
            extra_info: pet.extra_info.clone(),
            extra_contacts: pet.extra_contacts.clone(),
        }
    }
}

fn parse_birth_year(raw: &str) -> Result<Option<i32>, UserError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.parse::<i32>() {
        Ok(year) if (consts::MIN_BIRTH_YEAR..=consts::MAX_PROFILE_BIRTH_YEAR).contains(&year) => {
            Ok(Some(year))
        }
        _ => Err(invalid("Año de nacimiento inválido")),
    }
}

fn parse_weight(raw: &str) -> Result<Option<f64>, UserError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    match raw.replace(',', ".").parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 && weight <= consts::MAX_WEIGHT_KG => {
            Ok(Some(weight))
        }
        _ => Err(invalid("Peso inválido")),
    }
}

impl PetProfileDraft {
    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Color => &self.color,
            ProfileField::BirthYear => &self.birth_year,
            ProfileField::BirthDate => &self.birth_date,
            ProfileField::Sex => &self.sex,
            ProfileField::Weight => &self.weight_kg,
            ProfileField::OwnerPhone => &self.owner_phone,
            ProfileField::OwnerWhatsapp => &self.owner_whatsapp,
            ProfileField::PublicNotes => &self.public_notes,
            ProfileField::Allergies => &self.allergies,
            ProfileField::Medications => &self.medications,
            ProfileField::Conditions => &self.conditions,
            ProfileField::VetName => &self.vet_name,
            ProfileField::VetPhone => &self.vet_phone,
        }
    }

    pub fn field_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Color => &mut self.color,
            ProfileField::BirthYear => &mut self.birth_year,
            ProfileField::BirthDate => &mut self.birth_date,
            ProfileField::Sex => &mut self.sex,
            ProfileField::Weight => &mut self.weight_kg,
            ProfileField::OwnerPhone => &mut self.owner_phone,
            ProfileField::OwnerWhatsapp => &mut self.owner_whatsapp,
            ProfileField::PublicNotes => &mut self.public_notes,
            ProfileField::Allergies => &mut self.allergies,
            ProfileField::Medications => &mut self.medications,
            ProfileField::Conditions => &mut self.conditions,
            ProfileField::VetName => &mut self.vet_name,
            ProfileField::VetPhone => &mut self.vet_phone,
        }
    }

    pub fn set(&mut self, field: ProfileField, value: &str) {
        *self.field_mut(field) = value.to_string();
    }

    pub fn add_extra_info(&mut self, label: &str, value: &str) {
        self.extra_info.push(models::pet::ExtraInfo {
            label: label.trim().to_string(),
            value: value.trim().to_string(),
        });
    }

    pub fn add_extra_contact(&mut self, name: &str, phone: &str) {
        self.extra_contacts.push(models::pet::SecondaryContact {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
        });
    }

    /// Removes the entry at the 1-based `position`
    pub fn remove_extra_info(&mut self, position: usize) -> bool {
        if position == 0 || position > self.extra_info.len() {
            return false;
        }
        self.extra_info.remove(position - 1);
        true
    }

    /// Removes the contact at the 1-based `position`
    pub fn remove_extra_contact(&mut self, position: usize) -> bool {
        if position == 0 || position > self.extra_contacts.len() {
            return false;
        }
        self.extra_contacts.remove(position - 1);
        true
    }

    /// Validates the draft and builds the single update sent to the backend.
    /// Blank text becomes null.
    pub fn to_update(&self, today: NaiveDate) -> Result<models::pet::PetProfileUpdate, UserError> {
        let mut birth_year = parse_birth_year(&self.birth_year)?;

        let birth_date = match utils::normalize_string_or_null(&self.birth_date) {
            Some(typed) => Some(
                calendar::parse_typed_date(&typed, today)
                    .ok_or_else(|| invalid("Fecha inválida"))?,
            ),
            None => None,
        };

        if birth_year.is_none() {
            birth_year = birth_date
                .map(|d| parse_birth_year(&d.year().to_string()))
                .transpose()?
                .flatten();
        }

        let weight_kg = parse_weight(&self.weight_kg)?;

        Ok(models::pet::PetProfileUpdate {
            color: utils::normalize_string_or_null(&self.color),
            birth_year,
            birth_date,
            sex: utils::normalize_string_or_null(&self.sex),
            weight_kg,
            owner_phone: utils::normalize_string_or_null(&self.owner_phone),
            owner_whatsapp: utils::normalize_string_or_null(&self.owner_whatsapp),
            public_notes: utils::normalize_string_or_null(&self.public_notes),
            allergies: utils::normalize_string_or_null(&self.allergies),
            medications: utils::normalize_string_or_null(&self.medications),
            conditions: utils::normalize_string_or_null(&self.conditions),
            vet_name: utils::normalize_string_or_null(&self.vet_name),
            vet_phone: utils::normalize_string_or_null(&self.vet_phone),
            extra_info: self
                .extra_info
                .iter()
                .filter(|i| !i.label.trim().is_empty() && !i.value.trim().is_empty())
                .cloned()
                .collect(),
            extra_contacts: self
                .extra_contacts
                .iter()
                .filter(|c| !c.name.trim().is_empty() && !c.phone.trim().is_empty())
                .cloned()
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn add_form(name: &str) -> AddPetForm {
        AddPetForm {
            name: name.into(),
            ..AddPetForm::new(today())
        }
    }

    #[test]
    fn test_add_pet_defaults() {
        let form = AddPetForm::new(today());

        assert_eq!(form.species, "Perro");
        assert!(!form.show_species_dropdown);
        assert_eq!(
            form.birth_date.visible_month,
            NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
        );
    }

    #[test]
    fn test_add_pet_validation() {
        let owner = Uuid::new_v4();

        assert_eq!(
            add_form(" T ").validate(2026),
            Err(invalid("El nombre es obligatorio"))
        );

        let mut form = add_form("Toby");
        form.species = "G".into();
        assert_eq!(
            form.validate(2026),
            Err(invalid("La especie es obligatoria"))
        );

        let mut form = add_form("Toby");
        form.breed = "  ".into();
        form.color = " Café ".into();
        form.birth_date
            .set_date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());

        let pet = form.validate(2026).unwrap().into_new_pet(owner);
        assert_eq!(pet.owner_id, owner);
        assert_eq!(pet.breed, None);
        assert_eq!(pet.color.as_deref(), Some("Café"));
        assert_eq!(pet.birth_year, Some(2020));
    }

    #[test]
    fn test_add_pet_birth_year_range() {
        let mut form = add_form("Toby");
        form.birth_date
            .set_date(NaiveDate::from_ymd_opt(1989, 12, 31).unwrap());
        assert!(form.validate(2026).is_err());

        form.birth_date
            .set_date(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
        assert!(form.validate(2026).is_err());

        form.birth_date
            .set_date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert!(form.validate(2026).is_ok());
    }

    #[test]
    fn test_select_species() {
        let mut form = add_form("Toby");
        form.show_species_dropdown = true;

        form.select_species("gato").unwrap();
        assert_eq!(form.species, "Gato");
        assert!(!form.show_species_dropdown);

        assert!(form.select_species("Iguana").is_err());
        assert_eq!(form.species, "Gato");
    }

    #[test]
    fn test_profile_field_from_str() {
        assert_eq!("Weight".parse::<ProfileField>(), Ok(ProfileField::Weight));
        assert_eq!("vet_phone".parse::<ProfileField>(), Ok(ProfileField::VetPhone));
        assert!("owner".parse::<ProfileField>().is_err());
    }

    #[test]
    fn test_draft_from_pet() {
        let pet = models::pet::Pet {
            id: 1,
            name: "Toby".into(),
            species: "Perro".into(),
            birth_year: Some(0),
            weight_kg: Some(0.0),
            vet_name: Some("Dra. Paz".into()),
            birth_date: NaiveDate::from_ymd_opt(2019, 5, 3),
            ..Default::default()
        };

        let draft = PetProfileDraft::from(&pet);
        assert_eq!(draft.birth_year, "");
        assert_eq!(draft.weight_kg, "0");
        assert_eq!(draft.vet_name, "Dra. Paz");
        assert_eq!(draft.birth_date, "03/05/2019");
        assert_eq!(draft.color, "");
    }

    #[test]
    fn test_draft_to_update_normalizes() {
        let mut draft = PetProfileDraft::default();
        draft.set(ProfileField::Color, "  Negro con blanco ");
        draft.set(ProfileField::Sex, "   ");
        draft.set(ProfileField::Weight, "12,5");
        draft.set(ProfileField::BirthYear, "2019");
        draft.add_extra_info("Chip", "981020");
        draft.add_extra_info("  ", "sin etiqueta");
        draft.add_extra_contact("Ana", "");
        draft.add_extra_contact(" ", "+56922222222");
        draft.add_extra_contact("Luis", "+56911111111");

        let update = draft.to_update(today()).unwrap();
        assert_eq!(update.color.as_deref(), Some("Negro con blanco"));
        assert_eq!(update.sex, None);
        assert_eq!(update.weight_kg, Some(12.5));
        assert_eq!(update.birth_year, Some(2019));
        assert_eq!(update.birth_date, None);
        assert_eq!(update.extra_info.len(), 1);
        assert_eq!(update.extra_contacts.len(), 1);
        assert_eq!(update.extra_contacts[0].name, "Luis");
    }

    #[test]
    fn test_draft_rejects_out_of_range_values() {
        let mut draft = PetProfileDraft::default();

        for year in ["1989", "2036", "20x0", "2020.5"] {
            draft.set(ProfileField::BirthYear, year);
            assert_eq!(
                draft.to_update(today()),
                Err(invalid("Año de nacimiento inválido"))
            );
        }
        draft.set(ProfileField::BirthYear, "2035");
        assert!(draft.to_update(today()).is_ok());

        for weight in ["0", "-3", "120.01", "NaN", "inf", "pesado"] {
            draft.set(ProfileField::Weight, weight);
            assert_eq!(draft.to_update(today()), Err(invalid("Peso inválido")));
        }
        draft.set(ProfileField::Weight, "120");
        assert!(draft.to_update(today()).is_ok());
    }

    #[test]
    fn test_draft_typed_birth_date() {
        let mut draft = PetProfileDraft::default();

        draft.set(ProfileField::BirthDate, "31/02/20");
        assert_eq!(draft.to_update(today()), Err(invalid("Fecha inválida")));

        draft.set(ProfileField::BirthDate, "14/08/21");
        let update = draft.to_update(today()).unwrap();
        assert_eq!(update.birth_date, NaiveDate::from_ymd_opt(2021, 8, 14));
        // the year follows the date when it was left blank
        assert_eq!(update.birth_year, Some(2021));

        draft.set(ProfileField::BirthDate, "14/08/85");
        assert_eq!(
            draft.to_update(today()),
            Err(invalid("Año de nacimiento inválido"))
        );
    }

    #[test]
    fn test_remove_extensions_by_position() {
        let mut draft = PetProfileDraft::default();
        draft.add_extra_info("a", "1");
        draft.add_extra_info("b", "2");

        assert!(!draft.remove_extra_info(0));
        assert!(!draft.remove_extra_info(3));
        assert!(draft.remove_extra_info(1));
        assert_eq!(draft.extra_info[0].label, "b");
        assert!(!draft.remove_extra_contact(1));
    }
}
