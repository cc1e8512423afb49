pub mod postgrest;
pub mod postgrest_queries;

use crate::models;
use async_trait::async_trait;
use uuid::Uuid;

/// Tables and procedures of the backend the client talks to. Row level
/// security decides what each call may see, the owner filters only narrow
/// the result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PetRepo: Send + Sync {
    /// Pets of `owner_id`, newest first, list columns only
    async fn get_owner_pets(&self, owner_id: Uuid) -> anyhow::Result<Vec<models::pet::Pet>>;

    async fn get_pet_by_id(&self, pet_id: i64, owner_id: Uuid)
    -> anyhow::Result<models::pet::Pet>;

    async fn insert_pet(&self, pet: &models::pet::NewPet) -> anyhow::Result<()>;

    async fn set_pet_lost_status(&self, pet_id: i64, is_lost: bool) -> anyhow::Result<()>;

    /// Single update of the profile columns, returns the updated row
    async fn update_pet_profile(
        &self,
        pet_id: i64,
        profile: &models::pet::PetProfileUpdate,
    ) -> anyhow::Result<models::pet::Pet>;

    /// Stores the picture path and returns the one saved by the backend
    async fn set_pet_photo_path(&self, pet_id: i64, path: &str)
    -> anyhow::Result<Option<String>>;

    /// Links the tag with `code` to `pet_id` only while it has no pet.
    /// Returns the rows that were updated.
    async fn link_unlinked_tag(
        &self,
        code: &str,
        pet_id: i64,
    ) -> anyhow::Result<Vec<models::tag::Tag>>;

    /// Public record of a lost pet by the code of its tag
    async fn get_public_pet_by_tag(&self, code: &str)
    -> anyhow::Result<Vec<models::tag::PublicPet>>;
}

pub type ImplPetRepo = Box<dyn PetRepo>;
