//! # Pet API Module
//!
//! Owner side operations on pets: listing, detail, creation, lost status and
//! the profile editor. Every function receives the boxed services it needs,
//! the backend row level security decides what the current user may touch.

use crate::{front, metric, models, repo, services};
use uuid::Uuid;

async fn current_owner_id(auth_service: &services::ImplAuthService) -> anyhow::Result<Option<Uuid>> {
    Ok(auth_service.get_user().await?.map(|user| user.id))
}

/// Pets of the signed in owner, newest first.
///
/// # Returns
/// * `Ok(None)` when nobody is signed in, nothing is requested then
#[tracing::instrument(skip_all)]
pub async fn list_owner_pets(
    auth_service: &services::ImplAuthService,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<Option<Vec<models::pet::Pet>>> {
    let Some(owner_id) = current_owner_id(auth_service).await? else {
        return Ok(None);
    };

    let pets = repo.get_owner_pets(owner_id).await.inspect_err(|_| {
        metric::incr_backend_error_statds("list_pets");
    })?;

    Ok(Some(pets))
}

/// Full row of one pet of the signed in owner
#[tracing::instrument(skip(auth_service, repo))]
pub async fn load_pet_detail(
    pet_id: i64,
    auth_service: &services::ImplAuthService,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<models::pet::Pet> {
    let owner_id = current_owner_id(auth_service)
        .await?
        .ok_or(front::errors::UserError::Unauthorized)?;

    repo.get_pet_by_id(pet_id, owner_id).await
}

/// Validates the add pet form and inserts the pet for the signed in owner.
///
/// # Errors
/// - the form breaks one of its rules (reported before any request)
/// - nobody is signed in
/// - the insert is rejected by the backend
#[tracing::instrument(skip_all)]
pub async fn create_pet(
    form: &front::forms::pet::AddPetForm,
    current_year: i32,
    auth_service: &services::ImplAuthService,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<()> {
    let validated = form.validate(current_year)?;

    let owner_id = current_owner_id(auth_service)
        .await?
        .ok_or(front::errors::UserError::Unauthorized)?;

    repo.insert_pet(&validated.into_new_pet(owner_id)).await?;
    metric::incr_user_action_statds("create_pet");

    Ok(())
}

#[tracing::instrument(skip(repo))]
pub async fn set_lost_status(
    pet_id: i64,
    is_lost: bool,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<()> {
    repo.set_pet_lost_status(pet_id, is_lost).await?;

    metric::incr_user_action_statds(if is_lost { "mark_lost" } else { "mark_home" });
    Ok(())
}

/// Validates the draft and sends it as one update, returns the updated pet
#[tracing::instrument(skip(draft, repo))]
pub async fn save_pet_profile(
    pet_id: i64,
    draft: &front::forms::pet::PetProfileDraft,
    today: chrono::NaiveDate,
    repo: &repo::ImplPetRepo,
) -> anyhow::Result<models::pet::Pet> {
    let update = draft.to_update(today)?;

    let pet = repo.update_pet_profile(pet_id, &update).await?;
    metric::incr_user_action_statds("save_profile");

    Ok(pet)
}
