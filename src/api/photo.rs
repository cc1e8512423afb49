//! Pet pictures: upload to the private bucket and the per pet cache of the
//! signed urls used to display them.

use crate::{consts, front, models, repo, services};
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use log::warn;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct CachedSignedUrl {
    path: String,
    url: String,
    expires_at: DateTime<Utc>,
}

/// Signed urls already issued, one per pet. An entry is only reused for the
/// same storage path and until shortly before it expires.
#[derive(Debug, Default)]
pub struct SignedUrlCache {
    entries: HashMap<i64, CachedSignedUrl>,
}

impl SignedUrlCache {
    pub fn get(&self, pet_id: i64, path: &str, now: DateTime<Utc>) -> Option<&str> {
        let margin = Duration::seconds(consts::SIGNED_URL_EXPIRY_MARGIN_SECS);

        self.entries
            .get(&pet_id)
            .filter(|entry| entry.path == path && now < entry.expires_at - margin)
            .map(|entry| entry.url.as_str())
    }

    pub fn insert(&mut self, pet_id: i64, path: &str, url: String, now: DateTime<Utc>) {
        self.entries.insert(
            pet_id,
            CachedSignedUrl {
                path: path.to_string(),
                url,
                expires_at: now + Duration::seconds(consts::SIGNED_URL_TTL_SECS),
            },
        );
    }

    pub fn invalidate(&mut self, pet_id: i64) {
        self.entries.remove(&pet_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Storage path of the main picture of a pet
pub fn pet_photo_path(owner_id: uuid::Uuid, pet_id: i64) -> String {
    format!("{owner_id}/{pet_id}/{}", consts::PET_PHOTO_FILE_NAME)
}

fn stored_path(pet: &models::pet::Pet) -> Option<&str> {
    pet.photo_url
        .as_deref()
        .map(str::trim)
        .filter(|path| !path.is_empty())
}

/// Display urls for a list of pets. Cache misses are requested at the same
/// time; a pet without picture, or whose request failed, is left out.
#[tracing::instrument(skip_all, fields(pets = pets.len()))]
pub async fn resolve_pet_photos(
    pets: &[models::pet::Pet],
    cache: &mut SignedUrlCache,
    storage_service: &services::ImplStorageService,
    now: DateTime<Utc>,
) -> HashMap<i64, String> {
    let mut urls = HashMap::new();
    let mut misses = Vec::new();

    for pet in pets {
        let Some(path) = stored_path(pet) else {
            continue;
        };

        match cache.get(pet.id, path, now) {
            Some(url) => {
                urls.insert(pet.id, url.to_string());
            }
            None => misses.push((pet.id, path.to_string())),
        }
    }

    let signed = join_all(misses.into_iter().map(|(pet_id, path)| async move {
        let result = storage_service
            .create_signed_url(&path, consts::SIGNED_URL_TTL_SECS)
            .await;
        (pet_id, path, result)
    }))
    .await;

    for (pet_id, path, result) in signed {
        match result {
            Ok(url) => {
                cache.insert(pet_id, &path, url.clone(), now);
                urls.insert(pet_id, url);
            }
            Err(e) => warn!("signed url for pet {pet_id} failed: {e}"),
        }
    }

    urls
}

/// Display url of a single pet, through the same cache
pub async fn resolve_pet_photo(
    pet: &models::pet::Pet,
    cache: &mut SignedUrlCache,
    storage_service: &services::ImplStorageService,
    now: DateTime<Utc>,
) -> Option<String> {
    resolve_pet_photos(std::slice::from_ref(pet), cache, storage_service, now)
        .await
        .remove(&pet.id)
}

/// Uploads the picture of `pet_id` and stores its path on the pet row.
/// Returns the path saved by the backend.
#[tracing::instrument(skip(pic, auth_service, repo, storage_service, cache))]
pub async fn upload_pet_photo(
    pet_id: i64,
    pic: models::Pic,
    cache: &mut SignedUrlCache,
    auth_service: &services::ImplAuthService,
    repo: &repo::ImplPetRepo,
    storage_service: &services::ImplStorageService,
) -> anyhow::Result<Option<String>> {
    let user = auth_service
        .get_user()
        .await?
        .ok_or(front::errors::UserError::Unauthorized)?;

    let path = pet_photo_path(user.id, pet_id);

    let content_type = pic.content_type();
    storage_service
        .save_pic(&path, pic.body, content_type)
        .await?;
    let saved = repo.set_pet_photo_path(pet_id, &path).await?;

    cache.invalidate(pet_id);
    crate::metric::incr_user_action_statds("upload_photo");

    Ok(saved.or(Some(path)))
}
