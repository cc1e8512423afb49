use super::backend::{self, BackendClient};
use crate::{consts, services};
use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

/// Object storage of the backend, restricted to the pet photos bucket
#[derive(Clone)]
pub struct StorageHandler {
    pub backend: BackendClient,
}

/// Makes the relative url returned by the sign endpoint absolute
pub fn absolute_signed_url(storage_base: &str, signed_url: &str) -> String {
    if signed_url.starts_with("http://") || signed_url.starts_with("https://") {
        return signed_url.to_string();
    }

    format!(
        "{}/{}",
        storage_base.trim_end_matches('/'),
        signed_url.trim_start_matches('/')
    )
}

#[async_trait]
impl services::StorageService for StorageHandler {
    async fn save_pic(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        let url = self.backend.storage_url(&format!(
            "object/{bucket}/{path}",
            bucket = consts::PET_PHOTOS_BUCKET
        ));

        let response = self
            .backend
            .request(Method::POST, &url)
            .header("x-upsert", "true")
            .header("content-type", content_type)
            .body(body)
            .send()
            .await
            .map_err(services::BackendError::from)?;

        Ok(backend::expect_success(response).await?)
    }

    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: i64,
    ) -> anyhow::Result<String> {
        let url = self.backend.storage_url(&format!(
            "object/sign/{bucket}/{path}",
            bucket = consts::PET_PHOTOS_BUCKET
        ));

        let response = self
            .backend
            .request(Method::POST, &url)
            .json(&json!({"expiresIn": expires_in_secs}))
            .send()
            .await
            .map_err(services::BackendError::from)?;

        let signed: SignedUrlResponse = backend::handle_response(response).await?;

        Ok(absolute_signed_url(
            &self.backend.storage_url(""),
            &signed.signed_url,
        ))
    }
}
