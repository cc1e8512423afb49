//! # Backend HTTP core
//!
//! Shared `reqwest` client for the auth, rest and storage endpoints of the
//! backend project. Every request carries the anon key as `apikey` and a
//! bearer token: the signed-in user's access token when there is one, the
//! anon key otherwise.

use super::BackendError;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

pub const SINGLE_OBJECT_ACCEPT: &str = "application/vnd.pgrst.object+json";

#[derive(Clone, Debug)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Token used by every clone of this client from now on
    pub fn set_access_token(&self, token: Option<String>) {
        *self
            .access_token
            .write()
            .unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn bearer(&self) -> String {
        self.access_token()
            .unwrap_or_else(|| self.anon_key.to_string())
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Request with the project key and the current bearer token
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
    }

    /// Request authenticated with the anon key whatever the current session
    pub fn anon_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.request_with_token(method, url, &self.anon_key)
    }

    /// Request authenticated with an explicit token instead of the current one
    pub fn request_with_token(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }
}

/// Picks the human readable message out of an error body of any of the
/// backend services
pub fn remote_error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let message = ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|key| match fields.get(*key) {
                Some(Value::String(text)) if !text.trim().is_empty() => Some(text.trim()),
                _ => None,
            });

        if let Some(message) = message {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() || body.len() > 300 {
        return format!("error HTTP {status}");
    }

    body.to_string()
}

async fn error_from_response(response: Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());

    BackendError::Api {
        status,
        message: remote_error_message(status, &body),
    }
}

/// Parses a successful json response or turns the error body into [`BackendError`]
pub async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Like [`handle_response`] for calls whose body is irrelevant
pub async fn expect_success(response: Response) -> Result<(), BackendError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message_from_known_keys() {
        assert_eq!(
            remote_error_message(
                400,
                r#"{"code":"23505","message":"duplicate key value","details":null}"#
            ),
            "duplicate key value"
        );
        assert_eq!(
            remote_error_message(
                400,
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            "Invalid login credentials"
        );
        assert_eq!(
            remote_error_message(422, r#"{"msg":"Password should be at least 6 characters"}"#),
            "Password should be at least 6 characters"
        );
        assert_eq!(
            remote_error_message(404, r#"{"statusCode":"404","error":"not_found"}"#),
            "not_found"
        );
    }

    #[test]
    fn test_remote_error_message_fallbacks() {
        assert_eq!(remote_error_message(502, ""), "error HTTP 502");
        assert_eq!(remote_error_message(500, "upstream down"), "upstream down");
        assert_eq!(remote_error_message(500, &"x".repeat(400)), "error HTTP 500");
    }

    #[test]
    fn test_urls_and_bearer() {
        let client = BackendClient::new("https://demo.supabase.co/", "anon").unwrap();

        assert_eq!(
            client.rest_url("/pets"),
            "https://demo.supabase.co/rest/v1/pets"
        );
        assert_eq!(
            client.storage_url("object/sign/pet-photos/a.jpg"),
            "https://demo.supabase.co/storage/v1/object/sign/pet-photos/a.jpg"
        );
        assert_eq!(client.bearer(), "anon");

        let shared = client.clone();
        client.set_access_token(Some("jwt".into()));
        assert_eq!(shared.bearer(), "jwt");

        shared.set_access_token(None);
        assert_eq!(client.access_token(), None);
    }

    #[test]
    fn test_token_still_updated_after_poisoned_lock() {
        let client = BackendClient::new("https://demo.supabase.co", "anon").unwrap();
        client.set_access_token(Some("old".into()));

        let lock = client.access_token.clone();
        let _ = std::thread::spawn(move || {
            let _guard = lock.write().unwrap();
            panic!("writer died holding the token lock");
        })
        .join();
        assert!(client.access_token.is_poisoned());

        client.set_access_token(Some("new".into()));
        assert_eq!(client.access_token().as_deref(), Some("new"));
        assert_eq!(client.bearer(), "new");
    }
}
