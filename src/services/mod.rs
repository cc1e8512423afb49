pub mod auth;
pub mod backend;
pub mod session_store;
pub mod storage;
#[cfg(test)]
pub mod test_backend;

use crate::models;
use async_trait::async_trait;
use derive_more::{Display, Error};
use tokio::sync::broadcast;

/// Failure reported by the backend or while talking to it
#[derive(Debug, Display, Error, PartialEq)]
pub enum BackendError {
    /// The service answered with an error status, `message` is what it said
    #[display("{message}")]
    Api {
        status: u16,
        #[error(not(source))]
        message: String,
    },
    #[display("{_0}")]
    Transport(#[error(not(source))] String),
    #[display("{_0}")]
    Decode(#[error(not(source))] String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return BackendError::Decode(err.to_string());
        }
        BackendError::Transport(err.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> anyhow::Result<models::user_app::Session>;

    /// Current session, refreshed first when it is about to expire
    async fn get_session(&self) -> anyhow::Result<Option<models::user_app::Session>>;

    /// Asks the auth service who the current token belongs to
    async fn get_user(&self) -> anyhow::Result<Option<models::user_app::AuthUser>>;

    async fn sign_out(&self) -> anyhow::Result<()>;

    /// Loads the persisted session, if any, and makes it current
    async fn restore_session(&self) -> anyhow::Result<Option<models::user_app::Session>>;

    fn subscribe(&self) -> broadcast::Receiver<models::user_app::AuthEvent>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Uploads (upserting) a pet picture at `path` inside the photos bucket
    async fn save_pic(&self, path: &str, body: Vec<u8>, content_type: &str)
    -> anyhow::Result<()>;

    /// Temporary url for a private object of the photos bucket
    async fn create_signed_url(&self, path: &str, expires_in_secs: i64)
    -> anyhow::Result<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<models::user_app::Session>>;

    async fn save(&self, session: &models::user_app::Session) -> anyhow::Result<()>;

    async fn clear(&self) -> anyhow::Result<()>;
}

pub type ImplAuthService = Box<dyn AuthService>;
pub type ImplStorageService = Box<dyn StorageService>;
pub type ImplSessionStore = Box<dyn SessionStore>;
