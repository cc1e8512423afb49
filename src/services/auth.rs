use super::backend::{self, BackendClient};
use crate::{consts, models, services};
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

const AUTH_EVENTS_CAPACITY: usize = 16;

/// The auth service refused the refresh token itself (`invalid_grant`)
fn refresh_rejected(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<services::BackendError>(),
        Some(services::BackendError::Api {
            status: 400 | 401,
            ..
        })
    )
}

/// Session management against the auth service of the backend
pub struct AuthHandler {
    backend: BackendClient,
    store: services::ImplSessionStore,
    session: Arc<Mutex<Option<models::user_app::Session>>>,
    events: broadcast::Sender<models::user_app::AuthEvent>,
}

impl AuthHandler {
    pub fn new(backend: BackendClient, store: services::ImplSessionStore) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENTS_CAPACITY);

        Self {
            backend,
            store,
            session: Arc::new(Mutex::new(None)),
            events,
        }
    }

    fn emit(&self, event: models::user_app::AuthEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn request_token(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> anyhow::Result<models::user_app::Session> {
        let url = format!("{}?grant_type={grant_type}", self.backend.auth_url("token"));

        let response = self
            .backend
            .anon_request(Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(services::BackendError::from)?;

        let token: models::user_app::TokenResponse = backend::handle_response(response).await?;

        Ok(models::user_app::Session::from_token_response(
            token,
            Utc::now(),
        ))
    }

    /// Makes `session` current everywhere and persists it
    async fn install_session(&self, session: &models::user_app::Session) {
        self.backend
            .set_access_token(Some(session.access_token.clone()));

        if let Err(e) = self.store.save(session).await {
            warn!("session could not be persisted: {e}");
        }
    }

    async fn drop_session(&self) {
        self.backend.set_access_token(None);

        if let Err(e) = self.store.clear().await {
            warn!("persisted session could not be removed: {e}");
        }
    }
}

#[async_trait]
impl services::AuthService for AuthHandler {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> anyhow::Result<models::user_app::Session> {
        let session = self
            .request_token("password", json!({"email": email, "password": password}))
            .await?;

        *self.session.lock().await = Some(session.clone());
        self.install_session(&session).await;

        info!("signed in user {}", session.user.id);
        self.emit(models::user_app::AuthEvent::SignedIn(session.clone()));

        Ok(session)
    }

    async fn get_session(&self) -> anyhow::Result<Option<models::user_app::Session>> {
        let mut current = self.session.lock().await;

        let Some(session) = current.clone() else {
            return Ok(None);
        };

        if !session.needs_refresh(Utc::now(), consts::SESSION_REFRESH_MARGIN_SECS) {
            return Ok(Some(session));
        }

        match self
            .request_token(
                "refresh_token",
                json!({"refresh_token": session.refresh_token}),
            )
            .await
        {
            Ok(refreshed) => {
                *current = Some(refreshed.clone());
                drop(current);

                self.install_session(&refreshed).await;
                self.emit(models::user_app::AuthEvent::TokenRefreshed(
                    refreshed.clone(),
                ));

                Ok(Some(refreshed))
            }
            // transport and decode failures keep the session for a later retry
            Err(e) if !refresh_rejected(&e) => {
                warn!("session refresh failed, stored session kept: {e}");
                Err(e)
            }
            Err(e) => {
                *current = None;
                drop(current);

                warn!("refresh token rejected: {e}");
                self.drop_session().await;
                self.emit(models::user_app::AuthEvent::SignedOut);

                Err(e)
            }
        }
    }

    async fn get_user(&self) -> anyhow::Result<Option<models::user_app::AuthUser>> {
        let Some(session) = self.get_session().await? else {
            return Ok(None);
        };

        let response = self
            .backend
            .request_with_token(
                Method::GET,
                &self.backend.auth_url("user"),
                &session.access_token,
            )
            .send()
            .await
            .map_err(services::BackendError::from)?;

        match backend::handle_response::<models::user_app::AuthUser>(response).await {
            Ok(user) => Ok(Some(user)),
            Err(services::BackendError::Api { status: 401, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn sign_out(&self) -> anyhow::Result<()> {
        let mut current = self.session.lock().await;

        if let Some(session) = current.as_ref() {
            let response = self
                .backend
                .request_with_token(
                    Method::POST,
                    &self.backend.auth_url("logout"),
                    &session.access_token,
                )
                .send()
                .await
                .map_err(services::BackendError::from)?;

            match backend::expect_success(response).await {
                Ok(()) => {}
                // token already revoked or expired, nothing left to close remotely
                Err(e) if matches!(e.status(), Some(401 | 403 | 404)) => {
                    warn!("remote sign out ignored: {e}");
                }
                Err(e) => return Err(e.into()),
            }
        }

        *current = None;
        drop(current);

        self.drop_session().await;
        info!("signed out");
        self.emit(models::user_app::AuthEvent::SignedOut);

        Ok(())
    }

    async fn restore_session(&self) -> anyhow::Result<Option<models::user_app::Session>> {
        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("persisted session could not be read: {e}");
                None
            }
        };

        let Some(stored) = stored else {
            return Ok(None);
        };

        self.backend
            .set_access_token(Some(stored.access_token.clone()));
        *self.session.lock().await = Some(stored);

        self.get_session().await
    }

    fn subscribe(&self) -> broadcast::Receiver<models::user_app::AuthEvent> {
        self.events.subscribe()
    }
}
