use crate::{front, metric, models, services};
use log::{info, warn};

/// Validates the login form and opens a session with it
#[tracing::instrument(skip_all)]
pub async fn login(
    form: &front::forms::user::LoginForm,
    auth_service: &services::ImplAuthService,
) -> anyhow::Result<models::user_app::Session> {
    let credentials = form.validate()?;

    let session = auth_service
        .sign_in_with_password(&credentials.email, &credentials.password)
        .await
        .inspect_err(|_| metric::incr_user_action_statds("login_failed"))?;

    metric::incr_user_action_statds("login");
    Ok(session)
}

#[tracing::instrument(skip_all)]
pub async fn logout(auth_service: &services::ImplAuthService) -> anyhow::Result<()> {
    auth_service.sign_out().await?;

    metric::incr_user_action_statds("logout");
    Ok(())
}

/// Session left by a previous run, still valid after refreshing it if it
/// was about to expire. Any failure means starting from the login screen.
#[tracing::instrument(skip_all)]
pub async fn bootstrap_session(
    auth_service: &services::ImplAuthService,
) -> Option<models::user_app::Session> {
    match auth_service.restore_session().await {
        Ok(None) => return None,
        Ok(Some(_)) => {}
        Err(e) => {
            warn!("persisted session could not be restored: {e}");
            return None;
        }
    }

    match auth_service.get_session().await {
        Ok(session) => {
            if let Some(session) = &session {
                info!("session restored for user {}", session.user.id);
            }
            session
        }
        Err(e) => {
            warn!("persisted session is no longer valid: {e}");
            None
        }
    }
}
