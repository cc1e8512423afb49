use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user as returned by the auth service
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token response of the auth service
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: AuthUser,
}

/// Session kept by the client and persisted between runs
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: AuthUser,
}

impl Session {
    /// Builds the session from a token response received at `now`
    pub fn from_token_response(token: TokenResponse, now: DateTime<Utc>) -> Self {
        let expires_at = token
            .expires_at
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(|| now + Duration::seconds(token.expires_in.unwrap_or(3600)));

        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        }
    }

    /// True when the access token expires within `margin_secs` of `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.expires_at - Duration::seconds(margin_secs) <= now
    }
}

#[derive(Debug, Display, Clone, PartialEq)]
pub enum AuthEvent {
    #[display("SIGNED_IN")]
    SignedIn(Session),
    #[display("TOKEN_REFRESHED")]
    TokenRefreshed(Session),
    #[display("SIGNED_OUT")]
    SignedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(expires_at: Option<i64>) -> TokenResponse {
        serde_json::from_value(json!({
            "access_token": "jwt",
            "refresh_token": "refresh",
            "expires_in": 120,
            "expires_at": expires_at,
            "token_type": "bearer",
            "user": {"id": "7f0d6a4e-2b7c-4c8e-9a55-0c8f3b1d2e10", "email": "a@b.cl"}
        }))
        .unwrap()
    }

    #[test]
    fn test_expiry_prefers_absolute_timestamp() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        let session = Session::from_token_response(token(Some(1_700_000_500)), now);
        assert_eq!(session.expires_at.timestamp(), 1_700_000_500);

        let session = Session::from_token_response(token(None), now);
        assert_eq!(session.expires_at.timestamp(), 1_700_000_120);
    }

    #[test]
    fn test_needs_refresh_with_margin() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let session = Session::from_token_response(token(None), now);

        assert!(!session.needs_refresh(now, 60));
        assert!(session.needs_refresh(now + Duration::seconds(61), 60));
    }
}
