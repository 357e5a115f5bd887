// src/backend/auth.rs
// =============================================================================
// Email + password authentication against Supabase's GoTrue service.
//
// Sign in always returns a session with an access token. Sign up returns a
// session too, unless the project requires email confirmation, in which case
// only the user record comes back and the access token is None.
//
// Access tokens are short lived (about an hour). The refresh token that comes
// with them is exchanged for a fresh pair via grant_type=refresh_token.
// =============================================================================

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::client::Backend;
use crate::error::Result;

/// Who just authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub email: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    // present when the response *is* the user record
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl AuthResponse {
    fn into_session(self, submitted_email: &str) -> AuthSession {
        let email = self
            .user
            .and_then(|u| u.email)
            .or(self.email)
            .unwrap_or_else(|| submitted_email.to_string());
        AuthSession {
            email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}

impl Backend {
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = self.url(&["auth", "v1", "signup"]);
        let response: AuthResponse = self
            .send_json(self.post(url).json(&Credentials { email, password }))
            .await?;

        let session = response.into_session(email);
        if session.access_token.is_none() {
            info!(email = %session.email, "signed up, email confirmation pending");
        }
        Ok(session)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        let mut url = self.url(&["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");
        let response: AuthResponse = self
            .send_json(self.post(url).json(&Credentials { email, password }))
            .await?;
        Ok(response.into_session(email))
    }

    /// Trades a refresh token for a new access/refresh token pair.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        // Always as the anon role: the old access token is the expired one.
        let anon = self.clone().with_access_token(None);
        let mut url = anon.url(&["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");
        let response: AuthResponse = anon
            .send_json(anon.post(url).json(&json!({ "refresh_token": refresh_token })))
            .await?;
        Ok(response.into_session(""))
    }

    /// Revokes the given access token. The caller clears the local session
    /// whatever the outcome.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let as_user = self.clone().with_access_token(Some(access_token.to_string()));
        let url = as_user.url(&["auth", "v1", "logout"]);
        as_user.send_unit(as_user.post(url).json(&json!({}))).await
    }
}
