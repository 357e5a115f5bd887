// src/identity.rs
// =============================================================================
// Binds a logged-in account to a GitHub username.
//
// How it works:
// 1. Suggest a username by searching GitHub for the account's email
// 2. Take the chosen name, trim it, reject it if empty
// 3. Save it in the local session first, so the user can carry on even if
//    the next step fails
// 4. Register it in the `users` table; a name that is already registered
//    is fine (several accounts may follow the same GitHub user)
//
// A suggested name is only a guess (the email search is fuzzy), so it is
// never bound without the user saying yes.
// =============================================================================

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::github::GithubClient;
use crate::session::{self, Session, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BindOutcome {
    /// New row in the users table
    Registered { username: String },
    /// Someone already registered this name; the local binding still holds
    AlreadyRegistered { username: String },
    /// Bound locally, but the users table rejected the insert
    StoreFailed { username: String, message: String },
}

impl BindOutcome {
    pub fn username(&self) -> &str {
        match self {
            BindOutcome::Registered { username }
            | BindOutcome::AlreadyRegistered { username }
            | BindOutcome::StoreFailed { username, .. } => username,
        }
    }
}

/// Best guess at the account's GitHub login. Any failure just means "no
/// suggestion".
pub async fn suggest_username(github: &GithubClient, email: &str) -> Option<String> {
    match github.search_users(email).await {
        Ok(results) if results.total_count > 0 => {
            results.items.into_iter().next().map(|u| u.login)
        }
        Ok(_) => None,
        Err(e) => {
            warn!("GitHub user search failed: {e}");
            None
        }
    }
}

/// Reads one answer line from `input`. Only "y" or "yes" accepts; anything
/// else, including end of input, declines.
pub async fn confirm<R: AsyncBufRead + Unpin>(mut input: R) -> Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer).await?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub async fn bind_username(
    session: &mut Session,
    store: &SessionStore,
    backend: &Backend,
    raw: &str,
) -> Result<BindOutcome> {
    session.require_logged_in()?;

    let username = raw.trim();
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }
    let username = username.to_string();

    session.username = Some(username.clone());
    store.save(session)?;

    match insert_as_user(session, store, backend, &username).await {
        Ok(()) => {
            info!(%username, "username registered");
            Ok(BindOutcome::Registered { username })
        }
        Err(e) if e.is_unique_violation() => {
            warn!(%username, "username already exists, skipping insert");
            Ok(BindOutcome::AlreadyRegistered { username })
        }
        Err(Error::Backend { message, .. }) => {
            warn!(%username, "failed to save username to database: {message}");
            Ok(BindOutcome::StoreFailed { username, message })
        }
        Err(e) => {
            warn!(%username, "failed to save username to database: {e}");
            Ok(BindOutcome::StoreFailed {
                username,
                message: e.to_string(),
            })
        }
    }
}

// An expired access token gets one retry: with a refreshed token when the
// session can be renewed, otherwise as the anon role.
async fn insert_as_user(
    session: &mut Session,
    store: &SessionStore,
    backend: &Backend,
    username: &str,
) -> Result<()> {
    let expired = match backend.insert_username(username).await {
        Err(e) if e.is_expired_token() => e,
        other => return other,
    };
    debug!("access token rejected: {expired}");

    let retry = match session::renew(session, store, backend).await {
        Some(token) => backend.clone().with_access_token(Some(token)),
        None => {
            warn!("session could not be refreshed, retrying with the anon key");
            backend.clone().with_access_token(None)
        }
    };
    retry.insert_username(username).await
}
