// src/session/renew.rs
// =============================================================================
// Keeping a saved session usable after its access token expires.
//
// A command that hits an expired token:
// 1. trades the saved refresh token for a new pair
// 2. writes the new pair to the session file
// 3. retries once with the new access token
// =============================================================================

use tracing::{debug, info, warn};

use super::store::{Session, SessionStore};
use crate::backend::Backend;
use crate::error::Result;

/// Refreshes the session's tokens. Returns the new access token, or None
/// when there is nothing to refresh with or GoTrue refused.
pub async fn renew(session: &mut Session, store: &SessionStore, backend: &Backend) -> Option<String> {
    let refresh_token = session.refresh_token.clone()?;

    let fresh = match backend.refresh_session(&refresh_token).await {
        Ok(fresh) => fresh,
        Err(e) => {
            warn!("could not refresh the session: {e}");
            return None;
        }
    };

    session.replace_tokens(fresh.access_token, fresh.refresh_token);
    if let Err(e) = store.save(session) {
        warn!("refreshed session could not be saved: {e}");
    }
    info!(email = %session.email, "session refreshed");
    session.access_token.clone()
}

/// Revokes the session's access token, refreshing it first if it expired.
pub async fn sign_out(session: &mut Session, store: &SessionStore, backend: &Backend) -> Result<()> {
    let Some(token) = session.access_token.clone() else {
        debug!("no access token to revoke");
        return Ok(());
    };

    match backend.sign_out(&token).await {
        Err(e) if e.is_expired_token() => match renew(session, store, backend).await {
            Some(fresh) => backend.sign_out(&fresh).await,
            None => Err(e),
        },
        other => other,
    }
}
