// src/session/mod.rs
// =============================================================================
// Local credential storage.
//
// The session file plays the role a browser's localStorage plays for a web
// client: it remembers who is logged in and which GitHub username they bound
// to, so every command does not have to authenticate again.
//
// Submodules:
// - store: the session file and the login / username guards
// - renew: refresh-and-retry when the saved access token has expired
// =============================================================================

mod renew;
mod store;

pub use renew::{renew, sign_out};
pub use store::{Session, SessionStore};
