// src/error.rs
// =============================================================================
// Typed errors for the GitHub client, the Supabase backend and the local
// session store.
//
// The CLI layer (main.rs) still works with anyhow::Result, the same way the
// command handlers always have. These variants exist so callers can react to
// specific failures: a guard failure maps to exit code 1, a duplicate
// username is not fatal, and so on.
// =============================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (DNS, TLS, timeout, body decoding)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered, but not with a 2xx
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Supabase reported an error body
    #[error("backend error{}: {message}", code_suffix(.code))]
    Backend {
        code: Option<String>,
        status: u16,
        message: String,
    },

    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not logged in, run `gh-social login` first")]
    NotLoggedIn,

    #[error("no username chosen yet, run `gh-social username` first")]
    NoUsername,

    #[error("Username cannot be empty.")]
    EmptyUsername,
}

impl Error {
    /// Guard failures are the CLI equivalent of being redirected away from a
    /// page; they exit with code 1 instead of 2.
    pub fn is_guard(&self) -> bool {
        matches!(self, Error::NotLoggedIn | Error::NoUsername)
    }

    /// Postgres unique violation, or PostgREST's 409 for the same thing.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Backend { code, status, .. } => {
                code.as_deref() == Some("23505") || *status == 409
            }
            _ => false,
        }
    }

    /// The access token was rejected because it expired (PostgREST reports
    /// PGRST301/PGRST303, GoTrue reports bad_jwt).
    pub fn is_expired_token(&self) -> bool {
        match self {
            Error::Backend {
                code,
                status,
                message,
            } => {
                matches!(code.as_deref(), Some("PGRST301" | "PGRST303" | "bad_jwt"))
                    || (*status == 401 && message.contains("JWT expired"))
            }
            _ => false,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
