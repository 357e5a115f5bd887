// src/directory.rs
// =============================================================================
// The "Explore People" directory: every username registered with the app,
// straight from the relational store. It never touches the GitHub API.
// =============================================================================

use tracing::warn;

use crate::backend::Backend;
use crate::error::Result;

pub async fn list_handles(backend: &Backend) -> Result<Vec<String>> {
    backend.usernames().await
}

/// The directory is a sidebar on the feed and profile pages; if it fails to
/// load those pages still render, just with an empty directory.
pub async fn list_handles_or_empty(backend: Option<&Backend>) -> Vec<String> {
    let Some(backend) = backend else {
        return Vec::new();
    };

    match list_handles(backend).await {
        Ok(handles) => handles,
        Err(e) => {
            warn!("could not load the user directory: {e}");
            Vec::new()
        }
    }
}
