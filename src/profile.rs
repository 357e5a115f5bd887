// src/profile.rs
// =============================================================================
// Profile fetcher: a user's public record, repositories, followers and
// following, as shown on a profile page.
//
// Only the user record is mandatory. The three lists are fetched at the same
// time and each one falls back to empty on failure, so a rate-limited
// followers call does not blank out the whole page.
// =============================================================================

use serde::Serialize;
use tracing::warn;

use crate::error::Result;
use crate::github::{GithubClient, Repo, User, UserSummary};

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user: User,
    pub repos: Vec<Repo>,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
}

pub async fn fetch_profile(github: &GithubClient, login: &str) -> Result<Profile> {
    let user = github.user(login).await?;

    let (repos, followers, following) = futures::join!(
        github.repos(&user.login),
        github.followers(&user.login),
        github.following(&user.login),
    );

    Ok(Profile {
        repos: or_empty(repos, "repositories", &user.login),
        followers: or_empty(followers, "followers", &user.login),
        following: or_empty(following, "following", &user.login),
        user,
    })
}

pub(crate) fn or_empty<T>(result: Result<Vec<T>>, what: &str, login: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(%login, "could not load {what}: {e}");
        Vec::new()
    })
}
