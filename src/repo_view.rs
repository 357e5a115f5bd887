// src/repo_view.rs
// =============================================================================
// Repository detail: one repository plus its languages, its first few
// contributors, and a handful of the owner's other repositories.
// =============================================================================

use serde::Serialize;

use crate::error::Result;
use crate::github::{GithubClient, Repo, UserSummary};
use crate::profile::or_empty;

pub const MAX_CONTRIBUTORS: usize = 6;
pub const MAX_SIBLINGS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct RepoDetail {
    pub repo: Repo,
    pub languages: Vec<String>,
    pub contributors: Vec<UserSummary>,
    /// The owner's other repositories, this one excluded
    pub siblings: Vec<Repo>,
}

pub async fn fetch_repo_detail(github: &GithubClient, id: u64) -> Result<RepoDetail> {
    let repo = github.repository(id).await?;
    let owner = repo.owner.login.as_str();

    let (languages, contributors, owner_repos) = futures::join!(
        github.languages(owner, &repo.name),
        github.contributors(owner, &repo.name),
        github.repos(owner),
    );

    let mut contributors = or_empty(contributors, "contributors", owner);
    contributors.truncate(MAX_CONTRIBUTORS);

    let siblings = or_empty(owner_repos, "repositories", owner)
        .into_iter()
        .filter(|r| r.id != repo.id)
        .take(MAX_SIBLINGS)
        .collect();

    Ok(RepoDetail {
        languages: or_empty(languages, "languages", owner),
        contributors,
        siblings,
        repo,
    })
}
