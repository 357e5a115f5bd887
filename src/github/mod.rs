// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Currently implements:
// - A small typed client (users, followers, repositories, languages, ...)
// - The subset of GitHub's JSON models the feed, profile and repo pages use
//
// Everything goes through one reqwest::Client so connections are pooled
// across the many small requests a feed refill makes.
// =============================================================================

mod client;
mod models;

pub use client::GithubClient;
pub use models::{Repo, User, UserSummary};
