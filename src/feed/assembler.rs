// src/feed/assembler.rs
// =============================================================================
// Feed assembly.
//
// One refill (load_more) works like this:
// 1. Shuffle the follower list and take up to `batch_size` of them
// 2. For every sampled follower, at the same time:
//    a. fetch their repositories (failure or none -> follower skipped)
//    b. pick one repository at random
//    c. fetch its issues, pull requests and languages in parallel; each of
//       the three falls back to 0 / 0 / [] on its own
// 3. Append the survivors to the feed, in sample order
//
// Rust concepts:
// - Generic RNG parameter: production uses StdRng::from_entropy(), tests
//   use a seeded StdRng so sampling is reproducible
// - buffered(n): like buffer_unordered(n) but yields results in input order
// =============================================================================

use futures::stream::{self, StreamExt};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::github::{GithubClient, Repo, UserSummary};

/// Counts shown under each feed entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoStats {
    pub issues: usize,
    pub pulls: usize,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub follower: UserSummary,
    pub repo: Repo,
    pub details: RepoStats,
}

pub struct FeedAssembler<R> {
    github: GithubClient,
    followers: Vec<UserSummary>,
    batch_size: usize,
    rng: R,
    items: Vec<FeedItem>,
    loading: bool,
}

impl<R: Rng> FeedAssembler<R> {
    pub fn new(github: GithubClient, followers: Vec<UserSummary>, batch_size: usize, rng: R) -> Self {
        Self {
            github,
            followers,
            batch_size: batch_size.max(1),
            rng,
            items: Vec::new(),
            loading: false,
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn followers(&self) -> &[UserSummary] {
        &self.followers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Runs one refill and returns how many entries were appended.
    pub async fn load_more(&mut self) -> usize {
        if self.followers.is_empty() || self.loading {
            return 0;
        }
        let _loading = LoadingGuard::start(&mut self.loading);

        let sample = sample_followers(&self.followers, self.batch_size, &mut self.rng);
        // One pick per follower, drawn up front so the fetches below can run
        // concurrently without sharing the RNG.
        let picks: Vec<f64> = sample.iter().map(|_| self.rng.gen::<f64>()).collect();
        debug!(sampled = sample.len(), "refilling feed");

        let github = &self.github;
        let batch: Vec<FeedItem> = stream::iter(sample.into_iter().zip(picks))
            .map(|(follower, pick)| fetch_item(github, follower, pick))
            .buffered(self.batch_size)
            .filter_map(|item| async move { item })
            .collect()
            .await;

        let added = batch.len();
        self.items.extend(batch);

        info!(added, total = self.items.len(), "feed refilled");
        added
    }
}

// Clears the loading flag when a refill completes or its future is dropped
// part way through.
struct LoadingGuard<'a>(&'a mut bool);

impl<'a> LoadingGuard<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Up to `n` distinct followers in random order.
pub(crate) fn sample_followers<R: Rng>(followers: &[UserSummary], n: usize, rng: &mut R) -> Vec<UserSummary> {
    let mut pool = followers.to_vec();
    let (picked, _) = pool.partial_shuffle(rng, n);
    picked.to_vec()
}

// Maps a uniform pick in [0, 1) onto an index, the way Math.random() would.
fn pick_index(pick: f64, len: usize) -> usize {
    ((pick * len as f64) as usize).min(len.saturating_sub(1))
}

async fn fetch_item(github: &GithubClient, follower: UserSummary, pick: f64) -> Option<FeedItem> {
    let repos = match github.repos(&follower.login).await {
        Ok(repos) => repos,
        Err(e) => {
            warn!(login = %follower.login, "skipping follower, repositories unavailable: {e}");
            return None;
        }
    };
    if repos.is_empty() {
        debug!(login = %follower.login, "skipping follower without repositories");
        return None;
    }

    let index = pick_index(pick, repos.len());
    let repo = repos.into_iter().nth(index)?;
    let details = fetch_stats(github, &repo).await;

    Some(FeedItem {
        follower,
        repo,
        details,
    })
}

async fn fetch_stats(github: &GithubClient, repo: &Repo) -> RepoStats {
    let owner = repo.owner.login.as_str();
    let (issues, pulls, languages) = futures::join!(
        github.issue_count(owner, &repo.name),
        github.pull_count(owner, &repo.name),
        github.languages(owner, &repo.name),
    );

    RepoStats {
        issues: issues.unwrap_or_else(|e| {
            debug!(repo = %repo.name, "issues unavailable: {e}");
            0
        }),
        pulls: pulls.unwrap_or_else(|e| {
            debug!(repo = %repo.name, "pulls unavailable: {e}");
            0
        }),
        languages: languages.unwrap_or_else(|e| {
            debug!(repo = %repo.name, "languages unavailable: {e}");
            Vec::new()
        }),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why draw the random picks before fetching?
//    - The RNG lives in &mut self, and the per-follower futures run at the
//      same time; they cannot all borrow it mutably
//    - Drawing one f64 per follower up front keeps the futures independent
//
// 2. buffered vs buffer_unordered
//    - Both run up to N futures at once
//    - buffered yields results in the order the futures were created, so
//      the feed keeps the sample order
//
// 3. Why does load_more() return usize instead of Result?
//    - Nothing in a refill is fatal; a follower without repositories or a
//      failed request just makes the batch smaller
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;
    use url::Url;

    fn summary(login: &str, id: u64) -> UserSummary {
        UserSummary {
            login: login.to_string(),
            id,
            avatar_url: None,
            html_url: None,
        }
    }

    fn repo_json(id: u64, name: &str, owner: &str) -> String {
        format!(
            r#"{{ "id": {id}, "name": "{name}", "owner": {{ "login": "{owner}", "id": 1 }},
                 "created_at": "2023-01-01T00:00:00Z", "stargazers_count": {id} }}"#
        )
    }

    fn github_for(server: &ServerGuard) -> GithubClient {
        GithubClient::new(Url::parse(&server.url()).unwrap(), None).unwrap()
    }

    #[test]
    fn test_sample_is_distinct_and_bounded() {
        let followers: Vec<_> = (0..25).map(|i| summary(&format!("f{i}"), i)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let sample = sample_followers(&followers, 10, &mut rng);
        assert_eq!(sample.len(), 10);
        let ids: HashSet<_> = sample.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), 10);

        let small = sample_followers(&followers[..3], 10, &mut rng);
        assert_eq!(small.len(), 3);
    }

    #[test]
    fn test_pick_index_stays_in_range() {
        assert_eq!(pick_index(0.0, 4), 0);
        assert_eq!(pick_index(0.49, 4), 1);
        assert_eq!(pick_index(0.999_999, 4), 3);
        assert_eq!(pick_index(1.0, 4), 3);
    }

    #[tokio::test]
    async fn test_no_followers_is_noop() {
        let server = Server::new_async().await;
        let mut feed = FeedAssembler::new(github_for(&server), Vec::new(), 10, StdRng::seed_from_u64(1));
        assert_eq!(feed.load_more().await, 0);
        assert!(feed.items().is_empty());
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn test_refill_skips_empty_and_failing_followers() {
        let mut server = Server::new_async().await;

        // alice: one repo, fully enriched
        let _mock = server
            .mock("GET", "/users/alice/repos")
            .with_status(200)
            .with_body(format!("[{}]", repo_json(11, "tool", "alice")))
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/alice/tool/issues")
            .with_status(200)
            .with_body(r#"[{}, {}]"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/alice/tool/pulls")
            .with_status(200)
            .with_body(r#"[{}]"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/alice/tool/languages")
            .with_status(200)
            .with_body(r#"{ "Go": 10, "Makefile": 1 }"#)
            .create_async()
            .await;

        // bob: no repositories
        let _mock = server
            .mock("GET", "/users/bob/repos")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        // carol: rate limited
        let _mock = server
            .mock("GET", "/users/carol/repos")
            .with_status(403)
            .create_async()
            .await;

        let followers = vec![summary("alice", 1), summary("bob", 2), summary("carol", 3)];
        let mut feed = FeedAssembler::new(github_for(&server), followers, 10, StdRng::seed_from_u64(3));

        assert_eq!(feed.load_more().await, 1);
        let item = &feed.items()[0];
        assert_eq!(item.follower.login, "alice");
        assert_eq!(item.repo.name, "tool");
        assert_eq!(
            item.details,
            RepoStats {
                issues: 2,
                pulls: 1,
                languages: vec!["Go".to_string(), "Makefile".to_string()],
            }
        );
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn test_enrichment_failures_degrade_independently() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/dave/repos")
            .with_status(200)
            .with_body(format!("[{}]", repo_json(21, "notes", "dave")))
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/dave/notes/issues")
            .with_status(410)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/dave/notes/pulls")
            .with_status(200)
            .with_body(r#"[{}, {}, {}]"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/dave/notes/languages")
            .with_status(500)
            .create_async()
            .await;

        let mut feed = FeedAssembler::new(
            github_for(&server),
            vec![summary("dave", 4)],
            10,
            StdRng::seed_from_u64(9),
        );
        assert_eq!(feed.load_more().await, 1);
        assert_eq!(
            feed.items()[0].details,
            RepoStats {
                issues: 0,
                pulls: 3,
                languages: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_refills_append_and_respect_batch_size() {
        let mut server = Server::new_async().await;
        let logins: Vec<String> = (0..5).map(|i| format!("u{i}")).collect();
        let mut _mocks = Vec::new();
        for (i, login) in logins.iter().enumerate() {
            let id = 100 + i as u64;
            _mocks.push(
                server
                    .mock("GET", format!("/users/{login}/repos").as_str())
                    .with_status(200)
                    .with_body(format!("[{}]", repo_json(id, "only", login)))
                    .create_async()
                    .await,
            );
            for (suffix, body) in [("issues", "[]"), ("pulls", "[]"), ("languages", "{}")] {
                _mocks.push(
                    server
                        .mock("GET", format!("/repos/{login}/only/{suffix}").as_str())
                        .with_status(200)
                        .with_body(body)
                        .create_async()
                        .await,
                );
            }
        }

        let followers: Vec<_> = logins
            .iter()
            .enumerate()
            .map(|(i, l)| summary(l, i as u64))
            .collect();
        let mut feed = FeedAssembler::new(github_for(&server), followers, 2, StdRng::seed_from_u64(42));

        assert_eq!(feed.load_more().await, 2);
        assert_eq!(feed.load_more().await, 2);
        assert_eq!(feed.items().len(), 4);

        // each batch samples distinct followers
        let first: HashSet<_> = feed.items()[..2].iter().map(|i| &i.follower.login).collect();
        let second: HashSet<_> = feed.items()[2..].iter().map(|i| &i.follower.login).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);

        // every entry is the follower's own repository
        for item in feed.items() {
            assert_eq!(item.repo.owner.login, item.follower.login);
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_sample_order() {
        let mut server = Server::new_async().await;
        let logins: Vec<String> = (0..6).map(|i| format!("p{i}")).collect();
        let mut _mocks = Vec::new();
        for (i, login) in logins.iter().enumerate() {
            _mocks.push(
                server
                    .mock("GET", format!("/users/{login}/repos").as_str())
                    .with_status(200)
                    .with_body(format!("[{}]", repo_json(200 + i as u64, "only", login)))
                    .create_async()
                    .await,
            );
            for (suffix, body) in [("issues", "[]"), ("pulls", "[]"), ("languages", "{}")] {
                _mocks.push(
                    server
                        .mock("GET", format!("/repos/{login}/only/{suffix}").as_str())
                        .with_status(200)
                        .with_body(body)
                        .create_async()
                        .await,
                );
            }
        }

        let followers: Vec<_> = logins
            .iter()
            .enumerate()
            .map(|(i, l)| summary(l, i as u64))
            .collect();
        let expected: Vec<String> = sample_followers(&followers, 4, &mut StdRng::seed_from_u64(11))
            .into_iter()
            .map(|f| f.login)
            .collect();

        let mut feed = FeedAssembler::new(github_for(&server), followers, 4, StdRng::seed_from_u64(11));
        assert_eq!(feed.load_more().await, 4);

        let got: Vec<String> = feed.items().iter().map(|i| i.follower.login.clone()).collect();
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn test_dropped_refill_clears_loading() {
        // accepts connections into the backlog but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = Url::parse(&format!("http://{}/", listener.local_addr().unwrap())).unwrap();
        let github = GithubClient::new(base, None).unwrap();

        let mut feed = FeedAssembler::new(github, vec![summary("slow", 1)], 10, StdRng::seed_from_u64(5));
        let result = tokio::time::timeout(std::time::Duration::from_millis(100), feed.load_more()).await;

        assert!(result.is_err());
        assert!(!feed.is_loading());
        assert!(feed.items().is_empty());
    }
}
