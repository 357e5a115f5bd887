// src/github/client.rs
// =============================================================================
// A thin typed client over the GitHub REST API.
//
// Strategy:
// - Build every URL from a configurable base (api.github.com in production,
//   a local mock server in tests)
// - Send the token as `Authorization: token ...` when one is configured
// - Treat any non-2xx status as an error; callers decide whether a failure
//   is fatal (the profile record) or degrades to an empty list (followers)
//
// Rust concepts:
// - Generics with trait bounds: get_json::<T>() works for every model
// - Clone-able client: reqwest::Client is an Arc internally
// =============================================================================

use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::models::{Repo, SearchResults, User, UserSummary};
use crate::error::{Error, Result};

pub const USER_AGENT: &str = "gh-social";
const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(base_url: Url, token: Option<String>) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "GitHub API URL cannot be used as a base: {base_url}"
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub async fn user(&self, login: &str) -> Result<User> {
        self.get_json(self.endpoint(&["users", login])).await
    }

    pub async fn followers(&self, login: &str) -> Result<Vec<UserSummary>> {
        self.get_json(self.endpoint(&["users", login, "followers"]))
            .await
    }

    pub async fn following(&self, login: &str) -> Result<Vec<UserSummary>> {
        self.get_json(self.endpoint(&["users", login, "following"]))
            .await
    }

    pub async fn repos(&self, login: &str) -> Result<Vec<Repo>> {
        self.get_json(self.endpoint(&["users", login, "repos"])).await
    }

    /// Repository by its numeric id, which is what the repo page is keyed on.
    pub async fn repository(&self, id: u64) -> Result<Repo> {
        let id = id.to_string();
        self.get_json(self.endpoint(&["repositories", &id])).await
    }

    /// Language names in the order GitHub returns them (largest first).
    pub async fn languages(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let map: Map<String, Value> = self
            .get_json(self.endpoint(&["repos", owner, repo, "languages"]))
            .await?;
        Ok(map.into_iter().map(|(name, _)| name).collect())
    }

    pub async fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<UserSummary>> {
        self.get_json(self.endpoint(&["repos", owner, repo, "contributors"]))
            .await
    }

    /// Number of entries on the first page of the issues listing.
    pub async fn issue_count(&self, owner: &str, repo: &str) -> Result<usize> {
        let issues: Vec<Value> = self
            .get_json(self.endpoint(&["repos", owner, repo, "issues"]))
            .await?;
        Ok(issues.len())
    }

    /// Number of entries on the first page of the pull request listing.
    pub async fn pull_count(&self, owner: &str, repo: &str) -> Result<usize> {
        let pulls: Vec<Value> = self
            .get_json(self.endpoint(&["repos", owner, repo, "pulls"]))
            .await?;
        Ok(pulls.len())
    }

    pub async fn search_users(&self, query: &str) -> Result<SearchResults> {
        let mut url = self.endpoint(&["search", "users"]);
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    // Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in new(), so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "GET");

        let mut request = self
            .http
            .get(url.clone())
            .header(header::ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn client_for(server: &ServerGuard, token: Option<&str>) -> GithubClient {
        let base = Url::parse(&server.url()).unwrap();
        GithubClient::new(base, token.map(str::to_string)).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://api.github.com").unwrap();
        let client = GithubClient::new(base, None).unwrap();
        let url = client.endpoint(&["users", "we ird/name", "repos"]);
        assert_eq!(
            url.as_str(),
            "https://api.github.com/users/we%20ird%2Fname/repos"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("https://ghe.example.com/api/v3/").unwrap();
        let client = GithubClient::new(base, None).unwrap();
        let url = client.endpoint(&["users", "octo"]);
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/users/octo");
    }

    #[tokio::test]
    async fn test_user_sends_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/octo")
            .match_header("authorization", "token secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "login": "octo", "id": 1, "name": "Octo", "followers": 3 }"#)
            .create_async()
            .await;

        let user = client_for(&server, Some("secret")).user("octo").await.unwrap();
        assert_eq!(user.login, "octo");
        assert_eq!(user.followers, 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anonymous_requests_have_no_auth_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/octo/followers")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"[{ "login": "a", "id": 2 }, { "login": "b", "id": 3 }]"#)
            .create_async()
            .await;

        let followers = client_for(&server, None).followers("octo").await.unwrap();
        assert_eq!(followers.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/ghost")
            .with_status(404)
            .with_body(r#"{ "message": "Not Found" }"#)
            .create_async()
            .await;

        let err = client_for(&server, None).user("ghost").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_languages_keep_upstream_order() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/site/languages")
            .with_status(200)
            .with_body(r#"{ "TypeScript": 9000, "CSS": 400, "HTML": 20 }"#)
            .create_async()
            .await;

        let langs = client_for(&server, None)
            .languages("octo", "site")
            .await
            .unwrap();
        assert_eq!(langs, vec!["TypeScript", "CSS", "HTML"]);
    }

    #[tokio::test]
    async fn test_issue_and_pull_counts() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/site/issues")
            .with_status(200)
            .with_body(r#"[{ "number": 1 }, { "number": 2 }, { "number": 3 }]"#)
            .create_async()
            .await;
        let _mock = server
            .mock("GET", "/repos/octo/site/pulls")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client_for(&server, None);
        assert_eq!(client.issue_count("octo", "site").await.unwrap(), 3);
        assert_eq!(client.pull_count("octo", "site").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_users_query() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search/users")
            .match_query(Matcher::UrlEncoded("q".into(), "dev@example.com".into()))
            .with_status(200)
            .with_body(r#"{ "total_count": 1, "items": [{ "login": "dev", "id": 9 }] }"#)
            .create_async()
            .await;

        let results = client_for(&server, None)
            .search_users("dev@example.com")
            .await
            .unwrap();
        assert_eq!(results.total_count, 1);
        assert_eq!(results.items[0].login, "dev");
    }
}
