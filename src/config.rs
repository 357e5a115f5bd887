// src/config.rs
// =============================================================================
// Runtime configuration, read from environment variables.
//
//   GITHUB_TOKEN          optional personal access token
//   GITHUB_API_URL        defaults to https://api.github.com
//   SUPABASE_URL          auth + users table (needed by login/username/explore)
//   SUPABASE_ANON_KEY     public anon key for the project above
//   GH_SOCIAL_FEED_BATCH  followers sampled per feed refill (default 10)
//   GH_SOCIAL_SESSION     session file (default ~/.gh-social/session.json)
// =============================================================================

use std::{collections::HashMap, env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_FEED_BATCH: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub github_api_url: Url,
    pub github_token: Option<String>,
    pub supabase_url: Option<Url>,
    pub supabase_anon_key: Option<String>,
    pub feed_batch: usize,
    pub session_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars().collect())
    }

    /// Builds the config from an explicit variable map so tests never have
    /// to touch the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let github_api_url = parse_url(
            "GITHUB_API_URL",
            &get("GITHUB_API_URL").unwrap_or_else(|| {
                debug!("GITHUB_API_URL not set, using default: {DEFAULT_GITHUB_API_URL}");
                DEFAULT_GITHUB_API_URL.to_string()
            }),
        )?;

        let github_token = get("GITHUB_TOKEN");
        if github_token.is_none() {
            info!("GITHUB_TOKEN not set, GitHub requests will be anonymous and rate limited");
        }

        let supabase_url = get("SUPABASE_URL")
            .map(|raw| parse_url("SUPABASE_URL", &raw))
            .transpose()?;

        let feed_batch = match get("GH_SOCIAL_FEED_BATCH") {
            Some(raw) => parse_value::<usize>("GH_SOCIAL_FEED_BATCH", &raw)?,
            None => DEFAULT_FEED_BATCH,
        };
        if feed_batch == 0 {
            return Err(Error::Config(
                "GH_SOCIAL_FEED_BATCH must be at least 1".to_string(),
            ));
        }

        let session_path = match get("GH_SOCIAL_SESSION") {
            Some(path) => PathBuf::from(path),
            None => default_session_path()?,
        };

        Ok(Self {
            github_api_url,
            github_token,
            supabase_url,
            supabase_anon_key: get("SUPABASE_ANON_KEY"),
            feed_batch,
            session_path,
        })
    }

    /// Supabase settings, or a config error naming what is missing.
    pub fn supabase(&self) -> Result<(Url, String)> {
        let url = self
            .supabase_url
            .clone()
            .ok_or_else(|| Error::Config("SUPABASE_URL is not set".to_string()))?;
        let key = self
            .supabase_anon_key
            .clone()
            .ok_or_else(|| Error::Config("SUPABASE_ANON_KEY is not set".to_string()))?;
        Ok((url, key))
    }
}

fn parse_url(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config(format!("invalid {key} '{raw}': {e}")))
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("invalid {key} '{raw}': {e}")))
}

fn default_session_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".gh-social").join("session.json"))
        .ok_or_else(|| {
            Error::Config("no home directory found, set GH_SOCIAL_SESSION".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(vars(&[("GH_SOCIAL_SESSION", "/tmp/s.json")])).unwrap();
        assert_eq!(config.github_api_url.as_str(), "https://api.github.com/");
        assert_eq!(config.github_token, None);
        assert_eq!(config.feed_batch, 10);
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
        assert!(config.supabase().is_err());
    }

    #[test]
    fn test_reads_all_values() {
        let config = Config::from_vars(vars(&[
            ("GITHUB_API_URL", "http://127.0.0.1:9000"),
            ("GITHUB_TOKEN", "ghp_abc"),
            ("SUPABASE_URL", "https://proj.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("GH_SOCIAL_FEED_BATCH", "3"),
            ("GH_SOCIAL_SESSION", "/tmp/s.json"),
        ]))
        .unwrap();

        assert_eq!(config.github_token.as_deref(), Some("ghp_abc"));
        assert_eq!(config.feed_batch, 3);
        let (url, key) = config.supabase().unwrap();
        assert_eq!(url.as_str(), "https://proj.supabase.co/");
        assert_eq!(key, "anon");
    }

    #[test]
    fn test_blank_token_is_none() {
        let config = Config::from_vars(vars(&[
            ("GITHUB_TOKEN", "  "),
            ("GH_SOCIAL_SESSION", "/tmp/s.json"),
        ]))
        .unwrap();
        assert_eq!(config.github_token, None);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let bad_batch = Config::from_vars(vars(&[
            ("GH_SOCIAL_FEED_BATCH", "lots"),
            ("GH_SOCIAL_SESSION", "/tmp/s.json"),
        ]));
        assert!(matches!(bad_batch, Err(Error::Config(_))));

        let zero_batch = Config::from_vars(vars(&[
            ("GH_SOCIAL_FEED_BATCH", "0"),
            ("GH_SOCIAL_SESSION", "/tmp/s.json"),
        ]));
        assert!(matches!(zero_batch, Err(Error::Config(_))));

        let bad_url = Config::from_vars(vars(&[
            ("GITHUB_API_URL", "not a url"),
            ("GH_SOCIAL_SESSION", "/tmp/s.json"),
        ]));
        assert!(matches!(bad_url, Err(Error::Config(_))));
    }
}
