// src/backend/client.rs
// =============================================================================
// Shared plumbing for the Supabase endpoints: URL building, the apikey /
// bearer headers, and turning error bodies into Error::Backend.
// =============================================================================

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Backend {
    http: Client,
    base_url: Url,
    anon_key: String,
    access_token: Option<String>,
}

impl Backend {
    pub fn new(base_url: Url, anon_key: impl Into<String>) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "SUPABASE_URL cannot be used as a base: {base_url}"
            )));
        }

        let http = Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            anon_key: anon_key.into(),
            access_token: None,
        })
    }

    /// Requests made through the returned client act as the signed-in user.
    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        self.access_token = token;
        self
    }

    pub(super) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(super) fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub(super) fn post(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    pub(super) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = checked(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }

    pub(super) async fn send_unit(&self, request: RequestBuilder) -> Result<()> {
        checked(request.send().await?).await?;
        Ok(())
    }
}

// Passes 2xx responses through; anything else becomes Error::Backend.
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), %body, "backend error response");
    Err(backend_error(status.as_u16(), &body))
}

/// GoTrue and PostgREST disagree on field names, so look for all of them.
pub(crate) fn backend_error(status: u16, body: &str) -> Error {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);

    let code = match &json["code"] {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => json["error_code"].as_str().map(str::to_string),
    };

    let message = ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| json[*key].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                body.trim().to_string()
            }
        });

    Error::Backend {
        code,
        status,
        message,
    }
}
