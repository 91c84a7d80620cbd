use anyhow::{anyhow, bail, Context};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::middleware::EDIT_KEY_HEADER;

/// Thin HTTP wrapper over the roster endpoints. Every call returns the
/// decoded envelope, or an error carrying the server's `error` message.
pub struct RosterClient {
    http: reqwest::Client,
    base_url: Url,
    edit_key: Option<String>,
}

impl RosterClient {
    pub fn new(base_url: &str, edit_key: Option<String>) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid server url '{}'", base_url))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            edit_key: edit_key.filter(|k| !k.is_empty()),
        })
    }

    pub async fn health(&self) -> anyhow::Result<Value> {
        let url = self.endpoint(&["health"])?;
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    pub async fn list(&self, event: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        let url = self.members_url(event)?;
        let response = self.http.get(url).query(query).send().await?;
        decode(response).await
    }

    pub async fn mutate(&self, event: &str, body: &Value) -> anyhow::Result<Value> {
        let url = self.members_url(event)?;
        let mut request = self.http.post(url).json(body);
        if let Some(key) = &self.edit_key {
            request = request.header(EDIT_KEY_HEADER, key);
        }
        decode(request.send().await?).await
    }

    pub fn members_url(&self, event: &str) -> anyhow::Result<Url> {
        self.endpoint(&["api", "members", event])
    }

    fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("server url cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("unreadable response ({})", status))?;

    if !status.is_success() || body.get("ok") != Some(&Value::Bool(true)) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        bail!("{} ({})", message, status);
    }
    Ok(body)
}
