//! REST implementation of [`AgentDirectory`] for a project endpoint.

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::AgentDirectory;
use crate::model::{AgentDefinition, RemoteAgentSummary, RemoteAgentVersion};

pub const DEFAULT_API_VERSION: &str = "2025-11-15-preview";

/// Connection settings for a project endpoint. Built once by the driver and
/// handed to the adapter; nothing here is read from the environment.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project endpoint, e.g. `https://<resource>.services.ai.azure.com/api/projects/<project>`.
    pub endpoint: String,
    /// Bearer token for the `Authorization` header.
    pub token: Option<String>,
    pub api_version: String,
}

pub struct HttpAgentDirectory {
    client: Client,
    config: RemoteConfig,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Serialize)]
struct CreateAgentBody<'a> {
    name: &'a str,
    definition: &'a AgentDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct CreateVersionBody<'a> {
    definition: &'a AgentDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl HttpAgentDirectory {
    pub fn new(config: RemoteConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("agent-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    /// Endpoint plus `segments`, each percent-encoded as a single path segment.
    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.config.endpoint)
            .with_context(|| format!("invalid endpoint '{}'", self.config.endpoint))?;
        url.path_segments_mut()
            .map_err(|()| {
                anyhow::anyhow!("endpoint '{}' cannot take a path", self.config.endpoint)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.query(&[("api-version", self.config.api_version.as_str())]);
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> anyhow::Result<T> {
        let resp = self
            .request(builder)
            .send()
            .await
            .with_context(|| format!("{what}: request failed"))?;
        decode(resp, what).await
    }

    /// Fetch every page of a list endpoint.
    async fn list_all<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        what: &str,
    ) -> anyhow::Result<Vec<T>> {
        let url = self.url(segments)?;
        let mut out = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut builder = self.client.get(url.clone());
            if let Some(cursor) = after.as_deref() {
                builder = builder.query(&[("after", cursor)]);
            }
            let mut page: Page<T> = self.send(builder, what).await?;
            let next = next_cursor(&page);
            out.append(&mut page.data);
            match next {
                Some(cursor) => after = Some(cursor),
                None => break,
            }
        }
        tracing::debug!("{}: fetched {} item(s)", what, out.len());
        Ok(out)
    }
}

/// Cursor for the following page. A page that claims more but is empty or has
/// no `last_id` ends the listing rather than looping.
fn next_cursor<T>(page: &Page<T>) -> Option<String> {
    if !page.has_more || page.data.is_empty() {
        return None;
    }
    page.last_id.clone().filter(|id| !id.is_empty())
}

async fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> anyhow::Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("{what}: HTTP {status}: {}", body.trim());
    }
    resp.json::<T>()
        .await
        .with_context(|| format!("{what}: invalid response body"))
}

/// Pull the version label out of a create response. Agent objects nest it
/// under `versions.latest`; version objects carry it at the top level.
fn version_of(body: &JsonValue) -> String {
    let label = body
        .get("version")
        .or_else(|| body.pointer("/versions/latest/version"))
        .or_else(|| body.pointer("/versions/version"));
    match label {
        Some(JsonValue::String(s)) => s.clone(),
        Some(JsonValue::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}

#[async_trait]
impl AgentDirectory for HttpAgentDirectory {
    async fn list_agents(&self) -> anyhow::Result<Vec<RemoteAgentSummary>> {
        self.list_all(&["agents"], "list agents").await
    }

    async fn list_versions(&self, name: &str) -> anyhow::Result<Vec<RemoteAgentVersion>> {
        let what = format!("list versions of '{name}'");
        self.list_all(&["agents", name, "versions"], &what).await
    }

    async fn create_agent(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String> {
        let body = CreateAgentBody {
            name,
            definition,
            description,
        };
        let builder = self.client.post(self.url(&["agents"])?).json(&body);
        let created: JsonValue = self
            .send(builder, &format!("create agent '{name}'"))
            .await?;
        Ok(version_of(&created))
    }

    async fn create_version(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String> {
        let body = CreateVersionBody {
            definition,
            description,
        };
        let builder = self
            .client
            .post(self.url(&["agents", name, "versions"])?)
            .json(&body);
        let created: JsonValue = self
            .send(builder, &format!("create version of '{name}'"))
            .await?;
        Ok(version_of(&created))
    }
}
