//! Remote agent directory contract and its implementations.
//!
//! The core only needs four calls from the store: list agents, list the
//! versions of one agent, create an agent, and append a version. Retry and
//! timeout policy belong to the implementation.

use async_trait::async_trait;

use crate::model::{AgentDefinition, RemoteAgentSummary, RemoteAgentVersion};

pub mod http;
#[cfg(test)]
pub mod memory;

pub use http::{DEFAULT_API_VERSION, HttpAgentDirectory, RemoteConfig};

#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn list_agents(&self) -> anyhow::Result<Vec<RemoteAgentSummary>>;

    async fn list_versions(&self, name: &str) -> anyhow::Result<Vec<RemoteAgentVersion>>;

    /// Create a new agent; returns the label of its first version.
    async fn create_agent(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String>;

    /// Append a version to an existing agent; returns the new version label.
    async fn create_version(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String>;
}
