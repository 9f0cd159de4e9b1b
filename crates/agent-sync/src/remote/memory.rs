//! In-memory directory used by tests. Records every call in order.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;

use super::AgentDirectory;
use crate::model::{AgentDefinition, RemoteAgentSummary, RemoteAgentVersion};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListAgents,
    ListVersions(String),
    CreateAgent(String),
    CreateVersion(String),
}

#[derive(Default)]
struct State {
    agents: BTreeMap<String, Vec<RemoteAgentVersion>>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct MemoryDirectory {
    state: Mutex<State>,
    failing: HashSet<String>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an agent with the given version history.
    pub fn with_agent(self, name: &str, versions: Vec<RemoteAgentVersion>) -> Self {
        self.state
            .lock()
            .unwrap()
            .agents
            .insert(name.to_string(), versions);
        self
    }

    /// Make every create/create-version call for `name` fail.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn versions(&self, name: &str) -> Vec<RemoteAgentVersion> {
        self.state
            .lock()
            .unwrap()
            .agents
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn next_label(history: &[RemoteAgentVersion]) -> String {
        let next = history.iter().filter_map(|v| v.ordinal()).max().unwrap_or(0) + 1;
        next.to_string()
    }
}

#[async_trait]
impl AgentDirectory for MemoryDirectory {
    async fn list_agents(&self) -> anyhow::Result<Vec<RemoteAgentSummary>> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::ListAgents);
        Ok(st
            .agents
            .keys()
            .map(|name| RemoteAgentSummary {
                name: name.clone(),
                id: format!("id-{name}"),
            })
            .collect())
    }

    async fn list_versions(&self, name: &str) -> anyhow::Result<Vec<RemoteAgentVersion>> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::ListVersions(name.to_string()));
        Ok(st.agents.get(name).cloned().unwrap_or_default())
    }

    async fn create_agent(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::CreateAgent(name.to_string()));
        if self.failing.contains(name) {
            return Err(anyhow!("simulated failure creating {name}"));
        }
        if st.agents.contains_key(name) {
            return Err(anyhow!("agent {name} already exists"));
        }
        st.agents.insert(
            name.to_string(),
            vec![RemoteAgentVersion {
                name: Some(name.to_string()),
                version: "1".to_string(),
                definition: Some(definition.clone()),
                description: description.map(str::to_string),
            }],
        );
        Ok("1".to_string())
    }

    async fn create_version(
        &self,
        name: &str,
        definition: &AgentDefinition,
        description: Option<&str>,
    ) -> anyhow::Result<String> {
        let mut st = self.state.lock().unwrap();
        st.calls.push(Call::CreateVersion(name.to_string()));
        if self.failing.contains(name) {
            return Err(anyhow!("simulated failure updating {name}"));
        }
        let Some(history) = st.agents.get_mut(name) else {
            return Err(anyhow!("agent {name} not found"));
        };
        let label = Self::next_label(history);
        history.push(RemoteAgentVersion {
            name: Some(name.to_string()),
            version: label.clone(),
            definition: Some(definition.clone()),
            description: description.map(str::to_string),
        });
        Ok(label)
    }
}
