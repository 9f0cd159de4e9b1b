use serde::Serialize;

use super::{Maintenance, is_gpt5_class};
use crate::error::SyncError;
use crate::model::{RemoteAgentSummary, RemoteIndex};
use crate::remote::AgentDirectory;
use crate::version::select_latest;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MaintenanceOutcome {
    Published { version: String },
    Skipped { error: SyncError },
    Failed { error: SyncError },
}

impl MaintenanceOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MaintenanceOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: MaintenanceOutcome,
}

/// Apply `task` to the latest version of each named agent, in order, and
/// publish the result as a new version. Existing history is never modified.
pub async fn run_maintenance(
    directory: &dyn AgentDirectory,
    names: &[String],
    index: &RemoteIndex,
    task: Maintenance,
) -> Vec<MaintenanceReport> {
    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        let outcome = maintain_one(directory, name, index, task).await;
        reports.push(MaintenanceReport {
            name: name.clone(),
            outcome,
        });
    }
    reports
}

async fn maintain_one(
    directory: &dyn AgentDirectory,
    name: &str,
    index: &RemoteIndex,
    task: Maintenance,
) -> MaintenanceOutcome {
    let skipped = |error: SyncError| {
        tracing::info!("skip {}: {}", name, error);
        MaintenanceOutcome::Skipped { error }
    };
    let failed = |e: anyhow::Error| {
        tracing::warn!("{:?} on '{}' failed: {:#}", task, name, e);
        MaintenanceOutcome::Failed {
            error: SyncError::adapter(&e),
        }
    };

    if name.is_empty() {
        return skipped(SyncError::MissingField { field: "name" });
    }
    if !index.contains(name) {
        return skipped(SyncError::NotFoundRemotely {
            name: name.to_string(),
        });
    }

    let versions = match directory.list_versions(name).await {
        Ok(v) => v,
        Err(e) => return failed(e),
    };
    let Some(latest) = select_latest(&versions) else {
        return skipped(SyncError::NoVersions {
            name: name.to_string(),
        });
    };
    let Some(definition) = latest.definition.as_ref() else {
        return skipped(SyncError::MissingField {
            field: "definition",
        });
    };
    if definition.model().is_none() {
        return skipped(SyncError::MissingField {
            field: "definition.model",
        });
    }
    tracing::debug!("'{}' latest version is {}", name, latest.version);

    let rewrite = task.apply(definition);
    if !rewrite.changed {
        if definition.has_mcp_tools() {
            tracing::debug!("every MCP tool of '{}' already has approval 'never'", name);
        }
        return skipped(SyncError::NoApplicableTools {
            name: name.to_string(),
        });
    }

    match directory
        .create_version(name, &rewrite.definition, latest.description.as_deref())
        .await
    {
        Ok(version) => {
            tracing::info!("{:?} applied to '{}'; new version {}", task, name, version);
            MaintenanceOutcome::Published { version }
        }
        Err(e) => failed(e),
    }
}

/// Agents whose latest version runs a GPT-5-class model. Used to narrow the
/// list offered for sampling cleanup; agents whose versions cannot be read
/// are left out with a warning.
pub async fn gpt5_candidates(
    directory: &dyn AgentDirectory,
    agents: &[RemoteAgentSummary],
) -> Vec<RemoteAgentSummary> {
    let mut out = Vec::new();
    for agent in agents {
        match directory.list_versions(&agent.name).await {
            Ok(versions) => {
                let model = select_latest(&versions)
                    .and_then(|v| v.definition.as_ref())
                    .and_then(|d| d.model());
                if model.is_some_and(is_gpt5_class) {
                    out.push(agent.clone());
                }
            }
            Err(e) => tracing::warn!("cannot read versions of '{}': {:#}", agent.name, e),
        }
    }
    tracing::info!("{} of {} agent(s) use GPT-5-class models", out.len(), agents.len());
    out
}
