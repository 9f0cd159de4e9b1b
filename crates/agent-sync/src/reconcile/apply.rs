use super::{Action, Mode, Outcome, ReconcileReport};
use crate::error::SyncError;
use crate::model::{DeclaredAgent, RemoteIndex};
use crate::remote::AgentDirectory;

/// Reconcile declared agents against the remote index, one at a time and in
/// input order. A failed remote call is recorded on that agent's report and
/// processing moves on to the next one.
pub async fn reconcile(
    directory: &dyn AgentDirectory,
    declared: &[DeclaredAgent],
    index: &RemoteIndex,
    mode: Mode,
) -> Vec<ReconcileReport> {
    let mut reports = Vec::with_capacity(declared.len());
    for agent in declared {
        let outcome = reconcile_one(directory, agent, index, mode).await;
        reports.push(ReconcileReport {
            name: agent.display_name().to_string(),
            source: agent.source.clone(),
            outcome,
        });
    }
    reports
}

async fn reconcile_one(
    directory: &dyn AgentDirectory,
    agent: &DeclaredAgent,
    index: &RemoteIndex,
    mode: Mode,
) -> Outcome {
    let valid = match agent.validate() {
        Ok(v) => v,
        Err(error) => {
            tracing::warn!(
                "skipping {} ({}): {}",
                agent.display_name(),
                source_label(agent),
                error
            );
            return Outcome::SkippedInvalid { error };
        }
    };

    match mode.action(index.contains(valid.name)) {
        Action::SkipExists => {
            tracing::info!("skip (exists): {}", valid.name);
            Outcome::SkippedExists
        }
        Action::SkipMissing => {
            tracing::info!("skip (missing): {}", valid.name);
            Outcome::SkippedMissing
        }
        Action::Create => {
            tracing::info!("creating agent '{}' from {}", valid.name, source_label(agent));
            match directory
                .create_agent(valid.name, valid.definition, valid.description)
                .await
            {
                Ok(version) => {
                    tracing::info!("created '{}' with version {}", valid.name, version);
                    Outcome::Created { version }
                }
                Err(e) => {
                    tracing::warn!("create '{}' failed: {:#}", valid.name, e);
                    Outcome::Failed {
                        error: SyncError::adapter(&e),
                    }
                }
            }
        }
        Action::Update => {
            tracing::info!("updating agent '{}' from {}", valid.name, source_label(agent));
            match directory
                .create_version(valid.name, valid.definition, valid.description)
                .await
            {
                Ok(version) => {
                    tracing::info!("updated '{}' to version {}", valid.name, version);
                    Outcome::Updated { version }
                }
                Err(e) => {
                    tracing::warn!("update '{}' failed: {:#}", valid.name, e);
                    Outcome::Failed {
                        error: SyncError::adapter(&e),
                    }
                }
            }
        }
    }
}

fn source_label(agent: &DeclaredAgent) -> String {
    agent
        .source
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<inline>".to_string())
}
