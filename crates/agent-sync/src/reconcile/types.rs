use std::path::PathBuf;

use serde::Serialize;

use crate::error::SyncError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Create agents absent remotely; leave present ones alone.
    CreateMissing,
    /// Publish a new version for present agents; leave absent ones alone.
    UpdateExisting,
    /// Both of the above.
    Sync,
}

/// What to do with one declared agent, decided from presence alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    SkipExists,
    SkipMissing,
}

impl Mode {
    pub fn action(self, exists: bool) -> Action {
        match (self, exists) {
            (Mode::CreateMissing, true) => Action::SkipExists,
            (Mode::UpdateExisting, false) => Action::SkipMissing,
            (_, true) => Action::Update,
            (_, false) => Action::Create,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Created { version: String },
    Updated { version: String },
    SkippedExists,
    SkippedMissing,
    SkippedInvalid { error: SyncError },
    Failed { error: SyncError },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(flatten)]
    pub outcome: Outcome,
}
