//! Run reports: one JSON document for `OUTPUT_JSON`, one line per item otherwise.

use std::fmt;

use serde::Serialize;

use crate::loader::LoadError;
use crate::maintain::{Maintenance, MaintenanceOutcome, MaintenanceReport};
use crate::reconcile::{Mode, Outcome, ReconcileReport};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum RunReport {
    Reconcile {
        mode: Mode,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        load_errors: Vec<LoadError>,
        items: Vec<ReconcileReport>,
    },
    Maintain {
        task: Maintenance,
        items: Vec<MaintenanceReport>,
    },
}

impl RunReport {
    /// True when any remote call failed; unreadable files and skips do not count.
    pub fn has_failures(&self) -> bool {
        match self {
            RunReport::Reconcile { items, .. } => items.iter().any(|r| r.outcome.is_failure()),
            RunReport::Maintain { items, .. } => items.iter().any(|r| r.outcome.is_failure()),
        }
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Created { version } => {
                write!(f, "created  {} (version {})", self.name, version)?
            }
            Outcome::Updated { version } => {
                write!(f, "updated  {} (version {})", self.name, version)?
            }
            Outcome::SkippedExists => write!(f, "skipped  {} (already exists)", self.name)?,
            Outcome::SkippedMissing => write!(f, "skipped  {} (not found remotely)", self.name)?,
            Outcome::SkippedInvalid { error } => write!(f, "invalid  {}: {}", self.name, error)?,
            Outcome::Failed { error } => write!(f, "failed   {}: {}", self.name, error)?,
        }
        if let Some(source) = self.source.as_ref().and_then(|p| p.file_name()) {
            write!(f, " [{}]", source.to_string_lossy())?;
        }
        Ok(())
    }
}

impl fmt::Display for MaintenanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            MaintenanceOutcome::Published { version } => {
                write!(f, "updated  {} (version {})", self.name, version)
            }
            MaintenanceOutcome::Skipped { error } => write!(f, "skipped  {}: {}", self.name, error),
            MaintenanceOutcome::Failed { error } => write!(f, "failed   {}: {}", self.name, error),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunReport::Reconcile {
                mode,
                load_errors,
                items,
            } => {
                for e in load_errors {
                    writeln!(f, "unreadable {}: {}", e.path.display(), e.message)?;
                }
                for item in items {
                    writeln!(f, "{item}")?;
                }
                let done = items
                    .iter()
                    .filter(|r| {
                        matches!(r.outcome, Outcome::Created { .. } | Outcome::Updated { .. })
                    })
                    .count();
                write!(f, "{mode:?}: {done} of {} agent(s) published", items.len())
            }
            RunReport::Maintain { task, items } => {
                for item in items {
                    writeln!(f, "{item}")?;
                }
                let done = items
                    .iter()
                    .filter(|r| matches!(r.outcome, MaintenanceOutcome::Published { .. }))
                    .count();
                write!(f, "{task:?}: {done} of {} agent(s) updated", items.len())
            }
        }
    }
}
