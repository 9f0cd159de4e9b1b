//! Declarative agent file parsers.
//!
//! Each parser declares a `supports` predicate over file paths and a `parse`
//! function that returns a `DeclaredAgent`. Missing `name`/`definition` are
//! not parse errors; the reconciler reports those per agent.

use std::path::Path;

use anyhow::Result;

use crate::model::DeclaredAgent;

/// Parser trait implemented by each on-disk format.
pub trait AgentParser {
    fn supports(path: &Path) -> bool;
    fn parse(content: &str, path: &Path) -> Result<DeclaredAgent>;
}

pub mod agent_yaml;
