//! Reconcile declarative agent definitions against a versioned remote agent
//! directory, and apply maintenance rewrites to already published agents.

pub mod config;
pub mod error;
pub mod loader;
pub mod maintain;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod selection;
pub mod version;
