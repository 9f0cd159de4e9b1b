//! Reconciliation: create or update remote agents from declared ones.

pub mod apply;
pub mod types;

pub use apply::*;
pub use types::*;
