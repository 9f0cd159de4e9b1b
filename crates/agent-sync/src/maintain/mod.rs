//! Maintenance rewrites applied to the latest version of published agents.

pub mod apply;
pub mod transform;

pub use apply::*;
pub use transform::*;
