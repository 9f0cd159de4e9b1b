//! Agent domain types: tool bindings, definitions, declared and remote agents.

pub mod agent;
pub mod definition;
pub mod tool;

pub use agent::*;
pub use definition::*;
pub use tool::*;
