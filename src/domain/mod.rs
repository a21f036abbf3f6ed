//! Domain layer types and invariants.

pub mod error;
pub mod module_name;
pub mod render_config;
