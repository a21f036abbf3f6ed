//! Infrastructure adapters and runtime bootstrap.

pub mod elm;
pub mod error;
pub mod fs;
pub mod telemetry;
