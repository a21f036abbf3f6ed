//! Application services: configuration normalisation, manifest patching,
//! scaffold generation and the orchestration of a render run.

pub mod error;
pub mod manifest;
pub mod normalize;
pub mod pipeline;
pub mod scaffold;
pub mod toolchain;
pub mod workspace;
