//! Pure text generation for the files placed in the scratch workspace.
//!
//! The driver is assembled from a structured description (imports plus one
//! binding per render target) and rendered by a single formatting pass, so the
//! same [`RenderConfiguration`](crate::domain::render_config::RenderConfiguration)
//! always yields byte-identical output.

mod driver;
mod shim;

pub use driver::{DriverProgram, FormatOptions, ViewBinding, elm_string_literal};
pub use shim::{RUNNER_SCRIPT, render_shim};
