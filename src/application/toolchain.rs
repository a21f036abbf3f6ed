//! Collaborator traits describing the file system and the external Elm toolchain.

use std::{io, path::Path, path::PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use super::workspace::Workspace;

/// One `(destination key, html or error text)` pair emitted by the driver.
pub type RenderedPair = (String, String);

/// Text storage used for sources, the manifest, scratch files and outputs.
pub trait FileStore: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    /// Create a directory and its parents; an existing directory is not an error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Completion signal of the external build step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Built(PathBuf),
    Failed { code: i32 },
}

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited with status {code:?}: {stderr}")]
    Exited {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("compiled artifact produced unreadable output: {message}")]
    Decode { message: String },
}

impl ToolchainError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Compiles the generated driver inside the workspace.
#[async_trait]
pub trait BuildStep: Send + Sync {
    async fn build(&self, workspace: &Workspace) -> Result<BuildOutcome, ToolchainError>;
}

/// Loads the compiled artifact and collects its single batch of results.
#[async_trait]
pub trait ArtifactRunner: Send + Sync {
    async fn run(&self, workspace: &Workspace) -> Result<Vec<RenderedPair>, ToolchainError>;
}
