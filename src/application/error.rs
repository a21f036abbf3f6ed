use std::path::PathBuf;

use thiserror::Error;

use crate::{domain::error::DomainError, infra::error::InfraError};

use super::{normalize::NormalizeError, toolchain::ToolchainError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no filename provided; please provide a filename via -f")]
    MissingFilename,
    #[error("invalid input: {0}")]
    UserInput(String),
    #[error(transparent)]
    Config(#[from] NormalizeError),
    #[error("failed to load {}: {reason}; make sure elm-package.json is in the current directory", .path.display())]
    MissingManifest { path: PathBuf, reason: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Toolchain(#[from] ToolchainError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn user_input(message: impl Into<String>) -> Self {
        Self::UserInput(message.into())
    }

    pub fn missing_manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MissingManifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Whether the failure stems from how the tool was invoked rather than the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingFilename | AppError::UserInput(_) | AppError::Config(_)
        )
    }
}
