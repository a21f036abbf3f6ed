//! Subprocess adapters for `elm-make` and the Node.js artifact runner.

use std::{
    io::ErrorKind,
    path::PathBuf,
    process::{Output, Stdio},
    time::Instant,
};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::application::{
    toolchain::{ArtifactRunner, BuildOutcome, BuildStep, RenderedPair, ToolchainError},
    workspace::{ARTIFACT_FILE, DRIVER_FILE, RUNNER_FILE, Workspace},
};

pub const DEFAULT_ELM_MAKE_PATH: &str = "elm-make";
pub const DEFAULT_NODE_PATH: &str = "node";

/// Runs `elm-make PrivateMain.elm --yes --output elm.js` inside the workspace.
#[derive(Debug, Clone)]
pub struct ElmMake {
    program: PathBuf,
}

impl ElmMake {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl BuildStep for ElmMake {
    async fn build(&self, workspace: &Workspace) -> Result<BuildOutcome, ToolchainError> {
        let started_at = Instant::now();
        let program = self.program.display().to_string();

        // Compiler progress goes to a pipe so it never mixes with rendered HTML on stdout.
        let output = Command::new(&self.program)
            .arg(DRIVER_FILE)
            .arg("--yes")
            .arg("--output")
            .arg(ARTIFACT_FILE)
            .current_dir(workspace.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| spawn_error(&program, source))?;

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            target = "elm_static_html::toolchain",
            op = "elm_make::build",
            stdout = %stdout.trim_end(),
            "elm-make output"
        );

        if output.status.success() {
            info!(
                target = "elm_static_html::toolchain",
                op = "elm_make::build",
                result = "ok",
                elapsed_ms,
                "Driver compiled"
            );
            return Ok(BuildOutcome::Built(workspace.artifact_path()));
        }

        let code = output.status.code().unwrap_or(-1);
        warn!(
            target = "elm_static_html::toolchain",
            op = "elm_make::build",
            result = "error",
            elapsed_ms,
            exit_code = code,
            stderr = %stderr.trim_end(),
            "elm-make reported a failure"
        );
        Ok(BuildOutcome::Failed { code })
    }
}

/// Executes the generated `runner.js` with Node.js and decodes the batch it prints.
#[derive(Debug, Clone)]
pub struct NodeRunner {
    program: PathBuf,
}

impl NodeRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl ArtifactRunner for NodeRunner {
    async fn run(&self, workspace: &Workspace) -> Result<Vec<RenderedPair>, ToolchainError> {
        let program = self.program.display().to_string();
        let output: Output = Command::new(&self.program)
            .arg(RUNNER_FILE)
            .current_dir(workspace.root())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| spawn_error(&program, source))?;

        if !output.status.success() {
            return Err(ToolchainError::Exited {
                program,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        decode_batch(&output.stdout)
    }
}

/// Decode the JSON array of `[destination, html]` pairs printed by the runner.
pub fn decode_batch(stdout: &[u8]) -> Result<Vec<RenderedPair>, ToolchainError> {
    serde_json::from_slice(stdout).map_err(|err| ToolchainError::decode(err.to_string()))
}

fn spawn_error(program: &str, source: std::io::Error) -> ToolchainError {
    if source.kind() == ErrorKind::NotFound {
        warn!(
            target = "elm_static_html::toolchain",
            program,
            "Executable not found; check the toolchain paths"
        );
    }
    ToolchainError::Spawn {
        program: program.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs_in_order() {
        let pairs =
            decode_batch(br#"[["::stdout","<div>a</div>"],["out.html","<p>b</p>"]]"#)
                .expect("batch");
        assert_eq!(
            pairs,
            vec![
                ("::stdout".to_string(), "<div>a</div>".to_string()),
                ("out.html".to_string(), "<p>b</p>".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_malformed_batch() {
        let err = decode_batch(b"Compiled successfully").expect_err("not json");
        assert!(matches!(err, ToolchainError::Decode { .. }));
    }
}
