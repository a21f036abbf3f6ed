//! Layout of the scratch workspace that holds generated build inputs.

use std::path::{Path, PathBuf};

/// Scratch directory used when no other location is configured.
pub const DEFAULT_WORKSPACE_DIR: &str = ".elm-static-html";
/// Project manifest read from the invocation directory and written patched.
pub const MANIFEST_FILE: &str = "elm-package.json";
pub const DRIVER_FILE: &str = "PrivateMain.elm";
pub const NATIVE_DIR: &str = "Native";
pub const SHIM_FILE: &str = "Jsonify.js";
pub const RUNNER_FILE: &str = "runner.js";
/// Compiled artifact produced by the build step, relative to the workspace.
pub const ARTIFACT_FILE: &str = "elm.js";

/// Explicit handle on the scratch directory; nothing in the pipeline assumes
/// the process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a configured directory against the invocation directory.
    pub fn resolve(invocation_dir: &Path, directory: &Path) -> Self {
        Self::new(invocation_dir.join(directory))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    pub fn driver_path(&self) -> PathBuf {
        self.root.join(DRIVER_FILE)
    }

    pub fn native_dir(&self) -> PathBuf {
        self.root.join(NATIVE_DIR)
    }

    pub fn shim_path(&self) -> PathBuf {
        self.native_dir().join(SHIM_FILE)
    }

    pub fn runner_path(&self) -> PathBuf {
        self.root.join(RUNNER_FILE)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.root.join(ARTIFACT_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_directory_resolves_against_invocation_dir() {
        let workspace = Workspace::resolve(Path::new("/project"), Path::new(DEFAULT_WORKSPACE_DIR));
        assert_eq!(workspace.root(), Path::new("/project/.elm-static-html"));
        assert_eq!(
            workspace.shim_path(),
            Path::new("/project/.elm-static-html/Native/Jsonify.js")
        );
        assert_eq!(
            workspace.artifact_path(),
            Path::new("/project/.elm-static-html/elm.js")
        );
    }

    #[test]
    fn absolute_directory_is_kept() {
        let workspace = Workspace::resolve(Path::new("/project"), Path::new("/tmp/scratch"));
        assert_eq!(workspace.driver_path(), Path::new("/tmp/scratch/PrivateMain.elm"));
    }
}
