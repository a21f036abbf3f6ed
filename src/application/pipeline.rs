//! Orchestration of one render run.
//!
//! A run moves through `Init → ConfigLoaded → ManifestPatched →
//! ScaffoldWritten → Compiling → Running → Distributing → Done`; any fatal
//! error leaves it in `Aborted`. The build step is the only long suspension
//! point. A non-zero build status is logged and the run proceeds anyway, since
//! an artifact from a partially failing build may still be usable.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    domain::{
        module_name::{ModuleName, ModuleNameError, resolve_module_name},
        render_config::{ModuleRenderSpec, OutputDestination, RenderConfiguration},
    },
    infra::error::InfraError,
};

use super::{
    error::AppError,
    manifest::{ProjectManifest, ProjectName},
    normalize::{
        ConfigFile, EXAMPLE_CONFIG_FILE, SourceTargets, example_config, normalize_file,
        normalize_shorthand,
    },
    scaffold::{DriverProgram, FormatOptions, RUNNER_SCRIPT, render_shim},
    toolchain::{ArtifactRunner, BuildOutcome, BuildStep, FileStore, RenderedPair},
    workspace::{MANIFEST_FILE, Workspace},
};

const LOG_TARGET: &str = "elm_static_html::pipeline";

/// Where the render configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `-f FILE [-o OUTPUT]`; no output means standard output.
    Shorthand {
        filename: PathBuf,
        output: Option<String>,
    },
    /// `-c CONFIG`: a JSON configuration file.
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    ConfigLoaded,
    ManifestPatched,
    ScaffoldWritten,
    Compiling,
    Running,
    Distributing,
    Done,
    Aborted,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::ConfigLoaded => "config_loaded",
            Stage::ManifestPatched => "manifest_patched",
            Stage::ScaffoldWritten => "scaffold_written",
            Stage::Compiling => "compiling",
            Stage::Running => "running",
            Stage::Distributing => "distributing",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        }
    }
}

/// Values threaded through a run instead of process-wide state.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory that relative source, config, manifest and output paths resolve against.
    pub invocation_dir: PathBuf,
    pub workspace: Workspace,
    pub format: FormatOptions,
}

/// What a finished run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Source files skipped because no usable module name could be derived.
    pub dropped: Vec<PathBuf>,
    pub build: Option<BuildOutcome>,
    pub files_written: Vec<PathBuf>,
    pub printed: usize,
}

#[derive(Debug, Error)]
enum SourceError {
    #[error("failed to read source file: {0}")]
    Unreadable(#[from] io::Error),
    #[error(transparent)]
    Module(#[from] ModuleNameError),
}

pub struct Pipeline {
    store: Arc<dyn FileStore>,
    build: Arc<dyn BuildStep>,
    runner: Arc<dyn ArtifactRunner>,
    options: PipelineOptions,
    stage: Stage,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn FileStore>,
        build: Arc<dyn BuildStep>,
        runner: Arc<dyn ArtifactRunner>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            store,
            build,
            runner,
            options,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Execute the whole run, writing standard-output targets to `stdout`.
    pub async fn run<W: Write>(
        &mut self,
        source: &ConfigSource,
        stdout: &mut W,
    ) -> Result<RunReport, AppError> {
        let result = self.execute(source, stdout).await;
        if let Err(err) = &result {
            debug!(
                target = LOG_TARGET,
                stage = self.stage.as_str(),
                error = %err,
                "Run aborted"
            );
            self.stage = Stage::Aborted;
        }
        result
    }

    async fn execute<W: Write>(
        &mut self,
        source: &ConfigSource,
        stdout: &mut W,
    ) -> Result<RunReport, AppError> {
        let mut report = RunReport::default();

        let config = self.load_configuration(source, &mut report)?;
        self.advance(Stage::ConfigLoaded);

        let (manifest, project) = self.load_manifest()?;
        self.advance(Stage::ManifestPatched);

        self.write_scaffold(&config, &manifest, &project)?;
        self.advance(Stage::ScaffoldWritten);

        self.advance(Stage::Compiling);
        let outcome = self.build.build(&self.options.workspace).await?;
        if let BuildOutcome::Failed { code } = &outcome {
            warn!(
                target = LOG_TARGET,
                exit_code = *code,
                "Build exited with code {code}; trying to proceed anyway"
            );
        }
        report.build = Some(outcome);

        self.advance(Stage::Running);
        let pairs = self.runner.run(&self.options.workspace).await?;

        self.advance(Stage::Distributing);
        self.distribute(pairs, stdout, &mut report)?;

        self.advance(Stage::Done);
        info!(
            target = LOG_TARGET,
            files = report.files_written.len(),
            printed = report.printed,
            dropped = report.dropped.len(),
            "Done!"
        );
        Ok(report)
    }

    fn advance(&mut self, next: Stage) {
        debug!(
            target = LOG_TARGET,
            from = self.stage.as_str(),
            to = next.as_str(),
            "Stage transition"
        );
        self.stage = next;
    }

    fn load_configuration(
        &self,
        source: &ConfigSource,
        report: &mut RunReport,
    ) -> Result<RenderConfiguration, AppError> {
        let pending = match source {
            ConfigSource::Shorthand { filename, output } => {
                info!(
                    target = LOG_TARGET,
                    file = %filename.display(),
                    output = output.as_deref().unwrap_or("stdout"),
                    "Loading file"
                );
                normalize_shorthand(filename, output.as_deref())?
            }
            ConfigSource::File(path) => {
                info!(target = LOG_TARGET, config = %path.display(), "Using the config file");
                let text = self
                    .store
                    .read_to_string(&self.resolve(path))
                    .map_err(|err| {
                        AppError::user_input(format!(
                            "failed to load config file `{}`: {err}; you can create one with --init-config",
                            path.display()
                        ))
                    })?;
                normalize_file(&ConfigFile::parse(&text)?)?
            }
        };

        let mut config = RenderConfiguration::new();
        for SourceTargets {
            source_file,
            targets,
        } in pending
        {
            match self.resolve_module(&source_file) {
                Ok(module) => {
                    config.push(ModuleRenderSpec::new(source_file, module, targets)?)?;
                }
                Err(reason) => {
                    warn!(
                        target = LOG_TARGET,
                        file = %source_file.display(),
                        reason = %reason,
                        "Skipping source file"
                    );
                    report.dropped.push(source_file);
                }
            }
        }
        Ok(config)
    }

    fn resolve_module(&self, source_file: &Path) -> Result<ModuleName, SourceError> {
        let text = self.store.read_to_string(&self.resolve(source_file))?;
        Ok(resolve_module_name(&text)?)
    }

    fn load_manifest(&self) -> Result<(ProjectManifest, ProjectName), AppError> {
        let path = self.options.invocation_dir.join(MANIFEST_FILE);
        let text = self
            .store
            .read_to_string(&path)
            .map_err(|err| AppError::missing_manifest(&path, err))?;
        let manifest =
            ProjectManifest::parse(&text).map_err(|err| AppError::missing_manifest(&path, err))?;
        let project = manifest
            .project_name()
            .map_err(|err| AppError::missing_manifest(&path, err))?;
        let patched = manifest
            .patch(&self.options.invocation_dir)
            .map_err(|err| AppError::missing_manifest(&path, err))?;
        Ok((patched, project))
    }

    fn write_scaffold(
        &self,
        config: &RenderConfiguration,
        manifest: &ProjectManifest,
        project: &ProjectName,
    ) -> Result<(), AppError> {
        let workspace = &self.options.workspace;
        self.store
            .create_dir_all(&workspace.native_dir())
            .map_err(InfraError::from)?;

        let manifest_json = manifest
            .to_json()
            .map_err(|err| AppError::unexpected(format!("failed to encode manifest: {err}")))?;
        let driver = DriverProgram::from_configuration(config, self.options.format).render();

        for (path, contents) in [
            (workspace.manifest_path(), manifest_json),
            (workspace.driver_path(), driver),
            (workspace.shim_path(), render_shim(project)),
            (workspace.runner_path(), RUNNER_SCRIPT.to_string()),
        ] {
            self.store
                .write(&path, &contents)
                .map_err(InfraError::from)?;
        }

        info!(
            target = LOG_TARGET,
            workspace = %workspace.root().display(),
            modules = config.len(),
            targets = config.target_count(),
            "Wrote template files"
        );
        Ok(())
    }

    fn distribute<W: Write>(
        &self,
        pairs: Vec<RenderedPair>,
        stdout: &mut W,
        report: &mut RunReport,
    ) -> Result<(), AppError> {
        for (key, html) in pairs {
            match OutputDestination::from_key(&key) {
                OutputDestination::Stdout => {
                    write!(stdout, "{html}\n\n").map_err(InfraError::from)?;
                    report.printed += 1;
                }
                OutputDestination::File(path) => {
                    let path = self.resolve(&path);
                    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                        self.store
                            .create_dir_all(parent)
                            .map_err(InfraError::from)?;
                    }
                    self.store
                        .write(&path, &format!("{html}\n"))
                        .map_err(InfraError::from)?;
                    info!(target = LOG_TARGET, path = %path.display(), "Saved output");
                    report.files_written.push(path);
                }
            }
        }
        stdout.flush().map_err(InfraError::from)?;
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.options.invocation_dir.join(path)
    }
}

/// Write the example configuration into `invocation_dir`, returning its path.
pub fn write_example_config(
    store: &dyn FileStore,
    invocation_dir: &Path,
) -> Result<PathBuf, AppError> {
    let path = invocation_dir.join(EXAMPLE_CONFIG_FILE);
    let body = example_config().to_pretty_json()?;
    store.write(&path, &body).map_err(InfraError::from)?;
    info!(target = LOG_TARGET, path = %path.display(), "Initialized example config");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(Stage::Init.as_str(), "init");
        assert_eq!(Stage::ScaffoldWritten.as_str(), "scaffold_written");
        assert_eq!(Stage::Aborted.as_str(), "aborted");
    }
}
