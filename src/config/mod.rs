//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::{Args, Parser, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{
    application::{
        error::AppError, pipeline::ConfigSource, scaffold::FormatOptions,
        workspace::DEFAULT_WORKSPACE_DIR,
    },
    infra::elm::{DEFAULT_ELM_MAKE_PATH, DEFAULT_NODE_PATH},
};

const LOCAL_SETTINGS_FILE: &str = "elm-static-html.toml";
const ENV_PREFIX: &str = "ELM_STATIC_HTML";
const DEFAULT_INDENT: u8 = 4;
const MAX_INDENT: u64 = 16;

/// Command-line arguments for the elm-static-html binary.
#[derive(Debug, Parser)]
#[command(
    name = "elm-static-html",
    version,
    about = "Render Elm view functions to static HTML"
)]
pub struct CliArgs {
    /// Provide an Elm file to compile to HTML.
    #[arg(short = 'f', long = "filename", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub filename: Option<PathBuf>,

    /// Write to a particular file. Defaults to STDOUT.
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<String>,

    /// Be more chatty.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Provide a json file for use as config.
    #[arg(short = 'c', long = "config", value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Generate an example elm-static-html.json and exit.
    #[arg(long = "init-config", action = clap::ArgAction::SetTrue)]
    pub init_config: bool,

    /// Optional path to a tool settings file (TOML).
    #[arg(
        long = "settings-file",
        env = "ELM_STATIC_HTML_SETTINGS_FILE",
        value_name = "PATH"
    )]
    pub settings_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

impl CliArgs {
    /// Decide where the render configuration comes from; `-c` wins over `-f`.
    pub fn config_source(&self) -> Result<ConfigSource, AppError> {
        if let Some(path) = self.config.as_ref() {
            return Ok(ConfigSource::File(path.clone()));
        }
        match self.filename.as_ref() {
            Some(filename) => Ok(ConfigSource::Shorthand {
                filename: filename.clone(),
                output: self.output.clone(),
            }),
            None => Err(AppError::MissingFilename),
        }
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the scratch workspace directory.
    #[arg(long = "workspace-dir", value_name = "PATH")]
    pub workspace_dir: Option<PathBuf>,

    /// Override the elm-make executable.
    #[arg(long = "elm-make-path", value_name = "PATH")]
    pub elm_make_path: Option<PathBuf>,

    /// Override the node executable used to run the compiled artifact.
    #[arg(long = "node-path", value_name = "PATH")]
    pub node_path: Option<PathBuf>,

    /// Override the indentation width of rendered HTML.
    #[arg(long = "indent", value_name = "COUNT")]
    pub indent: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved tool settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub workspace: WorkspaceSettings,
    pub toolchain: ToolchainSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct WorkspaceSettings {
    pub directory: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ToolchainSettings {
    pub elm_make_path: PathBuf,
    pub node_path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub indent: u8,
    pub new_lines: bool,
}

impl From<&RenderSettings> for FormatOptions {
    fn from(render: &RenderSettings) -> Self {
        FormatOptions {
            indent: render.indent,
            new_lines: render.new_lines,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs, invocation_dir: &Path) -> Result<Settings, LoadError> {
    let local = invocation_dir.join(LOCAL_SETTINGS_FILE);
    let mut builder = Config::builder().add_source(
        File::new(&local.to_string_lossy(), FileFormat::Toml).required(false),
    );

    if let Some(path) = cli.settings_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(cli.verbose, &cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    workspace: RawWorkspaceSettings,
    toolchain: RawToolchainSettings,
    render: RawRenderSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWorkspaceSettings {
    directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawToolchainSettings {
    elm_make_path: Option<PathBuf>,
    node_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    indent: Option<u64>,
    new_lines: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, verbose: bool, overrides: &SettingsOverrides) {
        if verbose {
            self.logging.level = Some("debug".to_string());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(directory) = overrides.workspace_dir.as_ref() {
            self.workspace.directory = Some(directory.clone());
        }
        if let Some(path) = overrides.elm_make_path.as_ref() {
            self.toolchain.elm_make_path = Some(path.clone());
        }
        if let Some(path) = overrides.node_path.as_ref() {
            self.toolchain.node_path = Some(path.clone());
        }
        if let Some(indent) = overrides.indent {
            self.render.indent = Some(indent);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            workspace,
            toolchain,
            render,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            workspace: build_workspace_settings(workspace)?,
            toolchain: build_toolchain_settings(toolchain)?,
            render: build_render_settings(render)?,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_workspace_settings(
    workspace: RawWorkspaceSettings,
) -> Result<WorkspaceSettings, LoadError> {
    let directory = workspace
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKSPACE_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "workspace.directory",
            "path must not be empty",
        ));
    }
    Ok(WorkspaceSettings { directory })
}

fn build_toolchain_settings(
    toolchain: RawToolchainSettings,
) -> Result<ToolchainSettings, LoadError> {
    let elm_make_path = non_empty_path(
        toolchain.elm_make_path,
        DEFAULT_ELM_MAKE_PATH,
        "toolchain.elm_make_path",
    )?;
    let node_path = non_empty_path(toolchain.node_path, DEFAULT_NODE_PATH, "toolchain.node_path")?;

    Ok(ToolchainSettings {
        elm_make_path,
        node_path,
    })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let indent = render.indent.unwrap_or(u64::from(DEFAULT_INDENT));
    if indent > MAX_INDENT {
        return Err(LoadError::invalid(
            "render.indent",
            format!("must be at most {MAX_INDENT}"),
        ));
    }
    let indent = u8::try_from(indent)
        .map_err(|_| LoadError::invalid("render.indent", "value exceeds supported range"))?;

    Ok(RenderSettings {
        indent,
        new_lines: render.new_lines.unwrap_or(true),
    })
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli(invocation_dir: &Path) -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args, invocation_dir)?;
    Ok((args, settings))
}
