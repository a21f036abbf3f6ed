//! Normalisation of CLI shorthand and configuration files into render targets.
//!
//! The configuration file maps each source path to one of:
//!
//! * a bare output string (rendered with the `view` entry function),
//! * a `{"output": ..., "viewFunction": ...}` record,
//! * a list of such records for several outputs from one module.
//!
//! A malformed record fails the whole load; silently accepting the rest would
//! write HTML under the wrong names.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, ser::PrettyFormatter};
use thiserror::Error;

use crate::domain::render_config::{
    EntryFunction, OutputDestination, RenderConfiguration, RenderTarget,
};

/// File written by `--init-config`.
pub const EXAMPLE_CONFIG_FILE: &str = "elm-static-html.json";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed configuration entry for `{file}`: {reason}")]
    MalformedEntry { file: String, reason: String },
}

impl NormalizeError {
    fn malformed(file: &str, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            file: file.to_string(),
            reason: reason.into(),
        }
    }
}

/// On-disk configuration shape. Object order is preserved on parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub files: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetRecord {
    pub output: String,
    #[serde(rename = "viewFunction")]
    pub view_function: String,
}

impl ConfigFile {
    pub fn parse(text: &str) -> Result<Self, NormalizeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Pretty JSON with four-space indentation and a trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, NormalizeError> {
        let mut buffer = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)?;
        let mut text = String::from_utf8_lossy(&buffer).into_owned();
        text.push('\n');
        Ok(text)
    }
}

impl From<&RenderConfiguration> for ConfigFile {
    fn from(config: &RenderConfiguration) -> Self {
        let files = config
            .specs()
            .iter()
            .map(|spec| {
                let records = spec
                    .targets()
                    .iter()
                    .map(|target| {
                        serde_json::json!({
                            "output": target.destination.key(),
                            "viewFunction": target.entry.as_str(),
                        })
                    })
                    .collect();
                (
                    spec.source_file().to_string_lossy().into_owned(),
                    Value::Array(records),
                )
            })
            .collect();
        Self { files }
    }
}

/// A source file with its targets, before its module name is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTargets {
    pub source_file: PathBuf,
    pub targets: Vec<RenderTarget>,
}

/// `-f FILE [-o OUTPUT]`: one target using the default entry function.
/// Without `-o` the target goes to standard output; an empty `-o` is
/// rejected like an empty `output` in a config file.
pub fn normalize_shorthand(
    filename: &Path,
    output: Option<&str>,
) -> Result<Vec<SourceTargets>, NormalizeError> {
    let destination = match output {
        Some(path) => OutputDestination::parse(path).map_err(|err| {
            NormalizeError::malformed(&filename.to_string_lossy(), err.to_string())
        })?,
        None => OutputDestination::Stdout,
    };
    Ok(vec![SourceTargets {
        source_file: filename.to_path_buf(),
        targets: vec![RenderTarget::new(destination, EntryFunction::default())],
    }])
}

/// Flatten every configuration entry into targets, in document order.
pub fn normalize_file(config: &ConfigFile) -> Result<Vec<SourceTargets>, NormalizeError> {
    config
        .files
        .iter()
        .map(|(file, entry)| {
            Ok(SourceTargets {
                source_file: PathBuf::from(file),
                targets: normalize_entry(file, entry)?,
            })
        })
        .collect()
}

fn normalize_entry(file: &str, entry: &Value) -> Result<Vec<RenderTarget>, NormalizeError> {
    match entry {
        Value::String(output) => {
            let destination = OutputDestination::parse(output)
                .map_err(|err| NormalizeError::malformed(file, err.to_string()))?;
            Ok(vec![RenderTarget::new(destination, EntryFunction::default())])
        }
        Value::Object(_) => Ok(vec![normalize_record(file, entry)?]),
        Value::Array(records) => {
            if records.is_empty() {
                return Err(NormalizeError::malformed(file, "no outputs listed"));
            }
            records
                .iter()
                .map(|record| match record {
                    Value::Object(_) => normalize_record(file, record),
                    other => Err(NormalizeError::malformed(
                        file,
                        format!("expected an output record, found {}", kind_of(other)),
                    )),
                })
                .collect()
        }
        other => Err(NormalizeError::malformed(
            file,
            format!(
                "expected an output string, record or list, found {}",
                kind_of(other)
            ),
        )),
    }
}

fn normalize_record(file: &str, record: &Value) -> Result<RenderTarget, NormalizeError> {
    let record = TargetRecord::deserialize(record)
        .map_err(|err| NormalizeError::malformed(file, err.to_string()))?;
    let destination = OutputDestination::parse(&record.output)
        .map_err(|err| NormalizeError::malformed(file, err.to_string()))?;
    let entry = EntryFunction::new(&record.view_function)
        .map_err(|err| NormalizeError::malformed(file, err.to_string()))?;
    Ok(RenderTarget::new(destination, entry))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a record",
    }
}

/// Body of the example configuration written by `--init-config`.
pub fn example_config() -> ConfigFile {
    ConfigFile::default()
}
