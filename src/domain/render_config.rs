//! Canonical description of what to render and where to write it.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use super::{error::DomainError, module_name::ModuleName};

/// Destination key that routes a rendered target to standard output.
pub const STDOUT_SENTINEL: &str = "::stdout";

/// Entry function used when a configuration names only an output.
pub const DEFAULT_ENTRY_FUNCTION: &str = "view";

/// Reserved words of Elm 0.18; none of them can name a top-level value.
const ELM_KEYWORDS: &[&str] = &[
    "if", "then", "else", "case", "of", "let", "in", "type", "module", "where", "import",
    "exposing", "as", "port", "effect", "alias", "infix", "infixl", "infixr",
];

/// Where one rendered HTML artifact ends up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    /// Parse a destination as written in configuration; empty values are rejected.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.is_empty() {
            return Err(DomainError::validation("output destination must not be empty"));
        }
        Ok(Self::from_key(raw))
    }

    /// Map a key emitted by the compiled driver back to a destination.
    pub fn from_key(key: &str) -> Self {
        if key == STDOUT_SENTINEL {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(key))
        }
    }

    /// The string form embedded into the driver program.
    pub fn key(&self) -> String {
        match self {
            Self::Stdout => STDOUT_SENTINEL.to_string(),
            Self::File(path) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn is_stdout(&self) -> bool {
        matches!(self, Self::Stdout)
    }
}

impl fmt::Display for OutputDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Name of a view-producing function exposed by a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryFunction(String);

impl EntryFunction {
    pub fn new(name: &str) -> Result<Self, DomainError> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(DomainError::validation(format!(
                "`{name}` is not a valid view function name"
            )));
        }
        if ELM_KEYWORDS.contains(&name) {
            return Err(DomainError::validation(format!(
                "`{name}` is an Elm keyword and cannot name a view function"
            )));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ENTRY_FUNCTION
    }
}

impl Default for EntryFunction {
    fn default() -> Self {
        Self(DEFAULT_ENTRY_FUNCTION.to_string())
    }
}

/// One HTML artifact produced from one entry point of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    pub destination: OutputDestination,
    pub entry: EntryFunction,
}

impl RenderTarget {
    pub fn new(destination: OutputDestination, entry: EntryFunction) -> Self {
        Self { destination, entry }
    }
}

/// All targets rendered from a single source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRenderSpec {
    source_file: PathBuf,
    module_name: ModuleName,
    targets: Vec<RenderTarget>,
}

impl ModuleRenderSpec {
    pub fn new(
        source_file: PathBuf,
        module_name: ModuleName,
        targets: Vec<RenderTarget>,
    ) -> Result<Self, DomainError> {
        if targets.is_empty() {
            return Err(DomainError::invariant(format!(
                "module `{module_name}` has no render targets"
            )));
        }
        Ok(Self {
            source_file,
            module_name,
            targets,
        })
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn module_name(&self) -> &ModuleName {
        &self.module_name
    }

    pub fn targets(&self) -> &[RenderTarget] {
        &self.targets
    }
}

/// Ordered module specs keyed by source file. Insertion order drives the
/// generated import order, so it must be stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderConfiguration {
    specs: Vec<ModuleRenderSpec>,
}

impl RenderConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, spec: ModuleRenderSpec) -> Result<(), DomainError> {
        if self
            .specs
            .iter()
            .any(|existing| existing.source_file == spec.source_file)
        {
            return Err(DomainError::invariant(format!(
                "source file `{}` is configured twice",
                spec.source_file.display()
            )));
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn specs(&self) -> &[ModuleRenderSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Total number of targets across every module.
    pub fn target_count(&self) -> usize {
        self.specs.iter().map(|spec| spec.targets.len()).sum()
    }
}
