//! Module-name resolution from an Elm source header.
//!
//! Only the first line of a source file is inspected. It must match
//! `["port" | "effect"] "module" ModuleName ...`, where a module name is a
//! dot-separated sequence of capitalised identifiers (`Pages.About`). Anything
//! else is rejected with a typed error so callers can skip the file with a
//! precise diagnostic instead of guessing.

use std::fmt;

use thiserror::Error;

/// Module name reserved for the generated driver program.
pub const RESERVED_MODULE_NAME: &str = "PrivateMain";

/// Reasons a source header does not yield a usable module name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModuleNameError {
    #[error("first line is not a module declaration")]
    MissingHeader,
    #[error("module declaration does not name a module")]
    EmptyName,
    #[error("`{0}` is not a valid module name")]
    InvalidName(String),
    #[error("you can't call your module PrivateMain; please rename it")]
    Reserved,
}

/// A validated, non-reserved Elm module name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn parse(raw: &str) -> Result<Self, ModuleNameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ModuleNameError::EmptyName);
        }
        if !name.split('.').all(is_upper_identifier) {
            return Err(ModuleNameError::InvalidName(name.to_string()));
        }
        if name == RESERVED_MODULE_NAME {
            return Err(ModuleNameError::Reserved);
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derive the declared module name from the raw contents of a source file.
pub fn resolve_module_name(source: &str) -> Result<ModuleName, ModuleNameError> {
    let header = source
        .trim_start_matches('\u{feff}')
        .lines()
        .next()
        .unwrap_or_default();
    let mut tokens = header.split_whitespace();

    let mut keyword = tokens.next().ok_or(ModuleNameError::MissingHeader)?;
    if matches!(keyword, "port" | "effect") {
        keyword = tokens.next().ok_or(ModuleNameError::MissingHeader)?;
    }
    if keyword != "module" {
        return Err(ModuleNameError::MissingHeader);
    }

    let name = tokens.next().ok_or(ModuleNameError::EmptyName)?;
    ModuleName::parse(name)
}

fn is_upper_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
