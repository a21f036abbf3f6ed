//! Patching of `elm-package.json` so the compiler accepts the generated sources.

use std::{fmt, path::Path};

use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Package providing `ElmHtml.InternalTypes` and `ElmHtml.ToString`.
pub const RENDER_SUPPORT_PACKAGE: &str = "eeue56/elm-html-in-elm";
pub const RENDER_SUPPORT_CONSTRAINT: &str = "5.1.0 <= v < 6.0.0";

const SOURCE_DIRECTORIES: &str = "source-directories";
const DEPENDENCIES: &str = "dependencies";
const NATIVE_MODULES: &str = "native-modules";
const REPOSITORY: &str = "repository";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("manifest field `{field}` {problem}")]
    Field {
        field: &'static str,
        problem: &'static str,
    },
}

impl ManifestError {
    fn field(field: &'static str, problem: &'static str) -> Self {
        Self::Field { field, problem }
    }
}

/// Namespace used by native modules, e.g. `user$project` for
/// `https://github.com/user/project.git`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn from_repository(repository: &str) -> Result<Self, ManifestError> {
        let path = match Url::parse(repository.trim()) {
            Ok(url) => url.path().to_string(),
            Err(_) => repository.trim().to_string(),
        };
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        if path.is_empty() {
            return Err(ManifestError::field(REPOSITORY, "does not name a project"));
        }
        Ok(Self(path.replace('/', "$").replace('-', "_")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory copy of the project manifest. Patching never touches the
/// original file; the result is only persisted inside the scratch workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectManifest {
    fields: Map<String, Value>,
}

impl ProjectManifest {
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        match serde_json::from_str(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ManifestError::field("(root)", "must be a JSON object")),
        }
    }

    pub fn source_directories(&self) -> Result<Vec<String>, ManifestError> {
        let entries = self
            .fields
            .get(SOURCE_DIRECTORIES)
            .and_then(Value::as_array)
            .ok_or_else(|| ManifestError::field(SOURCE_DIRECTORIES, "must be a list"))?;
        entries
            .iter()
            .map(|entry| {
                entry
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ManifestError::field(SOURCE_DIRECTORIES, "must hold strings"))
            })
            .collect()
    }

    pub fn project_name(&self) -> Result<ProjectName, ManifestError> {
        let repository = self
            .fields
            .get(REPOSITORY)
            .and_then(Value::as_str)
            .ok_or_else(|| ManifestError::field(REPOSITORY, "must be a string"))?;
        ProjectName::from_repository(repository)
    }

    /// Rebase source directories onto `invocation_dir`, add the workspace root
    /// (`.`), pin the rendering-support package and allow native modules.
    pub fn patch(mut self, invocation_dir: &Path) -> Result<Self, ManifestError> {
        let mut sources: Vec<Value> = self
            .source_directories()?
            .iter()
            .map(|dir| Value::String(invocation_dir.join(dir).to_string_lossy().into_owned()))
            .collect();
        sources.push(Value::String(".".to_string()));
        self.fields
            .insert(SOURCE_DIRECTORIES.to_string(), Value::Array(sources));

        let dependencies = self
            .fields
            .entry(DEPENDENCIES)
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| ManifestError::field(DEPENDENCIES, "must be an object"))?;
        dependencies.insert(
            RENDER_SUPPORT_PACKAGE.to_string(),
            Value::String(RENDER_SUPPORT_CONSTRAINT.to_string()),
        );

        self.fields
            .insert(NATIVE_MODULES.to_string(), Value::Bool(true));
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn to_json(&self) -> Result<String, ManifestError> {
        let mut text = serde_json::to_string_pretty(&self.fields)?;
        text.push('\n');
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "version": "1.0.0",
        "summary": "site",
        "repository": "https://github.com/some-user/my-site.git",
        "license": "BSD3",
        "source-directories": ["src", "vendor/widgets"],
        "exposed-modules": [],
        "dependencies": {
            "elm-lang/core": "5.1.1 <= v < 6.0.0",
            "elm-lang/html": "2.0.0 <= v < 3.0.0"
        },
        "elm-version": "0.18.0 <= v < 0.19.0"
    }"#;

    #[test]
    fn project_name_strips_scheme_host_and_suffix() {
        let manifest = ProjectManifest::parse(MANIFEST).expect("manifest");
        assert_eq!(
            manifest.project_name().expect("name").as_str(),
            "some_user$my_site"
        );
        assert_eq!(
            ProjectName::from_repository("user/project")
                .expect("bare path")
                .as_str(),
            "user$project"
        );
        assert!(ProjectName::from_repository("https://github.com/").is_err());
    }

    #[test]
    fn patch_rebases_sources_and_appends_workspace_root() {
        let patched = ProjectManifest::parse(MANIFEST)
            .expect("manifest")
            .patch(Path::new("/home/me/site"))
            .expect("patched");

        assert_eq!(
            patched.source_directories().expect("sources"),
            vec![
                "/home/me/site/src".to_string(),
                "/home/me/site/vendor/widgets".to_string(),
                ".".to_string(),
            ]
        );
        assert_eq!(patched.get("native-modules"), Some(&Value::Bool(true)));
    }

    #[test]
    fn patch_pins_render_support_dependency_and_keeps_others() {
        let patched = ProjectManifest::parse(MANIFEST)
            .expect("manifest")
            .patch(Path::new("/p"))
            .expect("patched");

        let deps = patched
            .get("dependencies")
            .and_then(Value::as_object)
            .expect("dependencies");
        assert_eq!(
            deps.get(RENDER_SUPPORT_PACKAGE).and_then(Value::as_str),
            Some(RENDER_SUPPORT_CONSTRAINT)
        );
        assert!(deps.contains_key("elm-lang/core"));
        assert_eq!(
            patched.get("elm-version").and_then(Value::as_str),
            Some("0.18.0 <= v < 0.19.0")
        );
    }

    #[test]
    fn patch_adds_missing_dependencies_object() {
        let manifest = ProjectManifest::parse(
            r#"{"repository": "https://github.com/u/p.git", "source-directories": ["."]}"#,
        )
        .expect("manifest");
        let patched = manifest.patch(Path::new("/p")).expect("patched");
        assert!(
            patched
                .get("dependencies")
                .and_then(Value::as_object)
                .is_some_and(|deps| deps.contains_key(RENDER_SUPPORT_PACKAGE))
        );
    }

    #[test]
    fn invalid_manifests_are_rejected() {
        assert!(matches!(
            ProjectManifest::parse("not json"),
            Err(ManifestError::Parse(_))
        ));
        assert!(ProjectManifest::parse("[]").is_err());

        let no_sources =
            ProjectManifest::parse(r#"{"repository": "https://github.com/u/p.git"}"#)
                .expect("object");
        assert!(no_sources.patch(Path::new("/p")).is_err());
    }

    #[test]
    fn serialised_manifest_round_trips_through_parse() {
        let patched = ProjectManifest::parse(MANIFEST)
            .expect("manifest")
            .patch(Path::new("/p"))
            .expect("patched");
        let reparsed = ProjectManifest::parse(&patched.to_json().expect("json")).expect("reparse");
        assert_eq!(reparsed, patched);
    }
}
