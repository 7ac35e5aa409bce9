//! Decoded `Cargo.toml` consumed by manifest rules.

use crate::types::{DependencySummary, ProjectSummary};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use toml::Value;

/// Errors reading or decoding a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest could not be read.
    #[error("failed to read manifest {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest is not valid TOML.
    #[error("malformed manifest {path}: {message}")]
    Malformed {
        /// Path that was decoded.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
}

/// The `[package]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Package name, `unknown` when absent.
    pub name: String,
    /// Package version, `0.0.0` when absent.
    pub version: String,
    /// Edition, `2021` when absent.
    pub edition: String,
    /// Authors.
    pub authors: Vec<String>,
    /// `description`, if set.
    pub description: Option<String>,
    /// `license` or `license-file`, if set.
    pub license: Option<String>,
    /// `repository`, if set.
    pub repository: Option<String>,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            version: "0.0.0".to_string(),
            edition: "2021".to_string(),
            authors: Vec::new(),
            description: None,
            license: None,
            repository: None,
        }
    }
}

/// One dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Crate name as written in the manifest.
    pub name: String,
    /// Version requirement, `*` when absent.
    pub version: String,
    /// Enabled features.
    pub features: Vec<String>,
    /// `optional = true`.
    pub optional: bool,
    /// Listed under `[dev-dependencies]`.
    pub dev: bool,
    /// `workspace = true`; version and features come from the workspace.
    pub inherited: bool,
}

/// A decoded manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Package metadata. Defaults for a virtual workspace manifest.
    pub package: PackageInfo,
    /// `[dependencies]`, sorted by name.
    pub dependencies: Vec<Dependency>,
    /// `[dev-dependencies]`, sorted by name.
    pub dev_dependencies: Vec<Dependency>,
    /// Names of `[profile.*]` tables.
    pub profiles: BTreeSet<String>,
}

impl Manifest {
    /// Decodes manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Malformed`] if `content` is not valid TOML.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Self::parse_at(content, Path::new("Cargo.toml"))
    }

    /// Reads and decodes the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] if the file cannot be read, or
    /// [`ManifestError::Malformed`] if it is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_at(&content, path)
    }

    fn parse_at(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let root: toml::Table = content.parse().map_err(|e: toml::de::Error| {
            ManifestError::Malformed {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            }
        })?;

        let package = root
            .get("package")
            .and_then(Value::as_table)
            .map(package_info)
            .unwrap_or_default();

        let profiles = root
            .get("profile")
            .and_then(Value::as_table)
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            package,
            dependencies: dependencies(&root, "dependencies", false),
            dev_dependencies: dependencies(&root, "dev-dependencies", true),
            profiles,
        })
    }

    /// Regular and dev dependencies together.
    pub fn all_dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().chain(&self.dev_dependencies)
    }

    /// Looks up a regular dependency by name.
    #[must_use]
    pub fn dependency(&self, name: &str) -> Option<&Dependency> {
        self.dependencies.iter().find(|d| d.name == name)
    }

    /// Whether a regular or dev dependency called `name` exists.
    #[must_use]
    pub fn has_dependency(&self, name: &str) -> bool {
        self.all_dependencies().any(|d| d.name == name)
    }

    /// Whether a dev dependency called `name` exists.
    #[must_use]
    pub fn has_dev_dependency(&self, name: &str) -> bool {
        self.dev_dependencies.iter().any(|d| d.name == name)
    }

    /// Package facts for reports.
    #[must_use]
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            name: self.package.name.clone(),
            version: self.package.version.clone(),
            edition: self.package.edition.clone(),
            license: self.package.license.clone(),
            dependencies: self
                .all_dependencies()
                .map(|d| DependencySummary {
                    name: d.name.clone(),
                    version: if d.inherited {
                        "workspace".to_string()
                    } else {
                        d.version.clone()
                    },
                    dev: d.dev,
                })
                .collect(),
        }
    }
}

fn package_info(table: &toml::Table) -> PackageInfo {
    let defaults = PackageInfo::default();
    PackageInfo {
        name: string_field(table, "name").unwrap_or(defaults.name),
        version: string_field(table, "version").unwrap_or(defaults.version),
        edition: string_field(table, "edition").unwrap_or(defaults.edition),
        authors: table
            .get("authors")
            .and_then(Value::as_array)
            .map(|a| strings(a))
            .unwrap_or_default(),
        description: string_field(table, "description"),
        license: string_field(table, "license").or_else(|| string_field(table, "license-file")),
        repository: string_field(table, "repository"),
    }
}

/// Reads a string field; `{ workspace = true }` counts as set.
fn string_field(table: &toml::Table, key: &str) -> Option<String> {
    match table.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Table(t) if t.get("workspace").and_then(Value::as_bool) == Some(true) => {
            Some("workspace".to_string())
        }
        _ => None,
    }
}

fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

fn dependencies(root: &toml::Table, key: &str, dev: bool) -> Vec<Dependency> {
    let Some(table) = root.get(key).and_then(Value::as_table) else {
        return Vec::new();
    };

    table
        .iter()
        .map(|(name, spec)| match spec {
            Value::Table(t) => Dependency {
                name: name.clone(),
                version: t
                    .get("version")
                    .and_then(Value::as_str)
                    .unwrap_or("*")
                    .to_string(),
                features: t
                    .get("features")
                    .and_then(Value::as_array)
                    .map(|a| strings(a))
                    .unwrap_or_default(),
                optional: t.get("optional").and_then(Value::as_bool).unwrap_or(false),
                dev,
                inherited: t.get("workspace").and_then(Value::as_bool).unwrap_or(false),
            },
            other => Dependency {
                name: name.clone(),
                version: other.as_str().unwrap_or("*").to_string(),
                features: Vec::new(),
                optional: false,
                dev,
                inherited: false,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[package]
name = "demo"
version = "0.1.0"
edition = "2018"
authors = ["A <a@example.com>"]

[dependencies]
serde = { version = "1", features = ["derive"] }
regex = "1"
tokio = { workspace = true }
extra = { version = "0.2", optional = true }

[dev-dependencies]
criterion = "0.5"

[profile.release]
lto = true
"#;

    #[test]
    fn parses_package_and_dependencies() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.package.edition, "2018");
        assert_eq!(manifest.package.authors.len(), 1);
        assert!(manifest.package.license.is_none());

        let serde = manifest.dependency("serde").unwrap();
        assert_eq!(serde.features, vec!["derive"]);
        assert_eq!(manifest.dependency("regex").unwrap().version, "1");
        assert!(manifest.dependency("tokio").unwrap().inherited);
        assert!(manifest.dependency("extra").unwrap().optional);

        assert!(manifest.has_dev_dependency("criterion"));
        assert!(manifest.dev_dependencies[0].dev);
        assert!(manifest.profiles.contains("release"));
    }

    #[test]
    fn summary_lists_dependencies() {
        let summary = Manifest::parse(SAMPLE).unwrap().summary();
        assert_eq!(summary.name, "demo");
        assert_eq!(summary.edition, "2018");
        let deps: Vec<(&str, &str, bool)> = summary
            .dependencies
            .iter()
            .map(|d| (d.name.as_str(), d.version.as_str(), d.dev))
            .collect();
        assert_eq!(
            deps,
            vec![
                ("extra", "0.2", false),
                ("regex", "1", false),
                ("serde", "1", false),
                ("tokio", "workspace", false),
                ("criterion", "0.5", true),
            ]
        );
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let manifest = Manifest::parse("[dependencies]\nfoo = { path = \"../foo\" }\n").unwrap();
        assert_eq!(manifest.package.name, "unknown");
        assert_eq!(manifest.package.version, "0.0.0");
        assert_eq!(manifest.package.edition, "2021");
        assert_eq!(manifest.dependency("foo").unwrap().version, "*");
    }

    #[test]
    fn workspace_inherited_fields_count_as_set() {
        let manifest = Manifest::parse("[package]\nname = \"x\"\nlicense.workspace = true\n").unwrap();
        assert!(manifest.package.license.is_some());
        assert!(manifest.package.description.is_none());
    }

    #[test]
    fn malformed_input_is_an_error() {
        let err = Manifest::parse("[package\nname = 1").unwrap_err();
        assert!(matches!(err, ManifestError::Malformed { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::from_file(&dir.path().join("Cargo.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
