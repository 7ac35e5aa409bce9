//! Locates the configuration file for an analysis target.
//!
//! `--config` wins. Otherwise the search starts at the target's directory and
//! walks up to the enclosing crate root (the first directory holding a
//! `Cargo.toml` or `.git`), taking the first `idiom-lint.toml` or
//! `.idiom-lint.toml` it meets. Without one, `config.toml` in the user config
//! directory applies.

use std::path::{Path, PathBuf};

const CONFIG_NAMES: &[&str] = &["idiom-lint.toml", ".idiom-lint.toml"];

const ROOT_MARKERS: &[&str] = &["Cargo.toml", ".git"];

const USER_CONFIG_DIR_ENV: &str = "IDIOM_LINT_CONFIG_DIR";

/// How a configuration file was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Named on the command line.
    Flag,
    /// Found between the target and its crate root.
    Project,
    /// From the user config directory.
    User,
}

/// Finds the configuration file that applies to `target`.
#[must_use]
pub fn find(target: &Path, explicit: Option<&Path>) -> Option<(PathBuf, Origin)> {
    if let Some(path) = explicit {
        return Some((path.to_path_buf(), Origin::Flag));
    }
    if let Some(path) = search_upward(&start_dir(target)) {
        return Some((path, Origin::Project));
    }
    user_config_dir()
        .map(|dir| dir.join("config.toml"))
        .filter(|path| path.is_file())
        .map(|path| (path, Origin::User))
}

fn start_dir(target: &Path) -> PathBuf {
    let dir = if target.is_file() {
        target.parent().unwrap_or(Path::new(""))
    } else {
        target
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf())
}

/// Walks from `start` toward the filesystem root, stopping after the first
/// directory that marks a crate or repository root.
fn search_upward(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let found = CONFIG_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file());
        if let Some(path) = found {
            tracing::debug!("Found project config: {}", path.display());
            return Some(path);
        }
        if ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            tracing::debug!("No config up to crate root {}", dir.display());
            return None;
        }
    }
    None
}

/// `$IDIOM_LINT_CONFIG_DIR`, else `~/.idiom-lint`.
fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(USER_CONFIG_DIR_ENV) {
        Some(dir) => Some(PathBuf::from(dir)),
        None => home::home_dir().map(|h| h.join(".idiom-lint")),
    }
}
