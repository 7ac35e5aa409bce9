//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

const CONFIG_NAME: &str = "idiom-lint.toml";

const DEFAULT_CONFIG: &str = r#"# idiom-lint configuration

# recommended | strict | minimal
preset = "recommended"

# Exit non-zero when findings at or above this severity exist
fail_on = "error"

[analyzer]
# Glob patterns to exclude from analysis
exclude = [
    "**/target/**",
    "**/vendor/**",
]

# Respect .gitignore files
respect_gitignore = true

# Worker threads for directory scans (default: one per core)
# parallelism = 4

[score]
error = 15
warning = 5
info = 2
positive_bonus = 2
max_bonus = 20

# Pattern configurations, keyed by name or code.
# Each pattern can be disabled or have its severity overridden.

[rules.unwrap]
enabled = true
# severity = "error"

# [rules.IL102]
# enabled = false
"#;

/// Runs the init command in the current directory.
pub fn run(force: bool) -> Result<()> {
    let path = write_config(Path::new("."), force)?;

    println!("Created {}", path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to configure patterns");
    println!("  2. Run: idiom-lint check");

    Ok(())
}

fn write_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}
