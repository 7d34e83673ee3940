pub mod generate;
pub mod inspect;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{self, Config, CONFIG_FILE};
use crate::injector::{Change, ClassPath};
use crate::source::{self, SourceTree};

/// Configuration for a run and the directory its relative paths start from
pub struct LoadedConfig {
    pub config: Config,
    pub base_dir: PathBuf,
}

/// Use `--config` when given, else `viewbind.toml` in the current directory,
/// else the defaults.
pub fn resolve_config(explicit: Option<&str>) -> Result<LoadedConfig> {
    let path = match explicit {
        Some(path) => PathBuf::from(path),
        None => {
            let candidate = PathBuf::from(CONFIG_FILE);
            if !candidate.exists() {
                return Ok(LoadedConfig {
                    config: Config::default(),
                    base_dir: PathBuf::from("."),
                });
            }
            candidate
        }
    };

    let config = config::load_config(&path.to_string_lossy())?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    Ok(LoadedConfig { config, base_dir })
}

/// Read and parse a Java source file
pub fn read_java_file(file_path: &str) -> Result<SourceTree> {
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {}", file_path);
    }
    if path.extension().and_then(|e| e.to_str()) != Some("java") {
        anyhow::bail!("File must have .java extension: {}", file_path);
    }

    let content = fs::read_to_string(path).context(format!("Failed to read {}", file_path))?;
    source::parse(&content).map_err(|e| anyhow::anyhow!("failed to parse `{}`: {}", file_path, e))
}

/// Class path for a run: built-ins, config, project sources, and the classes
/// of the file being edited.
pub fn build_class_path(loaded: &LoadedConfig, tree: &SourceTree, quiet: bool) -> ClassPath {
    let (mut classpath, warnings) = loaded.config.class_path(&loaded.base_dir);
    if !quiet {
        for warning in warnings {
            eprintln!("{} {}", "warning:".yellow().bold(), warning);
        }
    }
    classpath.add_tree(tree);
    classpath
}

/// One status line per change
pub fn describe_change(change: &Change) -> String {
    match change {
        Change::FieldAdded { field } => format!("{} field `{}`", "added".green(), field),
        Change::HolderAdded { class } => format!("{} holder class `{}`", "added".green(), class),
        Change::MethodCreated { method } => format!("{} method `{}`", "created".green(), method),
        Change::StatementInserted { method, statement } => {
            format!("{} `{}` into `{}`", "inserted".green(), statement, method)
        }
        Change::ReturnRewritten { method } => {
            format!("{} return of `{}`", "rewrote".green(), method)
        }
        Change::Skipped { step, reason } => {
            format!("skipped `{}`: {}", step, reason).dimmed().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::SkipReason;
    use tempfile::TempDir;

    #[test]
    fn test_read_java_file_checks_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Main.kt");
        fs::write(&path, "class Main").unwrap();
        let err = read_java_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains(".java"));
    }

    #[test]
    fn test_read_java_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Main.java");
        fs::write(&path, "class Main {").unwrap();
        let err = read_java_file(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse"));
    }

    #[test]
    fn test_explicit_config_sets_base_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("viewbind.toml");
        fs::write(&path, "[binding]\nfield_prefix = \"\"\n").unwrap();

        let loaded = resolve_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.base_dir, dir.path());
        assert_eq!(loaded.config.binding.field_prefix, "");
    }

    #[test]
    fn test_describe_skipped_change() {
        colored::control::set_override(false);
        let line = describe_change(&Change::Skipped {
            step: "onCreate".to_string(),
            reason: SkipReason::NoAnchor,
        });
        assert_eq!(line, "skipped `onCreate`: no anchor statement found");
    }
}
