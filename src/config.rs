use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::injector::binding::{BindingLibrary, LibrarySelection};
use crate::injector::classpath::ClassPath;
use crate::injector::definitions::DEFAULT_HOLDER_CLASS_NAME;
use crate::injector::element::is_valid_identifier;

pub const CONFIG_FILE: &str = "viewbind.toml";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub binding: BindingConfig,
    /// Extra classes: qualified name -> superclass (`""` for none)
    #[serde(default)]
    pub classpath: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProjectConfig {
    pub name: Option<String>,
    /// Directories scanned for project classes, relative to the config file
    #[serde(default)]
    pub source_dirs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    #[serde(default = "default_library")]
    pub library: String,
    #[serde(default = "default_holder_class_name")]
    pub holder_class_name: String,
    #[serde(default = "default_field_prefix")]
    pub field_prefix: String,
    pub custom: Option<BindingLibrary>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            holder_class_name: default_holder_class_name(),
            field_prefix: default_field_prefix(),
            custom: None,
        }
    }
}

fn default_library() -> String {
    "auto".to_string()
}

fn default_holder_class_name() -> String {
    DEFAULT_HOLDER_CLASS_NAME.to_string()
}

fn default_field_prefix() -> String {
    "m".to_string()
}

impl Config {
    /// Library choice: a custom table wins over the `library` key.
    pub fn library_selection(&self) -> LibrarySelection {
        if let Some(custom) = &self.binding.custom {
            return LibrarySelection::Custom(custom.clone());
        }
        match self.binding.library.as_str() {
            "auto" => LibrarySelection::Auto,
            name => LibrarySelection::Named(name.to_string()),
        }
    }

    /// Class path with the built-in Android classes, the `[classpath]`
    /// table, and every class found under `source_dirs` (resolved against
    /// `base_dir`).
    pub fn class_path(&self, base_dir: &Path) -> (ClassPath, Vec<String>) {
        let mut classpath = ClassPath::android();
        for (name, superclass) in &self.classpath {
            let superclass = Some(superclass.as_str()).filter(|s| !s.is_empty());
            classpath.insert(name, superclass);
        }

        let mut warnings = Vec::new();
        for dir in &self.project.source_dirs {
            let path = base_dir.join(dir);
            if !path.is_dir() {
                warnings.push(format!("source directory `{}` does not exist", path.display()));
                continue;
            }
            let summary = classpath.scan_sources(&path);
            for (file, err) in summary.failures {
                warnings.push(format!("skipped `{}`: {}", file.display(), err));
            }
        }
        (classpath, warnings)
    }
}

/// Load and parse a viewbind.toml configuration file
pub fn load_config(path: &str) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("could not find `{}`", path)
        } else {
            anyhow::anyhow!("failed to read `{}`: {}", path, e)
        }
    })?;

    let config = parse_config(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse `{}`: {}", path, e))?;
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    validate_binding(&config.binding)?;
    Ok(config)
}

/// Validate the `[binding]` section
fn validate_binding(binding: &BindingConfig) -> Result<()> {
    if binding.custom.is_none()
        && binding.library != "auto"
        && BindingLibrary::find_builtin(&binding.library).is_none()
    {
        let known: Vec<String> = BindingLibrary::builtin().into_iter().map(|l| l.name).collect();
        anyhow::bail!(
            "Unknown binding library '{}'. Expected 'auto' or one of: {}",
            binding.library,
            known.join(", ")
        );
    }

    if !is_valid_identifier(&binding.holder_class_name) {
        anyhow::bail!(
            "Invalid holder class name '{}'. Must be a Java identifier",
            binding.holder_class_name
        );
    }

    if !binding.field_prefix.is_empty() && !is_valid_identifier(&binding.field_prefix) {
        anyhow::bail!(
            "Invalid field prefix '{}'. Must be empty or a Java identifier",
            binding.field_prefix
        );
    }

    if let Some(custom) = &binding.custom {
        for (key, value) in [
            ("annotation", &custom.annotation),
            ("bind", &custom.bind),
            ("bind_simple", &custom.bind_simple),
            ("unbind", &custom.unbind),
            ("unbind_simple", &custom.unbind_simple),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("Custom binding library '{}' has an empty `{}`", custom.name, key);
            }
        }
    }

    Ok(())
}
