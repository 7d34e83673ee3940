/// Element descriptors: the UI widgets selected for binding
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::injector::definitions::{
    widget_path, DEFAULT_WIDGET_PACKAGE, PLATFORM_ID_PREFIX, PROJECT_ID_PREFIX,
};

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub is_android_ns: bool,
    pub name: String,
    /// Fully qualified type of a custom widget
    pub qualified_name: Option<String>,
    pub field_name: String,
    pub used: bool,
}

impl Element {
    /// Element in the project namespace with a field name derived from `id`.
    pub fn new(id: &str, name: &str, field_prefix: &str) -> Self {
        Element {
            id: id.to_string(),
            is_android_ns: false,
            name: name.to_string(),
            qualified_name: None,
            field_name: derive_field_name(id, field_prefix),
            used: true,
        }
    }

    /// `android.R.id.<id>` or `R.id.<id>`
    pub fn full_id(&self) -> String {
        let prefix = if self.is_android_ns {
            PLATFORM_ID_PREFIX
        } else {
            PROJECT_ID_PREFIX
        };
        format!("{}{}", prefix, self.id)
    }

    /// Declared type of the generated field: explicit qualified name, then
    /// the well-known widget table, then the default widget package.
    pub fn type_name(&self) -> String {
        match self.qualified_name.as_deref().filter(|q| !q.is_empty()) {
            Some(qualified) => qualified.to_string(),
            None => match widget_path(&self.name) {
                Some(path) => path.to_string(),
                None => format!("{}{}", DEFAULT_WIDGET_PACKAGE, self.name),
            },
        }
    }
}

/// `user_name` + `m` -> `mUserName`; `user_name` + `` -> `userName`.
/// Only the part after the last `.` of each `_`-separated word is used.
pub fn derive_field_name(id: &str, prefix: &str) -> String {
    let mut name = String::from(prefix);
    for (i, word) in id.split('_').enumerate() {
        let word = word.rsplit('.').next().unwrap_or(word);
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if i > 0 || !prefix.is_empty() {
            name.extend(first.to_uppercase());
        } else {
            name.push(first);
        }
        name.push_str(chars.as_str());
    }
    name
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Element list file as written by hand or exported from a layout tool
#[derive(Debug, Deserialize)]
pub struct ElementList {
    pub layout: Option<String>,
    #[serde(default, rename = "element")]
    pub elements: Vec<ElementEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ElementEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub android_ns: bool,
    pub qualified_name: Option<String>,
    pub field_name: Option<String>,
    #[serde(default = "default_used")]
    pub used: bool,
}

fn default_used() -> bool {
    true
}

impl ElementList {
    pub fn parse(content: &str) -> Result<Self> {
        let list: ElementList = toml::from_str(content)?;
        Ok(list)
    }

    /// Resolve entries into descriptors, checking id and field-name
    /// uniqueness.
    pub fn into_elements(self, field_prefix: &str) -> Result<Vec<Element>> {
        let mut ids = HashSet::new();
        let mut fields = HashSet::new();
        let mut elements = Vec::with_capacity(self.elements.len());

        for entry in self.elements {
            if !ids.insert(entry.id.clone()) {
                anyhow::bail!("duplicate element id '{}'", entry.id);
            }
            let field_name = entry
                .field_name
                .unwrap_or_else(|| derive_field_name(&entry.id, field_prefix));
            if !is_valid_identifier(&field_name) {
                anyhow::bail!(
                    "element '{}' has invalid field name '{}'",
                    entry.id,
                    field_name
                );
            }
            if entry.used && !fields.insert(field_name.clone()) {
                anyhow::bail!("field name '{}' is used by more than one element", field_name);
            }

            elements.push(Element {
                id: entry.id,
                is_android_ns: entry.android_ns,
                name: entry.name,
                qualified_name: entry.qualified_name.filter(|q| !q.is_empty()),
                field_name,
                used: entry.used,
            });
        }

        Ok(elements)
    }
}

/// Load an element list file. Returns the layout name (falling back to the
/// file stem) and the resolved elements.
pub fn load_elements(path: &Path, field_prefix: &str) -> Result<(String, Vec<Element>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read `{}`", path.display()))?;
    let list = ElementList::parse(&content)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;

    let layout = list.layout.clone().unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("layout")
            .to_string()
    });
    let elements = list.into_elements(field_prefix)?;
    Ok((layout, elements))
}
