/// View-binding library variants
///
/// A binding strategy supplies the textual shape of the field annotation and
/// of the bind/unbind calls. Short forms are only used to spot calls that are
/// already present.
use serde::Deserialize;

use crate::injector::classpath::TypeResolver;

pub trait BindingStrategy {
    /// Qualified annotation placed on generated fields
    fn field_annotation_canonical_name(&self) -> &str;
    fn canonical_bind_statement(&self) -> &str;
    fn simple_bind_statement(&self) -> &str;
    fn canonical_unbind_statement(&self) -> &str;
    fn simple_unbind_statement(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BindingLibrary {
    pub name: String,
    pub annotation: String,
    pub bind: String,
    pub bind_simple: String,
    pub unbind: String,
    pub unbind_simple: String,
}

impl BindingLibrary {
    fn butterknife(name: &str, annotation: &str, bind: &str, unbind: &str) -> Self {
        BindingLibrary {
            name: name.to_string(),
            annotation: format!("butterknife.{}", annotation),
            bind: format!("butterknife.ButterKnife.{}", bind),
            bind_simple: format!("ButterKnife.{}", bind),
            unbind: format!("butterknife.ButterKnife.{}", unbind),
            unbind_simple: format!("ButterKnife.{}", unbind),
        }
    }

    /// Built-in variants, newest first.
    pub fn builtin() -> Vec<BindingLibrary> {
        vec![
            BindingLibrary::butterknife("butterknife-7", "Bind", "bind", "unbind"),
            BindingLibrary::butterknife("butterknife-6", "InjectView", "inject", "reset"),
        ]
    }

    pub fn find_builtin(name: &str) -> Option<BindingLibrary> {
        BindingLibrary::builtin().into_iter().find(|lib| lib.name == name)
    }
}

impl BindingStrategy for BindingLibrary {
    fn field_annotation_canonical_name(&self) -> &str {
        &self.annotation
    }

    fn canonical_bind_statement(&self) -> &str {
        &self.bind
    }

    fn simple_bind_statement(&self) -> &str {
        &self.bind_simple
    }

    fn canonical_unbind_statement(&self) -> &str {
        &self.unbind
    }

    fn simple_unbind_statement(&self) -> &str {
        &self.unbind_simple
    }
}

/// Which library a project uses
#[derive(Debug, Clone, PartialEq)]
pub enum LibrarySelection {
    /// First built-in variant whose annotation class is on the class path
    Auto,
    Named(String),
    Custom(BindingLibrary),
}

impl LibrarySelection {
    /// Resolve the strategy for a project. `None` means no binding library is
    /// available and nothing should be generated.
    pub fn locate(&self, resolver: &dyn TypeResolver) -> Option<BindingLibrary> {
        match self {
            LibrarySelection::Auto => BindingLibrary::builtin()
                .into_iter()
                .find(|lib| resolver.find_class(&lib.annotation).is_some()),
            LibrarySelection::Named(name) => BindingLibrary::find_builtin(name),
            LibrarySelection::Custom(library) => Some(library.clone()),
        }
    }
}
