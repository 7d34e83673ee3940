/// View-binding injection into Java classes
///
/// `Injector::inject` runs the whole edit: pick the binding library, add the
/// holder class or the bound fields, classify the class, merge lifecycle
/// bindings, then hand the file to the post-processor. Every structural edit
/// happens inside one `SourceTree::transaction`, so a failure leaves the tree
/// exactly as it was.
pub mod binding;
pub mod classifier;
pub mod classpath;
pub mod definitions;
pub mod element;
pub mod insert;
pub mod postprocess;
pub mod synth;

pub use binding::{BindingLibrary, BindingStrategy, LibrarySelection};
pub use classifier::{classify, ClassRole};
pub use classpath::{ClassInfo, ClassPath, TypeResolver};
pub use element::Element;
pub use postprocess::{JavaPostProcessor, NoopPostProcessor, PostProcessor};

use std::fmt;
use thiserror::Error;

use crate::source::{NodeId, SourceTree};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InjectError {
    #[error("`{class}.{method}` has no body to insert into")]
    MissingBody { class: String, method: String },

    #[error("node {0:?} is not a class declaration")]
    NotAClass(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    LibraryNotPresent,
    AlreadyBound,
    NoAnchor,
    NoReturnValue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::LibraryNotPresent => "no binding library on the class path",
            SkipReason::AlreadyBound => "binding call already present",
            SkipReason::NoAnchor => "no anchor statement found",
            SkipReason::NoReturnValue => "first return has no value",
        };
        f.write_str(text)
    }
}

/// One thing the injector did, or chose not to do
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    FieldAdded { field: String },
    HolderAdded { class: String },
    MethodCreated { method: String },
    StatementInserted { method: String, statement: String },
    ReturnRewritten { method: String },
    Skipped { step: String, reason: SkipReason },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionReport {
    /// Name of the binding library used, if one was found
    pub library: Option<String>,
    /// Role the class was handled as; not set in holder mode
    pub role: Option<ClassRole>,
    pub changes: Vec<Change>,
}

impl InjectionReport {
    /// True when the tree was left untouched.
    pub fn is_noop(&self) -> bool {
        self.changes
            .iter()
            .all(|c| matches!(c, Change::Skipped { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, SkipReason)> {
        self.changes.iter().filter_map(|c| match c {
            Change::Skipped { step, reason } => Some((step.as_str(), *reason)),
            _ => None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct InjectRequest<'a> {
    pub class: NodeId,
    pub elements: &'a [Element],
    /// Generate a nested holder class instead of fields on the class itself
    pub holder: bool,
    /// Layout name shown in the holder documentation comment
    pub layout: &'a str,
}

pub struct Injector<'a> {
    pub library: &'a LibrarySelection,
    pub resolver: &'a dyn TypeResolver,
    pub post: &'a dyn PostProcessor,
    pub holder_class_name: &'a str,
}

impl<'a> Injector<'a> {
    pub fn inject(
        &self,
        tree: &mut SourceTree,
        request: &InjectRequest<'_>,
    ) -> Result<InjectionReport, InjectError> {
        let Some(library) = self.library.locate(self.resolver) else {
            return Ok(InjectionReport {
                library: None,
                role: None,
                changes: vec![Change::Skipped {
                    step: "inject".to_string(),
                    reason: SkipReason::LibraryNotPresent,
                }],
            });
        };
        if tree.class(request.class).is_none() {
            return Err(InjectError::NotAClass(request.class));
        }

        tree.transaction(|tree| {
            let mut report = InjectionReport {
                library: Some(library.name.clone()),
                ..Default::default()
            };
            let class = request.class;

            if request.holder {
                insert::append_holder(
                    tree,
                    class,
                    self.holder_class_name,
                    request.layout,
                    request.elements,
                    &library,
                    &mut report.changes,
                );
            } else {
                insert::append_fields(tree, class, request.elements, &library, &mut report.changes);
                let role = classify(tree, class, self.resolver);
                match role {
                    ClassRole::ActivityLike => {
                        insert::bind_activity(tree, class, &library, &mut report.changes)?
                    }
                    ClassRole::FragmentLike => {
                        insert::bind_fragment(tree, class, &library, &mut report.changes)?
                    }
                    ClassRole::Plain => {}
                }
                report.role = Some(role);
            }

            self.post.optimize_imports(tree);
            let generated = synth::generated_types(request.elements, &library);
            self.post.shorten_class_references(tree, class, &generated);
            self.post.reformat(tree, class);
            Ok(report)
        })
    }
}
