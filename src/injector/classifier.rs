/// Class role classification by inheritance chain
use std::collections::HashSet;

use crate::injector::classpath::{resolve_supertype, TypeResolver};
use crate::injector::definitions::{ACTIVITY, FRAGMENT, SUPPORT_FRAGMENT};
use crate::source::{NodeId, SourceTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassRole {
    Plain,
    ActivityLike,
    FragmentLike,
}

impl ClassRole {
    pub fn label(self) -> &'static str {
        match self {
            ClassRole::Plain => "plain",
            ClassRole::ActivityLike => "activity",
            ClassRole::FragmentLike => "fragment",
        }
    }
}

/// Activity is checked before the two fragment bases. A base the resolver
/// does not know never matches.
pub fn classify(tree: &SourceTree, class: NodeId, resolver: &dyn TypeResolver) -> ClassRole {
    let Some(supertype) = resolve_supertype(tree, class, resolver) else {
        return ClassRole::Plain;
    };

    if is_inheritor(&supertype, ACTIVITY, resolver) {
        ClassRole::ActivityLike
    } else if is_inheritor(&supertype, FRAGMENT, resolver)
        || is_inheritor(&supertype, SUPPORT_FRAGMENT, resolver)
    {
        ClassRole::FragmentLike
    } else {
        ClassRole::Plain
    }
}

/// Walk superclass links from `supertype` looking for `base`.
fn is_inheritor(supertype: &str, base: &str, resolver: &dyn TypeResolver) -> bool {
    if resolver.find_class(base).is_none() {
        return false;
    }

    let mut visited = HashSet::new();
    let mut current = Some(supertype.to_string());
    while let Some(name) = current {
        if name == base {
            return true;
        }
        if !visited.insert(name.clone()) {
            return false;
        }
        current = resolver
            .find_class(&name)
            .and_then(|info| info.superclass.clone());
    }
    false
}
