/// Class path: the set of classes the project can see, with superclass links
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::injector::definitions::ANDROID_CLASSES;
use crate::source::{self, FileDecl, NodeId, ParseError, SourceTree};

#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    pub name: String,
    pub superclass: Option<String>,
}

/// Name-resolution capability. Lookups that fail return `None`; callers treat
/// an unknown class as "does not match" rather than as an error.
pub trait TypeResolver {
    fn find_class(&self, qualified_name: &str) -> Option<&ClassInfo>;
}

#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    classes: HashMap<String, ClassInfo>,
}

/// Outcome of scanning a source directory
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub files: usize,
    pub classes: usize,
    pub failures: Vec<(PathBuf, ParseError)>,
}

impl ClassPath {
    pub fn new() -> Self {
        ClassPath {
            classes: HashMap::new(),
        }
    }

    /// Class path preloaded with the Android framework hierarchy.
    pub fn android() -> Self {
        let mut classpath = ClassPath::new();
        for (name, parent) in ANDROID_CLASSES {
            classpath.insert(name, *parent);
        }
        classpath
    }

    pub fn insert(&mut self, name: &str, superclass: Option<&str>) {
        self.classes.insert(
            name.to_string(),
            ClassInfo {
                name: name.to_string(),
                superclass: superclass.map(|s| s.to_string()),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Register every class declared in `tree`.
    pub fn add_tree(&mut self, tree: &SourceTree) -> usize {
        self.register_names(tree);
        self.resolve_superclasses(tree)
    }

    /// Parse every `.java` file under `dir` and register its classes.
    /// Files that fail to parse are reported, not fatal.
    pub fn scan_sources(&mut self, dir: &Path) -> ScanSummary {
        let mut summary = ScanSummary::default();
        let mut trees = Vec::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }
            let Ok(content) = fs::read_to_string(path) else {
                continue;
            };
            summary.files += 1;
            match source::parse(&content) {
                Ok(tree) => trees.push(tree),
                Err(err) => summary.failures.push((path.to_path_buf(), err)),
            }
        }

        // names first so superclasses declared in later files resolve
        for tree in &trees {
            self.register_names(tree);
        }
        for tree in &trees {
            summary.classes += self.resolve_superclasses(tree);
        }
        summary
    }

    fn register_names(&mut self, tree: &SourceTree) {
        for class in tree.all_classes() {
            if let Some(name) = tree.qualified_name(class) {
                self.classes.entry(name.clone()).or_insert(ClassInfo {
                    name,
                    superclass: None,
                });
            }
        }
    }

    fn resolve_superclasses(&mut self, tree: &SourceTree) -> usize {
        let mut count = 0;
        for class in tree.all_classes() {
            let Some(name) = tree.qualified_name(class) else {
                continue;
            };
            let superclass = resolve_supertype(tree, class, &*self);
            self.insert(&name, superclass.as_deref());
            count += 1;
        }
        count
    }
}

impl TypeResolver for ClassPath {
    fn find_class(&self, qualified_name: &str) -> Option<&ClassInfo> {
        self.classes.get(qualified_name)
    }
}

/// Qualified name of the class `class` extends, if it can be resolved.
pub fn resolve_supertype(
    tree: &SourceTree,
    class: NodeId,
    resolver: &dyn TypeResolver,
) -> Option<String> {
    let extends = tree.class(class)?.extends.as_deref()?;

    // enclosing classes, innermost first, are searched before imports
    let mut scopes = Vec::new();
    let mut cursor = tree.parent(class);
    while let Some(id) = cursor {
        if let Some(name) = tree.qualified_name(id) {
            scopes.push(name);
        }
        cursor = tree.parent(id);
    }

    let empty = FileDecl::default();
    let file = tree.file().unwrap_or(&empty);
    resolve_type_name(extends, file, &scopes, resolver)
}

/// Resolve a type reference as written in source to a qualified name.
pub fn resolve_type_name(
    reference: &str,
    file: &FileDecl,
    scopes: &[String],
    resolver: &dyn TypeResolver,
) -> Option<String> {
    let name = reference.split('<').next().unwrap_or(reference).trim();
    if name.is_empty() {
        return None;
    }
    let known = |candidate: &str| resolver.find_class(candidate).is_some();

    let (head, tail) = match name.split_once('.') {
        Some((head, tail)) => (head, Some(tail)),
        None => (name, None),
    };
    if tail.is_some() && known(name) {
        return Some(name.to_string());
    }

    let with_tail = |base: String| match tail {
        Some(tail) => format!("{}.{}", base, tail),
        None => base,
    };

    for scope in scopes {
        let candidate = with_tail(format!("{}.{}", scope, head));
        if known(&candidate) {
            return Some(candidate);
        }
    }

    let single = file
        .imports
        .iter()
        .find(|import| import.rsplit('.').next() == Some(head) && !import.starts_with("static "));
    if let Some(import) = single {
        return Some(with_tail(import.clone()));
    }

    if let Some(package) = &file.package {
        let candidate = with_tail(format!("{}.{}", package, head));
        if known(&candidate) {
            return Some(candidate);
        }
    }

    for import in &file.imports {
        if let Some(package) = import.strip_suffix(".*") {
            let candidate = with_tail(format!("{}.{}", package, head));
            if known(&candidate) {
                return Some(candidate);
            }
        }
    }

    let candidate = with_tail(format!("java.lang.{}", head));
    if known(&candidate) {
        return Some(candidate);
    }

    // a dotted name nobody knows is taken as already qualified
    tail.map(|_| name.to_string())
}
