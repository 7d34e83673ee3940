/// Post-processing hooks run after the structural edit
///
/// Generated code is written with fully qualified names. These passes tidy
/// the file afterwards the way an editor would: imports first, then
/// qualified references, then layout. Only types the generator emitted, or
/// that the file already imports, are shortened; any other
/// `lower.Upper` text may be a field read on a variable.
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::source::{NodeId, NodeKind, SourceTree, Statement};

pub trait PostProcessor {
    fn optimize_imports(&self, tree: &mut SourceTree);
    /// `generated` lists the canonical type names emitted into `class`.
    fn shorten_class_references(&self, tree: &mut SourceTree, class: NodeId, generated: &[String]);
    fn reformat(&self, tree: &mut SourceTree, class: NodeId);
}

/// Leaves the tree as generated.
pub struct NoopPostProcessor;

impl PostProcessor for NoopPostProcessor {
    fn optimize_imports(&self, _tree: &mut SourceTree) {}
    fn shorten_class_references(
        &self,
        _tree: &mut SourceTree,
        _class: NodeId,
        _generated: &[String],
    ) {
    }
    fn reformat(&self, _tree: &mut SourceTree, _class: NodeId) {}
}

pub struct JavaPostProcessor;

fn qualified_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[a-z][a-z0-9_]*(?:\.[a-z][a-z0-9_]*)*\.[A-Z][A-Za-z0-9_]*\b")
            .expect("qualified reference pattern")
    })
}

fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("identifier pattern"))
}

impl PostProcessor for JavaPostProcessor {
    /// Drop duplicate and unused single-type imports, then sort with static
    /// imports last.
    fn optimize_imports(&self, tree: &mut SourceTree) {
        let Some(root) = tree.root() else {
            return;
        };
        let mut used = HashSet::new();
        for id in tree.descendants(root) {
            for text in node_texts(tree, id) {
                for word in identifier().find_iter(&text) {
                    used.insert(word.as_str().to_string());
                }
            }
        }

        let Some(file) = tree.file_mut() else {
            return;
        };
        let mut seen = HashSet::new();
        file.imports.retain(|import| {
            if !seen.insert(import.clone()) {
                return false;
            }
            if import.starts_with("static ") || import.ends_with(".*") {
                return true;
            }
            let simple = import.rsplit('.').next().unwrap_or(import);
            used.contains(simple)
        });
        file.imports
            .sort_by(|a, b| (a.starts_with("static "), a).cmp(&(b.starts_with("static "), b)));
    }

    /// Replace `pkg.Name` with `Name` inside `class` and import `pkg.Name`,
    /// unless `Name` already means something else in this file.
    fn shorten_class_references(&self, tree: &mut SourceTree, class: NodeId, generated: &[String]) {
        let Some(file) = tree.file().cloned() else {
            return;
        };

        let mut known: HashSet<&str> = generated.iter().map(String::as_str).collect();
        known.extend(
            file.imports
                .iter()
                .filter(|i| !i.starts_with("static ") && !i.ends_with(".*"))
                .map(String::as_str),
        );

        let mut taken: HashMap<String, String> = HashMap::new();
        for import in &file.imports {
            if import.starts_with("static ") || import.ends_with(".*") {
                continue;
            }
            if let Some(simple) = import.rsplit('.').next() {
                taken.insert(simple.to_string(), import.clone());
            }
        }
        for id in tree.all_classes() {
            if let (Some(decl), Some(qualified)) = (tree.class(id), tree.qualified_name(id)) {
                taken.entry(decl.name.clone()).or_insert(qualified);
            }
        }

        let mut imports = Vec::new();
        let mut ids = vec![class];
        ids.extend(tree.descendants(class));
        for id in ids {
            let mut shorten = |text: &str| shorten_text(text, &known, &mut taken, &mut imports);
            match tree.kind_mut(id) {
                NodeKind::Class(decl) => {
                    decl.extends = decl.extends.as_deref().map(&mut shorten);
                    decl.implements = decl.implements.iter().map(|t| shorten(t)).collect();
                }
                NodeKind::Method(decl) => {
                    decl.annotations = decl.annotations.iter().map(|a| shorten(a)).collect();
                    decl.signature = shorten(&decl.signature);
                }
                NodeKind::Field { text } | NodeKind::Raw { text } => *text = shorten(text),
                NodeKind::Statement(stmt) => *stmt = Statement::parse(&shorten(&stmt.text)),
                NodeKind::File(_) | NodeKind::Block | NodeKind::Comment { .. } => {}
            }
        }

        let package = file.package.clone().unwrap_or_default();
        let Some(file) = tree.file_mut() else {
            return;
        };
        for qualified in imports {
            let owner = qualified.rsplit_once('.').map_or("", |(p, _)| p);
            let covered = owner == package
                || owner == "java.lang"
                || file.imports.iter().any(|i| *i == qualified || *i == format!("{}.*", owner));
            if covered {
                continue;
            }
            let pos = file
                .imports
                .iter()
                .position(|i| i.starts_with("static ") || *i > qualified)
                .unwrap_or(file.imports.len());
            file.imports.insert(pos, qualified);
        }
    }

    /// Trim trailing whitespace from generated and edited member text.
    fn reformat(&self, tree: &mut SourceTree, class: NodeId) {
        for id in tree.descendants(class) {
            match tree.kind_mut(id) {
                NodeKind::Field { text } | NodeKind::Raw { text } => *text = trim_lines(text),
                NodeKind::Statement(stmt) => {
                    let trimmed = trim_lines(&stmt.text);
                    if trimmed != stmt.text {
                        *stmt = Statement::parse(&trimmed);
                    }
                }
                NodeKind::Method(decl) => decl.signature = decl.signature.trim().to_string(),
                _ => {}
            }
        }
    }
}

/// Text of a node that can mention type names.
fn node_texts(tree: &SourceTree, id: NodeId) -> Vec<String> {
    match tree.kind(id) {
        NodeKind::Class(decl) => {
            let mut texts = decl.modifiers.clone();
            texts.extend(decl.extends.clone());
            texts.extend(decl.implements.iter().cloned());
            texts.extend(decl.type_params.clone());
            texts
        }
        NodeKind::Method(decl) => {
            let mut texts = decl.annotations.clone();
            texts.push(decl.signature.clone());
            texts
        }
        NodeKind::Field { text } | NodeKind::Raw { text } | NodeKind::Comment { text } => {
            vec![text.clone()]
        }
        NodeKind::Statement(stmt) => vec![stmt.text.clone()],
        NodeKind::File(_) | NodeKind::Block => Vec::new(),
    }
}

fn shorten_text(
    text: &str,
    known: &HashSet<&str>,
    taken: &mut HashMap<String, String>,
    imports: &mut Vec<String>,
) -> String {
    map_code(text, |code| {
        let mut out = String::with_capacity(code.len());
        let mut last = 0;
        for found in qualified_reference().find_iter(code) {
            let qualified = found.as_str();
            let preceded_by_dot = code[..found.start()].ends_with('.');
            let first = qualified.split('.').next().unwrap_or("");
            let Some((_, simple)) = qualified.rsplit_once('.') else {
                continue;
            };
            if preceded_by_dot
                || !known.contains(qualified)
                || simple == "R"
                || first == "this"
                || first == "super"
            {
                continue;
            }
            match taken.get(simple) {
                Some(owner) if owner != qualified => continue,
                Some(_) => {}
                None => {
                    taken.insert(simple.to_string(), qualified.to_string());
                }
            }
            if !imports.iter().any(|i| i == qualified) {
                imports.push(qualified.to_string());
            }
            out.push_str(&code[last..found.start()]);
            out.push_str(simple);
            last = found.end();
        }
        out.push_str(&code[last..]);
        out
    })
}

/// Apply `f` to the code parts of `text`, leaving string and char literals
/// and comments untouched.
fn map_code(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut code_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let end = match bytes[i] {
            b'"' | b'\'' => {
                let quote = bytes[i];
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != quote {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                Some((j + 1).min(bytes.len()))
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                Some(text[i..].find('\n').map_or(bytes.len(), |n| i + n))
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                Some(text[i + 2..].find("*/").map_or(bytes.len(), |n| i + 2 + n + 2))
            }
            _ => None,
        };
        match end {
            Some(end) => {
                out.push_str(&f(&text[code_start..i]));
                out.push_str(&text[i..end]);
                i = end;
                code_start = end;
            }
            None => i += 1,
        }
    }
    out.push_str(&f(&text[code_start..]));
    out
}

fn trim_lines(text: &str) -> String {
    text.trim()
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{parse, print};

    fn run(source: &str, generated: &[&str]) -> String {
        let generated: Vec<String> = generated.iter().map(|t| t.to_string()).collect();
        let mut tree = parse(source).unwrap();
        let class = tree.top_level_classes()[0];
        let post = JavaPostProcessor;
        post.optimize_imports(&mut tree);
        post.shorten_class_references(&mut tree, class, &generated);
        post.reformat(&mut tree, class);
        print(&tree)
    }

    #[test]
    fn test_shorten_adds_sorted_imports() {
        let output = run(
            "package com.example;\n\nimport android.os.Bundle;\n\nclass Main {\n    @butterknife.Bind(R.id.title) android.widget.TextView mTitle;\n\n    void f(Bundle b) {\n        butterknife.ButterKnife.bind(this);\n    }\n}\n",
            &["butterknife.Bind", "butterknife.ButterKnife", "android.widget.TextView"],
        );
        assert_eq!(
            output,
            "package com.example;\n\nimport android.os.Bundle;\nimport android.widget.TextView;\nimport butterknife.Bind;\nimport butterknife.ButterKnife;\n\nclass Main {\n    @Bind(R.id.title) TextView mTitle;\n\n    void f(Bundle b) {\n        ButterKnife.bind(this);\n    }\n}\n"
        );
    }

    #[test]
    fn test_platform_ids_keep_r_qualified() {
        let output = run(
            "class Main {\n    @butterknife.Bind(android.R.id.list) android.widget.ListView mList;\n}\n",
            &["butterknife.Bind", "android.widget.ListView"],
        );
        assert!(output.contains("@Bind(android.R.id.list) ListView mList;"));
        assert!(!output.contains("import android.R;"));
    }

    #[test]
    fn test_conflicting_simple_name_stays_qualified() {
        let output = run(
            "import com.example.ui.TextView;\n\nclass Main {\n    TextView mine;\n    android.widget.TextView theirs;\n}\n",
            &["android.widget.TextView"],
        );
        assert!(output.contains("    android.widget.TextView theirs;"));
        assert!(!output.contains("import android.widget.TextView;"));
    }

    #[test]
    fn test_literals_and_comments_untouched() {
        let output = run(
            "class Main {\n    void f() {\n        log(\"android.view.View\");\n        // android.os.Bundle\n    }\n}\n",
            &["android.view.View", "android.os.Bundle"],
        );
        assert!(output.contains("log(\"android.view.View\");"));
        assert!(output.contains("// android.os.Bundle"));
        assert!(!output.contains("import"));
    }

    #[test]
    fn test_unused_and_duplicate_imports_removed() {
        let mut tree = parse(
            "import java.util.List;\nimport android.os.Bundle;\nimport android.os.Bundle;\nimport java.util.*;\n\nclass Main {\n    void f(Bundle b) {\n    }\n}\n",
        )
        .unwrap();
        JavaPostProcessor.optimize_imports(&mut tree);
        assert_eq!(tree.file().unwrap().imports, vec!["android.os.Bundle", "java.util.*"]);
    }

    #[test]
    fn test_nested_type_reference_imports_outer_class() {
        let output = run(
            "class Main {\n    android.widget.AdapterView.OnItemClickListener listener;\n}\n",
            &["android.widget.AdapterView"],
        );
        assert!(output.contains("import android.widget.AdapterView;"));
        assert!(output.contains("    AdapterView.OnItemClickListener listener;"));
    }

    #[test]
    fn test_noop_leaves_tree_unchanged() {
        let source = "class Main {\n    android.view.View v;\n}\n";
        let mut tree = parse(source).unwrap();
        let class = tree.top_level_classes()[0];
        let post = NoopPostProcessor;
        post.optimize_imports(&mut tree);
        post.shorten_class_references(&mut tree, class, &["android.view.View".to_string()]);
        post.reformat(&mut tree, class);
        assert_eq!(print(&tree), source);
    }

    #[test]
    fn test_field_read_on_variable_is_not_a_type() {
        let source = "package com.example;\n\nclass Main {\n    void f(Item item) {\n        int t = item.TYPE;\n        butterknife.ButterKnife.bind(this);\n    }\n}\n";
        let output = run(source, &["butterknife.ButterKnife"]);
        assert!(output.contains("        int t = item.TYPE;"));
        assert!(output.contains("        ButterKnife.bind(this);"));
        assert!(!output.contains("import item.TYPE;"));
    }

    #[test]
    fn test_already_imported_type_is_shortened() {
        let output = run(
            "import android.os.Bundle;\n\nclass Main {\n    void f(android.os.Bundle b) {\n    }\n}\n",
            &[],
        );
        assert!(output.contains("    void f(Bundle b) {"));
    }

    #[test]
    fn test_unlisted_qualified_type_stays() {
        let output = run("class Main {\n    android.widget.TextView title;\n}\n", &[]);
        assert!(output.contains("    android.widget.TextView title;"));
        assert!(!output.contains("import"));
    }
}
