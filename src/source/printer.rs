/// Renders a source tree back to Java text
use crate::source::{NodeId, NodeKind, SourceTree};

const INDENT: &str = "    ";

pub fn print(tree: &SourceTree) -> String {
    let mut printer = Printer::new(tree);
    printer.print_file();
    printer.output
}

struct Printer<'a> {
    tree: &'a SourceTree,
    indent_level: usize,
    output: String,
}

impl<'a> Printer<'a> {
    fn new(tree: &'a SourceTree) -> Self {
        Printer {
            tree,
            indent_level: 0,
            output: String::new(),
        }
    }

    fn print_file(&mut self) {
        let Some(root) = self.tree.root() else {
            return;
        };

        if let Some(file) = self.tree.file() {
            if let Some(package) = &file.package {
                self.output.push_str(&format!("package {};\n\n", package));
            }
            if !file.imports.is_empty() {
                for import in &file.imports {
                    self.output.push_str(&format!("import {};\n", import));
                }
                self.output.push('\n');
            }
        }

        self.print_members(root);
    }

    /// Members of a class (or the file root), with a blank line between
    /// members except after comments and between consecutive fields.
    fn print_members(&mut self, parent: NodeId) {
        let mut previous: Option<&NodeKind> = None;
        for &child in self.tree.children(parent) {
            let kind = self.tree.kind(child);
            let tight = match (previous, kind) {
                (None, _) => true,
                (Some(NodeKind::Comment { .. }), _) => true,
                (Some(NodeKind::Field { .. }), NodeKind::Field { .. }) => true,
                _ => false,
            };
            if !tight {
                self.output.push('\n');
            }
            self.print_member(child);
            previous = Some(kind);
        }
    }

    fn print_member(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::Class(decl) => {
                let mut header = Vec::new();
                for modifier in &decl.modifiers {
                    if modifier.starts_with('@') {
                        self.line(modifier);
                    } else {
                        header.push(modifier.clone());
                    }
                }
                header.push(decl.keyword.clone());
                let mut name = decl.name.clone();
                if let Some(params) = &decl.type_params {
                    name.push_str(params);
                }
                header.push(name);
                if let Some(extends) = &decl.extends {
                    header.push(format!("extends {}", extends));
                }
                if !decl.implements.is_empty() {
                    header.push(format!("implements {}", decl.implements.join(", ")));
                }
                self.line(&format!("{} {{", header.join(" ")));
                self.indent_level += 1;
                self.print_members(id);
                self.indent_level -= 1;
                self.line("}");
            }
            NodeKind::Method(decl) => {
                for annotation in &decl.annotations {
                    self.line(annotation);
                }
                match decl.body {
                    Some(body) => {
                        self.line(&format!("{} {{", decl.signature));
                        self.indent_level += 1;
                        for &child in self.tree.children(body) {
                            self.print_member(child);
                        }
                        self.indent_level -= 1;
                        self.line("}");
                    }
                    None => self.line(&format!("{};", decl.signature)),
                }
            }
            NodeKind::Field { text } | NodeKind::Raw { text } => self.text_block(text),
            NodeKind::Statement(stmt) => self.text_block(&stmt.text),
            NodeKind::Comment { text } => self.comment(text),
            NodeKind::File(_) | NodeKind::Block => {}
        }
    }

    fn indent(&self) -> String {
        INDENT.repeat(self.indent_level)
    }

    fn line(&mut self, text: &str) {
        self.output.push_str(&self.indent());
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Multi-line text keeps the relative indentation of its continuation
    /// lines, re-based on the current level.
    fn text_block(&mut self, text: &str) {
        let mut lines = text.lines();
        let Some(first) = lines.next() else {
            return;
        };
        let rest: Vec<&str> = lines.collect();
        let base = rest
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .min()
            .unwrap_or(0);

        self.line(first.trim());
        for line in rest {
            if line.trim().is_empty() {
                self.output.push('\n');
            } else {
                let indent = self.indent();
                self.output.push_str(&indent);
                self.output.push_str(line[base.min(line.len())..].trim_end());
                self.output.push('\n');
            }
        }
    }

    fn comment(&mut self, text: &str) {
        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if i > 0 && trimmed.starts_with('*') {
                self.line(&format!(" {}", trimmed));
            } else {
                self.line(trimmed);
            }
        }
    }
}
