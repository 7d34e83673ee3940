/// Arena-backed source tree for Java classes
///
/// Nodes live in a single `Vec` and refer to each other by `NodeId`. Every
/// edit (append, insert before/after, replace) rewrites child indices, which
/// keeps rollback a matter of restoring the previous arena.
pub mod parser;
pub mod printer;
pub mod statement;

pub use parser::{parse, ParseError};
pub use printer::print;
pub use statement::{Statement, StatementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    File(FileDecl),
    Class(ClassDecl),
    Field { text: String },
    Method(MethodDecl),
    Block,
    Statement(Statement),
    Comment { text: String },
    /// Member kept verbatim (initializer blocks, enum constant lists)
    Raw { text: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileDecl {
    pub package: Option<String>,
    pub imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub modifiers: Vec<String>,
    pub keyword: String, // class, interface, enum, @interface
    pub name: String,
    pub type_params: Option<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
}

impl ClassDecl {
    pub fn new(name: &str) -> Self {
        ClassDecl {
            modifiers: Vec::new(),
            keyword: "class".to_string(),
            name: name.to_string(),
            type_params: None,
            extends: None,
            implements: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub annotations: Vec<String>,
    /// Everything between the annotations and the body: modifiers, return type,
    /// name, parameters and throws clause.
    pub signature: String,
    pub name: String,
    pub body: Option<NodeId>,
}

/// Unattached structure produced by code generation.
///
/// A fragment has no identity until `SourceTree::attach` moves it into the
/// arena.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Field(String),
    Comment(String),
    Statement(String),
    Method {
        annotations: Vec<String>,
        signature: String,
        body: Vec<Fragment>,
    },
    Class {
        decl: ClassDecl,
        members: Vec<Fragment>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SourceTree {
    pub fn new() -> Self {
        SourceTree {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Create an empty tree holding only a `File` root.
    pub fn with_file(file: FileDecl) -> Self {
        let mut tree = SourceTree::new();
        let root = tree.alloc(NodeKind::File(file));
        tree.root = Some(root);
        tree
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate an unattached node.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    // ---- typed accessors ----

    pub fn file(&self) -> Option<&FileDecl> {
        match self.root.map(|id| self.kind(id)) {
            Some(NodeKind::File(file)) => Some(file),
            _ => None,
        }
    }

    pub fn file_mut(&mut self) -> Option<&mut FileDecl> {
        let root = self.root?;
        match self.kind_mut(root) {
            NodeKind::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassDecl> {
        match self.kind(id) {
            NodeKind::Class(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn method(&self, id: NodeId) -> Option<&MethodDecl> {
        match self.kind(id) {
            NodeKind::Method(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn statement(&self, id: NodeId) -> Option<&Statement> {
        match self.kind(id) {
            NodeKind::Statement(stmt) => Some(stmt),
            _ => None,
        }
    }

    /// Classes declared directly in the file, in source order.
    pub fn top_level_classes(&self) -> Vec<NodeId> {
        match self.root {
            Some(root) => self.child_classes(root),
            None => Vec::new(),
        }
    }

    pub fn child_classes(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| matches!(self.kind(*c), NodeKind::Class(_)))
            .collect()
    }

    /// Every class in the file, outer classes before their nested classes.
    pub fn all_classes(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = self.top_level_classes();
        pending.reverse();
        while let Some(id) = pending.pop() {
            out.push(id);
            let mut nested = self.child_classes(id);
            nested.reverse();
            pending.extend(nested);
        }
        out
    }

    /// Find a class anywhere in the file by simple name.
    pub fn find_class(&self, name: &str) -> Option<NodeId> {
        self.all_classes()
            .into_iter()
            .find(|id| self.class(*id).map_or(false, |c| c.name == name))
    }

    /// Methods declared directly on `class` with the given name.
    pub fn find_methods_by_name(&self, class: NodeId, name: &str) -> Vec<NodeId> {
        self.children(class)
            .iter()
            .copied()
            .filter(|c| self.method(*c).map_or(false, |m| m.name == name))
            .collect()
    }

    pub fn find_inner_class(&self, class: NodeId, name: &str) -> Option<NodeId> {
        self.child_classes(class)
            .into_iter()
            .find(|c| self.class(*c).map_or(false, |decl| decl.name == name))
    }

    /// Statement nodes of a block, skipping comments.
    pub fn statements(&self, block: NodeId) -> Vec<NodeId> {
        self.children(block)
            .iter()
            .copied()
            .filter(|c| matches!(self.kind(*c), NodeKind::Statement(_)))
            .collect()
    }

    /// Every node below `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Qualified name of a class node: package, enclosing classes, name.
    pub fn qualified_name(&self, class: NodeId) -> Option<String> {
        let mut parts = vec![self.class(class)?.name.clone()];
        let mut cursor = self.parent(class);
        while let Some(id) = cursor {
            if let Some(decl) = self.class(id) {
                parts.push(decl.name.clone());
            }
            cursor = self.parent(id);
        }
        if let Some(package) = self.file().and_then(|f| f.package.as_ref()) {
            parts.push(package.clone());
        }
        parts.reverse();
        Some(parts.join("."))
    }

    // ---- mutation ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_at_anchor(anchor, node, 0);
    }

    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.insert_at_anchor(anchor, node, 1);
    }

    /// Put `new` where `old` is. `old` becomes unattached.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.detach(new);
        if let Some(parent) = self.parent(old) {
            let children = &mut self.nodes[parent.index()].children;
            if let Some(pos) = children.iter().position(|c| *c == old) {
                children[pos] = new;
            }
            self.nodes[new.index()].parent = Some(parent);
            self.nodes[old.index()].parent = None;
        }
    }

    fn insert_at_anchor(&mut self, anchor: NodeId, node: NodeId, offset: usize) {
        self.detach(node);
        let Some(parent) = self.parent(anchor) else {
            return;
        };
        let children = &mut self.nodes[parent.index()].children;
        let pos = children
            .iter()
            .position(|c| *c == anchor)
            .map_or(children.len(), |p| p + offset);
        children.insert(pos, node);
        self.nodes[node.index()].parent = Some(parent);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != node);
        }
    }

    /// Move a generated fragment into the arena, returning its unattached root.
    pub fn build(&mut self, fragment: Fragment) -> NodeId {
        match fragment {
            Fragment::Field(text) => self.alloc(NodeKind::Field { text }),
            Fragment::Comment(text) => self.alloc(NodeKind::Comment { text }),
            Fragment::Statement(text) => self.alloc(NodeKind::Statement(Statement::parse(&text))),
            Fragment::Method {
                annotations,
                signature,
                body,
            } => {
                let block = self.alloc(NodeKind::Block);
                for item in body {
                    let child = self.build(item);
                    self.append_child(block, child);
                }
                let name = method_name(&signature);
                let method = self.alloc(NodeKind::Method(MethodDecl {
                    annotations,
                    signature,
                    name,
                    body: Some(block),
                }));
                self.append_child(method, block);
                method
            }
            Fragment::Class { decl, members } => {
                let class = self.alloc(NodeKind::Class(decl));
                for member in members {
                    let child = self.build(member);
                    self.append_child(class, child);
                }
                class
            }
        }
    }

    /// Build `fragment` and append it as the last child of `parent`.
    pub fn attach(&mut self, parent: NodeId, fragment: Fragment) -> NodeId {
        let id = self.build(fragment);
        self.append_child(parent, id);
        id
    }

    /// Run `edit` as one all-or-nothing unit: when it returns an error the
    /// arena is restored to its state before the call.
    pub fn transaction<T, E, F>(&mut self, edit: F) -> Result<T, E>
    where
        F: FnOnce(&mut SourceTree) -> Result<T, E>,
    {
        let snapshot = self.clone();
        match edit(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }
}

/// Identifier directly before the parameter list of a method signature.
pub fn method_name(signature: &str) -> String {
    let head = match signature.find('(') {
        Some(pos) => &signature[..pos],
        None => signature,
    };
    head.trim_end()
        .rsplit(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .next()
        .unwrap_or("")
        .to_string()
}
