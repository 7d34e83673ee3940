/// Parser for the Java subset the injector works on
///
/// Understands package and import declarations, (nested) class, interface and
/// enum declarations, fields, methods, constructors and comments. Method
/// bodies are split into top-level statements; everything below statement
/// level is kept as text.
use thiserror::Error;

use crate::source::{ClassDecl, FileDecl, MethodDecl, NodeId, NodeKind, SourceTree, Statement};

#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub line: usize,
    pub message: String,
}

const TYPE_KEYWORDS: &[&str] = &["class", "interface", "enum", "@interface"];
const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "for", "while", "do", "switch", "try", "synchronized", "class", "interface", "enum",
];
const CONTINUATION_KEYWORDS: &[&str] = &["else", "catch", "finally"];

/// Parse a Java compilation unit into a fresh tree.
pub fn parse(source: &str) -> Result<SourceTree, ParseError> {
    Parser::new(source).parse()
}

pub struct Parser {
    source: String,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Parser {
            source: source.to_string(),
            pos: 0,
        }
    }

    pub fn parse(&mut self) -> Result<SourceTree, ParseError> {
        let mut file = FileDecl::default();
        let mut tree = SourceTree::with_file(FileDecl::default());
        let root = tree.root().ok_or_else(|| self.error("empty tree"))?;

        loop {
            self.skip_whitespace();
            if self.at_end() {
                break;
            }

            if let Some(comment) = self.read_comment() {
                let id = tree.alloc(NodeKind::Comment { text: comment });
                tree.append_child(root, id);
            } else if self.starts_with_word("package") {
                self.expect("package")?;
                let name = self.read_until(';')?;
                file.package = Some(collapse_whitespace(&name));
            } else if self.starts_with_word("import") {
                self.expect("import")?;
                let path = self.read_until(';')?;
                file.imports.push(collapse_whitespace(&path));
            } else if self.peek_char() == Some(';') {
                self.advance();
            } else {
                self.parse_member(&mut tree, root)?;
            }
        }

        if let Some(decl) = tree.file_mut() {
            *decl = file;
        }
        Ok(tree)
    }

    /// Parse one member declaration and append it to `parent`.
    fn parse_member(&mut self, tree: &mut SourceTree, parent: NodeId) -> Result<(), ParseError> {
        let start = self.pos;
        let stop = self.scan_to_any(&['{', ';'])?;
        let raw_header = self.source[start..self.pos].trim().to_string();
        let (header, comments) = split_header_comments(&raw_header);

        if stop == ';' {
            self.advance();
            let id = if is_method_header(&header) {
                append_comments(tree, parent, comments);
                let (annotations, signature) = split_annotations(&header);
                tree.alloc(NodeKind::Method(MethodDecl {
                    annotations,
                    name: crate::source::method_name(&signature),
                    signature,
                    body: None,
                }))
            } else {
                tree.alloc(NodeKind::Field {
                    text: format!("{};", raw_header),
                })
            };
            tree.append_child(parent, id);
            return Ok(());
        }

        if let Some(keyword) = type_keyword(&header) {
            let decl = parse_class_header(&header, keyword).ok_or_else(|| {
                ParseError {
                    offset: start,
                    line: self.line_at(start),
                    message: format!("malformed type declaration '{}'", header),
                }
            })?;
            let is_enum = decl.keyword == "enum";
            self.expect("{")?;
            append_comments(tree, parent, comments);
            let class = tree.alloc(NodeKind::Class(decl));
            tree.append_child(parent, class);
            if is_enum {
                let body = self.read_balanced_braces()?;
                if !body.trim().is_empty() {
                    let raw = tree.alloc(NodeKind::Raw {
                        text: body.trim().to_string(),
                    });
                    tree.append_child(class, raw);
                }
            } else {
                self.parse_class_body(tree, class)?;
            }
        } else if has_top_level_char(&header, '=') {
            // field initializer containing braces (array literal, anonymous class)
            self.scan_to_any(&[';'])?;
            self.advance();
            let text = self.source[start..self.pos].trim().to_string();
            let id = tree.alloc(NodeKind::Field { text });
            tree.append_child(parent, id);
        } else if is_method_header(&header) {
            let (annotations, signature) = split_annotations(&header);
            self.expect("{")?;
            append_comments(tree, parent, comments);
            let block = tree.alloc(NodeKind::Block);
            self.parse_block(tree, block)?;
            let method = tree.alloc(NodeKind::Method(MethodDecl {
                annotations,
                name: crate::source::method_name(&signature),
                signature,
                body: Some(block),
            }));
            tree.append_child(method, block);
            tree.append_child(parent, method);
        } else {
            // initializer block
            self.expect("{")?;
            let body = self.read_balanced_braces()?;
            let text = format!("{} {{{}}}", raw_header, body).trim().to_string();
            let id = tree.alloc(NodeKind::Raw { text });
            tree.append_child(parent, id);
        }

        Ok(())
    }

    fn parse_class_body(&mut self, tree: &mut SourceTree, class: NodeId) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error("unexpected end of input inside class body"));
            }
            if self.peek_char() == Some('}') {
                self.advance();
                return Ok(());
            }
            if let Some(comment) = self.read_comment() {
                let id = tree.alloc(NodeKind::Comment { text: comment });
                tree.append_child(class, id);
            } else if self.peek_char() == Some(';') {
                self.advance();
            } else {
                self.parse_member(tree, class)?;
            }
        }
    }

    fn parse_block(&mut self, tree: &mut SourceTree, block: NodeId) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Err(self.error("unexpected end of input inside method body"));
            }
            if self.peek_char() == Some('}') {
                self.advance();
                return Ok(());
            }
            if let Some(comment) = self.read_comment() {
                let id = tree.alloc(NodeKind::Comment { text: comment });
                tree.append_child(block, id);
                continue;
            }

            let text = self.read_statement()?;
            let id = tree.alloc(NodeKind::Statement(Statement::parse(&text)));
            tree.append_child(block, id);
        }
    }

    fn read_statement(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.skip_labels();

        if self.peek_char() == Some('{') {
            self.advance();
            self.read_balanced_braces()?;
        } else {
            let word = self.peek_word();
            if COMPOUND_KEYWORDS.contains(&word.as_str()) {
                self.read_compound_statement(word == "do")?;
            } else {
                self.scan_to_any(&[';'])?;
                self.advance();
            }
        }

        Ok(self.source[start..self.pos].trim().to_string())
    }

    /// Move past `label:` prefixes so a labeled statement is split by its
    /// own leading keyword.
    fn skip_labels(&mut self) {
        loop {
            let word = self.peek_word();
            if word.is_empty() || word.starts_with(|c: char| c.is_ascii_digit()) {
                return;
            }
            let saved = self.pos;
            self.pos += word.len();
            self.skip_whitespace();
            if self.peek_char() != Some(':') || self.starts_with("::") {
                self.pos = saved;
                return;
            }
            self.advance();
            loop {
                self.skip_whitespace();
                if self.read_comment().is_none() {
                    break;
                }
            }
        }
    }

    /// `if/else`, `try/catch/finally`, loops and local type declarations.
    fn read_compound_statement(&mut self, mut do_loop: bool) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error("unexpected end of input inside statement"));
            };
            if self.skip_literal_or_comment()? {
                continue;
            }
            self.advance();

            let ends = match c {
                '(' | '[' | '{' => {
                    depth += 1;
                    false
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    false
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    depth == 0
                }
                ';' => depth == 0,
                _ => false,
            };
            if !ends {
                continue;
            }

            let next = self.peek_word_after_trivia();
            if CONTINUATION_KEYWORDS.contains(&next.as_str()) {
                continue;
            }
            if do_loop && next == "while" {
                do_loop = false;
                continue;
            }
            return Ok(());
        }
    }

    /// Advance to the first of `stops` at bracket depth zero, leaving the
    /// cursor on it.
    fn scan_to_any(&mut self, stops: &[char]) -> Result<char, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            let Some(c) = self.peek_char() else {
                return Err(ParseError {
                    offset: start,
                    line: self.line_at(start),
                    message: format!("expected one of {:?}", stops),
                });
            };
            if self.skip_literal_or_comment()? {
                continue;
            }
            if depth == 0 && stops.contains(&c) {
                return Ok(c);
            }
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => {
                    if depth == 0 {
                        return Err(self.error(&format!("unexpected '{}'", c)));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip a string/char literal or comment at the cursor. Returns whether
    /// anything was consumed.
    fn skip_literal_or_comment(&mut self) -> Result<bool, ParseError> {
        match self.peek_char() {
            Some(quote @ ('"' | '\'')) => {
                let start = self.pos;
                self.advance();
                loop {
                    match self.peek_char() {
                        None => {
                            return Err(ParseError {
                                offset: start,
                                line: self.line_at(start),
                                message: "unterminated literal".to_string(),
                            })
                        }
                        Some('\\') => {
                            self.advance();
                            self.advance();
                        }
                        Some(c) => {
                            self.advance();
                            if c == quote {
                                return Ok(true);
                            }
                        }
                    }
                }
            }
            Some('/') if self.starts_with("//") || self.starts_with("/*") => {
                self.read_comment();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn read_comment(&mut self) -> Option<String> {
        let start = self.pos;
        if self.starts_with("//") {
            while self.pos < self.source.len() && self.peek_char() != Some('\n') {
                self.advance();
            }
        } else if self.starts_with("/*") {
            match self.source[self.pos + 2..].find("*/") {
                Some(end) => self.pos += 2 + end + 2,
                None => self.pos = self.source.len(),
            }
        } else {
            return None;
        }
        Some(self.source[start..self.pos].trim_end().to_string())
    }

    /// Content up to the brace matching one already consumed; the closing
    /// brace is consumed too.
    fn read_balanced_braces(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        self.scan_to_any(&['}'])?;
        let body = self.source[start..self.pos].to_string();
        self.advance();
        Ok(body)
    }

    // Helper methods

    fn read_until(&mut self, c: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.scan_to_any(&[c])?;
        let text = self.source[start..self.pos].to_string();
        self.advance();
        Ok(text)
    }

    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_word(&self) -> String {
        self.source[self.pos..]
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
            .collect()
    }

    fn peek_word_after_trivia(&mut self) -> String {
        let saved = self.pos;
        loop {
            self.skip_whitespace();
            if self.read_comment().is_none() {
                break;
            }
        }
        let word = self.peek_word();
        self.pos = saved;
        word
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.source[self.pos..].starts_with(s)
    }

    fn starts_with_word(&self, word: &str) -> bool {
        self.starts_with(word)
            && self.source[self.pos + word.len()..]
                .chars()
                .next()
                .map_or(false, |c| c.is_whitespace())
    }

    fn expect(&mut self, s: &str) -> Result<(), ParseError> {
        if self.starts_with(s) {
            self.pos += s.len();
            Ok(())
        } else {
            let found: String = self.source[self.pos..].chars().take(20).collect();
            Err(self.error(&format!("expected '{}', found '{}'", s, found)))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.source[..offset.min(self.source.len())].matches('\n').count() + 1
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            offset: self.pos,
            line: self.line_at(self.pos),
            message: message.to_string(),
        }
    }
}

/// Header text with its comments cut out, plus those comments in order.
fn split_header_comments(header: &str) -> (String, Vec<String>) {
    let mut code = String::with_capacity(header.len());
    let mut comments = Vec::new();
    let mut rest = header;

    while let Some(start) = find_comment_start(rest) {
        code.push_str(&rest[..start]);
        code.push(' ');
        let comment = &rest[start..];
        let end = if comment.starts_with("//") {
            comment.find('\n').unwrap_or(comment.len())
        } else {
            comment[2..].find("*/").map_or(comment.len(), |n| n + 4)
        };
        comments.push(comment[..end].trim_end().to_string());
        rest = &comment[end..];
    }
    code.push_str(rest);

    (code.trim().to_string(), comments)
}

fn find_comment_start(text: &str) -> Option<usize> {
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                while let Some((_, inner)) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == c {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/' | '*'))) => return Some(i),
            _ => {}
        }
    }
    None
}

fn append_comments(tree: &mut SourceTree, parent: NodeId, comments: Vec<String>) {
    for text in comments {
        let id = tree.alloc(NodeKind::Comment { text });
        tree.append_child(parent, id);
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_top_level_char(text: &str, target: char) -> bool {
    crate::source::statement::code_chars(text)
        .iter()
        .any(|(_, c, depth)| *c == target && *depth == 0)
}

/// A header with a parameter list and no initializer declares a method or
/// constructor.
fn is_method_header(header: &str) -> bool {
    let (_, signature) = split_annotations(header);
    has_top_level_char(&signature, '(') && !has_top_level_char(&signature, '=')
}

fn type_keyword(header: &str) -> Option<&'static str> {
    let (_, rest) = split_annotations(header);
    if rest.contains('(') && has_top_level_char(&rest, '=') {
        return None;
    }
    rest.split_whitespace()
        .find_map(|word| TYPE_KEYWORDS.iter().copied().find(|k| *k == word))
}

/// Leading annotations (`@Override`, `@SuppressLint("x")`) and the rest.
fn split_annotations(header: &str) -> (Vec<String>, String) {
    let mut annotations = Vec::new();
    let mut rest = header.trim();

    while rest.starts_with('@') && !rest.starts_with("@interface") {
        let name_len = rest[1..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.' || c == '$'))
            .map_or(rest.len(), |p| p + 1);
        let mut end = name_len;
        let after = rest[end..].trim_start();
        if after.starts_with('(') {
            let offset = rest.len() - after.len();
            let close = crate::source::statement::code_chars(after)
                .iter()
                .find(|(_, c, depth)| *c == ')' && *depth == 0)
                .map(|(i, _, _)| *i);
            match close {
                Some(i) => end = offset + i + 1,
                None => break,
            }
        }
        annotations.push(collapse_whitespace(&rest[..end]));
        rest = rest[end..].trim_start();
    }

    (annotations, collapse_whitespace(rest))
}

fn parse_class_header(header: &str, keyword: &str) -> Option<ClassDecl> {
    let (annotations, rest) = split_annotations(header);
    let words: Vec<&str> = rest.split_whitespace().collect();
    let keyword_pos = words.iter().position(|w| *w == keyword)?;

    let mut modifiers = annotations;
    modifiers.extend(words[..keyword_pos].iter().map(|w| w.to_string()));

    let tail = words[keyword_pos + 1..].join(" ");
    let name_len = tail
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(tail.len());
    if name_len == 0 {
        return None;
    }
    let name = tail[..name_len].to_string();
    let mut after = tail[name_len..].trim_start();

    let mut type_params = None;
    if after.starts_with('<') {
        let mut depth = 0;
        let mut end = 0;
        for (i, c) in after.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        end = i + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if end == 0 {
            return None;
        }
        type_params = Some(after[..end].to_string());
        after = after[end..].trim_start();
    }

    let (extends_part, implements_part) = match find_word(after, "implements") {
        Some(pos) => (&after[..pos], Some(&after[pos + "implements".len()..])),
        None => (after, None),
    };
    let extends = extends_part
        .trim()
        .strip_prefix("extends")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let implements = implements_part
        .map(|list| split_type_list(list))
        .unwrap_or_default();

    Some(ClassDecl {
        modifiers,
        keyword: keyword.to_string(),
        name,
        type_params,
        extends,
        implements,
    })
}

fn find_word(text: &str, word: &str) -> Option<usize> {
    let mut search = 0;
    while let Some(found) = text[search..].find(word) {
        let pos = search + found;
        let before = text[..pos].chars().last();
        let after = text[pos + word.len()..].chars().next();
        let boundary = |c: Option<char>| c.map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        if boundary(before) && boundary(after) {
            return Some(pos);
        }
        search = pos + word.len();
    }
    None
}

/// Split `A, B<C, D>, E` on commas outside type arguments.
fn split_type_list(list: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0;
    let mut current = String::new();
    for c in list.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                out.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        out.push(current.trim().to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StatementKind;

    const ACTIVITY: &str = r#"package com.example.app;

import android.os.Bundle;
import android.support.v7.app.AppCompatActivity;

/**
 * Main screen.
 */
public class MainActivity extends AppCompatActivity implements View.OnClickListener, Runnable {

    private static final String TAG = "Main;{";
    private int[] values = {1, 2, 3};

    @Override
    protected void onCreate(Bundle savedInstanceState) {
        super.onCreate(savedInstanceState);
        // set up the screen
        setContentView(R.layout.activity_main);
        if (savedInstanceState != null) {
            restore();
        } else {
            init();
        }
        for (int i = 0; i < 3; i++) tick(i);
    }

    public abstract void run();

    static class Helper<T> extends Base<T> {
        Helper() { }
    }
}
"#;

    fn method_statements(tree: &SourceTree, class: NodeId, name: &str) -> Vec<Statement> {
        let method = tree.find_methods_by_name(class, name)[0];
        let body = tree.method(method).unwrap().body.unwrap();
        tree.statements(body)
            .iter()
            .map(|id| tree.statement(*id).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_parse_package_and_imports() {
        let tree = parse(ACTIVITY).unwrap();
        let file = tree.file().unwrap();
        assert_eq!(file.package.as_deref(), Some("com.example.app"));
        assert_eq!(
            file.imports,
            vec!["android.os.Bundle", "android.support.v7.app.AppCompatActivity"]
        );
    }

    #[test]
    fn test_parse_class_header() {
        let tree = parse(ACTIVITY).unwrap();
        let class = tree.find_class("MainActivity").unwrap();
        let decl = tree.class(class).unwrap();
        assert_eq!(decl.modifiers, vec!["public"]);
        assert_eq!(decl.extends.as_deref(), Some("AppCompatActivity"));
        assert_eq!(decl.implements, vec!["View.OnClickListener", "Runnable"]);

        let helper = tree.find_inner_class(class, "Helper").unwrap();
        let helper = tree.class(helper).unwrap();
        assert_eq!(helper.type_params.as_deref(), Some("<T>"));
        assert_eq!(helper.extends.as_deref(), Some("Base<T>"));
        assert_eq!(helper.modifiers, vec!["static"]);
    }

    #[test]
    fn test_parse_fields_with_tricky_initializers() {
        let tree = parse(ACTIVITY).unwrap();
        let class = tree.find_class("MainActivity").unwrap();
        let fields: Vec<String> = tree
            .children(class)
            .iter()
            .filter_map(|id| match tree.kind(*id) {
                NodeKind::Field { text } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "private static final String TAG = \"Main;{\";",
                "private int[] values = {1, 2, 3};",
            ]
        );
    }

    #[test]
    fn test_parse_method_statements() {
        let tree = parse(ACTIVITY).unwrap();
        let class = tree.find_class("MainActivity").unwrap();
        let method = tree.find_methods_by_name(class, "onCreate")[0];
        let decl = tree.method(method).unwrap();
        assert_eq!(decl.annotations, vec!["@Override"]);
        assert_eq!(decl.signature, "protected void onCreate(Bundle savedInstanceState)");

        let stmts = method_statements(&tree, class, "onCreate");
        assert_eq!(stmts.len(), 4);
        assert_eq!(stmts[0].call(), Some("super.onCreate"));
        assert_eq!(stmts[1].call(), Some("setContentView"));
        assert_eq!(stmts[2].kind, StatementKind::Other);
        assert!(stmts[2].text.ends_with("init();\n        }"));
        assert_eq!(stmts[3].text, "for (int i = 0; i < 3; i++) tick(i);");

        // the comment stays in the block but is not a statement
        let body = decl.body.unwrap();
        assert_eq!(tree.children(body).len(), 5);
    }

    #[test]
    fn test_parse_bodiless_method() {
        let tree = parse(ACTIVITY).unwrap();
        let class = tree.find_class("MainActivity").unwrap();
        let run = tree.find_methods_by_name(class, "run")[0];
        assert_eq!(tree.method(run).unwrap().body, None);
    }

    #[test]
    fn test_parse_try_and_do_while_chains() {
        let source = r#"class A {
    void f() {
        try {
            a();
        } catch (Exception e) {
            b();
        } finally {
            c();
        }
        do { d(); } while (e());
        return;
    }
}"#;
        let tree = parse(source).unwrap();
        let class = tree.find_class("A").unwrap();
        let stmts = method_statements(&tree, class, "f");
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].text.starts_with("try"));
        assert!(stmts[0].text.ends_with('}'));
        assert_eq!(stmts[1].text, "do { d(); } while (e());");
        assert_eq!(stmts[2].kind, StatementKind::Return { value: None });
    }

    #[test]
    fn test_parse_anonymous_class_statement() {
        let source = r#"class A {
    void f() {
        button.setOnClickListener(new View.OnClickListener() {
            @Override
            public void onClick(View v) { go(); }
        });
        done();
    }
}"#;
        let tree = parse(source).unwrap();
        let class = tree.find_class("A").unwrap();
        let stmts = method_statements(&tree, class, "f");
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].call(), Some("button.setOnClickListener"));
        assert_eq!(stmts[1].call(), Some("done"));
    }

    #[test]
    fn test_parse_enum_body_is_kept_verbatim() {
        let tree = parse("enum Mode { ON, OFF; }").unwrap();
        let class = tree.find_class("Mode").unwrap();
        let raw = tree.children(class)[0];
        assert_eq!(tree.kind(raw), &NodeKind::Raw { text: "ON, OFF;".to_string() });
    }

    #[test]
    fn test_comment_inside_method_header() {
        let source = "class A extends Activity {\n    @Override // lifecycle\n    protected void onCreate(Bundle b) {\n        super.onCreate(b);\n    }\n}\n";
        let tree = parse(source).unwrap();
        let class = tree.find_class("A").unwrap();

        let methods = tree.find_methods_by_name(class, "onCreate");
        assert_eq!(methods.len(), 1);
        let decl = tree.method(methods[0]).unwrap();
        assert_eq!(decl.annotations, vec!["@Override"]);
        assert_eq!(decl.signature, "protected void onCreate(Bundle b)");

        let first = tree.children(class)[0];
        assert_eq!(
            tree.kind(first),
            &NodeKind::Comment {
                text: "// lifecycle".to_string()
            }
        );
    }

    #[test]
    fn test_comment_inside_class_header() {
        let source = "class Main extends Activity // screen\n{\n    /* base */ void f() {\n    }\n}\n";
        let tree = parse(source).unwrap();
        let class = tree.find_class("Main").unwrap();
        assert_eq!(tree.class(class).unwrap().extends.as_deref(), Some("Activity"));
        assert_eq!(tree.find_methods_by_name(class, "f").len(), 1);

        let printed = crate::source::print(&tree);
        assert!(printed.contains("// screen\nclass Main extends Activity {"));
        assert_eq!(crate::source::print(&parse(&printed).unwrap()), printed);
    }

    #[test]
    fn test_labeled_loop_is_one_statement() {
        let source = r#"class A {
    void f() {
        outer:
        for (int i = 0; i < n; i++) {
            a();
        }
        setContentView(R.layout.x);
        foo();
    }
}"#;
        let tree = parse(source).unwrap();
        let class = tree.find_class("A").unwrap();
        let stmts = method_statements(&tree, class, "f");
        assert_eq!(stmts.len(), 3);
        assert!(stmts[0].text.starts_with("outer:"));
        assert!(stmts[0].text.ends_with('}'));
        assert_eq!(stmts[0].kind, StatementKind::Other);
        assert_eq!(stmts[1].call(), Some("setContentView"));
        assert_eq!(stmts[2].call(), Some("foo"));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse("class A {\n    void f() {\n        a();\n").unwrap_err();
        assert_eq!(err.line, 4);
        assert!(err.message.contains("unexpected end of input"));
    }
}
