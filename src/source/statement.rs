/// Statement classification
///
/// Statements are stored as text plus a coarse kind. The kind is derived from
/// the text alone, so generated statements and parsed statements are
/// classified the same way.

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// Expression statement. `call` holds the method-expression text
    /// (`setContentView`, `super.onCreate`) when the whole expression is a
    /// method invocation.
    Expression { call: Option<String> },
    Return { value: Option<String> },
    LocalVariable { name: String },
    Other,
}

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "do", "switch", "try", "synchronized", "throw", "break", "continue",
    "else", "assert", "yield", "class", "interface", "enum", "record", "case", "default",
];

const DECLARATION_MODIFIERS: &[&str] = &["final"];

impl Statement {
    pub fn parse(text: &str) -> Statement {
        let text = text.trim().to_string();
        let kind = classify(&text);
        Statement { kind, text }
    }

    pub fn is_expression(&self) -> bool {
        matches!(self.kind, StatementKind::Expression { .. })
    }

    pub fn call(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::Expression { call } => call.as_deref(),
            _ => None,
        }
    }

    pub fn return_value(&self) -> Option<&str> {
        match &self.kind {
            StatementKind::Return { value } => value.as_deref(),
            _ => None,
        }
    }
}

fn classify(text: &str) -> StatementKind {
    if text.starts_with('{') || text.starts_with("//") || text.starts_with("/*") {
        return StatementKind::Other;
    }

    let first = leading_word(text);
    if first == "return" {
        let value = text["return".len()..].trim().trim_end_matches(';').trim();
        return StatementKind::Return {
            value: if value.is_empty() { None } else { Some(value.to_string()) },
        };
    }
    if CONTROL_KEYWORDS.contains(&first) || is_labeled(text, first) {
        return StatementKind::Other;
    }
    if let Some(name) = local_variable_name(text) {
        return StatementKind::LocalVariable { name };
    }

    let expr = text.trim_end_matches(';').trim();
    StatementKind::Expression {
        call: invoked_method(expr),
    }
}

/// `outer: for (...)`
fn is_labeled(text: &str, first: &str) -> bool {
    let rest = text[first.len()..].trim_start();
    !first.is_empty() && rest.starts_with(':') && !rest.starts_with("::")
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(text.len());
    &text[..end]
}

/// Characters outside string/char literals and comments, paired with their
/// byte offset and the bracket depth in effect before them.
pub(crate) fn code_chars(text: &str) -> Vec<(usize, char, usize)> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut depth = 0usize;

    while let Some((i, c)) = chars.next() {
        match c {
            '"' | '\'' => {
                let quote = c;
                while let Some((_, inner)) = chars.next() {
                    if inner == '\\' {
                        chars.next();
                    } else if inner == quote {
                        break;
                    }
                }
                // the literal stands in as a single opaque char
                out.push((i, quote, depth));
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, inner) in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = ' ';
                for (_, inner) in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            '(' | '[' | '{' => {
                out.push((i, c, depth));
                depth += 1;
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                out.push((i, c, depth));
            }
            _ => out.push((i, c, depth)),
        }
    }

    out
}

/// `Type name = ...;` / `final Type name;` / `var name = ...;`
fn local_variable_name(text: &str) -> Option<String> {
    let mut rest = text;
    loop {
        let word = leading_word(rest);
        let annotation = rest.starts_with('@');
        if DECLARATION_MODIFIERS.contains(&word) || annotation {
            let skip = if annotation {
                1 + leading_word(&rest[1..]).len()
            } else {
                word.len()
            };
            rest = rest[skip..].trim_start();
        } else {
            break;
        }
    }

    let type_len = type_prefix_len(rest)?;
    let after_type = &rest[type_len..];
    if !after_type.starts_with(char::is_whitespace) {
        return None;
    }
    let after_type = after_type.trim_start();
    let name = leading_word(after_type);
    if name.is_empty() || name.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        return None;
    }
    let after_name = after_type[name.len()..].trim_start();
    match after_name.chars().next() {
        Some('=') if !after_name.starts_with("==") => Some(name.to_string()),
        Some(';') | Some(',') | Some('[') => Some(name.to_string()),
        _ => None,
    }
}

/// Length of a type at the start of `text`: dotted identifier, optional type
/// arguments, optional array brackets.
fn type_prefix_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    let ident = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';

    if i >= bytes.len() || !(bytes[i].is_ascii_alphabetic() || bytes[i] == b'_') {
        return None;
    }
    while i < bytes.len() && (ident(bytes[i]) || bytes[i] == b'.') {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'<' {
        let mut depth = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'<' => depth += 1,
                b'>' => {
                    depth -= 1;
                    if depth == 0 {
                        i += 1;
                        break;
                    }
                }
                b'(' | b')' | b';' | b'=' => return None,
                _ => {}
            }
            i += 1;
        }
    }
    while text[i..].starts_with("[]") {
        i += 2;
    }
    Some(i)
}

/// Method-expression text when `expr` as a whole is a method invocation.
fn invoked_method(expr: &str) -> Option<String> {
    if !expr.ends_with(')') || expr.starts_with("new ") {
        return None;
    }

    let chars = code_chars(expr);
    // the '(' that opens the final argument list
    let (close_idx, _, depth) = *chars.last()?;
    if close_idx != expr.len() - 1 {
        return None;
    }
    let open = chars
        .iter()
        .rev()
        .find(|(_, c, d)| *c == '(' && *d == depth)?
        .0;

    let callee = expr[..open].trim_end();
    if callee.is_empty() {
        return None;
    }
    let operator = chars.iter().any(|(i, c, d)| {
        *i < open && *d == 0 && matches!(c, '=' | '+' | '-' | '*' | '/' | '?' | ':' | '!' | '<' | '>' | '&' | '|' | ' ' | '\t' | '\n' | '%' | '^' | '~' | ',')
    });
    let last = callee.chars().last()?;
    if operator || !(last.is_alphanumeric() || last == '_' || last == '$') {
        return None;
    }
    Some(callee.to_string())
}
