//! Per-rule diff line classifiers.
//!
//! Each detection rule is its own [`LineClassifier`]; the scanner runs all
//! of them over every line and merges the results in line order. This keeps
//! the rule set testable in isolation instead of one monolithic sweep.

use herald_core::Finding;

/// Scanning context carried across lines.
///
/// # Examples
///
/// ```
/// use herald_lens::classify::LineContext;
///
/// let mut ctx = LineContext::default();
/// ctx.current_file = Some("src/db.rs".into());
/// assert_eq!(ctx.file_label(), "src/db.rs");
/// ```
#[derive(Debug, Clone, Default)]
pub struct LineContext {
    /// Path from the most recent `+++ b/<path>` header, if any.
    pub current_file: Option<String>,
}

impl LineContext {
    /// The current file path, or a placeholder before the first header.
    pub fn file_label(&self) -> String {
        self.current_file.clone().unwrap_or_else(|| "unknown".into())
    }
}

/// Maps one diff line plus the current-file context to zero or one finding.
pub trait LineClassifier {
    /// Classify `line`; `None` when the rule does not apply.
    fn classify(&self, line: &str, ctx: &LineContext) -> Option<Finding>;
}

/// Function definitions on added lines.
pub struct FunctionAddedRule;

impl LineClassifier for FunctionAddedRule {
    fn classify(&self, line: &str, ctx: &LineContext) -> Option<Finding> {
        let code = added_code(line)?;
        let name = function_name(code)?;
        Some(Finding::FunctionAdded {
            name,
            file: ctx.file_label(),
        })
    }
}

/// Function definitions on removed lines.
pub struct FunctionRemovedRule;

impl LineClassifier for FunctionRemovedRule {
    fn classify(&self, line: &str, ctx: &LineContext) -> Option<Finding> {
        let code = removed_code(line)?;
        let name = function_name(code)?;
        Some(Finding::FunctionRemoved {
            name,
            file: ctx.file_label(),
        })
    }
}

/// Class definitions on added lines.
pub struct ClassAddedRule;

impl LineClassifier for ClassAddedRule {
    fn classify(&self, line: &str, ctx: &LineContext) -> Option<Finding> {
        let code = added_code(line)?;
        let name = class_name(code)?;
        Some(Finding::ClassAdded {
            name,
            file: ctx.file_label(),
        })
    }
}

/// TODO/FIXME markers on added or removed lines. Markers being removed
/// still count: the report surfaces both directions.
pub struct TodoRule;

impl LineClassifier for TodoRule {
    fn classify(&self, line: &str, _ctx: &LineContext) -> Option<Finding> {
        let code = added_code(line).or_else(|| removed_code(line))?;
        if code.contains("TODO") || code.contains("FIXME") {
            Some(Finding::TodoMarker {
                text: code.trim().to_string(),
            })
        } else {
            None
        }
    }
}

/// Git's `Binary files a/<p> and b/<p> differ` marker.
pub struct BinaryRule;

impl LineClassifier for BinaryRule {
    fn classify(&self, line: &str, _ctx: &LineContext) -> Option<Finding> {
        binary_path(line).map(|path| Finding::BinaryFileChanged { path })
    }
}

/// The default classifier set, one per rule, in report order.
pub fn default_classifiers() -> Vec<Box<dyn LineClassifier>> {
    vec![
        Box::new(FunctionAddedRule),
        Box::new(FunctionRemovedRule),
        Box::new(ClassAddedRule),
        Box::new(TodoRule),
        Box::new(BinaryRule),
    ]
}

fn added_code(line: &str) -> Option<&str> {
    if line.starts_with('+') && !line.starts_with("+++") {
        Some(line[1..].trim())
    } else {
        None
    }
}

fn removed_code(line: &str) -> Option<&str> {
    if line.starts_with('-') && !line.starts_with("---") {
        Some(line[1..].trim())
    } else {
        None
    }
}

/// Extract a function name from a definition line.
///
/// Covers `fn`, `def`, and `function` keywords, with leading modifiers
/// (`pub`, `pub(crate)`, `async`, `unsafe`, `export`, `default`) stripped.
///
/// # Examples
///
/// ```
/// use herald_lens::classify::function_name;
///
/// assert_eq!(function_name("def foo(x):"), Some("foo".into()));
/// assert_eq!(function_name("pub async fn fetch_all(db: &Db) {"), Some("fetch_all".into()));
/// assert_eq!(function_name("function handle(req) {"), Some("handle".into()));
/// assert_eq!(function_name("x = foo(1)"), None);
/// ```
pub fn function_name(code: &str) -> Option<String> {
    let code = strip_modifiers(code);
    for keyword in ["fn", "def", "function"] {
        if let Some(rest) = after_keyword(code, keyword) {
            if let Some((name, after)) = take_identifier(rest) {
                if after.trim_start().starts_with('(') {
                    return Some(name);
                }
            }
        }
    }
    None
}

/// Extract a class name from a definition line.
///
/// # Examples
///
/// ```
/// use herald_lens::classify::class_name;
///
/// assert_eq!(class_name("class Calculator:"), Some("Calculator".into()));
/// assert_eq!(class_name("class Handler(Base):"), Some("Handler".into()));
/// assert_eq!(class_name("class Widget {"), Some("Widget".into()));
/// assert_eq!(class_name("classify(x)"), None);
/// ```
pub fn class_name(code: &str) -> Option<String> {
    let code = strip_modifiers(code);
    let rest = after_keyword(code, "class")?;
    let (name, after) = take_identifier(rest)?;
    let after = after.trim_start();
    if after.starts_with(':')
        || after.starts_with('(')
        || after.starts_with('{')
        || after.starts_with("extends")
    {
        Some(name)
    } else {
        None
    }
}

/// Extract the changed path from a `Binary files ... differ` line.
///
/// Prefers the new-side path; falls back to the old side for deletions.
///
/// # Examples
///
/// ```
/// use herald_lens::classify::binary_path;
///
/// let line = "Binary files a/logo.png and b/logo.png differ";
/// assert_eq!(binary_path(line), Some("logo.png".into()));
/// assert_eq!(binary_path("+++ b/logo.png"), None);
/// ```
pub fn binary_path(line: &str) -> Option<String> {
    let inner = line
        .trim()
        .strip_prefix("Binary files ")?
        .strip_suffix(" differ")?;
    let (old, new) = inner.split_once(" and ")?;
    let picked = if new != "/dev/null" { new } else { old };
    let picked = picked
        .strip_prefix("b/")
        .or_else(|| picked.strip_prefix("a/"))
        .unwrap_or(picked);
    Some(picked.to_string())
}

fn after_keyword<'a>(code: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = code.strip_prefix(keyword)?;
    // Require whitespace after the keyword so `classify(` does not match `class`
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    Some(trimmed)
}

fn take_identifier(code: &str) -> Option<(String, &str)> {
    let mut chars = code.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let mut end = first.len_utf8();
    for (i, c) in chars {
        if c.is_ascii_alphanumeric() || c == '_' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    Some((code[..end].to_string(), &code[end..]))
}

fn strip_modifiers(mut code: &str) -> &str {
    loop {
        code = code.trim_start();
        if let Some(rest) = code.strip_prefix("pub(") {
            if let Some(end) = rest.find(')') {
                code = &rest[end + 1..];
                continue;
            }
        }
        let mut stripped = false;
        for modifier in ["pub", "async", "unsafe", "export", "default"] {
            if let Some(rest) = code.strip_prefix(modifier) {
                if rest.starts_with(char::is_whitespace) {
                    code = rest;
                    stripped = true;
                    break;
                }
            }
        }
        if !stripped {
            return code;
        }
    }
}
