//! Diff scanning and finding collection.
//!
//! Drives the per-rule classifiers over the patch text line by line,
//! tracking the current file from `+++ b/` headers, then appends the
//! whole-text and file-set findings in a fixed order: line findings,
//! possible secret, large files, missing tests.

use std::collections::HashSet;
use std::path::Path;

use herald_core::Finding;

use crate::classify::{default_classifiers, LineContext};
use crate::filter::PathFilter;

/// Changed files larger than this many bytes on disk are flagged.
pub const LARGE_FILE_THRESHOLD_BYTES: u64 = 512_000;

/// Substrings that mark a diff as possibly containing credentials.
const SECRET_MARKERS: [&str; 4] = ["password", "secret", "api_key", "token"];

/// The analyzer's output: ordered findings plus the English narrative.
///
/// Both are pure functions of the inputs; identical diff text always
/// produces identical output.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    /// Findings in order of first appearance.
    pub findings: Vec<Finding>,
    /// Narrative sentences derived from the findings, deduplicated.
    pub narrative: Vec<String>,
}

/// Analyze a unified diff.
///
/// `changed_files` is the stat-derived path list; `repo_root` anchors the
/// on-disk size checks; `filter` excludes noisy paths from the file-set
/// checks (it does not affect the line scan).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use herald_core::Finding;
/// use herald_lens::filter::PathFilter;
/// use herald_lens::scan::analyze;
///
/// let patch = "+++ b/src/app.py\n+def foo(x):\n";
/// let changed = vec!["src/app.py".to_string()];
/// let analysis = analyze(patch, &changed, Path::new("."), &PathFilter::default());
/// assert!(matches!(analysis.findings[0], Finding::FunctionAdded { .. }));
/// assert!(analysis.findings.contains(&Finding::MissingTests));
/// ```
pub fn analyze(
    patch: &str,
    changed_files: &[String],
    repo_root: &Path,
    filter: &PathFilter,
) -> Analysis {
    let classifiers = default_classifiers();
    let mut ctx = LineContext::default();
    let mut findings: Vec<Finding> = Vec::new();
    let mut seen_added: HashSet<String> = HashSet::new();
    let mut seen_removed: HashSet<String> = HashSet::new();

    for line in patch.lines() {
        if let Some(path) = new_file_header(line) {
            ctx.current_file = path;
            continue;
        }
        for classifier in &classifiers {
            let Some(finding) = classifier.classify(line, &ctx) else {
                continue;
            };
            // Functions are reported once per name per direction
            match &finding {
                Finding::FunctionAdded { name, .. } => {
                    if !seen_added.insert(name.clone()) {
                        continue;
                    }
                }
                Finding::FunctionRemoved { name, .. } => {
                    if !seen_removed.insert(name.clone()) {
                        continue;
                    }
                }
                _ => {}
            }
            findings.push(finding);
        }
    }

    if has_secret_marker(patch) {
        findings.push(Finding::PossibleSecret);
    }

    let considered = filter.retain(changed_files);

    for path in &considered {
        if let Ok(meta) = repo_root.join(path).metadata() {
            if meta.is_file() && meta.len() > LARGE_FILE_THRESHOLD_BYTES {
                findings.push(Finding::LargeFile {
                    path: (*path).to_string(),
                    size: meta.len(),
                });
            }
        }
    }

    if missing_tests(&considered) {
        findings.push(Finding::MissingTests);
    }

    let narrative = build_narrative(&findings);

    Analysis {
        findings,
        narrative,
    }
}

/// Derive the changed-file list from patch headers alone.
///
/// Used when analyzing a diff with no repository at hand (stdin or a patch
/// file): new-side paths come from `+++ b/` headers, deletions from the
/// `--- a/` side.
///
/// # Examples
///
/// ```
/// use herald_lens::scan::changed_files_from_patch;
///
/// let patch = "--- a/old.py\n+++ b/new.py\n--- a/gone.py\n+++ /dev/null\n";
/// assert_eq!(changed_files_from_patch(patch), vec!["new.py", "gone.py"]);
/// ```
pub fn changed_files_from_patch(patch: &str) -> Vec<String> {
    let mut files = Vec::new();
    let mut last_old: Option<String> = None;
    for line in patch.lines() {
        if let Some(path) = line.strip_prefix("--- ") {
            last_old = strip_diff_path(path, "a/");
            continue;
        }
        if let Some(path) = line.strip_prefix("+++ ") {
            match strip_diff_path(path, "b/") {
                Some(new_path) => push_unique(&mut files, new_path),
                None => {
                    // Deleted file: the new side is /dev/null
                    if let Some(old_path) = last_old.take() {
                        push_unique(&mut files, old_path);
                    }
                }
            }
        }
    }
    files
}

fn strip_diff_path(raw: &str, prefix: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('"');
    if trimmed == "/dev/null" {
        return None;
    }
    Some(trimmed.strip_prefix(prefix).unwrap_or(trimmed).to_string())
}

fn new_file_header(line: &str) -> Option<Option<String>> {
    let path = line.strip_prefix("+++ ")?;
    Some(strip_diff_path(path, "b/"))
}

fn has_secret_marker(patch: &str) -> bool {
    let lowered = patch.to_lowercase();
    SECRET_MARKERS.iter().any(|m| lowered.contains(m))
}

fn missing_tests(changed: &[&str]) -> bool {
    let src_changed = changed.iter().any(|p| looks_like_source(p));
    let test_changed = changed.iter().any(|p| looks_like_test(p));
    src_changed && !test_changed
}

fn looks_like_source(path: &str) -> bool {
    if path.starts_with("src/") || path.starts_with("app/") {
        return true;
    }
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    matches!(ext, "rs" | "py" | "js" | "ts" | "go" | "java" | "c" | "cpp")
}

fn looks_like_test(path: &str) -> bool {
    path.starts_with("tests/") || path.starts_with("test_") || path.contains("/tests/")
}

fn build_narrative(findings: &[Finding]) -> Vec<String> {
    let mut narrative = Vec::new();
    for finding in findings {
        let sentence = match finding {
            Finding::FunctionAdded { name, .. } => format!("Added function `{name}()`."),
            Finding::FunctionRemoved { name, .. } => format!("Removed function `{name}()`."),
            Finding::ClassAdded { name, file } => {
                format!("Introduced class `{name}` in `{file}`.")
            }
            _ => continue,
        };
        push_unique(&mut narrative, sentence);
    }
    narrative
}

fn push_unique(items: &mut Vec<String>, item: String) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_patch(patch: &str, changed: &[&str]) -> Analysis {
        let changed: Vec<String> = changed.iter().map(|s| s.to_string()).collect();
        analyze(patch, &changed, Path::new("."), &PathFilter::default())
    }

    #[test]
    fn empty_diff_has_no_findings_and_no_narrative() {
        let analysis = analyze_patch("", &[]);
        assert!(analysis.findings.is_empty());
        assert!(analysis.narrative.is_empty());
    }

    #[test]
    fn context_only_diff_has_no_findings() {
        let patch = "+++ b/a.py\n@@ -1,2 +1,2 @@\n unchanged line\n another\n";
        let analysis = analyze_patch(patch, &[]);
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn function_added_and_removed_reported_once_each() {
        let patch = "\
+++ b/a.py
+def foo(x):
+def foo(x):
-def foo(x):
-def foo(x):
";
        let analysis = analyze_patch(patch, &[]);
        let added = analysis
            .findings
            .iter()
            .filter(|f| matches!(f, Finding::FunctionAdded { name, .. } if name == "foo"))
            .count();
        let removed = analysis
            .findings
            .iter()
            .filter(|f| matches!(f, Finding::FunctionRemoved { name, .. } if name == "foo"))
            .count();
        assert_eq!(added, 1);
        assert_eq!(removed, 1);
    }

    #[test]
    fn current_file_context_follows_headers() {
        let patch = "\
+++ b/src/first.py
+def one():
+++ b/src/second.py
+def two():
";
        let analysis = analyze_patch(patch, &[]);
        assert_eq!(
            analysis.findings[0],
            Finding::FunctionAdded {
                name: "one".into(),
                file: "src/first.py".into()
            }
        );
        assert_eq!(
            analysis.findings[1],
            Finding::FunctionAdded {
                name: "two".into(),
                file: "src/second.py".into()
            }
        );
    }

    #[test]
    fn todo_markers_keep_line_text_and_count_removals() {
        let patch = "\
+++ b/a.py
+    # TODO: handle zero division
-    # FIXME: slow path
";
        let analysis = analyze_patch(patch, &[]);
        let todos: Vec<_> = analysis
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::TodoMarker { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            todos,
            vec!["# TODO: handle zero division", "# FIXME: slow path"]
        );
    }

    #[test]
    fn secret_marker_reported_exactly_once() {
        let patch = "+++ b/conf.py\n+api_key=123\n+API_KEY=456\n+password = 'hunter2'\n";
        let analysis = analyze_patch(patch, &[]);
        let secrets = analysis
            .findings
            .iter()
            .filter(|f| matches!(f, Finding::PossibleSecret))
            .count();
        assert_eq!(secrets, 1);
    }

    #[test]
    fn missing_tests_present_without_test_paths() {
        let analysis = analyze_patch("", &["src/app.py"]);
        assert!(analysis.findings.contains(&Finding::MissingTests));

        let analysis = analyze_patch("", &["src/app.py", "tests/test_app.py"]);
        assert!(!analysis.findings.contains(&Finding::MissingTests));
    }

    #[test]
    fn missing_tests_ignores_non_source_changes() {
        let analysis = analyze_patch("", &["README.md", "docs/guide.md"]);
        assert!(!analysis.findings.contains(&Finding::MissingTests));
    }

    #[test]
    fn large_file_uses_exact_size_and_skips_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("model.bin");
        std::fs::write(&big, vec![0u8; 512_001]).unwrap();

        let changed = vec!["model.bin".to_string(), "deleted.bin".to_string()];
        let analysis = analyze("", &changed, dir.path(), &PathFilter::default());
        assert_eq!(
            analysis.findings,
            vec![Finding::LargeFile {
                path: "model.bin".into(),
                size: 512_001,
            }]
        );
    }

    #[test]
    fn threshold_boundary_is_exclusive() {
        let dir = tempfile::tempdir().unwrap();
        let exact = dir.path().join("exact.bin");
        std::fs::write(&exact, vec![0u8; 512_000]).unwrap();

        let changed = vec!["exact.bin".to_string()];
        let analysis = analyze("", &changed, dir.path(), &PathFilter::default());
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn skip_patterns_exclude_paths_from_file_set_checks() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.lock");
        std::fs::write(&big, vec![0u8; 600_000]).unwrap();

        let filter = PathFilter::new(&["*.lock".into()]);
        let changed = vec!["big.lock".to_string()];
        let analysis = analyze("", &changed, dir.path(), &filter);
        assert!(analysis.findings.is_empty());
    }

    #[test]
    fn narrative_sentences_follow_finding_order() {
        let patch = "\
+++ b/src/shapes.py
+class Circle:
+def area(r):
-def old_area(r):
";
        let analysis = analyze_patch(patch, &[]);
        assert_eq!(
            analysis.narrative,
            vec![
                "Introduced class `Circle` in `src/shapes.py`.",
                "Added function `area()`.",
                "Removed function `old_area()`.",
            ]
        );
    }

    #[test]
    fn binary_marker_yields_finding() {
        let patch = "Binary files a/logo.png and b/logo.png differ\n";
        let analysis = analyze_patch(patch, &[]);
        assert_eq!(
            analysis.findings,
            vec![Finding::BinaryFileChanged {
                path: "logo.png".into()
            }]
        );
    }

    #[test]
    fn changed_files_from_patch_handles_deletions() {
        let patch = "\
--- a/old.py
+++ b/new.py
@@ -1 +1 @@
-x
+y
--- a/gone.py
+++ /dev/null
@@ -1 +0,0 @@
-z
";
        assert_eq!(changed_files_from_patch(patch), vec!["new.py", "gone.py"]);
    }

    #[test]
    fn determinism_same_input_same_output() {
        let patch = "\
+++ b/src/app.py
+class Service:
+def start():
+    # TODO: wire config
+token = 'abc'
";
        let changed = vec!["src/app.py".to_string()];
        let first = analyze(patch, &changed, Path::new("."), &PathFilter::default());
        let second = analyze(patch, &changed, Path::new("."), &PathFilter::default());
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.narrative, second.narrative);
    }
}
