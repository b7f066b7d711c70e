//! Best-effort markdown to PDF rendering.
//!
//! The converter is an external `pandoc` binary, treated as a black box.
//! When it is missing or fails, the markdown text itself is written into
//! the target path so the run still produces a document at the expected
//! location.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use herald_core::{Degraded, HeraldError, Outcome};

/// How a document ended up on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The converter produced a real PDF.
    Pdf,
    /// The markdown text was written into the target path instead.
    MarkdownFallback(Degraded),
}

/// Render `markdown` into `target` as a PDF, falling back to the markdown
/// text when the converter is unavailable.
///
/// # Errors
///
/// Returns [`HeraldError::Io`] only if even the fallback write fails;
/// converter problems surface as [`RenderOutcome::MarkdownFallback`].
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use herald_report::render::{render_document, RenderOutcome};
///
/// match render_document("# Report\n", Path::new("outputs/summary.pdf")).unwrap() {
///     RenderOutcome::Pdf => println!("rendered"),
///     RenderOutcome::MarkdownFallback(d) => eprintln!("degraded: {d}"),
/// }
/// ```
pub fn render_document(markdown: &str, target: &Path) -> Result<RenderOutcome, HeraldError> {
    let pandoc = which::which("pandoc").ok();
    render_with(pandoc.as_deref(), markdown, target)
}

fn render_with(
    pandoc: Option<&Path>,
    markdown: &str,
    target: &Path,
) -> Result<RenderOutcome, HeraldError> {
    let reason = match pandoc {
        None => Degraded::new("pandoc not found on PATH; writing markdown instead"),
        Some(bin) => match convert(bin, markdown, target) {
            Ok(()) => return Ok(RenderOutcome::Pdf),
            Err(d) => d,
        },
    };

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(target, markdown)?;
    Ok(RenderOutcome::MarkdownFallback(reason))
}

fn convert(pandoc: &Path, markdown: &str, target: &Path) -> Outcome<()> {
    let mut child = Command::new(pandoc)
        .arg("-f")
        .arg("gfm")
        .arg("-o")
        .arg(target)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Degraded::new(format!("failed to start pandoc: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(markdown.as_bytes())
            .map_err(|e| Degraded::new(format!("failed to feed pandoc: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| Degraded::new(format!("failed to wait for pandoc: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Degraded::new(format!(
            "pandoc exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_writes_markdown_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("summary.pdf");
        let markdown = "# Report\n\nBody text.\n";

        let outcome = render_with(None, markdown, &target).unwrap();
        assert!(matches!(outcome, RenderOutcome::MarkdownFallback(_)));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), markdown);
    }

    #[test]
    fn fallback_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("outputs/summary.pdf");
        render_with(None, "# Report\n", &target).unwrap();
        assert!(target.exists());
    }

    #[test]
    fn missing_converter_reason_mentions_pandoc() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("summary.pdf");
        let outcome = render_with(None, "# Report\n", &target).unwrap();
        let RenderOutcome::MarkdownFallback(reason) = outcome else {
            panic!("expected fallback");
        };
        assert!(reason.reason.contains("pandoc"));
    }

    #[test]
    fn broken_converter_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("summary.pdf");
        let bogus = dir.path().join("no-such-pandoc");

        let outcome = render_with(Some(&bogus), "# Report\n", &target).unwrap();
        assert!(matches!(outcome, RenderOutcome::MarkdownFallback(_)));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Report\n");
    }

    #[test]
    fn render_document_always_produces_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("summary.pdf");
        let outcome = render_document("# Report\n", &target).unwrap();
        assert!(target.exists());
        // Either a real PDF or the exact markdown, depending on the machine
        if let RenderOutcome::MarkdownFallback(_) = outcome {
            assert_eq!(std::fs::read_to_string(&target).unwrap(), "# Report\n");
        }
    }
}
