use std::fmt;
use std::path::{Path, PathBuf};

use herald_core::{Degraded, DiffStat, Finding, HeraldError, Recommendation};
use serde::Serialize;

/// TODO markers rendered into the report are capped at this many entries.
pub const MAX_TODOS_RENDERED: usize = 20;

/// The assembled change-summary report.
///
/// Built once per run and immutable afterward. Rendering is a pure function
/// of the fields: the markdown carries no timestamps, so identical inputs
/// produce byte-identical output.
///
/// # Examples
///
/// ```
/// use herald_core::DiffStat;
/// use herald_report::builder::Report;
///
/// let report = Report::new(
///     "main",
///     "abc1234",
///     DiffStat::default(),
///     vec![],
///     vec![],
///     vec![],
///     String::new(),
///     vec![],
/// );
/// let md = report.to_markdown();
/// assert!(md.starts_with("# Change summary"));
/// assert!(md.contains("No clear changes detected"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Report header, carrying the branch and short commit id.
    pub title: String,
    /// Stat summary for the run's range.
    pub stat: DiffStat,
    /// Narrative sentences, in finding order.
    pub narrative: Vec<String>,
    /// Ordered findings.
    pub findings: Vec<Finding>,
    /// Derived recommendations, in derivation order.
    pub recommendations: Vec<Recommendation>,
    /// Raw unified diff, rendered verbatim at the end of the report.
    pub raw_diff: String,
    /// Reasons the run produced reduced output, if any.
    pub degradations: Vec<Degraded>,
}

impl Report {
    /// Assemble a report from the pipeline's outputs.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        branch: &str,
        short_sha: &str,
        stat: DiffStat,
        narrative: Vec<String>,
        findings: Vec<Finding>,
        recommendations: Vec<Recommendation>,
        raw_diff: String,
        degradations: Vec<Degraded>,
    ) -> Self {
        Self {
            title: format!("Change summary — `{branch}` @ `{short_sha}`"),
            stat,
            narrative,
            findings,
            recommendations,
            raw_diff,
            degradations,
        }
    }

    /// Render the report as markdown.
    ///
    /// Section order is fixed: header, stat block, narrative, TODO list
    /// (first [`MAX_TODOS_RENDERED`]), binary files, large files,
    /// recommendations, raw diff. Sections backed by an empty list render an
    /// explicit placeholder instead of being omitted; the raw-diff section
    /// always renders.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));

        if !self.degradations.is_empty() {
            out.push_str("_Running with reduced output:_\n");
            for d in &self.degradations {
                out.push_str(&format!("- {}\n", d.reason));
            }
            out.push('\n');
        }

        out.push_str("## Changed files (stat)\n\n");
        if self.stat.is_empty() {
            out.push_str("_No file stat available._\n\n");
        } else {
            out.push_str("```\n");
            out.push_str(self.stat.raw.trim());
            out.push_str("\n```\n\n");
        }

        out.push_str("## Summary (automated)\n\n");
        if self.narrative.is_empty() {
            out.push_str("No clear changes detected by heuristics.\n\n");
        } else {
            for line in &self.narrative {
                out.push_str(&format!("- {line}\n"));
            }
            out.push('\n');
        }

        out.push_str("## TODO / FIXME found\n\n");
        let todos: Vec<&str> = self
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::TodoMarker { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if todos.is_empty() {
            out.push_str("None found.\n\n");
        } else {
            for text in todos.iter().take(MAX_TODOS_RENDERED) {
                out.push_str(&format!("- `{text}`\n"));
            }
            out.push('\n');
        }

        out.push_str("## Binary files changed\n\n");
        let binaries: Vec<&str> = self
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::BinaryFileChanged { path } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        if binaries.is_empty() {
            out.push_str("None found.\n\n");
        } else {
            for path in binaries {
                out.push_str(&format!("- `{path}`\n"));
            }
            out.push('\n');
        }

        out.push_str("## Large file changes (>= 500 KB)\n\n");
        let large: Vec<(&str, u64)> = self
            .findings
            .iter()
            .filter_map(|f| match f {
                Finding::LargeFile { path, size } => Some((path.as_str(), *size)),
                _ => None,
            })
            .collect();
        if large.is_empty() {
            out.push_str("None found.\n\n");
        } else {
            for (path, size) in large {
                out.push_str(&format!("- `{path}` ({size} bytes)\n"));
            }
            out.push('\n');
        }

        out.push_str("## Review recommendations\n\n");
        if self.recommendations.is_empty() {
            out.push_str("No automatic recommendations generated.\n\n");
        } else {
            for rec in &self.recommendations {
                out.push_str(&format!("- {}\n", rec.text));
            }
            out.push('\n');
        }

        out.push_str("## Raw diff\n\n");
        out.push_str("```diff\n");
        let diff = self.raw_diff.trim();
        if !diff.is_empty() {
            out.push_str(diff);
            out.push('\n');
        }
        out.push_str("```\n");

        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(
            f,
            "{} findings, {} recommendations",
            self.findings.len(),
            self.recommendations.len()
        )?;
        if self.narrative.is_empty() {
            writeln!(f, "\nNo clear changes detected by heuristics.")?;
        } else {
            writeln!(f)?;
            for line in &self.narrative {
                writeln!(f, "  {line}")?;
            }
        }
        if !self.recommendations.is_empty() {
            writeln!(f, "\nRecommendations:")?;
            for rec in &self.recommendations {
                writeln!(f, "  [{}] {}", rec.category, rec.text)?;
            }
        }
        Ok(())
    }
}

/// File-name stem for a run's report artifacts.
///
/// Branch names may contain `/`; path separators and whitespace are mapped
/// to `-` so the artifacts land inside the output directory.
///
/// # Examples
///
/// ```
/// use herald_report::builder::report_basename;
///
/// assert_eq!(report_basename("feature/login", "abc1234"), "summary_feature-login_abc1234");
/// ```
pub fn report_basename(branch: &str, short_sha: &str) -> String {
    format!(
        "summary_{}_{}",
        sanitize_component(branch),
        sanitize_component(short_sha)
    )
}

/// Markdown and PDF target paths for a run.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use herald_report::builder::report_paths;
///
/// let (md, pdf) = report_paths(Path::new("outputs"), "main", "abc1234");
/// assert_eq!(md, Path::new("outputs/summary_main_abc1234.md"));
/// assert_eq!(pdf, Path::new("outputs/summary_main_abc1234.pdf"));
/// ```
pub fn report_paths(output_dir: &Path, branch: &str, short_sha: &str) -> (PathBuf, PathBuf) {
    let base = report_basename(branch, short_sha);
    (
        output_dir.join(format!("{base}.md")),
        output_dir.join(format!("{base}.pdf")),
    )
}

/// Write `markdown` to `path`, creating the parent directory if absent.
///
/// # Errors
///
/// Returns [`HeraldError::Io`] if the directory or file cannot be written.
pub fn write_markdown(markdown: &str, path: &Path) -> Result<(), HeraldError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, markdown)?;
    Ok(())
}

fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() {
                '-'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::{Category, RecommendationKind};

    fn sample_report() -> Report {
        Report::new(
            "feature/login",
            "abc1234",
            DiffStat {
                entries: vec![],
                raw: " a.py | 3 ++-\n 1 file changed, 3 insertions(+)".into(),
            },
            vec!["Added function `foo()`.".into()],
            vec![
                Finding::FunctionAdded {
                    name: "foo".into(),
                    file: "a.py".into(),
                },
                Finding::TodoMarker {
                    text: "# TODO: later".into(),
                },
                Finding::LargeFile {
                    path: "model.bin".into(),
                    size: 600_000,
                },
            ],
            vec![Recommendation {
                kind: RecommendationKind::LintInCi,
                category: Category::Process,
                text: "Run automated linters and formatters in CI.".into(),
            }],
            "+def foo(x):\n".into(),
            vec![],
        )
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let md = sample_report().to_markdown();
        let order = [
            "# Change summary",
            "## Changed files (stat)",
            "## Summary (automated)",
            "## TODO / FIXME found",
            "## Binary files changed",
            "## Large file changes (>= 500 KB)",
            "## Review recommendations",
            "## Raw diff",
        ];
        let mut last = 0;
        for heading in order {
            let pos = md[last..]
                .find(heading)
                .unwrap_or_else(|| panic!("missing or misordered section: {heading}"));
            last += pos;
        }
    }

    #[test]
    fn empty_sections_render_placeholders() {
        let report = Report::new(
            "main",
            "abc1234",
            DiffStat::default(),
            vec![],
            vec![],
            vec![],
            String::new(),
            vec![],
        );
        let md = report.to_markdown();
        assert!(md.contains("_No file stat available._"));
        assert!(md.contains("No clear changes detected by heuristics."));
        assert!(md.contains("None found."));
        // Raw diff always renders, even when empty
        assert!(md.contains("```diff\n```"));
    }

    #[test]
    fn degradation_reasons_are_rendered() {
        let report = Report::new(
            "main",
            "abc1234",
            DiffStat::default(),
            vec![],
            vec![],
            vec![],
            String::new(),
            vec![Degraded::new("git fetch exited with status 128")],
        );
        let md = report.to_markdown();
        assert!(md.contains("_Running with reduced output:_"));
        assert!(md.contains("- git fetch exited with status 128"));
    }

    #[test]
    fn todo_list_caps_at_twenty() {
        let findings: Vec<Finding> = (0..30)
            .map(|i| Finding::TodoMarker {
                text: format!("TODO: item {i}"),
            })
            .collect();
        let report = Report::new(
            "main",
            "abc1234",
            DiffStat::default(),
            vec![],
            findings,
            vec![],
            String::new(),
            vec![],
        );
        let md = report.to_markdown();
        assert!(md.contains("TODO: item 19"));
        assert!(!md.contains("TODO: item 20"));
    }

    #[test]
    fn large_file_renders_exact_byte_size() {
        let md = sample_report().to_markdown();
        assert!(md.contains("- `model.bin` (600000 bytes)"));
    }

    #[test]
    fn raw_diff_rendered_verbatim_in_fence() {
        let md = sample_report().to_markdown();
        assert!(md.contains("```diff\n+def foo(x):\n```"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let first = sample_report().to_markdown();
        let second = sample_report().to_markdown();
        assert_eq!(first, second);
    }

    #[test]
    fn title_carries_branch_and_sha() {
        let report = sample_report();
        assert_eq!(report.title, "Change summary — `feature/login` @ `abc1234`");
    }

    #[test]
    fn report_paths_sanitize_branch_names() {
        let (md, pdf) = report_paths(Path::new("outputs"), "feature/login", "abc1234");
        assert_eq!(md, Path::new("outputs/summary_feature-login_abc1234.md"));
        assert_eq!(pdf, Path::new("outputs/summary_feature-login_abc1234.pdf"));
    }

    #[test]
    fn write_markdown_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs/summary_main_abc1234.md");
        write_markdown("# hello\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hello\n");
    }

    #[test]
    fn display_lists_recommendations() {
        let text = sample_report().to_string();
        assert!(text.contains("Change summary"));
        assert!(text.contains("[process] Run automated linters"));
    }

    #[test]
    fn report_serializes_camel_case() {
        let json = serde_json::to_value(sample_report()).unwrap();
        assert!(json.get("rawDiff").is_some());
        assert!(json.get("raw_diff").is_none());
    }
}
