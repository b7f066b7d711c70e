use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Degraded;

/// The two version-control points being compared.
///
/// Created once by the history resolver and immutable afterward. The
/// degraded forms cover shallow checkouts: a repository whose `HEAD` has no
/// parent can only be compared against itself.
///
/// # Examples
///
/// ```
/// use herald_core::ChangeRange;
///
/// let range = ChangeRange::between("origin/main", "HEAD");
/// assert_eq!(range.to_string(), "origin/main..HEAD");
///
/// let shallow = ChangeRange::head_only();
/// assert_eq!(shallow.to_string(), "HEAD");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChangeRange {
    /// Compare `base` against `head`.
    Between {
        /// Base reference (e.g. `origin/main` or `HEAD~1`).
        base: String,
        /// Head reference (normally `HEAD`).
        head: String,
    },
    /// Single-commit case: show `HEAD` against its (missing) parent.
    HeadOnly,
}

impl ChangeRange {
    /// Range comparing `base` against `head`.
    pub fn between(base: impl Into<String>, head: impl Into<String>) -> Self {
        ChangeRange::Between {
            base: base.into(),
            head: head.into(),
        }
    }

    /// Range comparing the previous commit against the current one.
    pub fn parent_of_head() -> Self {
        ChangeRange::between("HEAD~1", "HEAD")
    }

    /// Degenerate range for a history with a single commit.
    pub fn head_only() -> Self {
        ChangeRange::HeadOnly
    }
}

impl fmt::Display for ChangeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeRange::Between { base, head } => write!(f, "{base}..{head}"),
            ChangeRange::HeadOnly => write!(f, "HEAD"),
        }
    }
}

/// One row of a `git diff --stat` summary.
///
/// # Examples
///
/// ```
/// use herald_core::StatEntry;
///
/// let row = StatEntry {
///     path: "src/main.rs".into(),
///     insertions: 12,
///     deletions: 3,
/// };
/// assert_eq!(row.insertions, 12);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    /// Path relative to the repository root.
    pub path: String,
    /// Lines added in this file.
    pub insertions: u64,
    /// Lines deleted in this file.
    pub deletions: u64,
}

/// Per-file change summary plus the raw stat text as git rendered it.
///
/// The raw text goes into the report verbatim; the parsed entries feed the
/// analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStat {
    /// Parsed summary rows in stat order.
    pub entries: Vec<StatEntry>,
    /// Raw `git diff --stat` output.
    pub raw: String,
}

impl DiffStat {
    /// `true` when git reported no changed files.
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

/// Everything the diff collector produces for one run.
///
/// An empty bundle means "no changes", never an error: collection failures
/// surface as [`Degraded`] reasons, not as empty-looking silence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffBundle {
    /// Stat summary for the resolved range.
    pub stat: DiffStat,
    /// Full unified diff with 3 lines of context. Never mutated downstream.
    pub patch: String,
    /// Changed file paths parsed from the stat text, in stat order.
    pub changed_files: Vec<String>,
    /// Reasons the bundle is shallower than requested, if any.
    pub degradations: Vec<Degraded>,
}

/// One noteworthy fact extracted from a diff.
///
/// Findings are collected in order of first appearance in the diff; the
/// file-set findings (`LargeFile`, `MissingTests`) and the whole-text
/// `PossibleSecret` follow the line findings in a fixed order.
///
/// # Examples
///
/// ```
/// use herald_core::Finding;
///
/// let f = Finding::FunctionAdded {
///     name: "connect".into(),
///     file: "src/db.rs".into(),
/// };
/// let json = serde_json::to_value(&f).unwrap();
/// assert_eq!(json["kind"], "functionAdded");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Finding {
    /// A function definition appeared on an added line.
    FunctionAdded {
        /// Function name as written in the definition.
        name: String,
        /// File the definition appeared in (from the nearest `+++` header).
        file: String,
    },
    /// A function definition appeared on a removed line.
    FunctionRemoved {
        /// Function name as written in the definition.
        name: String,
        /// File the removal appeared in.
        file: String,
    },
    /// A class definition appeared on an added line.
    ClassAdded {
        /// Class name.
        name: String,
        /// File the definition appeared in.
        file: String,
    },
    /// A TODO or FIXME marker on an added or removed line.
    TodoMarker {
        /// Trimmed text of the marker line.
        text: String,
    },
    /// Git reported a binary file change.
    BinaryFileChanged {
        /// Path extracted from the `Binary files ... differ` line.
        path: String,
    },
    /// A changed file on disk exceeds the size threshold.
    LargeFile {
        /// Path relative to the repository root.
        path: String,
        /// Exact size in bytes.
        size: u64,
    },
    /// The diff contains a secret-looking token. Reported at most once.
    PossibleSecret,
    /// Source paths changed without any test path changing.
    MissingTests,
}

/// Stable rationale category for a recommendation.
///
/// # Examples
///
/// ```
/// use herald_core::Category;
///
/// assert_eq!(Category::Secrets.to_string(), "secrets");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Test coverage concerns.
    Tests,
    /// Credential and secret hygiene.
    Secrets,
    /// Artifact and change size concerns.
    Size,
    /// Documentation concerns.
    Docs,
    /// Workflow and review-process concerns.
    Process,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tests => write!(f, "tests"),
            Category::Secrets => write!(f, "secrets"),
            Category::Size => write!(f, "size"),
            Category::Docs => write!(f, "docs"),
            Category::Process => write!(f, "process"),
        }
    }
}

/// Identifies which rule produced a recommendation.
///
/// The derivation order in the report is fixed: the variants below are
/// listed in that order, with the two `always` entries last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    /// TODO/FIXME markers present.
    ResolveTodos,
    /// Binary files changed.
    BinaryArtifacts,
    /// Oversized files changed.
    LargeAssets,
    /// Source changed without tests.
    AddTests,
    /// Commit message empty or too short.
    CommitMessage,
    /// New functions added.
    DocumentNewFunctions,
    /// Secret-looking tokens in the diff.
    SecretsExposure,
    /// Always emitted: lint in CI.
    LintInCi,
    /// Always emitted: review infra changes.
    InfraReview,
}

/// A human-readable suggestion derived deterministically from the finding
/// set. Each kind appears at most once per report.
///
/// # Examples
///
/// ```
/// use herald_core::{Category, Recommendation, RecommendationKind};
///
/// let rec = Recommendation {
///     kind: RecommendationKind::AddTests,
///     category: Category::Tests,
///     text: "Add tests for the modified modules.".into(),
/// };
/// assert_eq!(rec.category, Category::Tests);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Which rule produced this recommendation.
    pub kind: RecommendationKind,
    /// Stable rationale category.
    pub category: Category,
    /// Suggestion text rendered into the report.
    pub text: String,
}

/// Output format for the `analyze` subcommand.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument
/// parsing.
///
/// # Examples
///
/// ```
/// use herald_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown, identical to the written report file.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_range_display() {
        assert_eq!(
            ChangeRange::between("origin/main", "HEAD").to_string(),
            "origin/main..HEAD"
        );
        assert_eq!(ChangeRange::parent_of_head().to_string(), "HEAD~1..HEAD");
        assert_eq!(ChangeRange::head_only().to_string(), "HEAD");
    }

    #[test]
    fn diff_stat_empty_checks_raw_text() {
        let empty = DiffStat::default();
        assert!(empty.is_empty());

        let stat = DiffStat {
            entries: vec![],
            raw: " a.py | 3 ++-\n 1 file changed".into(),
        };
        assert!(!stat.is_empty());
    }

    #[test]
    fn finding_serializes_tagged_camel_case() {
        let f = Finding::LargeFile {
            path: "assets/model.bin".into(),
            size: 600_000,
        };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "largeFile");
        assert_eq!(json["size"], 600_000);

        let f = Finding::MissingTests;
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "missingTests");
    }

    #[test]
    fn finding_roundtrips_through_json() {
        let f = Finding::TodoMarker {
            text: "TODO: handle zero division".into(),
        };
        let json = serde_json::to_string(&f).unwrap();
        let back: Finding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }

    #[test]
    fn recommendation_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&RecommendationKind::LintInCi).unwrap();
        assert_eq!(json, "\"lint-in-ci\"");
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_default_is_text() {
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Tests.to_string(), "tests");
        assert_eq!(Category::Process.to_string(), "process");
    }
}
