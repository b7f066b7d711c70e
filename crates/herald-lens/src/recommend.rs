//! Deterministic recommendation derivation.
//!
//! Maps the finding set (plus the commit-message probe) to review
//! recommendations. Each condition is independent, each recommendation
//! appears at most once, and the output order is fixed, so identical
//! findings always produce identical output.

use herald_core::{Category, Finding, Recommendation, RecommendationKind};

/// First lines shorter than this many characters trip the commit-message
/// quality rule.
pub const MIN_COMMIT_SUBJECT_CHARS: usize = 10;

/// Derive recommendations from `findings` and the latest commit message.
///
/// `commit_message` is `None` when the probe degraded (or when analyzing a
/// raw diff with no repository); the commit-message rule is then skipped.
///
/// # Examples
///
/// ```
/// use herald_core::{Finding, RecommendationKind};
/// use herald_lens::recommend::derive;
///
/// let findings = vec![Finding::MissingTests];
/// let recs = derive(&findings, Some("feat(core): add collector fallback"));
/// assert_eq!(recs[0].kind, RecommendationKind::AddTests);
/// // The two process recommendations are always appended
/// assert_eq!(recs.last().unwrap().kind, RecommendationKind::InfraReview);
/// ```
pub fn derive(findings: &[Finding], commit_message: Option<&str>) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if findings.iter().any(|f| matches!(f, Finding::TodoMarker { .. })) {
        recs.push(rec(
            RecommendationKind::ResolveTodos,
            Category::Process,
            "Resolve TODO/FIXME items before merging; they often indicate incomplete logic or edge cases.",
        ));
    }

    if findings
        .iter()
        .any(|f| matches!(f, Finding::BinaryFileChanged { .. }))
    {
        recs.push(rec(
            RecommendationKind::BinaryArtifacts,
            Category::Size,
            "Binary files changed; ensure these are intended (e.g. models, images) and prefer storing large artifacts in releases or object storage.",
        ));
    }

    if findings.iter().any(|f| matches!(f, Finding::LargeFile { .. })) {
        recs.push(rec(
            RecommendationKind::LargeAssets,
            Category::Size,
            "Large file changes detected; consider storing large assets outside the repo (S3/GCS) and referencing them instead.",
        ));
    }

    if findings.iter().any(|f| matches!(f, Finding::MissingTests)) {
        recs.push(rec(
            RecommendationKind::AddTests,
            Category::Tests,
            "Code changes detected without test changes; add unit/integration tests focused on the modified modules.",
        ));
    }

    if let Some(message) = commit_message {
        if subject_too_short(message) {
            recs.push(rec(
                RecommendationKind::CommitMessage,
                Category::Process,
                "Commit message is short or missing. Use descriptive commit messages: [TYPE] scope: short description (e.g. feat(auth): add token refresh).",
            ));
        }
    }

    if findings
        .iter()
        .any(|f| matches!(f, Finding::FunctionAdded { .. }))
    {
        recs.push(rec(
            RecommendationKind::DocumentNewFunctions,
            Category::Docs,
            "New functions added; ensure they include doc comments and are covered by unit tests.",
        ));
    }

    if findings.iter().any(|f| matches!(f, Finding::PossibleSecret)) {
        recs.push(rec(
            RecommendationKind::SecretsExposure,
            Category::Secrets,
            "Possible secrets detected in the diff; store credentials in a secrets manager and never commit them.",
        ));
    }

    recs.push(rec(
        RecommendationKind::LintInCi,
        Category::Process,
        "Run automated linters and formatters in CI and fail the build on lint errors.",
    ));
    recs.push(rec(
        RecommendationKind::InfraReview,
        Category::Process,
        "For changes touching infra, CI/CD, or dependencies, require at least one approving review and run full integration tests.",
    ));

    recs
}

/// Whether a commit message trips the quality rule: empty, or a first line
/// shorter than [`MIN_COMMIT_SUBJECT_CHARS`].
///
/// # Examples
///
/// ```
/// use herald_lens::recommend::subject_too_short;
///
/// assert!(subject_too_short(""));
/// assert!(subject_too_short("wip"));
/// assert!(!subject_too_short("feat(auth): add token refresh"));
/// ```
pub fn subject_too_short(message: &str) -> bool {
    let subject = message.lines().next().unwrap_or("").trim();
    subject.chars().count() < MIN_COMMIT_SUBJECT_CHARS
}

fn rec(kind: RecommendationKind, category: Category, text: &str) -> Recommendation {
    Recommendation {
        kind,
        category,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(recs: &[Recommendation]) -> Vec<RecommendationKind> {
        recs.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn empty_findings_still_emit_the_two_process_recommendations() {
        let recs = derive(&[], Some("feat: a perfectly fine commit message"));
        assert_eq!(
            kinds(&recs),
            vec![RecommendationKind::LintInCi, RecommendationKind::InfraReview]
        );
    }

    #[test]
    fn output_order_is_fixed() {
        let findings = vec![
            Finding::PossibleSecret,
            Finding::MissingTests,
            Finding::TodoMarker {
                text: "TODO: x".into(),
            },
            Finding::FunctionAdded {
                name: "f".into(),
                file: "a.py".into(),
            },
            Finding::LargeFile {
                path: "big.bin".into(),
                size: 600_000,
            },
            Finding::BinaryFileChanged {
                path: "logo.png".into(),
            },
        ];
        let recs = derive(&findings, Some("wip"));
        assert_eq!(
            kinds(&recs),
            vec![
                RecommendationKind::ResolveTodos,
                RecommendationKind::BinaryArtifacts,
                RecommendationKind::LargeAssets,
                RecommendationKind::AddTests,
                RecommendationKind::CommitMessage,
                RecommendationKind::DocumentNewFunctions,
                RecommendationKind::SecretsExposure,
                RecommendationKind::LintInCi,
                RecommendationKind::InfraReview,
            ]
        );
    }

    #[test]
    fn each_recommendation_appears_once_regardless_of_finding_count() {
        let findings = vec![
            Finding::TodoMarker {
                text: "TODO: a".into(),
            },
            Finding::TodoMarker {
                text: "TODO: b".into(),
            },
            Finding::TodoMarker {
                text: "TODO: c".into(),
            },
        ];
        let recs = derive(&findings, None);
        let todo_recs = recs
            .iter()
            .filter(|r| r.kind == RecommendationKind::ResolveTodos)
            .count();
        assert_eq!(todo_recs, 1);
    }

    #[test]
    fn secret_finding_yields_one_secrets_recommendation() {
        let findings = vec![Finding::PossibleSecret];
        let recs = derive(&findings, None);
        let secret_recs: Vec<_> = recs
            .iter()
            .filter(|r| r.kind == RecommendationKind::SecretsExposure)
            .collect();
        assert_eq!(secret_recs.len(), 1);
        assert_eq!(secret_recs[0].category, Category::Secrets);
    }

    #[test]
    fn commit_message_rule_skipped_without_a_message() {
        let recs = derive(&[], None);
        assert!(!kinds(&recs).contains(&RecommendationKind::CommitMessage));
    }

    #[test]
    fn short_and_empty_subjects_trip_the_rule() {
        assert!(subject_too_short(""));
        assert!(subject_too_short("fix"));
        assert!(subject_too_short("123456789")); // 9 chars
        assert!(!subject_too_short("1234567890")); // 10 chars
        assert!(!subject_too_short("fix: correct rounding in totals"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let findings = vec![Finding::MissingTests, Finding::PossibleSecret];
        let first = derive(&findings, Some("wip"));
        let second = derive(&findings, Some("wip"));
        assert_eq!(first, second);
    }
}
