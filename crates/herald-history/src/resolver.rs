//! Comparison-range resolution.
//!
//! Picks the widest range the local history supports: the configured base
//! branch when it resolves, then the previous commit, then the single-commit
//! fallback. Fetch attempts widen a shallow CI checkout first; their
//! failures are swallowed into degradation reasons.

use std::path::Path;

use git2::Repository;
use herald_core::{ChangeRange, Degraded, Outcome, RunConfig};

use crate::cmd::run_git;

/// The range a run will compare, plus the reasons it is narrower than
/// requested.
#[derive(Debug, Clone)]
pub struct ResolvedRange {
    /// Range usable by the diff collector.
    pub range: ChangeRange,
    /// Why the range degraded, if it did.
    pub degradations: Vec<Degraded>,
}

/// Resolve the comparison range for this run.
///
/// Never fails: the result is always a usable [`ChangeRange`], possibly
/// shallower than requested, with the downgrade reasons collected.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use herald_core::{EnvSnapshot, HeraldConfig, RunConfig};
/// use herald_history::resolver::resolve_range;
///
/// let config = RunConfig::resolve(&HeraldConfig::default(), &EnvSnapshot::default());
/// let resolved = resolve_range(Path::new("."), &config);
/// println!("comparing {}", resolved.range);
/// ```
pub fn resolve_range(repo_root: &Path, config: &RunConfig) -> ResolvedRange {
    let mut degradations = Vec::new();

    if let Err(d) = fetch_origin(repo_root) {
        degradations.push(d);
    }
    if let Err(d) = fetch_base(repo_root, &config.base_branch) {
        degradations.push(d);
    }

    match ref_exists(repo_root, &config.base_branch) {
        Ok(true) => {
            return ResolvedRange {
                range: ChangeRange::between(config.base_branch.clone(), "HEAD"),
                degradations,
            };
        }
        Ok(false) => degradations.push(Degraded::new(format!(
            "base reference {} not found locally; comparing against the previous commit",
            config.base_branch
        ))),
        Err(d) => degradations.push(d),
    }

    match head_has_parent(repo_root) {
        Ok(true) => ResolvedRange {
            range: ChangeRange::parent_of_head(),
            degradations,
        },
        Ok(false) => {
            degradations.push(Degraded::new(
                "HEAD has no parent; showing the single commit",
            ));
            ResolvedRange {
                range: ChangeRange::head_only(),
                degradations,
            }
        }
        Err(d) => {
            degradations.push(d);
            ResolvedRange {
                range: ChangeRange::head_only(),
                degradations,
            }
        }
    }
}

/// Widen a shallow checkout to at least two commits.
fn fetch_origin(repo_root: &Path) -> Outcome<()> {
    run_git(
        repo_root,
        &["fetch", "--no-tags", "--prune", "--depth=2", "origin"],
    )
    .map(|_| ())
}

/// Fetch the tip of the base branch so the primary range can resolve.
fn fetch_base(repo_root: &Path, base_branch: &str) -> Outcome<()> {
    let short = base_branch.rsplit('/').next().unwrap_or(base_branch);
    run_git(repo_root, &["fetch", "origin", short, "--depth=1"]).map(|_| ())
}

fn ref_exists(repo_root: &Path, name: &str) -> Outcome<bool> {
    let repo = open_repo(repo_root)?;
    let exists = repo.revparse_single(name).is_ok();
    Ok(exists)
}

fn head_has_parent(repo_root: &Path) -> Outcome<bool> {
    let repo = open_repo(repo_root)?;
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .map_err(|e| Degraded::new(format!("failed to resolve HEAD: {e}")))?;
    Ok(head.parent_count() > 0)
}

fn open_repo(repo_root: &Path) -> Outcome<Repository> {
    Repository::discover(repo_root)
        .map_err(|e| Degraded::new(format!("failed to open repository: {e}")))
}
