//! Latest-commit probe.

use std::path::Path;

use git2::Repository;
use herald_core::{Degraded, Outcome};

/// Fetch the latest commit's full message.
///
/// Degrades (rather than failing the run) when there is no repository or no
/// commit to read; the caller then skips the commit-message heuristic.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use herald_history::commit::latest_commit_message;
///
/// let message = latest_commit_message(Path::new(".")).unwrap_or_default();
/// println!("{}", message.lines().next().unwrap_or(""));
/// ```
pub fn latest_commit_message(repo_root: &Path) -> Outcome<String> {
    let repo = Repository::discover(repo_root)
        .map_err(|e| Degraded::new(format!("failed to open repository: {e}")))?;
    let commit = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .map_err(|e| Degraded::new(format!("failed to resolve HEAD commit: {e}")))?;
    Ok(commit.message().unwrap_or("").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_repo_with_message(message: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let sig = git2::Signature::now("herald", "herald@example.com").unwrap();
        let tree_id = {
            let mut index = repo.index().unwrap();
            index.write_tree().unwrap()
        };
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])
            .unwrap();
        dir
    }

    #[test]
    fn reads_latest_message() {
        let dir = temp_repo_with_message("feat(auth): add token refresh\n\nLonger body.\n");
        let message = latest_commit_message(dir.path()).unwrap();
        assert!(message.starts_with("feat(auth): add token refresh"));
        assert!(message.contains("Longer body."));
    }

    #[test]
    fn missing_repository_degrades() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_commit_message(dir.path()).is_err());
    }

    #[test]
    fn empty_repository_degrades() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        // HEAD exists but points at an unborn branch
        assert!(latest_commit_message(dir.path()).is_err());
    }
}
