use std::path::Path;
use std::process::Command;

use herald_core::{Degraded, Outcome};

/// Run git with `args` in `repo_root`, capturing stdout as text.
///
/// A non-zero exit or spawn failure degrades with the command line and the
/// trimmed stderr; it never panics or propagates an error type.
pub(crate) fn run_git(repo_root: &Path, args: &[&str]) -> Outcome<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo_root)
        .args(args)
        .output()
        .map_err(|e| Degraded::new(format!("failed to run git {}: {e}", args.join(" "))))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Degraded::new(format!(
            "git {} exited with {}: {}",
            args.join(" "),
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
pub(crate) fn git_available() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}
