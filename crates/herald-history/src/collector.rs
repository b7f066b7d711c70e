//! Diff collection over a resolved range.
//!
//! Captures the stat summary, the unified diff, and exact per-file line
//! counts by shelling out to git. The collector never errors: total failure
//! yields an empty bundle plus degradation reasons, and downstream treats an
//! empty diff as "no changes".

use std::path::Path;

use herald_core::{ChangeRange, Degraded, DiffBundle, DiffStat, StatEntry};

use crate::cmd::run_git;

/// Collect the diff for `range`.
///
/// When the primary range yields no stat output and `fallback_on_empty` is
/// set, the latest commit is shown against its parent instead and the
/// downgrade is recorded. With the flag unset an empty range is a valid
/// "no changes" answer.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use herald_core::ChangeRange;
/// use herald_history::collector::collect_diff;
///
/// let bundle = collect_diff(Path::new("."), &ChangeRange::parent_of_head(), true);
/// println!("{} files changed", bundle.changed_files.len());
/// ```
pub fn collect_diff(repo_root: &Path, range: &ChangeRange, fallback_on_empty: bool) -> DiffBundle {
    let mut degradations = Vec::new();

    let mut stat_raw = capture(repo_root, &stat_args(range), &mut degradations);
    let mut patch = capture(repo_root, &patch_args(range), &mut degradations);
    let mut numstat = capture(repo_root, &numstat_args(range), &mut degradations);

    let primary_empty = stat_raw.trim().is_empty();
    if primary_empty && matches!(range, ChangeRange::Between { .. }) && fallback_on_empty {
        degradations.push(Degraded::new(format!(
            "range {range} produced no changes; falling back to the latest commit"
        )));
        let fallback = ChangeRange::head_only();
        stat_raw = capture(repo_root, &stat_args(&fallback), &mut degradations);
        patch = capture(repo_root, &patch_args(&fallback), &mut degradations);
        numstat = capture(repo_root, &numstat_args(&fallback), &mut degradations);
    }

    let changed_files = parse_stat_files(&stat_raw);
    let entries = parse_numstat(&numstat);

    DiffBundle {
        stat: DiffStat {
            entries,
            raw: stat_raw.trim().to_string(),
        },
        patch,
        changed_files,
        degradations,
    }
}

fn capture(repo_root: &Path, args: &[&str], degradations: &mut Vec<Degraded>) -> String {
    match run_git(repo_root, args) {
        Ok(text) => text,
        Err(d) => {
            degradations.push(d);
            String::new()
        }
    }
}

fn stat_args(range: &ChangeRange) -> Vec<&str> {
    match range {
        ChangeRange::Between { base, head } => vec!["diff", "--stat", base, head],
        ChangeRange::HeadOnly => vec!["show", "--stat", "--pretty=", "HEAD"],
    }
}

fn patch_args(range: &ChangeRange) -> Vec<&str> {
    match range {
        ChangeRange::Between { base, head } => vec!["diff", "--unified=3", base, head],
        ChangeRange::HeadOnly => vec!["show", "--unified=3", "HEAD"],
    }
}

fn numstat_args(range: &ChangeRange) -> Vec<&str> {
    match range {
        ChangeRange::Between { base, head } => vec!["diff", "--numstat", base, head],
        ChangeRange::HeadOnly => vec!["show", "--numstat", "--pretty=", "HEAD"],
    }
}

/// Extract changed file paths from `git diff --stat` output, in stat order.
///
/// Each stat row has the form `<path> | <markers>`; the trailing
/// `N file(s) changed, ...` summary is excluded.
///
/// # Examples
///
/// ```
/// use herald_history::collector::parse_stat_files;
///
/// let stat = " a.py | 3 ++-\n 1 file changed, 3 insertions(+)";
/// assert_eq!(parse_stat_files(stat), vec!["a.py"]);
/// ```
pub fn parse_stat_files(stat_text: &str) -> Vec<String> {
    let mut files = Vec::new();
    for line in stat_text.lines() {
        let line = line.trim();
        if line.is_empty() || is_summary_line(line) {
            continue;
        }
        let path = match line.split_once('|') {
            Some((path, _markers)) => path.trim(),
            None => line,
        };
        if !path.is_empty() {
            files.push(path.to_string());
        }
    }
    files
}

// The trailing summary row: `N file changed, ...` / `N files changed, ...`
fn is_summary_line(line: &str) -> bool {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return false;
    }
    let rest = &line[digits..];
    rest.starts_with(" file changed") || rest.starts_with(" files changed")
}

/// Parse `git diff --numstat` output into exact per-file line counts.
///
/// Binary files report `-` for both counts; those rows parse as zeros.
///
/// # Examples
///
/// ```
/// use herald_history::collector::parse_numstat;
///
/// let rows = parse_numstat("3\t1\tsrc/main.rs\n-\t-\tlogo.png\n");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].insertions, 3);
/// assert_eq!(rows[1].insertions, 0);
/// ```
pub fn parse_numstat(numstat_text: &str) -> Vec<StatEntry> {
    let mut entries = Vec::new();
    for line in numstat_text.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(ins), Some(del), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        entries.push(StatEntry {
            path: path.to_string(),
            insertions: ins.trim().parse().unwrap_or(0),
            deletions: del.trim().parse().unwrap_or(0),
        });
    }
    entries
}
