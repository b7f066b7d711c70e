//! Path-level noise filtering for the file-set checks.
//!
//! Changed paths matching the configured glob patterns (lock files,
//! vendored code, generated output) are excluded from the large-file and
//! missing-tests checks so machine-written churn does not drown the report.

use glob::Pattern;

/// Compiled skip patterns.
///
/// # Examples
///
/// ```
/// use herald_lens::filter::PathFilter;
///
/// let filter = PathFilter::new(&["*.lock".into(), "vendor/**".into()]);
/// assert!(filter.should_skip("Cargo.lock"));
/// assert!(filter.should_skip("vendor/lib/mod.js"));
/// assert!(!filter.should_skip("src/main.rs"));
/// ```
#[derive(Debug, Default)]
pub struct PathFilter {
    patterns: Vec<Pattern>,
}

impl PathFilter {
    /// Compile `patterns`, ignoring any that fail to parse.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// Check whether `path` matches any skip pattern.
    pub fn should_skip(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Return the paths that survive the filter, preserving order.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_lens::filter::PathFilter;
    ///
    /// let filter = PathFilter::new(&["*.min.js".into()]);
    /// let paths = vec!["app.min.js".to_string(), "src/app.js".to_string()];
    /// assert_eq!(filter.retain(&paths), vec!["src/app.js"]);
    /// ```
    pub fn retain<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| !self.should_skip(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_keeps_everything() {
        let filter = PathFilter::new(&[]);
        assert!(!filter.should_skip("anything/at/all.py"));
    }

    #[test]
    fn invalid_patterns_are_ignored() {
        let filter = PathFilter::new(&["[".into(), "*.lock".into()]);
        assert!(filter.should_skip("Cargo.lock"));
        assert!(!filter.should_skip("src/lib.rs"));
    }

    #[test]
    fn retain_preserves_order() {
        let filter = PathFilter::new(&["target/**".into()]);
        let paths = vec![
            "src/a.rs".to_string(),
            "target/debug/out".to_string(),
            "src/b.rs".to_string(),
        ];
        assert_eq!(filter.retain(&paths), vec!["src/a.rs", "src/b.rs"]);
    }
}
