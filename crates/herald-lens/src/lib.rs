//! Heuristic diff analysis: line classifiers, findings, and recommendations.
//!
//! Scans unified-diff text line by line with one [`classify::LineClassifier`]
//! per rule, merges the results into an ordered finding sequence, and derives
//! a deterministic set of review recommendations from it. Re-running the
//! analyzer on the same diff always yields identical output.

pub mod classify;
pub mod filter;
pub mod recommend;
pub mod scan;
