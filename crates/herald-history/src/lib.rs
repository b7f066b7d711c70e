//! History resolution and diff collection.
//!
//! Resolves the comparison range for a run (configured base branch, the
//! previous commit, or a single-commit fallback), then shells out to git to
//! capture the stat summary and unified diff as text. Every external call is
//! wrapped in [`herald_core::Outcome`]: failures degrade the range or the
//! bundle, they never abort the run.

mod cmd;
pub mod collector;
pub mod commit;
pub mod resolver;
