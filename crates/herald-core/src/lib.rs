//! Core types, configuration, and error handling for Herald.
//!
//! This crate provides the shared foundation used by all other Herald crates:
//! - [`HeraldError`] — unified error type using `thiserror`
//! - [`Degraded`] / [`Outcome`] — soft-failure results for external calls
//! - [`HeraldConfig`] / [`RunConfig`] — configuration from `.herald.toml`,
//!   the environment, and CLI flags, resolved once at startup
//! - Shared types: [`ChangeRange`], [`DiffStat`], [`DiffBundle`],
//!   [`Finding`], [`Recommendation`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{
    AnalyzerConfig, EnvSnapshot, HeraldConfig, HistoryConfig, OutputConfig, RunConfig,
    TelegramConfig, TelegramTarget,
};
pub use error::{Degraded, HeraldError, Outcome};
pub use types::{
    Category, ChangeRange, DiffBundle, DiffStat, Finding, OutputFormat, Recommendation,
    RecommendationKind, StatEntry,
};

/// A convenience `Result` type for Herald operations.
pub type Result<T> = std::result::Result<T, HeraldError>;
