use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

/// Top-level configuration loaded from `.herald.toml`.
///
/// The file is optional; every field has a default. Runtime resolution is
/// layered: CLI flags > environment > config file > defaults, collapsed into
/// a [`RunConfig`] once at startup.
///
/// # Examples
///
/// ```
/// use herald_core::HeraldConfig;
///
/// let config = HeraldConfig::default();
/// assert_eq!(config.history.base_branch, "origin/main");
/// assert_eq!(config.output.dir, "outputs");
/// assert!(config.output.fallback_on_empty);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    /// History resolution settings.
    #[serde(default)]
    pub history: HistoryConfig,
    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
    /// Analyzer settings.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl HeraldConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Io`] if the file cannot be read, or
    /// [`HeraldError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use herald_core::HeraldConfig;
    /// use std::path::Path;
    ///
    /// let config = HeraldConfig::from_file(Path::new(".herald.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, HeraldError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`HeraldError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use herald_core::HeraldConfig;
    ///
    /// let toml = r#"
    /// [history]
    /// base_branch = "origin/develop"
    /// "#;
    /// let config = HeraldConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.history.base_branch, "origin/develop");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, HeraldError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// History resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Base reference to compare against (default: `origin/main`).
    #[serde(default = "default_base_branch")]
    pub base_branch: String,
}

fn default_base_branch() -> String {
    "origin/main".into()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base_branch: default_base_branch(),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for generated reports (default: `outputs`).
    #[serde(default = "default_output_dir")]
    pub dir: String,
    /// When the primary range yields no output, fall back to showing the
    /// latest commit against its parent (default: true). When false an
    /// empty range is reported as "no changes".
    #[serde(default = "default_true")]
    pub fallback_on_empty: bool,
}

fn default_output_dir() -> String {
    "outputs".into()
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            fallback_on_empty: true,
        }
    }
}

/// Analyzer configuration.
///
/// # Examples
///
/// ```
/// use herald_core::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert!(config.skip_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Glob patterns for changed paths excluded from the file-set checks
    /// (e.g. `"*.lock"`, `"vendor/**"`).
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

/// Telegram delivery configuration.
///
/// Both fields may instead come from `TELEGRAM_BOT_TOKEN` /
/// `TELEGRAM_CHAT_ID`; delivery is enabled only when both resolve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token for the Telegram Bot API.
    pub bot_token: Option<String>,
    /// Target chat identifier.
    pub chat_id: Option<String>,
}

/// A resolved Telegram delivery target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramTarget {
    /// Bot token for the Telegram Bot API.
    pub bot_token: String,
    /// Target chat identifier.
    pub chat_id: String,
}

/// Environment variables recognized by Herald, captured in one place.
///
/// Components never read the process environment themselves; [`RunConfig`]
/// is resolved from a snapshot taken once at startup, which keeps resolution
/// testable and the reads visible.
///
/// # Examples
///
/// ```
/// use herald_core::EnvSnapshot;
///
/// let env = EnvSnapshot {
///     github_ref: Some("refs/heads/feature/login".into()),
///     github_sha: Some("0123456789abcdef".into()),
///     ..EnvSnapshot::default()
/// };
/// assert!(env.base_branch.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    /// `BASE_BRANCH`
    pub base_branch: Option<String>,
    /// `GITHUB_REF`
    pub github_ref: Option<String>,
    /// `GITHUB_SHA`
    pub github_sha: Option<String>,
    /// `BRANCH_NAME` (used by the delivery step)
    pub branch_name: Option<String>,
    /// `SHORT_SHA` (used by the delivery step)
    pub short_sha: Option<String>,
    /// `TELEGRAM_BOT_TOKEN`
    pub telegram_bot_token: Option<String>,
    /// `TELEGRAM_CHAT_ID`
    pub telegram_chat_id: Option<String>,
}

impl EnvSnapshot {
    /// Capture the recognized variables from the process environment.
    pub fn capture() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        Self {
            base_branch: var("BASE_BRANCH"),
            github_ref: var("GITHUB_REF"),
            github_sha: var("GITHUB_SHA"),
            branch_name: var("BRANCH_NAME"),
            short_sha: var("SHORT_SHA"),
            telegram_bot_token: var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: var("TELEGRAM_CHAT_ID"),
        }
    }
}

/// Fully resolved runtime configuration, passed by value into each
/// pipeline component.
///
/// # Examples
///
/// ```
/// use herald_core::{EnvSnapshot, HeraldConfig, RunConfig};
///
/// let env = EnvSnapshot {
///     github_ref: Some("refs/heads/main".into()),
///     github_sha: Some("0123456789abcdef".into()),
///     ..EnvSnapshot::default()
/// };
/// let config = RunConfig::resolve(&HeraldConfig::default(), &env);
/// assert_eq!(config.branch_name, "main");
/// assert_eq!(config.short_sha, "0123456");
/// ```
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Base reference for the comparison range.
    pub base_branch: String,
    /// Branch name used in output file names and captions.
    pub branch_name: String,
    /// Short commit id used in output file names and captions.
    pub short_sha: String,
    /// Directory reports are written to.
    pub output_dir: PathBuf,
    /// Whether an empty primary range falls back to the latest commit.
    pub fallback_on_empty: bool,
    /// Glob patterns excluded from the analyzer's file-set checks.
    pub skip_patterns: Vec<String>,
    /// Delivery target, when both token and chat id resolve.
    pub telegram: Option<TelegramTarget>,
}

impl RunConfig {
    /// Resolve the runtime configuration from a config file and an
    /// environment snapshot.
    pub fn resolve(file: &HeraldConfig, env: &EnvSnapshot) -> Self {
        let branch_name = env
            .github_ref
            .as_deref()
            .map(strip_ref_prefix)
            .filter(|b| !b.is_empty())
            .or_else(|| env.branch_name.clone())
            .unwrap_or_else(|| "unknown-branch".into());

        let short_sha = env
            .github_sha
            .as_deref()
            .map(|sha| sha.chars().take(7).collect::<String>())
            .filter(|s| !s.is_empty())
            .or_else(|| env.short_sha.clone())
            .unwrap_or_else(|| "unknown".into());

        let base_branch = env
            .base_branch
            .clone()
            .unwrap_or_else(|| file.history.base_branch.clone());

        let bot_token = env
            .telegram_bot_token
            .clone()
            .or_else(|| file.telegram.bot_token.clone());
        let chat_id = env
            .telegram_chat_id
            .clone()
            .or_else(|| file.telegram.chat_id.clone());
        let telegram = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) => Some(TelegramTarget { bot_token, chat_id }),
            _ => None,
        };

        Self {
            base_branch,
            branch_name,
            short_sha,
            output_dir: PathBuf::from(&file.output.dir),
            fallback_on_empty: file.output.fallback_on_empty,
            skip_patterns: file.analyzer.skip_patterns.clone(),
            telegram,
        }
    }
}

fn strip_ref_prefix(git_ref: &str) -> String {
    git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(git_ref)
        .to_string()
}
