use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};

use herald_core::{
    Degraded, DiffBundle, DiffStat, EnvSnapshot, HeraldConfig, OutputFormat, RunConfig,
};
use herald_lens::filter::PathFilter;
use herald_report::builder::{report_paths, write_markdown, Report};
use herald_report::render::{render_document, RenderOutcome};
use herald_report::telegram::{caption, TelegramClient};

#[derive(Parser)]
#[command(
    name = "herald",
    version,
    about = "CI change herald — deterministic diff summaries and review recommendations",
    long_about = "Herald turns a CI run's diff into a markdown change summary with\n\
                   deterministic review recommendations, renders it to PDF when a\n\
                   converter is available, and can deliver the document to a chat.\n\n\
                   Examples:\n  \
                     herald run                      Summarize the current checkout\n  \
                     herald run --send               Summarize and deliver to Telegram\n  \
                     git diff main | herald analyze  Analyze a diff from stdin\n  \
                     herald analyze --file ch.patch  Analyze a patch file\n  \
                     herald doctor                   Check setup and environment"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .herald.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text      Human-readable summary (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  The report exactly as written to disk"
    )]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: resolve, collect, analyze, report, render
    #[command(long_about = "Run the full pipeline against the working tree.\n\n\
        Resolves a comparison range (base branch, previous commit, or the single\n\
        commit on a shallow checkout), collects the diff, scans it with the\n\
        heuristic analyzer, and writes outputs/summary_<branch>_<sha>.md plus a\n\
        best-effort PDF. Always exits 0 on happy and degraded paths so it never\n\
        blocks CI.\n\n\
        Examples:\n  herald run\n  herald run --base-branch origin/develop --send\n  herald run --no-fallback")]
    Run {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Base reference override (also: BASE_BRANCH env var)
        #[arg(long)]
        base_branch: Option<String>,

        /// Output directory override
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Report an empty primary range as "no changes" instead of falling
        /// back to the latest commit
        #[arg(long)]
        no_fallback: bool,

        /// Deliver the rendered document to Telegram after the run
        #[arg(long)]
        send: bool,
    },
    /// Analyze a diff from stdin or a file without touching git
    #[command(long_about = "Analyze a diff without a repository.\n\n\
        Runs the heuristic analyzer and report builder over a unified diff read\n\
        from stdin or a file. Nothing is written to disk; the report goes to\n\
        stdout in the chosen format. The changed-file list is derived from the\n\
        patch headers.\n\n\
        Examples:\n  git diff main | herald analyze\n  herald analyze --file changes.patch --format json")]
    Analyze {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Deliver an already-generated document to Telegram
    #[command(long_about = "Deliver an already-generated document to Telegram.\n\n\
        Looks up outputs/summary_<branch>_<sha>.pdf using BRANCH_NAME and\n\
        SHORT_SHA (or GITHUB_REF / GITHUB_SHA) and posts it with a fixed\n\
        caption. A missing document is a warning, not a failure; a non-2xx\n\
        response is logged and never retried.")]
    Send,
    /// Create a default .herald.toml configuration file
    #[command(long_about = "Create a default .herald.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .herald.toml already exists.")]
    Init,
    /// Check your Herald setup and environment
    Doctor,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("herald v{version} — CI change summaries that never block the build\n");

    println!("Quick start:");
    println!("  herald init                      Create a .herald.toml config file");
    println!("  herald run                       Summarize the current checkout");
    println!("  git diff main | herald analyze   Analyze a diff from stdin\n");

    println!("All commands:");
    println!("  run       Full pipeline: resolve, collect, analyze, report, render");
    println!("  analyze   Heuristic analysis of a diff from stdin or a file");
    println!("  send      Deliver a generated document to Telegram");
    println!("  doctor    Check your setup and environment");
    println!("  init      Create default configuration\n");

    println!("Run 'herald <command> --help' for details.");
}

fn read_diff_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

#[derive(serde::Serialize)]
struct CheckResult {
    name: &'static str,
    status: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CheckResult {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "pass",
            detail: detail.into(),
            hint: None,
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>, hint: impl Into<String>) -> Self {
        Self {
            name,
            status: "fail",
            detail: detail.into(),
            hint: Some(hint.into()),
        }
    }

    fn info(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            status: "info",
            detail: detail.into(),
            hint: None,
        }
    }

    fn symbol(&self) -> &'static str {
        match self.status {
            "pass" => "\u{2713}",
            "fail" => "\u{2717}",
            _ => "~",
        }
    }
}

fn run_doctor(config: &HeraldConfig, format: OutputFormat) -> Result<()> {
    let mut checks: Vec<CheckResult> = Vec::new();

    match git2::Repository::discover(".") {
        Ok(repo) => checks.push(CheckResult::pass(
            "git_repository",
            format!("detected at {}", repo.path().display()),
        )),
        Err(_) => checks.push(CheckResult::fail(
            "git_repository",
            "not a git repository",
            "run herald from inside a git repository",
        )),
    }

    if Path::new(".herald.toml").exists() {
        checks.push(CheckResult::pass("config_file", ".herald.toml found"));
    } else {
        checks.push(CheckResult::fail(
            "config_file",
            ".herald.toml not found",
            "run 'herald init' to create a default config",
        ));
    }

    let output_dir = Path::new(&config.output.dir);
    if output_dir.exists() {
        checks.push(CheckResult::pass(
            "output_dir",
            format!("{} exists", output_dir.display()),
        ));
    } else {
        checks.push(CheckResult::info(
            "output_dir",
            format!("{} will be created on first run", output_dir.display()),
        ));
    }

    match which::which("pandoc") {
        Ok(path) => checks.push(CheckResult::pass(
            "pdf_renderer",
            format!("pandoc at {}", path.display()),
        )),
        Err(_) => checks.push(CheckResult::info(
            "pdf_renderer",
            "pandoc not found; reports degrade to markdown in the .pdf path",
        )),
    }

    let env = EnvSnapshot::capture();
    let resolved = RunConfig::resolve(config, &env);
    if resolved.telegram.is_some() {
        checks.push(CheckResult::pass("telegram", "bot token and chat id set"));
    } else {
        checks.push(CheckResult::info(
            "telegram",
            "not configured (set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID to deliver reports)",
        ));
    }

    match format {
        OutputFormat::Json => {
            let version = env!("CARGO_PKG_VERSION");
            let json = serde_json::json!({
                "version": version,
                "checks": checks,
            });
            println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        }
        _ => {
            let version = env!("CARGO_PKG_VERSION");
            println!("Herald v{version} — Environment Check\n");

            for check in &checks {
                let label = check.name.replace('_', " ");
                println!("  {} {label:<16} {}", check.symbol(), check.detail);
                if let Some(hint) = &check.hint {
                    println!("    hint: {hint}");
                }
            }

            let passed = checks.iter().filter(|c| c.status == "pass").count();
            let failed = checks.iter().filter(|c| c.status == "fail").count();
            let info = checks.iter().filter(|c| c.status == "info").count();
            println!("\n{passed} checks passed, {failed} failed, {info} info");
        }
    }

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Herald Configuration
# See: https://github.com/herald-ci/herald

[history]
# Base reference to compare against (also: BASE_BRANCH env var)
# base_branch = "origin/main"

[output]
# dir = "outputs"
# When the primary range yields no changes, fall back to showing the
# latest commit against its parent. Set false to report "no changes".
# fallback_on_empty = true

[analyzer]
# Changed paths excluded from the large-file and missing-tests checks
# skip_patterns = ["*.lock", "vendor/**"]

[telegram]
# bot_token = ""   # or TELEGRAM_BOT_TOKEN
# chat_id = ""     # or TELEGRAM_CHAT_ID
"#;

async fn run_pipeline(
    file_config: &HeraldConfig,
    repo: &Path,
    base_branch: Option<String>,
    output_dir: Option<PathBuf>,
    no_fallback: bool,
    send: bool,
    verbose: bool,
) {
    let env = EnvSnapshot::capture();
    let mut config = RunConfig::resolve(file_config, &env);
    if let Some(base) = base_branch {
        config.base_branch = base;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if no_fallback {
        config.fallback_on_empty = false;
    }

    let resolved = herald_history::resolver::resolve_range(repo, &config);
    if verbose {
        eprintln!("comparing {}", resolved.range);
    }

    let bundle =
        herald_history::collector::collect_diff(repo, &resolved.range, config.fallback_on_empty);
    let DiffBundle {
        stat,
        patch,
        changed_files,
        degradations: collect_degradations,
    } = bundle;

    let mut degradations: Vec<Degraded> = resolved.degradations;
    degradations.extend(collect_degradations);

    let commit_message = match herald_history::commit::latest_commit_message(repo) {
        Ok(message) => Some(message),
        Err(d) => {
            degradations.push(d);
            None
        }
    };

    let filter = PathFilter::new(&config.skip_patterns);
    let analysis = herald_lens::scan::analyze(&patch, &changed_files, repo, &filter);
    let recommendations =
        herald_lens::recommend::derive(&analysis.findings, commit_message.as_deref());

    if verbose {
        eprintln!(
            "{} changed files, {} findings, {} degradations",
            changed_files.len(),
            analysis.findings.len(),
            degradations.len(),
        );
    }

    let report = Report::new(
        &config.branch_name,
        &config.short_sha,
        stat,
        analysis.narrative,
        analysis.findings,
        recommendations,
        patch,
        degradations,
    );
    let markdown = report.to_markdown();

    let (md_path, pdf_path) =
        report_paths(&config.output_dir, &config.branch_name, &config.short_sha);
    if let Err(e) = write_markdown(&markdown, &md_path) {
        eprintln!("warning: failed to write {}: {e}", md_path.display());
        return;
    }
    eprintln!("Wrote summary: {}", md_path.display());

    match render_document(&markdown, &pdf_path) {
        Ok(RenderOutcome::Pdf) => eprintln!("Wrote PDF: {}", pdf_path.display()),
        Ok(RenderOutcome::MarkdownFallback(d)) => {
            eprintln!("warning: {d}; wrote markdown to {}", pdf_path.display());
        }
        Err(e) => eprintln!("warning: failed to write {}: {e}", pdf_path.display()),
    }

    if send {
        deliver(&config, &pdf_path).await;
    }
}

async fn deliver(config: &RunConfig, document: &Path) {
    let Some(target) = config.telegram.clone() else {
        eprintln!(
            "warning: Telegram delivery not configured (set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID)"
        );
        return;
    };
    if !document.exists() {
        eprintln!("warning: document not found: {}", document.display());
        return;
    }

    let is_tty = std::io::stderr().is_terminal();
    let spinner = if is_tty {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner()),
        );
        pb.set_message("Delivering document...");
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let client = TelegramClient::new(target);
    let result = client
        .send_document(document, &caption(&config.branch_name, &config.short_sha))
        .await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(()) => eprintln!("Sent {} to Telegram", document.display()),
        Err(d) => eprintln!("warning: {d}"),
    }
}

fn run_analyze(
    file_config: &HeraldConfig,
    file: &Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let input = read_diff_input(file)?;

    let changed_files = herald_lens::scan::changed_files_from_patch(&input);
    let filter = PathFilter::new(&file_config.analyzer.skip_patterns);
    let analysis = herald_lens::scan::analyze(&input, &changed_files, Path::new("."), &filter);
    let recommendations = herald_lens::recommend::derive(&analysis.findings, None);

    let env = EnvSnapshot::capture();
    let config = RunConfig::resolve(file_config, &env);
    let report = Report::new(
        &config.branch_name,
        &config.short_sha,
        DiffStat::default(),
        analysis.narrative,
        analysis.findings,
        recommendations,
        input,
        vec![],
    );

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        }
        OutputFormat::Markdown => {
            print!("{}", report.to_markdown());
        }
        OutputFormat::Text => {
            print!("{report}");
        }
    }

    Ok(())
}

async fn run_send(file_config: &HeraldConfig) {
    let env = EnvSnapshot::capture();
    let config = RunConfig::resolve(file_config, &env);
    let (_md_path, pdf_path) =
        report_paths(&config.output_dir, &config.branch_name, &config.short_sha);
    deliver(&config, &pdf_path).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HeraldConfig::from_file(path)
            .into_diagnostic()
            .wrap_err(format!("loading {}", path.display()))?,
        None => {
            let default_path = Path::new(".herald.toml");
            if default_path.exists() {
                HeraldConfig::from_file(default_path)
                    .into_diagnostic()
                    .wrap_err("loading .herald.toml")?
            } else {
                HeraldConfig::default()
            }
        }
    };

    match cli.command {
        None => {
            print_welcome();
        }
        Some(Command::Run {
            ref repo,
            ref base_branch,
            ref output_dir,
            no_fallback,
            send,
        }) => {
            run_pipeline(
                &config,
                repo,
                base_branch.clone(),
                output_dir.clone(),
                no_fallback,
                send,
                cli.verbose,
            )
            .await;
        }
        Some(Command::Analyze { ref file }) => {
            run_analyze(&config, file, cli.format)?;
        }
        Some(Command::Send) => {
            run_send(&config).await;
        }
        Some(Command::Init) => {
            let path = Path::new(".herald.toml");
            if path.exists() {
                miette::bail!(".herald.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .herald.toml with default configuration");
        }
        Some(Command::Doctor) => {
            run_doctor(&config, cli.format)?;
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "herald", &mut std::io::stdout());
        }
    }

    Ok(())
}
