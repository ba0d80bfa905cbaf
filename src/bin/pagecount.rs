//! CLI binary for doc-pagecount.
//!
//! A thin shim over the library crate that maps CLI flags to `CountConfig`,
//! counts every file given on the command line and prints the results.

use anyhow::{Context, Result};
use clap::Parser;
use doc_pagecount::{count_report, CountConfig, PageCountReport, Platform};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One document
  pagecount resume.docx

  # Several documents, four at a time
  pagecount -c 4 cv.pdf letter.doc portfolio.docx

  # JSON for scripts
  pagecount --json uploads/*.docx > counts.json

  # Estimate only, never start Word
  pagecount --no-native thesis.docx

  # Which native strategy would be used here?
  pagecount --show-platform

HOW PAGES ARE COUNTED:
  PDF    leaves of the page tree (exact; a broken PDF is an error)
  DOCX   Word automation → <Pages> in docProps/app.xml → text length → file size
  DOC    Word automation → file size

  Word automation is only attempted on Windows (COM via PowerShell) and
  macOS (AppleScript via osascript), and only when Word is installed.

ENVIRONMENT VARIABLES:
  RUST_LOG                   Log filter, overrides -v/-q (e.g. doc_pagecount=debug)
  PAGECOUNT_PLATFORM         Same as --platform
  PAGECOUNT_NO_NATIVE        Same as --no-native
  PAGECOUNT_NATIVE_TIMEOUT   Same as --native-timeout
  PAGECOUNT_CONCURRENCY      Same as --concurrency
"#;

/// Count the pages of PDF, DOCX and DOC documents.
#[derive(Parser, Debug)]
#[command(
    name = "pagecount",
    version,
    about = "Count the pages of PDF, DOCX and DOC documents",
    long_about = "Count the pages of PDF, DOCX and legacy DOC documents. PDFs are counted \
exactly from their page tree. Word documents are counted by Microsoft Word where it is \
available, otherwise estimated from document metadata, text volume or file size.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Documents to count (.pdf, .docx, .doc).
    #[arg(required_unless_present = "show_platform")]
    files: Vec<PathBuf>,

    /// Platform whose native strategy to try. Defaults to this host.
    #[arg(long, env = "PAGECOUNT_PLATFORM", value_enum)]
    platform: Option<PlatformArg>,

    /// Never start Word; use structural estimates only.
    #[arg(long, env = "PAGECOUNT_NO_NATIVE")]
    no_native: bool,

    /// Seconds to wait for Word before falling back (1 to 3600).
    #[arg(long, env = "PAGECOUNT_NATIVE_TIMEOUT", default_value_t = 60)]
    native_timeout: u64,

    /// Number of documents counted concurrently.
    #[arg(short, long, env = "PAGECOUNT_CONCURRENCY", default_value_t = 4,
          value_parser = clap::value_parser!(u16).range(1..=256))]
    concurrency: u16,

    /// Output a JSON array instead of one line per file.
    #[arg(long)]
    json: bool,

    /// Print the effective platform and exit.
    #[arg(long)]
    show_platform: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGECOUNT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except results and errors.
    #[arg(short, long, env = "PAGECOUNT_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PlatformArg {
    Windows,
    Macos,
    Linux,
    Unknown,
}

impl From<PlatformArg> for Platform {
    fn from(v: PlatformArg) -> Self {
        match v {
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Macos => Platform::MacOs,
            PlatformArg::Linux => Platform::Linux,
            PlatformArg::Unknown => Platform::Unknown,
        }
    }
}

/// One element of the `--json` array.
#[derive(Serialize)]
#[serde(untagged)]
enum FileResult {
    Counted(PageCountReport),
    Failed { filename: String, error: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    if cli.show_platform {
        let ctx = config.execution_context();
        println!(
            "{}{}",
            ctx.platform,
            if ctx.platform.has_native_automation() {
                " (native Word automation available)"
            } else {
                ""
            }
        );
        return Ok(());
    }

    // ── Count ────────────────────────────────────────────────────────────
    let show_progress =
        cli.files.len() > 1 && !cli.quiet && !cli.json && io::stderr().is_terminal();
    let bar = if show_progress {
        new_progress_bar(cli.files.len())
    } else {
        ProgressBar::hidden()
    };

    let config = &config;
    let results: Vec<(&PathBuf, Result<PageCountReport, doc_pagecount::PageCountError>)> =
        stream::iter(&cli.files)
            .map(|path| async move { (path, count_report(path, config).await) })
            .buffered(usize::from(cli.concurrency))
            .inspect(|_| bar.inc(1))
            .collect()
            .await;
    bar.finish_and_clear();

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let items: Vec<FileResult> = results
            .into_iter()
            .map(|(path, result)| match result {
                Ok(report) => FileResult::Counted(report),
                Err(e) => FileResult::Failed {
                    filename: display_name(path),
                    error: e.to_string(),
                },
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&items).context("Failed to serialise output")?
        );
    } else {
        for (path, result) in &results {
            match result {
                Ok(report) => println!("{}: {} page(s)", path.display(), report.page_count),
                Err(e) => eprintln!("{} {}: {}", red("✗"), path.display(), e),
            }
        }
        if !cli.quiet && results.len() > 1 {
            let counted = results.len() - failed;
            let pages: u64 = results
                .iter()
                .filter_map(|(_, r)| r.as_ref().ok())
                .map(|r| u64::from(r.page_count))
                .sum();
            eprintln!(
                "{} {} file(s), {} page(s) in total",
                if failed == 0 { green("✔") } else { red("⚠") },
                bold(&counted.to_string()),
                pages
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) could not be counted", failed, cli.files.len());
    }
    Ok(())
}

/// Map CLI args to `CountConfig`.
fn build_config(cli: &Cli) -> Result<CountConfig> {
    let mut builder = CountConfig::builder()
        .native_automation(!cli.no_native)
        .native_timeout_secs(cli.native_timeout);

    if let Some(platform) = cli.platform {
        builder = builder.platform(platform.into());
    }

    builder.build().context("Invalid configuration")
}

fn new_progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Counting");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
