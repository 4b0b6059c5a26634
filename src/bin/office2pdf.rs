//! CLI binary for edgequake-office2pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `BatchConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_office2pdf::{
    convert_dir, plan_dir, BatchConfig, BatchProgressCallback, BatchStats, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Staging");
        bar.set_message("Copying documents…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} staged documents…"))
        ));
    }

    fn on_file_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_file_converted(&self, _index: usize, _total: usize, name: &str) {
        self.bar.println(format!("  {} {name}", green("✓")));
        self.bar.inc(1);
    }

    fn on_file_skipped(&self, _index: usize, _total: usize, name: &str) {
        self.bar
            .println(format!("  {} {name}  {}", dim("•"), dim("already converted")));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {name}  {}", red("✗"), red(&msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, stats: &BatchStats) {
        self.bar.finish_and_clear();
        let mark = if stats.failed == 0 {
            green("✔")
        } else if stats.failed == stats.jobs() {
            red("✘")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{mark} {} converted, {} skipped, {} failed  {}",
            bold(&stats.converted.to_string()),
            stats.skipped,
            if stats.failed == 0 {
                "0".to_string()
            } else {
                red(&stats.failed.to_string())
            },
            dim(&format!("{}ms", stats.total_duration_ms)),
        );
    }
}

/// Log file in the working directory, unless `--no-log-file`.
const DEFAULT_LOG_FILE: &str = "doc_convert.log";

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every document in ./docs into ./pdfs
  office2pdf -i ./docs -o ./pdfs

  # See what would happen, without converting
  office2pdf -i ./docs -o ./pdfs --dry-run

  # Use a specific LibreOffice install and log somewhere else
  office2pdf -i ./docs -o ./pdfs --soffice /opt/libreoffice/program/soffice \
      --log-file logs/office2pdf.log

  # Machine-readable report
  office2pdf -i ./docs -o ./pdfs --json > report.json

BEHAVIOUR:
  Recognized: .doc .docx .xls .xlsx .ppt .pptx (any case); other files are ignored.
  File names are sanitised: every run of characters outside A-Z a-z 0-9 becomes "_".
  "Report (Final).docx" is converted to "Report_Final_.pdf".
  A PDF that already exists in the output directory is never regenerated.
  A failed document is logged and the batch continues.

ENVIRONMENT VARIABLES:
  OFFICE2PDF_SOFFICE      Path to the soffice executable
  OFFICE2PDF_LOG_FILE     Log file (default: doc_convert.log)
  RUST_LOG                Override log filter (e.g. debug, edgequake_office2pdf=trace)
"#;

/// Batch-convert office documents to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "office2pdf",
    version,
    about = "Convert Word, Excel and PowerPoint documents to PDF",
    long_about = "Convert every Word, Excel and PowerPoint document in a directory to PDF \
using a headless LibreOffice. Already-converted documents are skipped, so an interrupted \
batch can simply be run again.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the documents.
    #[arg(short, long, alias = "input_dir", env = "OFFICE2PDF_INPUT_DIR")]
    input_dir: PathBuf,

    /// Existing directory the PDFs are written to.
    #[arg(short, long, alias = "output_dir", env = "OFFICE2PDF_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Staging directory for sanitised copies (removed after the run).
    #[arg(long, env = "OFFICE2PDF_SCRATCH_DIR", default_value = "office2pdf_staging")]
    scratch_dir: PathBuf,

    /// soffice executable (default: OFFICE2PDF_SOFFICE, then soffice on PATH).
    #[arg(long)]
    soffice: Option<PathBuf>,

    /// Pause after opening a presentation before saving it, in milliseconds.
    #[arg(long, env = "OFFICE2PDF_SETTLE_MS", default_value_t = 1500)]
    settle_ms: u64,

    /// Per-document backend timeout in seconds.
    #[arg(long, env = "OFFICE2PDF_TIMEOUT", default_value_t = 300)]
    timeout: u64,

    /// List what would be converted or skipped, without converting.
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON on stdout.
    #[arg(long, env = "OFFICE2PDF_JSON")]
    json: bool,

    /// Log file receiving a line per converted, skipped or failed document.
    #[arg(long, env = "OFFICE2PDF_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Do not write the log file.
    #[arg(long, env = "OFFICE2PDF_NO_LOG_FILE")]
    no_log_file: bool,

    /// Disable progress bar.
    #[arg(long, env = "OFFICE2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "OFFICE2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "OFFICE2PDF_QUIET")]
    quiet: bool,
}

impl Cli {
    fn log_file(&self) -> Option<&Path> {
        (!self.no_log_file).then_some(self.log_file.as_path())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level console logs when the progress bar is active; the
    // bar prints a line per file. The log file always gets INFO or more.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.dry_run;
    let console_filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    let _log_guard = init_logging(console_filter, cli.verbose, cli.log_file())?;

    // ── Dry run ──────────────────────────────────────────────────────────
    if cli.dry_run {
        let plan = plan_dir(&cli.input_dir, &cli.output_dir)
            .await
            .context("Failed to plan batch")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            for job in &plan.jobs {
                println!(
                    "{:<8} {:<16} {} → {}",
                    if job.would_skip { "skip" } else { "convert" },
                    job.family.to_string(),
                    job.source.display(),
                    job.output_path.display()
                );
            }
            for c in &plan.collisions {
                println!(
                    "{:<8} {:<16} {} (name taken by {})",
                    "ignore",
                    "collision",
                    c.dropped.display(),
                    c.kept.display()
                );
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = convert_dir(&cli.input_dir, &cli.output_dir, &config)
        .await
        .context("Batch conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet && !show_progress {
        // Only print inline stats when the progress callback is disabled.
        let s = &report.stats;
        eprintln!(
            "Converted {} / skipped {} / failed {} in {}ms",
            s.converted, s.skipped, s.failed, s.total_duration_ms
        );
    }

    // Collision warnings are filtered off the console while the bar runs.
    if !cli.quiet && !cli.json {
        for c in &report.collisions {
            eprintln!(
                "{} {} not converted: name {} taken by {}",
                cyan("⚠"),
                c.dropped.display(),
                c.staged_name,
                c.kept.display()
            );
        }
    }

    if !cli.quiet && !report.scratch_removed {
        eprintln!(
            "{} scratch area {} could not be removed",
            cyan("⚠"),
            config.scratch_dir.display()
        );
    }

    Ok(())
}

/// Console layer on stderr, plus an optional plain-text file layer.
///
/// The returned guard flushes the file writer when dropped at exit.
fn init_logging(
    console_filter: &str,
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let console_layer = fmt::layer().with_writer(io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(console_filter)),
    );

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path {:?}", path))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {:?}", dir))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(if verbose { "debug" } else { "info" }));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Map CLI args to `BatchConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .scratch_dir(&cli.scratch_dir)
        .settle_delay_ms(cli.settle_ms)
        .backend_timeout_secs(cli.timeout);

    if let Some(ref soffice) = cli.soffice {
        builder = builder.soffice_path(soffice);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
