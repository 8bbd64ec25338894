//! CLI binary for pandoc-d2-filter.
//!
//! A thin shim over the library crate that maps CLI flags to `FilterConfig`
//! and runs one stdin → stdout pass, as pandoc expects of a JSON filter:
//!
//! ```text
//! pandoc input.md --filter pandoc-d2-filter -o output.html
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pandoc_d2_filter::{run_stdio, AttributePolicy, FilterConfig};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # As a pandoc filter
  pandoc report.md --filter pandoc-d2-filter -o report.html

  # Write images to files instead of inlining them
  #   ```{.d2 folder=img caption="Request flow"}
  #   client -> server
  #   ```
  pandoc report.md --filter pandoc-d2-filter -o report.docx

  # Standalone, on pandoc JSON
  pandoc -t json report.md | pandoc-d2-filter html | pandoc -f json -o report.html

BLOCK ANNOTATIONS:
  theme     theme code or name        theme=6, theme="grape soda"
  layout    dagre | elk               layout=elk
  format    svg | png | pdf           format=png
  sketch    hand-drawn style          sketch=true
  pad       padding in d2 units       pad=20
  folder    write <folder>/<filename>.<format> instead of inlining
  filename  output base name          filename=flow
  caption   figure caption            caption="Request flow"

ENVIRONMENT VARIABLES:
  D2_BIN                 Path to the d2 executable (skips the PATH search)
  D2_FILTER_CLASS        Class that marks diagram blocks (default: d2)
  D2_FILTER_LOG          Log file (default: d2-filter.err)
  RUST_LOG               Override the log filter (e.g. pandoc_d2_filter=debug)
"#;

/// Render d2 diagram code blocks in a pandoc JSON document.
#[derive(Parser, Debug)]
#[command(
    name = "pandoc-d2-filter",
    version,
    about = "Render d2 diagram code blocks in a pandoc JSON document",
    long_about = "Reads a pandoc JSON document on stdin, renders every code block carrying \
the d2 class with the d2 binary, replaces it with an image, and writes the document to stdout.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Target output format passed by pandoc (informational only).
    format: Option<String>,

    /// Path to the d2 executable.
    #[arg(long = "d2", env = "D2_BIN", value_name = "PATH")]
    d2: Option<PathBuf>,

    /// Class that marks a code block as a d2 diagram.
    #[arg(long, env = "D2_FILTER_CLASS", default_value = "d2")]
    class: String,

    /// Drop unrecognised block attributes instead of copying them onto the image.
    #[arg(long, env = "D2_FILTER_DROP_ATTRS")]
    drop_unknown_attrs: bool,

    /// File that receives the filter's log output.
    #[arg(long, env = "D2_FILTER_LOG", default_value = "d2-filter.err")]
    log_file: PathBuf,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "D2_FILTER_VERBOSE")]
    verbose: bool,

    /// Log errors only.
    #[arg(short, long, env = "D2_FILTER_QUIET")]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Ensure d2 is available ───────────────────────────────────────────
    // Checked before logging is redirected so the message reaches the
    // terminal, and before stdin is read.
    let located = match cli.d2 {
        Some(ref path) => d2_locate::verify_explicit(path),
        None => d2_locate::locate_d2(),
    };
    let d2_path = match located {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    info!("Using d2 at {}", d2_path.display());

    // ── Build config ─────────────────────────────────────────────────────
    let policy = if cli.drop_unknown_attrs {
        AttributePolicy::Drop
    } else {
        AttributePolicy::Forward
    };
    let config = FilterConfig::builder()
        .renderer_path(d2_path)
        .marker_class(cli.class.clone())
        .attribute_policy(policy)
        .build()
        .context("Invalid configuration")?;

    // ── Run filter ───────────────────────────────────────────────────────
    let stdin = io::stdin();
    let stdout = io::stdout();
    let result = run_stdio(
        stdin.lock(),
        BufWriter::new(stdout.lock()),
        cli.format.as_deref(),
        &config,
    );

    match result {
        Ok(report) => {
            if !report.warnings.is_empty() {
                warn!("{} annotation value(s) ignored", report.warnings.len());
            }
            info!(
                "Rendered {} diagram(s) in {}ms",
                report.rendered, report.total_duration_ms
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{e}");
            Err(e).context("d2 filter failed")
        }
    }
}
