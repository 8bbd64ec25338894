//! # pandoc-d2-filter
//!
//! A [pandoc](https://pandoc.org) JSON filter that renders
//! [d2](https://d2lang.com) diagrams.
//!
//! Fenced code blocks with the `d2` class are handed to the `d2` binary and
//! replaced by an image: inline as a base64 `data:` URI by default, or as a
//! file under a folder chosen per block.
//!
//! ````markdown
//! ```{.d2 theme="grape soda" folder=img caption="Request flow"}
//! client -> server: request
//! ```
//! ````
//!
//! ## Pipeline Overview
//!
//! ```text
//! pandoc JSON (stdin)
//!  │
//!  ├─ 1. Walk      visit every node of the tree
//!  ├─ 2. Match     CodeBlock with the marker class, else unchanged
//!  ├─ 3. Parse     key=value annotations → DiagramOptions
//!  ├─ 4. Name      filename ← caption or diagram-<n>
//!  ├─ 5. Render    stage source to a temp file, run d2 (blocking)
//!  ├─ 6. Place     data URI / loose PDF / <folder>/<filename>.<ext>
//!  └─ 7. Replace   Para [Image] with caption and "fig:" marker
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pandoc_d2_filter::{run_stdio, FilterConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FilterConfig::default();
//!     let report = run_stdio(std::io::stdin().lock(), std::io::stdout().lock(), None, &config)?;
//!     eprintln!("rendered {} diagrams", report.rendered);
//!     Ok(())
//! }
//! ```
//!
//! ## Annotations
//!
//! | Key        | Values                                   | Default  |
//! |------------|------------------------------------------|----------|
//! | `theme`    | code (`6`) or name (`grape soda`)        | `0`      |
//! | `layout`   | `dagre`, `elk`                           | `dagre`  |
//! | `format`   | `svg`, `png`, `pdf`                      | `svg`    |
//! | `sketch`   | `true` (anything else is false)          | `false`  |
//! | `pad`      | non-negative integer                     | `100`    |
//! | `folder`   | directory, created if missing (one level)| inline   |
//! | `filename` | base name without extension              | derived  |
//! | `caption`  | figure caption                           | none     |
//!
//! Any other pair (`width=50%`) is copied onto the image unless
//! [`AttributePolicy::Drop`] is configured.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pandoc-d2-filter` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod ast;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{AttributePolicy, DiagramOptions, FilterConfig, FilterConfigBuilder, Layout, OutputFormat, Theme};
pub use error::{AnnotationWarning, FilterError};
pub use filter::{filter_str, filter_value, run_stdio, FilterSession, FIGURE_MARKER};
pub use output::FilterReport;
pub use pipeline::render::{D2Cli, RenderRequest, Renderer};
