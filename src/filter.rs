//! The block filter: pandoc JSON in, pandoc JSON out.
//!
//! A [`FilterSession`] is one pass over one document. It owns the renderer
//! and the counter used for `diagram-<n>` names, so two runs never share
//! numbering. Every node of the tree is offered to
//! [`FilterSession::filter_block`]; code blocks carrying the marker class are
//! rendered and replaced by `Para [Image]`, everything else is left exactly
//! as it was.
//!
//! Blocks are rendered one at a time, in document order. The first failure
//! aborts the run and no document is produced.

use crate::ast::{Attr, Block, CodeBlock, Inline};
use crate::config::{AttributePolicy, FilterConfig};
use crate::error::FilterError;
use crate::output::FilterReport;
use crate::pipeline::annotations::parse_annotations;
use crate::pipeline::naming::resolve_filename;
use crate::pipeline::place::{place_output, Placement};
use crate::pipeline::render::{D2Cli, RenderRequest, Renderer};
use crate::pipeline::stage::StagedInput;
use serde_json::Value;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Title marker that makes pandoc treat an image as a numbered figure.
pub const FIGURE_MARKER: &str = "fig:";

/// State for one filtering run.
pub struct FilterSession {
    config: FilterConfig,
    renderer: Arc<dyn Renderer>,
    base_dir: PathBuf,
    counter: u64,
    report: FilterReport,
}

impl FilterSession {
    /// Start a run. Resolves the renderer, so a missing `d2` fails here,
    /// before any input is read.
    pub fn new(config: &FilterConfig) -> Result<Self, FilterError> {
        let renderer = resolve_renderer(config)?;
        let base_dir = match config.base_dir {
            Some(ref dir) => dir.clone(),
            None => std::env::current_dir().map_err(FilterError::Io)?,
        };
        debug!("Filter session using renderer '{}'", renderer.name());

        Ok(Self {
            config: config.clone(),
            renderer,
            base_dir,
            counter: 0,
            report: FilterReport::default(),
        })
    }

    /// Number of diagram blocks seen so far in this run.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Filter a single node.
    ///
    /// Returns `Ok(None)` when the node is not a diagram block and must be
    /// kept unchanged, or the replacement block otherwise.
    pub fn filter_block(&mut self, node: &Value) -> Result<Option<Block>, FilterError> {
        let Some(block) = CodeBlock::from_node(node) else {
            return Ok(None);
        };
        self.report.code_blocks += 1;
        if !block.attr.has_class(&self.config.marker_class) {
            return Ok(None);
        }

        let parsed = parse_annotations(block.attr.pairs());
        self.report.warnings.extend(parsed.warnings);
        let options = parsed.options;

        self.counter += 1;
        let filename = resolve_filename(&options, self.counter);
        debug!("Diagram block #{} → '{}.{}'", self.counter, filename, options.format);

        let input = StagedInput::create(&block.text, self.config.stage_dir.as_deref())?;
        let output = input.output_for(options.format);
        self.renderer.render(&RenderRequest {
            diagram: &filename,
            theme: options.theme,
            layout: options.layout,
            sketch: options.sketch,
            pad: options.pad,
            input: input.path(),
            output: output.path(),
        })?;

        let reference = place_output(
            output,
            &Placement {
                format: options.format,
                folder: options.folder.as_deref(),
                filename: &filename,
                base_dir: &self.base_dir,
            },
        )?;
        drop(input);
        self.report.rendered += 1;

        let caption = options.caption.unwrap_or_default();
        let title = if caption.is_empty() { "" } else { FIGURE_MARKER };
        let pairs = match self.config.attribute_policy {
            AttributePolicy::Forward => options.extra_attrs,
            AttributePolicy::Drop => Vec::new(),
        };

        Ok(Some(Block::Para(vec![Inline::Image(
            Attr::new(block.attr.id(), Vec::new(), pairs),
            vec![Inline::Str(caption)],
            (reference, title.to_string()),
        )])))
    }

    /// Replace every diagram block in `document`, in place.
    ///
    /// The whole tree is walked, so blocks nested in quotes, divs, lists or
    /// tables are found too. `target_format` is the output format pandoc
    /// passes to filters; it does not change the result.
    pub fn filter_document(
        &mut self,
        document: &mut Value,
        target_format: Option<&str>,
    ) -> Result<(), FilterError> {
        let start = Instant::now();
        info!(
            "Filtering document for target '{}'",
            target_format.unwrap_or("<unspecified>")
        );

        self.walk(document)?;

        self.report.total_duration_ms += start.elapsed().as_millis() as u64;
        info!(
            "Filter complete: {} diagram(s) rendered out of {} code block(s), {}ms",
            self.report.rendered, self.report.code_blocks, self.report.total_duration_ms
        );
        Ok(())
    }

    /// End the run and return what it did.
    pub fn finish(self) -> FilterReport {
        self.report
    }

    fn walk(&mut self, value: &mut Value) -> Result<(), FilterError> {
        if let Some(replacement) = self.filter_block(value)? {
            *value = replacement.to_value()?;
            return Ok(());
        }
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    self.walk(item)?;
                }
            }
            Value::Object(object) => {
                for (_, item) in object.iter_mut() {
                    self.walk(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Filter an already-parsed document.
pub fn filter_value(
    document: &mut Value,
    target_format: Option<&str>,
    config: &FilterConfig,
) -> Result<FilterReport, FilterError> {
    let mut session = FilterSession::new(config)?;
    session.filter_document(document, target_format)?;
    Ok(session.finish())
}

/// Filter a JSON string, returning the re-serialised document.
pub fn filter_str(
    input: &str,
    target_format: Option<&str>,
    config: &FilterConfig,
) -> Result<(String, FilterReport), FilterError> {
    let mut session = FilterSession::new(config)?;
    let mut document: Value = serde_json::from_str(input)?;
    session.filter_document(&mut document, target_format)?;
    Ok((serde_json::to_string(&document)?, session.finish()))
}

/// Read a document from `reader`, filter it, and write it to `writer`.
///
/// Nothing is written unless every block was rendered.
pub fn run_stdio<R: Read, W: Write>(
    reader: R,
    mut writer: W,
    target_format: Option<&str>,
    config: &FilterConfig,
) -> Result<FilterReport, FilterError> {
    let mut session = FilterSession::new(config)?;
    let mut document: Value = serde_json::from_reader(reader)?;
    session.filter_document(&mut document, target_format)?;

    serde_json::to_writer(&mut writer, &document)?;
    writer.flush().map_err(FilterError::Io)?;
    Ok(session.finish())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the renderer, from most-specific to least-specific:
/// a pre-built renderer, an explicit `d2` path, then `D2_BIN` / `PATH`.
fn resolve_renderer(config: &FilterConfig) -> Result<Arc<dyn Renderer>, FilterError> {
    if let Some(ref renderer) = config.renderer {
        return Ok(Arc::clone(renderer));
    }
    if let Some(ref path) = config.renderer_path {
        let program = d2_locate::verify_explicit(path)?;
        return Ok(Arc::new(D2Cli::new(program)));
    }
    Ok(Arc::new(D2Cli::locate()?))
}
