//! Annotation parsing: a block's `key=value` pairs → [`DiagramOptions`].
//!
//! Pairs are applied in document order, so a repeated key keeps its last
//! valid value. A value that cannot be interpreted leaves the setting as it
//! was and yields an [`AnnotationWarning`]; parsing itself never fails.

use crate::config::{DiagramOptions, Layout, OutputFormat, Theme};
use crate::error::AnnotationWarning;
use tracing::warn;

/// Result of folding a block's annotations over the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedAnnotations {
    pub options: DiagramOptions,
    pub warnings: Vec<AnnotationWarning>,
}

/// Parse annotation pairs on top of [`DiagramOptions::default()`].
pub fn parse_annotations(pairs: &[(String, String)]) -> ParsedAnnotations {
    let mut parsed = ParsedAnnotations::default();
    for (key, value) in pairs {
        if let Err(warning) = apply(&mut parsed.options, key, value) {
            warn!("{}", warning);
            parsed.warnings.push(warning);
        }
    }
    parsed
}

fn apply(options: &mut DiagramOptions, key: &str, value: &str) -> Result<(), AnnotationWarning> {
    match key {
        "theme" => options.theme = Theme::parse(value)?,
        "layout" => options.layout = Layout::parse(value)?,
        "format" => options.format = OutputFormat::parse(value)?,
        "sketch" => options.sketch = value == "true",
        "pad" => {
            options.pad = value.trim().parse().map_err(|_| {
                AnnotationWarning::invalid("pad", value, "expected a non-negative integer")
            })?
        }
        "folder" => options.folder = Some(value.to_string()),
        "filename" => options.filename = Some(value.to_string()),
        "caption" => options.caption = Some(value.to_string()),
        _ => options.extra_attrs.push((key.to_string(), value.to_string())),
    }
    Ok(())
}
