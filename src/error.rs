//! Error types for the pandoc-d2-filter library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FilterError`] — **Fatal**: the run cannot produce a document (renderer
//!   not installed, renderer rejected a diagram, output folder could not be
//!   created). Returned as `Err(FilterError)` from the `filter_*` functions;
//!   no partial document is ever written.
//!
//! * [`AnnotationWarning`] — **Non-fatal**: a block carried an annotation
//!   value the filter does not understand (`theme=fuchsia`, `pad=wide`). The
//!   setting keeps its current value and the warning is collected in
//!   [`crate::output::FilterReport`].

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// All fatal errors returned by the pandoc-d2-filter library.
#[derive(Debug, Error)]
pub enum FilterError {
    // ── Renderer errors ───────────────────────────────────────────────────
    /// The renderer executable could not be located before processing.
    #[error("{0}")]
    RendererMissing(#[from] d2_locate::LocateError),

    /// The renderer process could not be started.
    #[error("Failed to start renderer '{program}': {source}")]
    RendererSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but exited unsuccessfully.
    #[error("Renderer failed for diagram '{diagram}' ({status}):\n{stderr}")]
    RenderFailed {
        diagram: String,
        status: ExitStatus,
        stderr: String,
    },

    // ── File-system errors ────────────────────────────────────────────────
    /// Could not create or write the staged renderer input.
    #[error("Failed to stage diagram source in '{dir}': {source}")]
    Stage {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer reported success but its output could not be read.
    #[error("Failed to read rendered output '{path}': {source}")]
    ReadOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured output folder could not be created.
    #[error("Failed to create output folder '{path}': {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rendered image could not be written to its final location.
    #[error("Failed to write image '{path}': {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Document errors ───────────────────────────────────────────────────
    /// The input (or output) document is not valid pandoc JSON.
    #[error("Invalid pandoc JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the document or writing the result failed.
    #[error("Document I/O failed: {0}")]
    Io(#[source] std::io::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal problem with a single block annotation.
///
/// The offending setting keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum AnnotationWarning {
    /// The value of a recognised key could not be interpreted.
    #[error("Ignoring {key}={value:?}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl AnnotationWarning {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        AnnotationWarning::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_renderer_display() {
        let e = FilterError::from(d2_locate::LocateError::NotFound { name: "d2".into() });
        assert_eq!(e.to_string(), "d2 is not installed");
    }

    #[test]
    fn invalid_annotation_display() {
        let w = AnnotationWarning::invalid("layout", "tala", "unknown layout engine");
        let msg = w.to_string();
        assert!(msg.contains("layout=\"tala\""), "got: {msg}");
        assert!(msg.contains("unknown layout engine"));
    }

    #[test]
    fn output_dir_display() {
        let e = FilterError::OutputDir {
            path: PathBuf::from("a/b"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing parent"),
        };
        assert!(e.to_string().contains("a/b"));
        assert!(e.to_string().contains("missing parent"));
    }
}
