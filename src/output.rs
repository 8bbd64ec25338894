//! Per-run results.

use crate::error::AnnotationWarning;
use serde::{Deserialize, Serialize};

/// What a filtering run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Code blocks inspected, diagram or not.
    pub code_blocks: usize,
    /// Diagram blocks rendered and replaced.
    pub rendered: usize,
    /// Annotation values that were ignored.
    pub warnings: Vec<AnnotationWarning>,
    pub total_duration_ms: u64,
}

impl FilterReport {
    /// True when the document was left untouched.
    pub fn is_noop(&self) -> bool {
        self.rendered == 0
    }
}
