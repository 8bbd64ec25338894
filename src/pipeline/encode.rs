//! Image encoding: rendered bytes → base64 `data:` URI.
//!
//! Used when a block has no `folder`, so the image travels inside the
//! document itself and no file needs to outlive the run.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// `data:<mime>;base64,<payload>`
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded image → {} bytes base64", b64.len());
    format!("data:{mime_type};base64,{b64}")
}
