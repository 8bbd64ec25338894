//! Pipeline stages for turning one d2 code block into an image.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! annotations ──▶ naming ──▶ stage ──▶ render ──▶ place (+ encode)
//!  (key=value)   (filename)  (tmp file)  (d2)      (data URI / folder)
//! ```
//!
//! 1. [`annotations`] — fold the block's `key=value` pairs into
//!    [`crate::config::DiagramOptions`]
//! 2. [`naming`]      — derive the output base name from the caption or
//!    the per-run counter
//! 3. [`stage`]       — write the diagram source to a temp file and name the
//!    renderer's output next to it; both are removed on drop
//! 4. [`render`]      — run the renderer synchronously; the only stage that
//!    spawns a process
//! 5. [`place`]       — embed the bytes as a data URI ([`encode`]), leave a PDF
//!    in place, or copy the image into the configured folder

pub mod annotations;
pub mod encode;
pub mod naming;
pub mod place;
pub mod render;
pub mod stage;
