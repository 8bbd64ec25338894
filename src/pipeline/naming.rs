//! Output base-name derivation.
//!
//! An explicit `filename` always wins. Otherwise a caption is turned into a
//! title-cased, space-free name (`test/ caption` → `Test-Caption`), and as a
//! last resort the block is numbered `diagram-<n>` from the per-run counter.
//! Empty values count as absent.

use crate::config::DiagramOptions;
use once_cell::sync::Lazy;
use regex::Regex;

/// First character of every word: at the start, or after whitespace or an
/// opening quote/bracket.
static RE_WORD_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|[\s"'(\[{])[\s"'(\[{]*\S"#).unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Build a file name from a caption.
pub fn title_case_filename(caption: &str) -> String {
    let titled = RE_WORD_START.replace_all(caption, |caps: &regex::Captures<'_>| {
        caps[0].to_uppercase()
    });
    RE_WHITESPACE.replace_all(&titled, "").replace('/', "-")
}

/// Base name for a block, given the run's counter value for that block.
pub fn resolve_filename(options: &DiagramOptions, counter: u64) -> String {
    if let Some(name) = options.filename.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    options
        .caption
        .as_deref()
        .map(title_case_filename)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("diagram-{counter}"))
}
