//! End-to-end tests for the d2 block filter.
//!
//! A recording renderer stands in for `d2`: it writes a small fixed image
//! for each request and remembers the options it was called with, so these
//! tests run without d2 installed.
//!
//! Run with:
//!   cargo test --test filter

use pandoc_d2_filter::{
    filter_value, run_stdio, AttributePolicy, FilterConfig, FilterError, FilterSession,
    RenderRequest, Renderer,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Call {
    diagram: String,
    theme: u32,
    layout: String,
    sketch: bool,
    pad: u32,
    source: String,
    input: PathBuf,
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl Recorder {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for Recorder {
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), FilterError> {
        if self.fail {
            return Err(FilterError::RendererSpawn {
                program: PathBuf::from("d2"),
                source: std::io::Error::other("syntax error on line 1"),
            });
        }

        let source = std::fs::read_to_string(request.input).unwrap();
        let bytes: &[u8] = match request.output.extension().and_then(|e| e.to_str()) {
            Some("png") => b"\x89PNG fake",
            Some("pdf") => b"%PDF-1.7 fake",
            _ => b"<svg/>",
        };
        std::fs::write(request.output, bytes).unwrap();

        self.calls.lock().unwrap().push(Call {
            diagram: request.diagram.to_string(),
            theme: request.theme.code(),
            layout: request.layout.as_str().to_string(),
            sketch: request.sketch,
            pad: request.pad,
            source,
            input: request.input.to_path_buf(),
        });
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

struct Harness {
    recorder: Arc<Recorder>,
    base: tempfile::TempDir,
    stage: tempfile::TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_recorder(Recorder::default())
    }

    fn with_recorder(recorder: Recorder) -> Self {
        Self {
            recorder: Arc::new(recorder),
            base: tempfile::tempdir().unwrap(),
            stage: tempfile::tempdir().unwrap(),
        }
    }

    fn config(&self, policy: AttributePolicy) -> FilterConfig {
        FilterConfig::builder()
            .renderer(self.recorder.clone())
            .base_dir(self.base.path())
            .stage_dir(self.stage.path())
            .attribute_policy(policy)
            .build()
            .unwrap()
    }

    fn run(&self, document: &Value) -> Value {
        let mut output = document.clone();
        filter_value(&mut output, Some("html"), &self.config(AttributePolicy::Forward))
            .expect("filter should succeed");
        output
    }

    fn base(&self) -> &Path {
        self.base.path()
    }
}

fn document(blocks: Vec<Value>) -> Value {
    json!({
        "pandoc-api-version": [1, 23, 1],
        "meta": {},
        "blocks": blocks
    })
}

fn code_block(id: &str, classes: &[&str], attrs: &[(&str, &str)], text: &str) -> Value {
    json!({
        "t": "CodeBlock",
        "c": [[id, classes, attrs.iter().map(|(k, v)| json!([k, v])).collect::<Vec<_>>()], text]
    })
}

fn d2(attrs: &[(&str, &str)]) -> Value {
    code_block("", &["d2"], attrs, "x -> y")
}

/// The single image of a document whose only block is `Para [Image]`.
fn image_of(doc: &Value) -> (Value, Value, String, String) {
    let blocks = doc["blocks"].as_array().expect("blocks");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["t"], "Para");
    let inlines = blocks[0]["c"].as_array().expect("para inlines");
    assert_eq!(inlines.len(), 1);
    assert_eq!(inlines[0]["t"], "Image");

    let c = &inlines[0]["c"];
    (
        c[0].clone(),
        c[1].clone(),
        c[2][0].as_str().unwrap().to_string(),
        c[2][1].as_str().unwrap().to_string(),
    )
}

// ── Matching ─────────────────────────────────────────────────────────────────

#[test]
fn test_block_without_marker_is_unchanged() {
    let h = Harness::new();
    let input = document(vec![code_block("", &["rust"], &[("theme", "6")], "fn main() {}")]);

    assert_eq!(h.run(&input), input);
    assert!(h.recorder.calls().is_empty());
}

#[test]
fn test_nested_diagram_blocks_are_replaced() {
    let h = Harness::new();
    let input = document(vec![json!({"t": "BlockQuote", "c": [d2(&[])]})]);

    let output = h.run(&input);
    let quoted = &output["blocks"][0]["c"][0];
    assert_eq!(quoted["t"], "Para");
    assert_eq!(quoted["c"][0]["t"], "Image");
}

#[test]
fn test_surrounding_blocks_are_untouched() {
    let h = Harness::new();
    let para = json!({"t": "Para", "c": [{"t": "Str", "c": "Before"}]});
    let input = document(vec![para.clone(), d2(&[]), para.clone()]);

    let output = h.run(&input);
    assert_eq!(output["blocks"][0], para);
    assert_eq!(output["blocks"][1]["t"], "Para");
    assert_eq!(output["blocks"][2], para);
    assert_eq!(output["pandoc-api-version"], json!([1, 23, 1]));
}

// ── Inline output ────────────────────────────────────────────────────────────

#[test]
fn test_default_block_is_inline_svg() {
    let h = Harness::new();
    let (attr, inlines, url, title) = image_of(&h.run(&document(vec![d2(&[])])));

    assert_eq!(attr, json!(["", [], []]));
    assert_eq!(inlines, json!([{"t": "Str", "c": ""}]));
    assert!(url.starts_with("data:image/svg+xml;base64,"), "got {url}");
    assert_eq!(title, "");

    let calls = h.recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].source, "x -> y");
    assert_eq!(calls[0].theme, 0);
    assert_eq!(calls[0].layout, "dagre");
    assert!(!calls[0].sketch);
    assert_eq!(calls[0].pad, 100);
}

#[test]
fn test_png_is_inline_png() {
    let h = Harness::new();
    let (_, _, url, _) = image_of(&h.run(&document(vec![d2(&[("format", "png")])])));
    assert!(url.starts_with("data:image/png;base64,"), "got {url}");
}

#[test]
fn test_pdf_is_left_as_a_file() {
    let h = Harness::new();
    let (_, _, url, _) = image_of(&h.run(&document(vec![d2(&[("format", "pdf")])])));

    assert!(url.ends_with(".pdf"), "got {url}");
    assert!(Path::new(&url).exists());
    assert!(Path::new(&url).starts_with(h.stage.path()));
}

#[test]
fn test_renderer_options_are_forwarded() {
    let h = Harness::new();
    h.run(&document(vec![d2(&[
        ("layout", "elk"),
        ("sketch", "true"),
        ("pad", "20"),
    ])]));

    let call = &h.recorder.calls()[0];
    assert_eq!(call.layout, "elk");
    assert!(call.sketch);
    assert_eq!(call.pad, 20);
}

#[test]
fn test_staged_input_is_removed() {
    let h = Harness::new();
    h.run(&document(vec![d2(&[]), d2(&[("format", "png")])]));

    for call in h.recorder.calls() {
        assert!(!call.input.exists(), "{} left behind", call.input.display());
    }
}

#[test]
fn test_filename_without_folder_stays_inline() {
    let h = Harness::new();
    let (_, _, url, _) = image_of(&h.run(&document(vec![d2(&[("filename", "flow")])])));
    assert!(url.starts_with("data:image/svg+xml;base64,"));
    assert!(!h.base().join("flow.svg").exists());
}

// ── Captions ─────────────────────────────────────────────────────────────────

#[test]
fn test_caption_makes_a_figure() {
    let h = Harness::new();
    let (attr, inlines, url, title) = image_of(&h.run(&document(vec![d2(&[("caption", "test")])])));

    assert_eq!(attr, json!(["", [], []]));
    assert_eq!(inlines, json!([{"t": "Str", "c": "test"}]));
    assert!(url.starts_with("data:image/svg+xml;base64,"));
    assert_eq!(title, "fig:");
}

#[test]
fn test_identifier_is_kept_and_classes_dropped() {
    let h = Harness::new();
    let block = code_block("fig:test", &["d2", "wide"], &[("caption", "test")], "a -> b");
    let (attr, _, _, title) = image_of(&h.run(&document(vec![block])));

    assert_eq!(attr, json!(["fig:test", [], []]));
    assert_eq!(title, "fig:");
}

// ── Folder output ────────────────────────────────────────────────────────────

#[test]
fn test_folder_with_caption_uses_caption_filename() {
    let h = Harness::new();
    let block = d2(&[("folder", "tmp"), ("caption", "test/ caption")]);
    let (attr, inlines, url, title) = image_of(&h.run(&document(vec![block])));

    assert_eq!(attr, json!(["", [], []]));
    assert_eq!(inlines, json!([{"t": "Str", "c": "test/ caption"}]));
    assert_eq!(url, "tmp/Test-Caption.svg");
    assert_eq!(title, "fig:");
    assert_eq!(
        std::fs::read(h.base().join("tmp/Test-Caption.svg")).unwrap(),
        b"<svg/>"
    );
}

#[test]
fn test_folder_with_filename() {
    let h = Harness::new();
    let block = d2(&[("folder", "tmp"), ("filename", "test"), ("caption", "ignored name")]);
    let (_, _, url, _) = image_of(&h.run(&document(vec![block])));

    assert_eq!(url, "tmp/test.svg");
    assert!(h.base().join("tmp/test.svg").is_file());
}

#[test]
fn test_blank_caption_in_folder_is_numbered() {
    let h = Harness::new();
    let block = d2(&[("folder", "tmp"), ("caption", "   ")]);
    let (_, _, url, _) = image_of(&h.run(&document(vec![block])));

    assert_eq!(url, "tmp/diagram-1.svg");
    assert!(h.base().join("tmp/diagram-1.svg").is_file());
    assert!(!h.base().join("tmp/.svg").exists());
}

#[test]
fn test_folder_without_name_is_numbered_per_run() {
    let h = Harness::new();
    let input = document(vec![
        d2(&[("folder", "tmp")]),
        code_block("", &["python"], &[], "print()"),
        d2(&[("folder", "tmp"), ("format", "png")]),
    ]);

    let output = h.run(&input);
    assert_eq!(output["blocks"][0]["c"][0]["c"][2][0], "tmp/diagram-1.svg");
    assert_eq!(output["blocks"][1]["t"], "CodeBlock");
    assert_eq!(output["blocks"][2]["c"][0]["c"][2][0], "tmp/diagram-2.png");
    assert!(h.base().join("tmp/diagram-1.svg").is_file());
    assert!(h.base().join("tmp/diagram-2.png").is_file());

    // A fresh run starts counting again.
    let again = h.run(&document(vec![d2(&[("folder", "tmp")])]));
    assert_eq!(again["blocks"][0]["c"][0]["c"][2][0], "tmp/diagram-1.svg");

    let names: Vec<_> = h.recorder.calls().into_iter().map(|c| c.diagram).collect();
    assert_eq!(names, vec!["diagram-1", "diagram-2", "diagram-1"]);
}

#[test]
fn test_existing_folder_is_reused() {
    let h = Harness::new();
    std::fs::create_dir(h.base().join("img")).unwrap();
    let (_, _, url, _) = image_of(&h.run(&document(vec![d2(&[("folder", "img")])])));
    assert_eq!(url, "img/diagram-1.svg");
}

#[test]
fn test_nested_missing_folder_aborts() {
    let h = Harness::new();
    let mut doc = document(vec![d2(&[("folder", "a/b")])]);
    let err = filter_value(&mut doc, None, &h.config(AttributePolicy::Forward)).unwrap_err();

    assert!(matches!(err, FilterError::OutputDir { .. }), "got {err:?}");
    assert!(!h.base().join("a").exists());
}

// ── Themes ───────────────────────────────────────────────────────────────────

#[test]
fn test_theme_code_and_name_select_the_same_theme() {
    let h = Harness::new();
    h.run(&document(vec![
        d2(&[("theme", "6")]),
        d2(&[("theme", "grape soda")]),
        d2(&[("theme", "7")]),
        d2(&[("theme", "aubergine")]),
    ]));

    let themes: Vec<_> = h.recorder.calls().iter().map(|c| c.theme).collect();
    assert_eq!(themes, vec![6, 6, 7, 7]);
}

#[test]
fn test_unknown_theme_falls_back_with_warning() {
    let h = Harness::new();
    let mut doc = document(vec![d2(&[("theme", "fuchsia"), ("layout", "tala")])]);
    let report = filter_value(&mut doc, None, &h.config(AttributePolicy::Forward)).unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.warnings.len(), 2);
    let call = &h.recorder.calls()[0];
    assert_eq!(call.theme, 0);
    assert_eq!(call.layout, "dagre");
}

// ── Unrecognised attributes ──────────────────────────────────────────────────

#[test]
fn test_unknown_attributes_are_forwarded_by_default() {
    let h = Harness::new();
    let (attr, _, _, _) = image_of(&h.run(&document(vec![d2(&[("width", "50%")])])));
    assert_eq!(attr, json!(["", [], [["width", "50%"]]]));

    let (attr, _, _, _) = image_of(&h.run(&document(vec![d2(&[("height", "30"), ("pad", "5")])])));
    assert_eq!(attr, json!(["", [], [["height", "30"]]]));
}

#[test]
fn test_unknown_attributes_can_be_dropped() {
    let h = Harness::new();
    let mut doc = document(vec![d2(&[("width", "50%")])]);
    filter_value(&mut doc, None, &h.config(AttributePolicy::Drop)).unwrap();

    let (attr, _, _, _) = image_of(&doc);
    assert_eq!(attr, json!(["", [], []]));
}

// ── Whole-run behaviour ──────────────────────────────────────────────────────

#[test]
fn test_filtering_twice_is_a_no_op() {
    let h = Harness::new();
    let once = h.run(&document(vec![d2(&[("folder", "tmp"), ("caption", "twice")])]));

    let mut twice = once.clone();
    let report = filter_value(&mut twice, None, &h.config(AttributePolicy::Forward)).unwrap();
    assert_eq!(twice, once);
    assert!(report.is_noop());
}

#[test]
fn test_renderer_failure_writes_nothing() {
    let h = Harness::with_recorder(Recorder::failing());
    let input = serde_json::to_string(&document(vec![d2(&[])])).unwrap();

    let mut out = Vec::new();
    let err = run_stdio(
        input.as_bytes(),
        &mut out,
        None,
        &h.config(AttributePolicy::Forward),
    )
    .unwrap_err();

    assert!(matches!(err, FilterError::RendererSpawn { .. }));
    assert!(out.is_empty(), "partial output was written");
}

#[test]
fn test_run_stdio_round_trips_json() {
    let h = Harness::new();
    let input = serde_json::to_string(&document(vec![d2(&[("caption", "io")])])).unwrap();

    let mut out = Vec::new();
    let report = run_stdio(input.as_bytes(), &mut out, Some("html"), &h.config(AttributePolicy::Forward))
        .unwrap();
    assert_eq!(report.rendered, 1);

    let parsed: Value = serde_json::from_slice(&out).unwrap();
    let (_, inlines, _, title) = image_of(&parsed);
    assert_eq!(inlines, json!([{"t": "Str", "c": "io"}]));
    assert_eq!(title, "fig:");
}

#[test]
fn test_invalid_json_is_an_error() {
    let h = Harness::new();
    let mut out = Vec::new();
    let err = run_stdio(&b"{not json"[..], &mut out, None, &h.config(AttributePolicy::Forward))
        .unwrap_err();
    assert!(matches!(err, FilterError::Json(_)));
}

#[test]
fn test_session_counts_blocks() {
    let h = Harness::new();
    let mut session = FilterSession::new(&h.config(AttributePolicy::Forward)).unwrap();
    let mut doc = document(vec![d2(&[]), code_block("", &[], &[], "plain"), d2(&[])]);
    session.filter_document(&mut doc, None).unwrap();

    assert_eq!(session.counter(), 2);
    let report = session.finish();
    assert_eq!(report.code_blocks, 3);
    assert_eq!(report.rendered, 2);
}
