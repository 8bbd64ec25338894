//! Configuration types for the d2 block filter.
//!
//! Two levels of configuration exist:
//!
//! * [`FilterConfig`] — one per run, built via [`FilterConfigBuilder`]:
//!   which class marks a diagram block, where folders are resolved, which
//!   renderer to call, and what to do with annotations the filter does not
//!   recognise.
//! * [`DiagramOptions`] — one per matching block, derived from the block's
//!   annotations on top of fixed defaults and discarded once the block has
//!   been replaced.

use crate::error::{AnnotationWarning, FilterError};
use crate::pipeline::render::Renderer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Class that opts a fenced code block into rendering.
pub const DEFAULT_MARKER_CLASS: &str = "d2";

/// Default renderer padding, in d2 units.
pub const DEFAULT_PAD: u32 = 100;

// ── Run-level configuration ──────────────────────────────────────────────

/// Configuration for one filtering run.
///
/// Built via [`FilterConfig::builder()`] or using [`FilterConfig::default()`].
///
/// # Example
/// ```rust
/// use pandoc_d2_filter::{AttributePolicy, FilterConfig};
///
/// let config = FilterConfig::builder()
///     .marker_class("diagram")
///     .attribute_policy(AttributePolicy::Drop)
///     .build()
///     .unwrap();
/// assert_eq!(config.marker_class, "diagram");
/// ```
#[derive(Clone)]
pub struct FilterConfig {
    /// Class a code block must carry to be rendered. Default: `d2`.
    pub marker_class: String,

    /// What happens to unrecognised `key=value` annotations. Default: [`AttributePolicy::Forward`].
    pub attribute_policy: AttributePolicy,

    /// Directory that a block's `folder` is resolved against. Default: the
    /// current working directory.
    ///
    /// Only the file location depends on this; the emitted image reference
    /// is always the relative `<folder>/<filename>.<ext>`.
    pub base_dir: Option<PathBuf>,

    /// Directory for staged renderer input files. Default: the system temp dir.
    pub stage_dir: Option<PathBuf>,

    /// Path to the renderer executable.
    /// If None along with `renderer`, `d2` is located on `PATH` (or `D2_BIN`).
    pub renderer_path: Option<PathBuf>,

    /// Pre-constructed renderer. Takes precedence over `renderer_path`.
    pub renderer: Option<Arc<dyn Renderer>>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            attribute_policy: AttributePolicy::default(),
            base_dir: None,
            stage_dir: None,
            renderer_path: None,
            renderer: None,
        }
    }
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("marker_class", &self.marker_class)
            .field("attribute_policy", &self.attribute_policy)
            .field("base_dir", &self.base_dir)
            .field("stage_dir", &self.stage_dir)
            .field("renderer_path", &self.renderer_path)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name().to_string()))
            .finish()
    }
}

impl FilterConfig {
    /// Create a new builder for `FilterConfig`.
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`FilterConfig`].
#[derive(Debug)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    pub fn marker_class(mut self, class: impl Into<String>) -> Self {
        self.config.marker_class = class.into();
        self
    }

    pub fn attribute_policy(mut self, policy: AttributePolicy) -> Self {
        self.config.attribute_policy = policy;
        self
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = Some(dir.into());
        self
    }

    pub fn stage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.stage_dir = Some(dir.into());
        self
    }

    pub fn renderer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.renderer_path = Some(path.into());
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let c = &self.config;
        if c.marker_class.trim().is_empty() {
            return Err(FilterError::InvalidConfig(
                "Marker class must not be empty".into(),
            ));
        }
        if c.marker_class.chars().any(char::is_whitespace) {
            return Err(FilterError::InvalidConfig(format!(
                "Marker class must be a single word, got {:?}",
                c.marker_class
            )));
        }
        Ok(self.config)
    }
}

/// Policy for annotations that are not rendering options (`width=50%`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttributePolicy {
    /// Copy them, in order, onto the produced image. (default)
    #[default]
    Forward,
    /// Discard them.
    Drop,
}

// ── Per-block options ────────────────────────────────────────────────────

/// Rendering options for a single diagram block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramOptions {
    pub theme: Theme,
    pub layout: Layout,
    pub format: OutputFormat,
    /// Hand-drawn rendering style.
    pub sketch: bool,
    pub pad: u32,
    /// Output directory relative to the base dir. None means inline output.
    pub folder: Option<String>,
    /// Output base name without extension.
    pub filename: Option<String>,
    pub caption: Option<String>,
    /// Annotations that are not rendering options, in document order.
    pub extra_attrs: Vec<(String, String)>,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            layout: Layout::default(),
            format: OutputFormat::default(),
            sketch: false,
            pad: DEFAULT_PAD,
            folder: None,
            filename: None,
            caption: None,
            extra_attrs: Vec::new(),
        }
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The d2 colour themes, with their stable numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    NeutralDefault,
    NeutralGrey,
    FlagshipTerrastruct,
    CoolClassics,
    MixedBerryBlue,
    GrapeSoda,
    Aubergine,
    ColorblindClear,
    VanillaNitroCola,
    OrangeCreamsicle,
    ShirleyTemple,
    EarthTones,
    EvergladeGreen,
    ButteredToast,
    DarkMauve,
    Terminal,
    TerminalGrayscale,
    Origami,
}

impl Theme {
    /// Every theme, in code order.
    pub const ALL: [Theme; 18] = [
        Theme::NeutralDefault,
        Theme::NeutralGrey,
        Theme::FlagshipTerrastruct,
        Theme::CoolClassics,
        Theme::MixedBerryBlue,
        Theme::GrapeSoda,
        Theme::Aubergine,
        Theme::ColorblindClear,
        Theme::VanillaNitroCola,
        Theme::OrangeCreamsicle,
        Theme::ShirleyTemple,
        Theme::EarthTones,
        Theme::EvergladeGreen,
        Theme::ButteredToast,
        Theme::DarkMauve,
        Theme::Terminal,
        Theme::TerminalGrayscale,
        Theme::Origami,
    ];

    /// The code passed to `d2 --theme`.
    pub fn code(self) -> u32 {
        match self {
            Theme::NeutralDefault => 0,
            Theme::NeutralGrey => 1,
            Theme::FlagshipTerrastruct => 3,
            Theme::CoolClassics => 4,
            Theme::MixedBerryBlue => 5,
            Theme::GrapeSoda => 6,
            Theme::Aubergine => 7,
            Theme::ColorblindClear => 8,
            Theme::VanillaNitroCola => 100,
            Theme::OrangeCreamsicle => 101,
            Theme::ShirleyTemple => 102,
            Theme::EarthTones => 103,
            Theme::EvergladeGreen => 104,
            Theme::ButteredToast => 105,
            Theme::DarkMauve => 200,
            Theme::Terminal => 300,
            Theme::TerminalGrayscale => 301,
            Theme::Origami => 302,
        }
    }

    /// The concatenated, word-capitalised name (`GrapeSoda`).
    pub fn name(self) -> &'static str {
        match self {
            Theme::NeutralDefault => "NeutralDefault",
            Theme::NeutralGrey => "NeutralGrey",
            Theme::FlagshipTerrastruct => "FlagshipTerrastruct",
            Theme::CoolClassics => "CoolClassics",
            Theme::MixedBerryBlue => "MixedBerryBlue",
            Theme::GrapeSoda => "GrapeSoda",
            Theme::Aubergine => "Aubergine",
            Theme::ColorblindClear => "ColorblindClear",
            Theme::VanillaNitroCola => "VanillaNitroCola",
            Theme::OrangeCreamsicle => "OrangeCreamsicle",
            Theme::ShirleyTemple => "ShirleyTemple",
            Theme::EarthTones => "EarthTones",
            Theme::EvergladeGreen => "EvergladeGreen",
            Theme::ButteredToast => "ButteredToast",
            Theme::DarkMauve => "DarkMauve",
            Theme::Terminal => "Terminal",
            Theme::TerminalGrayscale => "TerminalGrayscale",
            Theme::Origami => "Origami",
        }
    }

    pub fn from_code(code: i64) -> Option<Theme> {
        Theme::ALL.into_iter().find(|t| i64::from(t.code()) == code)
    }

    /// Look a theme up by name.
    ///
    /// Each whitespace-separated word has its first letter capitalised and
    /// the words are concatenated, so `grape soda` and `GrapeSoda` both match.
    pub fn from_name(name: &str) -> Option<Theme> {
        let normalised: String = name.split_whitespace().map(capitalise_first).collect();
        if normalised == "ShirelyTemple" {
            return Some(Theme::ShirleyTemple);
        }
        Theme::ALL.into_iter().find(|t| t.name() == normalised)
    }

    /// Parse a `theme=` annotation value: a numeric code first, then a name.
    pub fn parse(value: &str) -> Result<Theme, AnnotationWarning> {
        if let Ok(code) = value.trim().parse::<i64>() {
            return Theme::from_code(code)
                .ok_or_else(|| AnnotationWarning::invalid("theme", value, "unknown theme code"));
        }
        Theme::from_name(value)
            .ok_or_else(|| AnnotationWarning::invalid("theme", value, "unknown theme name"))
    }
}

fn capitalise_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// d2 layout engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layout {
    /// Directed-graph layout. (default)
    #[default]
    Dagre,
    Elk,
}

impl Layout {
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::Dagre => "dagre",
            Layout::Elk => "elk",
        }
    }

    /// Exact, case-sensitive match against the engine identifiers.
    pub fn parse(value: &str) -> Result<Layout, AnnotationWarning> {
        match value {
            "dagre" => Ok(Layout::Dagre),
            "elk" => Ok(Layout::Elk),
            _ => Err(AnnotationWarning::invalid(
                "layout",
                value,
                "unknown layout engine (expected dagre or elk)",
            )),
        }
    }
}

/// Encodings the renderer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Vector. (default)
    #[default]
    Svg,
    /// Raster.
    Png,
    /// Print document.
    Pdf,
}

impl OutputFormat {
    /// File extension, which is also the annotation value.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// MIME type for inline embedding. PDF output is never inlined.
    pub fn mime_type(self) -> Option<&'static str> {
        match self {
            OutputFormat::Svg => Some("image/svg+xml"),
            OutputFormat::Png => Some("image/png"),
            OutputFormat::Pdf => None,
        }
    }

    /// Exact, case-sensitive match against the extensions.
    pub fn parse(value: &str) -> Result<OutputFormat, AnnotationWarning> {
        match value {
            "svg" => Ok(OutputFormat::Svg),
            "png" => Ok(OutputFormat::Png),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(AnnotationWarning::invalid(
                "format",
                value,
                "unknown format (expected svg, png or pdf)",
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
