//! Renderer invocation: d2 source file → image file.
//!
//! The [`Renderer`] trait is the seam between the filter and the outside
//! world. [`D2Cli`] runs the installed `d2` binary; tests and embedders can
//! supply their own implementation through
//! [`crate::config::FilterConfigBuilder::renderer`].
//!
//! The call blocks until the process exits, with no timeout. Its stdout and
//! stderr are captured so nothing but the filtered document ever reaches the
//! filter's own stdout.

use crate::config::{Layout, Theme};
use crate::error::FilterError;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Everything a renderer needs for one diagram.
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
    /// Name used in diagnostics (the derived output file name).
    pub diagram: &'a str,
    pub theme: Theme,
    pub layout: Layout,
    pub sketch: bool,
    pub pad: u32,
    /// Staged diagram source.
    pub input: &'a Path,
    /// Where the image must be written. Its extension selects the format.
    pub output: &'a Path,
}

/// Turns a staged d2 source file into an image file.
pub trait Renderer: Send + Sync {
    /// Render `request.input` into `request.output`, returning once the file is written.
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), FilterError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// The `d2` command-line renderer.
#[derive(Debug, Clone)]
pub struct D2Cli {
    program: PathBuf,
}

impl D2Cli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate `d2` via [`d2_locate::locate_d2`].
    pub fn locate() -> Result<Self, FilterError> {
        Ok(Self::new(d2_locate::locate_d2()?))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `d2 --theme=<n> --layout=<l> --sketch=<b> --pad=<n> <input> <output>`
    pub fn command(&self, request: &RenderRequest<'_>) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.arg(format!("--theme={}", request.theme.code()))
            .arg(format!("--layout={}", request.layout.as_str()))
            .arg(format!("--sketch={}", request.sketch))
            .arg(format!("--pad={}", request.pad))
            .arg(request.input)
            .arg(request.output);
        cmd
    }
}

impl Renderer for D2Cli {
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), FilterError> {
        info!(
            "Rendering '{}' (theme {}, layout {}, sketch {}, pad {})",
            request.diagram,
            request.theme.code(),
            request.layout.as_str(),
            request.sketch,
            request.pad
        );

        let output = self
            .command(request)
            .output()
            .map_err(|e| FilterError::RendererSpawn {
                program: self.program().to_path_buf(),
                source: e,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            debug!("{} stderr: {}", self.program().display(), stderr);
        }

        if !output.status.success() {
            return Err(FilterError::RenderFailed {
                diagram: request.diagram.to_string(),
                status: output.status,
                stderr,
            });
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "d2"
    }
}
