//! Temp-file staging for one render.
//!
//! The renderer reads from and writes to files, so each block gets a fresh
//! uniquely-named input file holding its source, and an output path derived
//! from it (`<input>.<ext>`). Both are owned by guards: the input is deleted
//! when [`StagedInput`] drops, the output when [`StagedOutput`] drops unless
//! it was explicitly [persisted](StagedOutput::persist).

use crate::config::OutputFormat;
use crate::error::FilterError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

/// The diagram source, written to a temp file.
#[derive(Debug)]
pub struct StagedInput {
    file: NamedTempFile,
}

impl StagedInput {
    /// Write `source` to a new temp file in `dir` (system temp dir if None).
    pub fn create(source: &str, dir: Option<&Path>) -> Result<StagedInput, FilterError> {
        let dir = dir.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let stage_err = |source| FilterError::Stage {
            dir: dir.clone(),
            source,
        };

        let mut file = Builder::new()
            .prefix("d2-filter-")
            .suffix(".d2")
            .tempfile_in(&dir)
            .map_err(stage_err)?;
        file.write_all(source.as_bytes()).map_err(stage_err)?;
        file.flush().map_err(stage_err)?;

        debug!("Staged {} bytes of d2 source at {}", source.len(), file.path().display());
        Ok(StagedInput { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Output location for `format`, next to the input.
    pub fn output_for(&self, format: OutputFormat) -> StagedOutput {
        let mut name = self.path().as_os_str().to_os_string();
        name.push(".");
        name.push(format.extension());
        StagedOutput {
            path: PathBuf::from(name),
            keep: false,
        }
    }
}

/// Where the renderer writes its image.
#[derive(Debug)]
pub struct StagedOutput {
    path: PathBuf,
    keep: bool,
}

impl StagedOutput {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file after this guard is dropped and return its path.
    pub fn persist(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for StagedOutput {
    fn drop(&mut self) {
        if !self.keep && self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                debug!("Could not remove staged output {}: {}", self.path.display(), e);
            }
        }
    }
}
