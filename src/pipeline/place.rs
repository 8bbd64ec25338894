//! Output placement: decide what the image reference points at.
//!
//! | `folder` | format    | reference                          | staged file |
//! |----------|-----------|------------------------------------|-------------|
//! | none     | svg / png | `data:<mime>;base64,…`             | removed     |
//! | none     | pdf       | the staged output path, as is      | kept        |
//! | set      | any       | `<folder>/<filename>.<ext>`        | removed     |
//!
//! A PDF cannot be embedded as an image, so without a folder it is left in
//! the temp dir for the downstream toolchain to pick up.

use crate::config::OutputFormat;
use crate::error::FilterError;
use crate::pipeline::encode;
use crate::pipeline::stage::StagedOutput;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Where a rendered image ends up.
#[derive(Debug, Clone, Copy)]
pub struct Placement<'a> {
    pub format: OutputFormat,
    /// Output folder relative to `base_dir`. None (or empty) means inline.
    pub folder: Option<&'a str>,
    pub filename: &'a str,
    /// Directory the folder is resolved against.
    pub base_dir: &'a Path,
}

/// Consume the staged output and return the image reference.
pub fn place_output(staged: StagedOutput, placement: &Placement<'_>) -> Result<String, FilterError> {
    if !staged.path().is_file() {
        return Err(FilterError::ReadOutput {
            path: staged.path().to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "renderer produced no output file",
            ),
        });
    }

    match placement.folder.filter(|f| !f.is_empty()) {
        None => inline(staged, placement.format),
        Some(folder) => into_folder(staged, folder, placement),
    }
}

fn inline(staged: StagedOutput, format: OutputFormat) -> Result<String, FilterError> {
    let Some(mime) = format.mime_type() else {
        let path = staged.persist();
        debug!("Leaving {} output at {}", format, path.display());
        return Ok(path.to_string_lossy().into_owned());
    };

    let bytes = fs::read(staged.path()).map_err(|e| FilterError::ReadOutput {
        path: staged.path().to_path_buf(),
        source: e,
    })?;
    Ok(encode::data_uri(mime, &bytes))
}

fn into_folder(
    staged: StagedOutput,
    folder: &str,
    placement: &Placement<'_>,
) -> Result<String, FilterError> {
    let dir = placement.base_dir.join(folder);
    // Single level only: a missing parent is an error.
    if !dir.is_dir() {
        fs::create_dir(&dir).map_err(|e| FilterError::OutputDir {
            path: dir.clone(),
            source: e,
        })?;
        info!("Created output folder {}", dir.display());
    }

    let file_name = format!("{}.{}", placement.filename, placement.format.extension());
    let dest = dir.join(&file_name);
    fs::copy(staged.path(), &dest).map_err(|e| FilterError::WriteOutput {
        path: dest.clone(),
        source: e,
    })?;
    debug!("Wrote {}", dest.display());

    // `staged` drops here and removes the temp copy.
    Ok(Path::new(folder).join(file_name).to_string_lossy().into_owned())
}
