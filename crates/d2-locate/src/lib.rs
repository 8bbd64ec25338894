//! # d2-locate
//!
//! Find the [d2](https://d2lang.com) diagram renderer on the local machine so
//! callers can fail fast, before any work is done, when it is not installed.
//!
//! ## How it works
//!
//! On a call to [`locate_d2`] or [`locate_renderer`]:
//!
//! 1. If `D2_BIN` is set, that path is used (it must point at a file).
//! 2. Otherwise every directory of `PATH` is searched for `d2`
//!    (`d2.exe` on Windows).
//!
//! The default lookup is resolved once per process.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use d2_locate::locate_d2;
//!
//! match locate_d2() {
//!     Ok(path) => println!("rendering with {}", path.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Environment variable overrides
//!
//! - `D2_BIN` — path to an existing d2 executable; skips the `PATH` search.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Executable name searched for by [`locate_d2`].
pub const D2_EXECUTABLE: &str = "d2";

/// Environment variable that overrides the `PATH` search.
pub const D2_BIN_ENV: &str = "D2_BIN";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by d2-locate operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    /// Nothing named `name` was found in any `PATH` directory.
    #[error("{name} is not installed")]
    NotFound { name: String },

    /// An explicit override points at something that is not a file.
    #[error("Renderer override '{path}' does not exist or is not a file")]
    InvalidOverride { path: PathBuf },
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static RESOLVED_D2: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Locate the `d2` executable, honouring `D2_BIN`.
///
/// Successful lookups are cached for the rest of the process.
pub fn locate_d2() -> Result<PathBuf, LocateError> {
    if let Some(path) = RESOLVED_D2.get() {
        return Ok(path.clone());
    }

    let path = locate_renderer(D2_EXECUTABLE)?;
    let _ = RESOLVED_D2.set(path.clone());
    Ok(path)
}

/// Locate an executable called `name`, honouring `D2_BIN`.
pub fn locate_renderer(name: &str) -> Result<PathBuf, LocateError> {
    resolve(
        name,
        std::env::var_os(D2_BIN_ENV),
        std::env::var_os("PATH"),
    )
}

/// Check that an explicitly configured renderer path exists.
pub fn verify_explicit(path: impl AsRef<Path>) -> Result<PathBuf, LocateError> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(LocateError::InvalidOverride {
            path: path.to_path_buf(),
        })
    }
}

/// Search each directory in `path_var` for an executable called `name`.
///
/// Returns the first match in `PATH` order.
pub fn find_in_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidate_names(name).map(move |exe| dir.join(exe)))
        .find(|candidate| is_executable(candidate))
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn resolve(
    name: &str,
    override_path: Option<OsString>,
    path_var: Option<OsString>,
) -> Result<PathBuf, LocateError> {
    // 1. Environment variable override.
    if let Some(p) = override_path.filter(|p| !p.is_empty()) {
        return verify_explicit(PathBuf::from(p));
    }

    // 2. PATH search.
    path_var
        .as_deref()
        .and_then(|paths| find_in_path(name, paths))
        .ok_or_else(|| LocateError::NotFound {
            name: name.to_string(),
        })
}

fn candidate_names(name: &str) -> impl Iterator<Item = String> {
    let mut names = vec![name.to_string()];
    if cfg!(windows) && Path::new(name).extension().is_none() {
        names.push(format!("{name}.exe"));
    }
    names.into_iter()
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
