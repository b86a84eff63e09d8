//! Locating a Python interpreter
//!
//! Order: the configured `python-path` (an executable or a virtual environment), then
//! `python3` and `python` on `PATH`.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::EvaluatorError;

/// The name of the binaries/scripts directory in a Python venv
/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const PYTHON_BIN_DIR: &str = "bin";

/// Candidate executable names in a venv
#[cfg(not(windows))]
const VENV_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const VENV_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Interpreters looked up on `PATH`
const PATH_CANDIDATES: &[&str] = &["python3", "python"];

/// Find the interpreter to evaluate build scripts with.
pub fn find_python(configured: Option<&Path>) -> Result<PathBuf, EvaluatorError> {
    if let Some(configured) = configured {
        return resolve_configured(configured);
    }

    for candidate in PATH_CANDIDATES {
        match which::which(candidate) {
            Ok(path) => {
                debug!("Using {} from PATH: {}", candidate, path.display());
                return Ok(path);
            }
            Err(err) => debug!("{} not found on PATH: {}", candidate, err),
        }
    }

    Err(EvaluatorError::InterpreterNotFound(
        PATH_CANDIDATES.join(", "),
    ))
}

/// A configured path is either an interpreter or the root of a virtual environment.
fn resolve_configured(configured: &Path) -> Result<PathBuf, EvaluatorError> {
    if configured.is_file() {
        debug!("Using configured interpreter: {}", configured.display());
        return Ok(configured.to_path_buf());
    }

    if configured.is_dir() {
        let bin_dir = configured.join(PYTHON_BIN_DIR);
        if let Some(executable) = VENV_EXE_CANDIDATES
            .iter()
            .map(|name| bin_dir.join(name))
            .find(|candidate| candidate.is_file())
        {
            debug!("Using interpreter from venv: {}", executable.display());
            return Ok(executable);
        }
    }

    // Bare names such as `python3.11` are looked up on PATH.
    if configured.components().count() == 1 {
        if let Ok(path) = which::which(configured) {
            return Ok(path);
        }
    }

    Err(EvaluatorError::InterpreterNotFound(
        configured.display().to_string(),
    ))
}
