//! Static `setup.py` evaluation using ast-grep
//!
//! The build script is parsed, never executed. The literal arguments of its `setup(...)` call
//! are read from the syntax tree:
//! 1. module-level assignments are collected, so `install_requires=REQUIREMENTS` resolves
//! 2. the first call to `setup` (or `<module>.setup`) is located
//! 3. `install_requires` and `extras_require` are evaluated from lists, tuples, dicts, strings
//!    and `+` concatenations of those
//!
//! Anything that needs running Python code to compute is reported as an evaluation error;
//! `pkglist-python` covers those scripts.
pub mod extractor;

use pkglist_manifest::{ManifestError, SetupEvaluator, SetupMetadata};
use std::fs;
use std::path::Path;
use tracing::debug;

pub use extractor::extract_setup_metadata;

/// Reads `setup()` arguments without running the script
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSetupEvaluator;

impl SetupEvaluator for StaticSetupEvaluator {
    fn evaluate(&self, path: &Path) -> Result<SetupMetadata, ManifestError> {
        debug!("Statically evaluating {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        extract_setup_metadata(&content).map_err(|err| ManifestError::Evaluation {
            path: path.to_path_buf(),
            message: format!("{err:#}"),
        })
    }
}
