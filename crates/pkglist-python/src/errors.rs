use pkglist_manifest::ManifestError;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while evaluating a `setup.py` under Python
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("No Python interpreter found (tried {0})")]
    InterpreterNotFound(String),

    #[error("Failed to run {}: {source}", .interpreter.display())]
    Spawn {
        interpreter: PathBuf,
        source: io::Error,
    },

    #[error("setup.py exited with {status}: {stderr}")]
    ScriptFailed { status: String, stderr: String },

    #[error("setup.py did not call setup()")]
    NoSetupCall,

    #[error("Failed to read captured setup() arguments: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

impl EvaluatorError {
    /// Attach the script path, for reporting through the manifest reader
    pub fn into_manifest_error(self, path: &Path) -> ManifestError {
        ManifestError::Evaluation {
            path: path.to_path_buf(),
            message: self.to_string(),
        }
    }
}
