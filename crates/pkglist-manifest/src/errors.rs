use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading and flattening manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot parse '{line}' in {location}")]
    EntryParse { line: String, location: String },

    #[error("Constraint '{0}' does not have a name")]
    ConstraintWithoutName(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to evaluate {}: {message}", .path.display())]
    Evaluation { path: PathBuf, message: String },
}

impl ManifestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ManifestError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_constraint_without_name_display() {
        let err = ManifestError::ConstraintWithoutName("-r base.txt".to_string());
        assert_eq!(err.to_string(), "Constraint '-r base.txt' does not have a name");
    }

    #[test]
    fn test_io_error_display_includes_path() {
        let err = ManifestError::io(
            "/tmp/missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "Failed to read /tmp/missing.txt: not found");
    }
}
