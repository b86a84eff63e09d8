//! Build-script (`setup.py`) manifests
//!
//! Reading a `setup.py` means getting at the arguments of its `setup(...)` call. How that is
//! done is up to a [`SetupEvaluator`]; this module only turns the captured requirement strings
//! into entries.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::entry::Source;
use crate::errors::ManifestError;
use crate::parser::parse_requirements;
use crate::paths::realpath;
use crate::EntryStream;

/// Requirements declared by a `setup.py`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupMetadata {
    #[serde(default)]
    pub install_requires: Vec<String>,
    /// Extras in declaration order
    #[serde(default)]
    pub extras_require: Vec<(String, Vec<String>)>,
}

impl SetupMetadata {
    /// `install_requires`, followed by the requirements of every extra in `active_extras`.
    ///
    /// Extras are visited in declaration order, not in the order they were asked for.
    pub fn requirements_for(&self, active_extras: &[String]) -> Vec<String> {
        let mut requirements = self.install_requires.clone();
        for (extra, extra_requirements) in &self.extras_require {
            if active_extras.iter().any(|active| active == extra) {
                requirements.extend(extra_requirements.iter().cloned());
            }
        }
        requirements
    }
}

/// Obtains the `setup(...)` arguments of a build script
pub trait SetupEvaluator {
    fn evaluate(&self, path: &Path) -> Result<SetupMetadata, ManifestError>;
}

/// Evaluate a `setup.py` and parse its requirements, including those of `active_extras`.
pub fn read_setup_py(
    path: &Path,
    active_extras: &[String],
    evaluator: &dyn SetupEvaluator,
) -> Result<EntryStream<'static>, ManifestError> {
    let absolute_path = realpath(path);
    if !absolute_path.is_file() {
        return Err(ManifestError::io(
            &absolute_path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
        ));
    }

    let metadata = evaluator.evaluate(&absolute_path)?;
    let requirements = metadata.requirements_for(active_extras);
    debug!(
        "Evaluated {}: {} requirements (extras: {:?})",
        absolute_path.display(),
        requirements.len(),
        active_extras
    );

    Ok(Box::new(parse_requirements(
        Some(Source::file(absolute_path)),
        requirements,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use tempfile::TempDir;

    struct FixedEvaluator(SetupMetadata);

    impl SetupEvaluator for FixedEvaluator {
        fn evaluate(&self, _path: &Path) -> Result<SetupMetadata, ManifestError> {
            Ok(self.0.clone())
        }
    }

    fn metadata() -> SetupMetadata {
        SetupMetadata {
            install_requires: vec!["django>=4.0".to_string(), "redis".to_string()],
            extras_require: vec![
                ("test".to_string(), vec!["pytest".to_string()]),
                ("docs".to_string(), vec!["sphinx".to_string()]),
            ],
        }
    }

    #[test]
    fn test_requirements_for_active_extras() {
        let metadata = metadata();
        assert_eq!(metadata.requirements_for(&[]), vec!["django>=4.0", "redis"]);
        assert_eq!(
            metadata.requirements_for(&["docs".to_string(), "test".to_string()]),
            vec!["django>=4.0", "redis", "pytest", "sphinx"]
        );
        assert_eq!(
            metadata.requirements_for(&["unknown".to_string()]),
            vec!["django>=4.0", "redis"]
        );
    }

    #[test]
    fn test_read_setup_py() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let path = dir.path().join("setup.py");
        std::fs::write(&path, "from setuptools import setup\nsetup()\n")?;

        let evaluator = FixedEvaluator(metadata());
        let entries = read_setup_py(&path, &["test".to_string()], &evaluator)?
            .collect::<Result<Vec<_>, _>>()?;
        let names: Vec<_> = entries.iter().filter_map(Entry::canonical_name).collect();
        assert_eq!(names, vec!["django", "redis", "pytest"]);

        let source = entries[2].source().cloned().unwrap_or_else(|| Source::file(""));
        assert_eq!(source.path, realpath(&path));
        assert_eq!(source.line_number, Some(3));
        Ok(())
    }

    #[test]
    fn test_read_missing_setup_py() {
        let dir = TempDir::new().unwrap_or_else(|err| panic!("{err}"));
        let evaluator = FixedEvaluator(SetupMetadata::default());
        let result = read_setup_py(&dir.path().join("setup.py"), &[], &evaluator);
        assert!(matches!(result, Err(ManifestError::Io { .. })));
    }

    #[test]
    fn test_metadata_from_json() -> Result<(), serde_json::Error> {
        let metadata: SetupMetadata = serde_json::from_str(
            r#"{"install_requires": ["six"], "extras_require": [["dev", ["black"]]]}"#,
        )?;
        assert_eq!(metadata.install_requires, vec!["six"]);
        assert_eq!(
            metadata.extras_require,
            vec![("dev".to_string(), vec!["black".to_string()])]
        );
        Ok(())
    }
}
