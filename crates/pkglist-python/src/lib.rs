//! Interpreter-backed `setup.py` evaluation
//!
//! Runs the build script under a real Python interpreter with `setup()` intercepted. This
//! executes arbitrary code from the project being listed.

pub mod discovery;
pub mod errors;
pub mod evaluator;

pub use discovery::find_python;
pub use errors::EvaluatorError;
pub use evaluator::PythonSetupEvaluator;

#[cfg(test)]
mod tests {
    use super::*;
    use pkglist_manifest::{ManifestError, SetupEvaluator};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Interpreter-backed tests are skipped when no interpreter is installed.
    fn evaluator() -> Option<PythonSetupEvaluator> {
        match find_python(None) {
            Ok(python) => Some(PythonSetupEvaluator::new(python)),
            Err(err) => {
                eprintln!("skipping: {err}");
                None
            }
        }
    }

    fn write_setup(dir: &TempDir, content: &str) -> std::io::Result<PathBuf> {
        let path = dir.path().join("setup.py");
        fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn test_evaluate_captures_arguments() -> Result<(), Box<dyn std::error::Error>> {
        let Some(evaluator) = evaluator() else {
            return Ok(());
        };
        let dir = TempDir::new()?;
        let path = write_setup(
            &dir,
            r#"from setuptools import setup

BASE = ["pyyaml>=2.1"]
print("building package-1")

setup(
    name="package-1",
    install_requires=BASE + ["grpcio==9.1"],
    extras_require={"test": ["pytest==5.2"], "local": ["mypackage"]},
)
"#,
        )?;

        let metadata = evaluator.evaluate(&path)?;
        assert_eq!(metadata.install_requires, vec!["pyyaml>=2.1", "grpcio==9.1"]);
        assert_eq!(
            metadata.extras_require,
            vec![
                ("test".to_string(), vec!["pytest==5.2".to_string()]),
                ("local".to_string(), vec!["mypackage".to_string()]),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_evaluate_runs_main_guard() -> Result<(), Box<dyn std::error::Error>> {
        let Some(evaluator) = evaluator() else {
            return Ok(());
        };
        let dir = TempDir::new()?;
        let path = write_setup(
            &dir,
            "import setuptools\nif __name__ == '__main__':\n    setuptools.setup(install_requires='six\\nredis')\n",
        )?;

        let metadata = evaluator.evaluate(&path)?;
        assert_eq!(metadata.install_requires, vec!["six", "redis"]);
        assert!(metadata.extras_require.is_empty());
        Ok(())
    }

    #[test]
    fn test_script_failure_is_evaluation_error() -> Result<(), Box<dyn std::error::Error>> {
        let Some(evaluator) = evaluator() else {
            return Ok(());
        };
        let dir = TempDir::new()?;
        let path = write_setup(&dir, "raise RuntimeError('broken build')\n")?;

        match evaluator.evaluate(&path) {
            Err(ManifestError::Evaluation { path: reported, message }) => {
                assert_eq!(reported, path);
                assert!(message.contains("broken build"), "{message}");
            }
            other => panic!("expected an evaluation error, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_script_without_setup_call() -> Result<(), Box<dyn std::error::Error>> {
        let Some(evaluator) = evaluator() else {
            return Ok(());
        };
        let dir = TempDir::new()?;
        let path = write_setup(&dir, "print('nothing to see')\n")?;

        assert!(matches!(
            evaluator.run(&path),
            Err(EvaluatorError::NoSetupCall)
        ));
        Ok(())
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let evaluator = PythonSetupEvaluator::new("/nonexistent/python3");
        assert!(matches!(
            evaluator.run(std::path::Path::new("/nonexistent/setup.py")),
            Err(EvaluatorError::Spawn { .. })
        ));
    }
}
