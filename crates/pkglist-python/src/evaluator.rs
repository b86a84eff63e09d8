use pkglist_config::Config;
use pkglist_logger as logger;
use pkglist_manifest::{ManifestError, SetupEvaluator, SetupMetadata};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::discovery::find_python;
use crate::errors::EvaluatorError;

/// Prefix of the stdout line carrying the captured arguments, so that output printed by the
/// script itself is ignored.
const RESULT_MARKER: &str = "__PIP_PACKAGE_LIST_SETUP__";

/// Replaces `setup()` in setuptools and distutils with a function that records its keyword
/// arguments, runs the script as `__main__`, and prints what was recorded. When setuptools is
/// not installed a stand-in module is registered so that `from setuptools import setup` works.
const CAPTURE_SCRIPT: &str = r#"
import json
import os
import runpy
import sys
import types

captured = {}
called = []


def _capture(*args, **kwargs):
    called.append(True)
    captured.update(kwargs)


try:
    import setuptools
except ImportError:
    setuptools = types.ModuleType("setuptools")
    setuptools.find_packages = lambda *args, **kwargs: []
    setuptools.find_namespace_packages = lambda *args, **kwargs: []
    sys.modules["setuptools"] = setuptools
setuptools.setup = _capture

try:
    import distutils.core
    distutils.core.setup = _capture
except ImportError:
    pass

path = sys.argv[1]
sys.argv = [path]
sys.path.insert(0, os.path.dirname(path))
runpy.run_path(path, run_name="__main__")


def _listify(value):
    if value is None:
        return []
    if isinstance(value, str):
        return [line.strip() for line in value.splitlines() if line.strip()]
    return [str(item) for item in value]


extras = captured.get("extras_require") or {}
result = {
    "called": bool(called),
    "install_requires": _listify(captured.get("install_requires")),
    "extras_require": [[str(name), _listify(reqs)] for name, reqs in extras.items()],
}
print(MARKER + json.dumps(result))
"#;

#[derive(Deserialize)]
struct Captured {
    called: bool,
    #[serde(flatten)]
    metadata: SetupMetadata,
}

/// Evaluates `setup.py` files by running them under a Python interpreter.
///
/// The script runs with full privileges of the current user; only use it on trusted projects.
#[derive(Debug, Clone)]
pub struct PythonSetupEvaluator {
    interpreter: PathBuf,
}

impl PythonSetupEvaluator {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        PythonSetupEvaluator {
            interpreter: interpreter.into(),
        }
    }

    /// Use the interpreter from the configuration, or the first one found on `PATH`.
    pub fn discover(config: &Config) -> Result<Self, EvaluatorError> {
        let configured = config.python_path.as_deref().map(Path::new);
        Ok(Self::new(find_python(configured)?))
    }

    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }

    pub fn run(&self, path: &Path) -> Result<SetupMetadata, EvaluatorError> {
        let script = CAPTURE_SCRIPT.replace("MARKER", &format!("{RESULT_MARKER:?}"));
        let mut command = Command::new(&self.interpreter);
        command.arg("-c").arg(script).arg(path);
        if let Some(parent) = path.parent().filter(|parent| parent.is_dir()) {
            command.current_dir(parent);
        }

        debug!(
            "Running {} with {}",
            path.display(),
            self.interpreter.display()
        );
        let output = command.output().map_err(|source| EvaluatorError::Spawn {
            interpreter: self.interpreter.clone(),
            source,
        })?;
        logger::capture_output(&format!("python {}", path.display()), &output);

        if !output.status.success() {
            return Err(EvaluatorError::ScriptFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let captured: Captured = match stdout
            .lines()
            .rev()
            .find_map(|line| line.strip_prefix(RESULT_MARKER))
        {
            Some(json) => serde_json::from_str(json)?,
            None => return Err(EvaluatorError::NoSetupCall),
        };
        if !captured.called {
            return Err(EvaluatorError::NoSetupCall);
        }
        Ok(captured.metadata)
    }
}

impl SetupEvaluator for PythonSetupEvaluator {
    fn evaluate(&self, path: &Path) -> Result<SetupMetadata, ManifestError> {
        self.run(path).map_err(|err| err.into_manifest_error(path))
    }
}
