//! User configuration for pip-package-list
//!
//! Stored as TOML at `$PIP_PACKAGE_LIST_CONFIG`, or `~/.config/pip-package-list/config.toml`
//! (the platform config directory on Windows). A missing file means defaults.

pub mod errors;

use pkglist_manifest::ListOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use errors::ConfigError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PIP_PACKAGE_LIST_CONFIG";

const APP_DIR: &str = "pip-package-list";
const CONFIG_FILE: &str = "config.toml";
const LIST_PREFIX: &str = "list.";

/// How `setup.py` files are evaluated
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    /// Read the `setup()` call from the syntax tree
    #[default]
    Static,
    /// Run the script under a Python interpreter
    Python,
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluatorKind::Static => f.write_str("static"),
            EvaluatorKind::Python => f.write_str("python"),
        }
    }
}

impl FromStr for EvaluatorKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(EvaluatorKind::Static),
            "python" => Ok(EvaluatorKind::Python),
            _ => Err(ConfigError::InvalidValue {
                key: "evaluator".to_string(),
                value: value.to_string(),
                expected: "static or python",
            }),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluator: Option<EvaluatorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_path: Option<String>,
    /// Defaults for `pip-package-list list`
    #[serde(default, skip_serializing_if = "is_default_options")]
    pub list: ListOptions,
}

fn is_default_options(options: &ListOptions) -> bool {
    *options == ListOptions::default()
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        // Honor explicit override for tests / isolated runs.
        if let Ok(env_path) = std::env::var(CONFIG_ENV) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir().map(|home| home.join(".config"));

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir();

        base.map(|base| base.join(APP_DIR).join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)
    }

    /// The configured evaluator, or the static one
    pub fn evaluator(&self) -> EvaluatorKind {
        self.evaluator.unwrap_or_default()
    }

    /// Every key accepted by [`Config::get`] and [`Config::set`]
    pub fn keys() -> Vec<String> {
        let mut keys = vec!["evaluator".to_string(), "python-path".to_string()];
        keys.extend(
            ListOptions::KEYS
                .iter()
                .map(|key| format!("{LIST_PREFIX}{key}")),
        );
        keys
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "evaluator" => self.evaluator.map(|kind| kind.to_string()),
            "python-path" => self.python_path.clone(),
            _ => key
                .strip_prefix(LIST_PREFIX)
                .and_then(|option| self.list.get(option))
                .map(|value| value.to_string()),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "evaluator" => self.evaluator = Some(value.parse()?),
            "python-path" => self.python_path = Some(value.to_string()),
            _ => {
                let option = key
                    .strip_prefix(LIST_PREFIX)
                    .filter(|option| self.list.get(option).is_some())
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let value = parse_bool(key, value)?;
                self.list.set(option, value);
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.evaluator.is_none() && self.python_path.is_none() && is_default_options(&self.list)
    }

    /// Values that differ from the defaults, in key order
    pub fn values_iter(&self) -> Vec<(String, String)> {
        let mut values = Vec::new();
        if let Some(evaluator) = self.evaluator {
            values.push(("evaluator".to_string(), evaluator.to_string()));
        }
        if let Some(ref python_path) = self.python_path {
            values.push(("python-path".to_string(), python_path.clone()));
        }
        for key in ListOptions::KEYS {
            if self.list.get(key) == Some(true) {
                values.push((format!("{LIST_PREFIX}{key}"), "true".to_string()));
            }
        }
        values
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "true or false",
        }),
    }
}
