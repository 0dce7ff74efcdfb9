//! Configuration for calcgate-runtime.

use calcgate_core::AdmissionPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::evaluator::BC_PRELUDE;

/// Errors loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Length bounds for the two entry points
    #[serde(default)]
    pub admission: AdmissionPolicy,

    /// Evaluator process settings
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

impl RuntimeConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, as JSON when the extension is `.json` and YAML otherwise.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&source)
        } else {
            Self::from_yaml(&source)
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admission.natural_language_max_len == 0 {
            return Err(ConfigError::Invalid(
                "admission.natural_language_max_len must be greater than zero".to_string(),
            ));
        }
        if self.admission.expression_max_len == 0 {
            return Err(ConfigError::Invalid(
                "admission.expression_max_len must be greater than zero".to_string(),
            ));
        }
        if self.evaluator.program().is_none() {
            return Err(ConfigError::Invalid(
                "evaluator.command must name a program".to_string(),
            ));
        }
        if self.evaluator.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "evaluator.timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// External evaluator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Program and arguments
    #[serde(default = "default_command")]
    pub command: Vec<String>,

    /// Per-evaluation timeout
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Definitions sent before each expression (built-in prelude for `bc`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prelude: Option<String>,
}

fn default_command() -> Vec<String> {
    vec!["bc".to_string(), "-l".to_string()]
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            timeout: default_timeout(),
            prelude: None,
        }
    }
}

impl EvaluatorConfig {
    /// The program to run, if the command names one.
    pub fn program(&self) -> Option<&str> {
        self.command
            .first()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    /// Whether the program is `bc`, by file name.
    pub fn is_bc(&self) -> bool {
        self.program()
            .and_then(|p| Path::new(p).file_name())
            .map(|name| name == "bc")
            .unwrap_or(false)
    }

    /// The configured prelude, or [`BC_PRELUDE`] when running `bc`.
    ///
    /// An explicitly empty prelude disables it.
    pub fn effective_prelude(&self) -> Option<&str> {
        match &self.prelude {
            Some(prelude) if prelude.trim().is_empty() => None,
            Some(prelude) => Some(prelude.as_str()),
            None if self.is_bc() => Some(BC_PRELUDE),
            None => None,
        }
    }
}

// Durations as humantime strings ("5s", "250ms")
mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
