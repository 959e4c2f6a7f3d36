//! Logging configuration.
//!
//! | variable             | meaning                                   | default |
//! |----------------------|-------------------------------------------|---------|
//! | `LISTENTO_LOG`       | `EnvFilter` directives (`RUST_LOG` if unset) | `info`  |
//! | `LISTENTO_LOG_FORMAT`| `json`, `pretty` or `compact`             | `json`  |

use std::env;
use std::str::FromStr;

use serde::Deserialize;

pub const FILTER_VAR: &str = "LISTENTO_LOG";
pub const FORMAT_VAR: &str = "LISTENTO_LOG_FORMAT";
pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
    pub format: LogFormat,
    /// Format value that could not be parsed; reported once logging is up.
    #[serde(skip)]
    pub(crate) rejected_format: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
            rejected_format: None,
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var(FILTER_VAR).ok(),
            env::var("RUST_LOG").ok(),
            env::var(FORMAT_VAR).ok(),
        )
    }

    fn from_vars(filter: Option<String>, rust_log: Option<String>, format: Option<String>) -> Self {
        let filter = filter
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        let (format, rejected_format) = match format.as_deref().map(LogFormat::from_str) {
            None => (LogFormat::default(), None),
            Some(Ok(format)) => (format, None),
            Some(Err(raw)) => (LogFormat::default(), Some(raw)),
        };

        Self {
            filter,
            format,
            rejected_format,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}
