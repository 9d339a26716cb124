//! Logging configuration
//!
//! Builds the `EnvFilter` directive for the service. The HTTP client and
//! TLS stack are quieted to `warn` unless a `[log.targets]` entry says otherwise.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Dependencies whose debug output drowns the dashboard's own logs
const QUIET_TARGETS: [&str; 4] = ["hyper", "h2", "reqwest", "rustls"];

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive name understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "unknown log level '{}', expected trace, debug, info, warn or error",
                s
            )),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    Console,
    /// One JSON object per event, for log shipping
    Json,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "json"
///
/// [log.targets]
/// growth_warehouse = "debug"
/// reqwest = "info"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Base level for every target
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,

    /// Per-target levels, keyed by module path
    pub targets: BTreeMap<String, LogLevel>,
}

impl LogConfig {
    /// `EnvFilter` directive for this config
    ///
    /// `base` replaces the configured level (the `--log-level` flag).
    pub fn filter_directive(&self, base: Option<LogLevel>) -> String {
        let base = base.unwrap_or(self.level);

        let mut targets: BTreeMap<&str, LogLevel> = QUIET_TARGETS
            .iter()
            .map(|t| (*t, base.max(LogLevel::Warn)))
            .collect();
        for (target, level) in &self.targets {
            targets.insert(target.as_str(), *level);
        }

        let mut directive = base.as_str().to_string();
        for (target, level) in targets {
            directive.push(',');
            directive.push_str(target);
            directive.push('=');
            directive.push_str(level.as_str());
        }
        directive
    }

    /// First target name that cannot appear in a filter directive
    pub fn invalid_target(&self) -> Option<&str> {
        self.targets.keys().map(String::as_str).find(|t| {
            t.is_empty()
                || !t
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        })
    }
}
