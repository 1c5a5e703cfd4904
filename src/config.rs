//! Report and log configuration.
//!
//! Settings come from `Config::default()`, optionally overridden by environment variables
//! (`REPORT_PATH`, `REPORT_TYPE`, `LOG_PATH`, `LOG_LEVEL`). The report mode is only
//! validated when a report filename is generated, so a bad `REPORT_TYPE` surfaces as a
//! `ConfigError` before any report file exists.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sink::FileLevel;

pub const REPORT_PATH_VAR: &str = "REPORT_PATH";
pub const REPORT_TYPE_VAR: &str = "REPORT_TYPE";
pub const LOG_PATH_VAR: &str = "LOG_PATH";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";

/// How report files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// One fixed file (`report_name`), overwritten by every run.
    Single,
    /// One file per suite run, named from the suite and a millisecond timestamp.
    Multi,
}

impl FromStr for ReportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(ReportMode::Single),
            "multi" => Ok(ReportMode::Multi),
            other => Err(ConfigError::UnknownReportMode {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Single => f.write_str("single"),
            ReportMode::Multi => f.write_str("multi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report_path: PathBuf,
    /// Kept as raw text; see [`Config::report_mode`].
    pub report_type: String,
    pub report_name: String,
    pub screenshot_directory: String,
    pub log_path: PathBuf,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("target/extent-reports/"),
            report_type: "single".to_string(),
            report_name: "index".to_string(),
            screenshot_directory: "screenshots".to_string(),
            log_path: PathBuf::from("target/logs/vouch.log"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::with_env(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`; blank values are ignored.
    pub fn with_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = value(REPORT_PATH_VAR) {
            config.report_path = PathBuf::from(path);
        }
        if let Some(mode) = value(REPORT_TYPE_VAR) {
            config.report_type = mode;
        }
        if let Some(path) = value(LOG_PATH_VAR) {
            config.log_path = PathBuf::from(path);
        }
        if let Some(level) = value(LOG_LEVEL_VAR) {
            config.log_level = level;
        }
        config
    }

    /// `report_path/screenshot_directory`.
    pub fn screenshot_path(&self) -> PathBuf {
        self.report_path.join(&self.screenshot_directory)
    }

    /// File sink threshold. Unknown levels fall back to `INFO`.
    pub fn file_level(&self) -> FileLevel {
        self.log_level.parse().unwrap_or(FileLevel::Info)
    }

    pub fn report_mode(&self) -> Result<ReportMode, ConfigError> {
        self.report_type.parse()
    }

    /// Report filename without extension.
    ///
    /// - `single`: `report_name`
    /// - `multi`: suite name with spaces as `_`, lowercased, then `_<now_millis>`
    pub fn report_filename(&self, suite_name: &str, now_millis: i64) -> Result<String, ConfigError> {
        Ok(match self.report_mode()? {
            ReportMode::Single => self.report_name.clone(),
            ReportMode::Multi => format!(
                "{}_{}",
                suite_name.replace(' ', "_").to_lowercase(),
                now_millis
            ),
        })
    }
}

#[cfg(test)]
mod config_tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::with_env(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.report_path, PathBuf::from("target/extent-reports/"));
        assert_eq!(config.report_mode().unwrap(), ReportMode::Single);
        assert_eq!(
            config.screenshot_path(),
            PathBuf::from("target/extent-reports/screenshots")
        );
        assert_eq!(config.file_level(), FileLevel::Info);
    }

    #[test]
    fn test_env_overrides_and_blank_values() {
        let config = env(&[
            (REPORT_PATH_VAR, "out/reports"),
            (REPORT_TYPE_VAR, "multi"),
            (LOG_LEVEL_VAR, "  "),
        ]);
        assert_eq!(config.report_path, PathBuf::from("out/reports"));
        assert_eq!(config.report_mode().unwrap(), ReportMode::Multi);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_report_filenames() {
        let single = Config::default();
        assert_eq!(single.report_filename("Any Suite", 1).unwrap(), "index");

        let multi = env(&[(REPORT_TYPE_VAR, "multi")]);
        assert_eq!(
            multi.report_filename("Smoke Suite", 1700000000123).unwrap(),
            "smoke_suite_1700000000123"
        );
    }

    #[test]
    fn test_unknown_mode_is_config_error() {
        let weird = env(&[(REPORT_TYPE_VAR, "weird")]);
        let err = weird.report_filename("Suite", 0).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownReportMode { ref value } if value == "weird"));
    }

    #[test]
    fn test_unparsable_log_level_falls_back_to_info() {
        let config = env(&[(LOG_LEVEL_VAR, "verbose")]);
        assert_eq!(config.file_level(), FileLevel::Info);
        let config = env(&[(LOG_LEVEL_VAR, "warning")]);
        assert_eq!(config.file_level(), FileLevel::Warn);
    }
}
