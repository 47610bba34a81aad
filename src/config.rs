//! Layered settings.
//!
//! Lowest to highest precedence: built-in defaults, an optional TOML file,
//! `SYSDASH_*` environment variables, then command-line overrides.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::Level;

use crate::data::duration::parse_duration;
use crate::error::ConfigError;
use crate::tracker::{SamplerConfig, TrackerConfig};

const ENV_PREFIX: &str = "SYSDASH";

/// Settings as they appear in files and the environment.
#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    interval: String,
    history_capacity: usize,
    degraded_after: u32,
    process_limit: usize,
    stop_timeout: String,
    log_file: Option<PathBuf>,
    log_level: String,
}

/// Values given on the command line, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub interval: Option<String>,
    pub history_capacity: Option<usize>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Validated runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Time between samples.
    pub interval: Duration,
    /// Samples kept per metric.
    pub history_capacity: usize,
    /// Consecutive failures before health is degraded.
    pub degraded_after: u32,
    /// Rows shown in the process table.
    pub process_limit: usize,
    /// How long to wait for the sampling task on quit.
    pub stop_timeout: Duration,
    pub log_file: Option<PathBuf>,
    pub log_level: Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            history_capacity: crate::data::history::DEFAULT_HISTORY_CAPACITY,
            degraded_after: 3,
            process_limit: 100,
            stop_timeout: Duration::from_secs(1),
            log_file: None,
            log_level: Level::INFO,
        }
    }
}

impl Settings {
    /// Load settings from all layers, reading `SYSDASH_*` from the process
    /// environment.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX), overrides)
    }

    fn load_with_env(
        file: Option<&Path>,
        env: Environment,
        overrides: &Overrides,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("interval", "1s")?
            .set_default("history_capacity", 60i64)?
            .set_default("degraded_after", 3i64)?
            .set_default("process_limit", 100i64)?
            .set_default("stop_timeout", "1s")?
            .set_default("log_level", "info")?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder
            .add_source(env.try_parsing(true))
            .set_override_option("interval", overrides.interval.clone())?
            .set_override_option(
                "history_capacity",
                overrides.history_capacity.map(|n| n as i64),
            )?
            .set_override_option(
                "log_file",
                overrides.log_file.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option("log_level", overrides.log_level.clone())?;

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigError> {
        let interval = positive_duration("interval", &raw.interval)?;
        let stop_timeout = positive_duration("stop_timeout", &raw.stop_timeout)?;

        if raw.history_capacity == 0 {
            return Err(invalid("history_capacity", "must be at least 1"));
        }
        if raw.degraded_after == 0 {
            return Err(invalid("degraded_after", "must be at least 1"));
        }
        if raw.process_limit == 0 {
            return Err(invalid("process_limit", "must be at least 1"));
        }

        let log_level = Level::from_str(raw.log_level.trim())
            .map_err(|_| invalid("log_level", format!("unknown level `{}`", raw.log_level)))?;

        Ok(Self {
            interval,
            history_capacity: raw.history_capacity,
            degraded_after: raw.degraded_after,
            process_limit: raw.process_limit,
            stop_timeout,
            log_file: raw.log_file,
            log_level,
        })
    }

    /// Tracker configuration derived from these settings.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            interval: self.interval,
            sampler: SamplerConfig {
                history_capacity: self.history_capacity,
                degraded_after: self.degraded_after,
            },
        }
    }
}

fn positive_duration(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let duration = parse_duration(value).map_err(|e| invalid(key, e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid(key, "must be greater than zero"));
    }
    Ok(duration)
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_without_sources() {
        let settings = Settings::load_with_env(None, env(&[]), &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn file_then_env_then_overrides() {
        let file = toml_file(
            "interval = \"250ms\"\nhistory_capacity = 120\nprocess_limit = 25\nlog_level = \"debug\"\n",
        );
        let overrides = Overrides {
            history_capacity: Some(30),
            ..Overrides::default()
        };

        let settings = Settings::load_with_env(
            Some(file.path()),
            env(&[("SYSDASH_INTERVAL", "2s"), ("SYSDASH_DEGRADED_AFTER", "5")]),
            &overrides,
        )
        .unwrap();

        assert_eq!(settings.interval, Duration::from_secs(2));
        assert_eq!(settings.history_capacity, 30);
        assert_eq!(settings.degraded_after, 5);
        assert_eq!(settings.process_limit, 25);
        assert_eq!(settings.log_level, Level::DEBUG);
    }

    #[test]
    fn rejects_zero_interval() {
        let overrides = Overrides {
            interval: Some("0s".to_string()),
            ..Overrides::default()
        };
        let err = Settings::load_with_env(None, env(&[]), &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "interval", .. }));
    }

    #[test]
    fn rejects_zero_capacity_and_threshold() {
        let file = toml_file("history_capacity = 0\n");
        let err = Settings::load_with_env(Some(file.path()), env(&[]), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "history_capacity", .. }));

        let err = Settings::load_with_env(
            None,
            env(&[("SYSDASH_DEGRADED_AFTER", "0")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "degraded_after", .. }));
    }

    #[test]
    fn rejects_unknown_level_and_bad_duration() {
        let err = Settings::load_with_env(
            None,
            env(&[("SYSDASH_LOG_LEVEL", "chatty")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "log_level", .. }));

        let err = Settings::load_with_env(
            None,
            env(&[("SYSDASH_STOP_TIMEOUT", "soon")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "stop_timeout", .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load_with_env(
            Some(Path::new("/nonexistent/sysdash.toml")),
            env(&[]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn tracker_config_carries_values() {
        let settings = Settings {
            interval: Duration::from_millis(500),
            history_capacity: 10,
            degraded_after: 2,
            ..Settings::default()
        };
        let config = settings.tracker_config();
        assert_eq!(config.interval, Duration::from_millis(500));
        assert_eq!(config.sampler.history_capacity, 10);
        assert_eq!(config.sampler.degraded_after, 2);
    }
}
