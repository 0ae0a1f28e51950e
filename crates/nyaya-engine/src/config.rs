//! Engine configuration.
//!
//! Defaults are the statutory values. A YAML file may override any subset
//! of fields, and environment variables override both:
//!
//! - `NYAYA_ADJOURNMENT_CAP` (default: 2)
//! - `NYAYA_TRANSFER_WINDOW_HOURS` (default: 24)
//! - `NYAYA_TICK_INTERVAL_MS` (default: 1000)
//! - `NYAYA_AUDIT_DIR` (default: `./nyaya-audit`)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use nyaya_state::{DEFAULT_TRANSFER_WINDOW_HOURS, STATUTORY_ADJOURNMENT_CAP};

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
const DEFAULT_AUDIT_DIR: &str = "./nyaya-audit";

/// Runtime parameters of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Adjournments grantable without an override reason.
    pub adjournment_cap: u32,
    /// Zero-FIR transfer window in hours.
    pub transfer_window_hours: i64,
    /// Deadline tracker tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Directory of the per-case journals.
    pub audit_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            adjournment_cap: STATUTORY_ADJOURNMENT_CAP,
            transfer_window_hours: DEFAULT_TRANSFER_WINDOW_HOURS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            audit_dir: PathBuf::from(DEFAULT_AUDIT_DIR),
        }
    }
}

impl EngineConfig {
    /// Parse a YAML document. Missing fields keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw)?;
        config.with_env_overrides()
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Apply `NYAYA_*` environment variables on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("NYAYA_ADJOURNMENT_CAP") {
            self.adjournment_cap = parse_var("NYAYA_ADJOURNMENT_CAP", &v)?;
        }
        if let Some(v) = lookup("NYAYA_TRANSFER_WINDOW_HOURS") {
            self.transfer_window_hours = parse_var("NYAYA_TRANSFER_WINDOW_HOURS", &v)?;
        }
        if let Some(v) = lookup("NYAYA_TICK_INTERVAL_MS") {
            self.tick_interval_ms = parse_var("NYAYA_TICK_INTERVAL_MS", &v)?;
        }
        if let Some(v) = lookup("NYAYA_AUDIT_DIR") {
            if v.trim().is_empty() {
                return Err(ConfigError::InvalidVar {
                    var: "NYAYA_AUDIT_DIR".to_string(),
                    value: v,
                });
            }
            self.audit_dir = PathBuf::from(v);
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transfer_window()?;
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Transfer window as a duration.
    ///
    /// Fails when the window is not positive or exceeds the range of
    /// [`chrono::Duration`].
    pub fn transfer_window(&self) -> Result<chrono::Duration, ConfigError> {
        if self.transfer_window_hours <= 0 {
            return Err(ConfigError::Invalid(format!(
                "transfer_window_hours must be positive, got {}",
                self.transfer_window_hours
            )));
        }
        chrono::Duration::try_hours(self.transfer_window_hours).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "transfer_window_hours out of range, got {}",
                self.transfer_window_hours
            ))
        })
    }

    /// Tick period as a duration.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidVar {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value {value:?} for {var}")]
    InvalidVar { var: String, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_statutory() {
        let c = EngineConfig::default();
        assert_eq!(c.adjournment_cap, 2);
        assert_eq!(c.transfer_window_hours, 24);
        assert_eq!(c.tick_interval(), std::time::Duration::from_secs(1));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let c = EngineConfig::from_yaml_str("adjournment_cap: 3\naudit_dir: /var/lib/nyaya\n").unwrap();
        assert_eq!(c.adjournment_cap, 3);
        assert_eq!(c.transfer_window_hours, 24);
        assert_eq!(c.audit_dir, PathBuf::from("/var/lib/nyaya"));
    }

    #[test]
    fn unknown_yaml_field_rejected() {
        assert!(matches!(
            EngineConfig::from_yaml_str("adjournment_limit: 3\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn env_overrides_yaml() {
        let c = EngineConfig::from_yaml_str("tick_interval_ms: 250\n")
            .unwrap()
            .with_overrides(vars(&[
                ("NYAYA_TICK_INTERVAL_MS", "500"),
                ("NYAYA_AUDIT_DIR", "/tmp/audit"),
            ]))
            .unwrap();
        assert_eq!(c.tick_interval_ms, 500);
        assert_eq!(c.audit_dir, PathBuf::from("/tmp/audit"));
    }

    #[test]
    fn malformed_env_value_is_an_error() {
        let err = EngineConfig::default()
            .with_overrides(vars(&[("NYAYA_ADJOURNMENT_CAP", "two")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { ref var, .. } if var == "NYAYA_ADJOURNMENT_CAP"));
    }

    #[test]
    fn zero_window_and_tick_rejected() {
        assert!(EngineConfig::from_yaml_str("transfer_window_hours: 0\n").is_err());
        assert!(EngineConfig::default()
            .with_overrides(vars(&[("NYAYA_TICK_INTERVAL_MS", "0")]))
            .is_err());
    }

    #[test]
    fn oversized_window_rejected() {
        let err = EngineConfig::default()
            .with_overrides(vars(&[("NYAYA_TRANSFER_WINDOW_HOURS", "9000000000000")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let unchecked = EngineConfig {
            transfer_window_hours: i64::MAX,
            ..EngineConfig::default()
        };
        assert!(unchecked.transfer_window().is_err());
        assert_eq!(
            EngineConfig::default().transfer_window().unwrap(),
            chrono::Duration::hours(24)
        );
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyaya.yaml");
        std::fs::write(&path, "transfer_window_hours: 48\n").unwrap();
        let c = EngineConfig::load(&path).unwrap();
        assert_eq!(c.transfer_window_hours, 48);
        assert!(EngineConfig::load(&dir.path().join("missing.yaml")).is_err());
    }
}
