//! Runtime Configuration
//!
//! Settings for the demo binary, read from `RALLY_*` environment
//! variables. Unset variables take defaults; malformed ones are errors.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::engine::config::{MatchConfigInput, MatchFormat, Sport};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Binary configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Sport to play (`RALLY_SPORT`)
    pub sport: Sport,
    /// Singles or doubles (`RALLY_FORMAT`)
    pub format: MatchFormat,
    /// Best-of sets (`RALLY_BEST_OF`), resolver default when unset
    pub best_of: Option<u32>,
    /// Play a single super tiebreak (`RALLY_SUPER_TIEBREAK`)
    pub super_tiebreak: bool,
    /// Demo rally RNG seed (`RALLY_SEED`); derived from the match id when unset
    pub seed: Option<u64>,
    /// Log filter (`RALLY_LOG_LEVEL`)
    pub log_level: String,
    /// Directory for the file store (`RALLY_STORE_DIR`); in-memory when unset
    pub store_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sport: Sport::default(),
            format: MatchFormat::default(),
            best_of: None,
            super_tiebreak: false,
            seed: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            store_dir: None,
        }
    }
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            sport: parse(&lookup, "RALLY_SPORT")?.unwrap_or(defaults.sport),
            format: parse(&lookup, "RALLY_FORMAT")?.unwrap_or(defaults.format),
            best_of: parse(&lookup, "RALLY_BEST_OF")?,
            super_tiebreak: parse_flag(&lookup, "RALLY_SUPER_TIEBREAK")?
                .unwrap_or(defaults.super_tiebreak),
            seed: parse(&lookup, "RALLY_SEED")?,
            log_level: lookup("RALLY_LOG_LEVEL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_level),
            store_dir: lookup("RALLY_STORE_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    /// Match rules for the configured match.
    pub fn match_input(&self) -> MatchConfigInput {
        MatchConfigInput {
            sport: Some(self.sport),
            format: Some(self.format),
            best_of: self.best_of,
            super_tiebreak_only: Some(self.super_tiebreak),
            ..Default::default()
        }
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    value
        .trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid { key, value: value.clone(), reason: e.to_string() })
}

fn parse_flag<F>(lookup: &F, key: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::Invalid {
            key,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = from_pairs(&[
            ("RALLY_SPORT", "Badminton"),
            ("RALLY_FORMAT", "doubles"),
            ("RALLY_BEST_OF", "5"),
            ("RALLY_SUPER_TIEBREAK", "yes"),
            ("RALLY_SEED", "42"),
            ("RALLY_LOG_LEVEL", "debug"),
            ("RALLY_STORE_DIR", "/tmp/rally"),
        ])
        .unwrap();

        assert_eq!(config.sport, Sport::Badminton);
        assert_eq!(config.format, MatchFormat::Doubles);
        assert_eq!(config.best_of, Some(5));
        assert!(config.super_tiebreak);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store_dir, Some(PathBuf::from("/tmp/rally")));

        let input = config.match_input();
        assert_eq!(input.best_of, Some(5));
        assert_eq!(input.super_tiebreak_only, Some(true));
    }

    #[test]
    fn test_malformed_values_rejected() {
        let err = from_pairs(&[("RALLY_SPORT", "squash")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RALLY_SPORT", .. }));

        let err = from_pairs(&[("RALLY_BEST_OF", "three")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RALLY_BEST_OF", .. }));

        let err = from_pairs(&[("RALLY_SUPER_TIEBREAK", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RALLY_SUPER_TIEBREAK", .. }));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = from_pairs(&[("RALLY_SEED", "  "), ("RALLY_STORE_DIR", "")]).unwrap();
        assert_eq!(config.seed, None);
        assert_eq!(config.store_dir, None);
    }
}
