//! Runtime configuration read from the environment
//!
//! `.env` is loaded by the binary before [`Config::from_env`] runs.

use std::env;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::generator::{CODE_LENGTH_RANGE, DEFAULT_CODE_LENGTH};
use crate::service::DEFAULT_MAX_ATTEMPTS;

/// `DATABASE_URL` value selecting the in-memory store
pub const MEMORY_DATABASE: &str = ":memory:";

/// How new short codes are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    /// Uniform random base62 codes
    Random,
    /// Base62 encoded counter seeded from the store size
    Sequence,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "sequence" | "seq" => Ok(Self::Sequence),
            other => Err(format!("unknown strategy `{other}`, expected random or sequence")),
        }
    }
}

/// # Environment Variables
///
/// - `PORT` - Server port number (default: 8080)
/// - `DATABASE_URL` - redb file path, or `:memory:` (default: "data.db")
/// - `BASE_URL` - Prefix for generated short URLs (default: "http://localhost:8080/s")
/// - `CORS_ORIGIN` - Allowed browser origin (default: "http://localhost:3000")
/// - `CODE_LENGTH` - Characters per generated code, 4 to 16 (default: 6)
/// - `CODE_STRATEGY` - `random` or `sequence` (default: random)
/// - `MAX_ATTEMPTS` - Candidates tried per create before failing (default: 10)
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub base_url: String,
    pub cors_origin: String,
    pub code_length: usize,
    pub code_strategy: CodeStrategy,
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: "data.db".to_string(),
            base_url: "http://localhost:8080/s".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            code_length: DEFAULT_CODE_LENGTH,
            code_strategy: CodeStrategy::Random,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source. Unset or blank
    /// variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let code_length = parse_var(&var, "CODE_LENGTH", defaults.code_length)?;
        if !CODE_LENGTH_RANGE.contains(&code_length) {
            return Err(ConfigError::Invalid {
                name: "CODE_LENGTH",
                value: code_length.to_string(),
                reason: format!(
                    "must be between {} and {}",
                    CODE_LENGTH_RANGE.start(),
                    CODE_LENGTH_RANGE.end()
                ),
            });
        }

        let max_attempts = parse_var(&var, "MAX_ATTEMPTS", defaults.max_attempts)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_ATTEMPTS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            port: parse_var(&var, "PORT", defaults.port)?,
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            base_url: var("BASE_URL").unwrap_or(defaults.base_url),
            cors_origin: var("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
            code_length,
            code_strategy: parse_var(&var, "CODE_STRATEGY", defaults.code_strategy)?,
            max_attempts,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE
    }
}

fn parse_var<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "data.db");
        assert_eq!(config.base_url, "http://localhost:8080/s");
        assert_eq!(config.code_length, 6);
        assert_eq!(config.code_strategy, CodeStrategy::Random);
        assert_eq!(config.max_attempts, 10);
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("DATABASE_URL", ":memory:"),
            ("CODE_LENGTH", "8"),
            ("CODE_STRATEGY", "Sequence"),
            ("MAX_ATTEMPTS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 9000);
        assert!(config.uses_memory_store());
        assert_eq!(config.code_length, 8);
        assert_eq!(config.code_strategy, CodeStrategy::Sequence);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("BASE_URL", "")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "http://localhost:8080/s");
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = config_from(&[("CODE_LENGTH", "2")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CODE_LENGTH", .. }));

        let err = config_from(&[("MAX_ATTEMPTS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "MAX_ATTEMPTS", .. }));

        let err = config_from(&[("CODE_STRATEGY", "uuid")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "CODE_STRATEGY", .. }));
    }
}
