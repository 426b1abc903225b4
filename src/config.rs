use thiserror::Error;

use std::env;

use crate::blockchain::crypto::{CryptoError, HashAlgorithm};

/// Environment variable selecting the block digest
pub const HASH_ALGORITHM_VAR: &str = "LEDGER_HASH_ALGORITHM";

/// Environment variable holding the log filter, `RUST_LOG` syntax
pub const LOG_FILTER_VAR: &str = "LEDGER_LOG";

/// The standard `env_logger` filter variable, which overrides [`LOG_FILTER_VAR`]
pub const RUST_LOG_VAR: &str = "RUST_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Errors that can occur while reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {var}: {source}")]
    InvalidHashAlgorithm {
        var: &'static str,
        #[source]
        source: CryptoError,
    },
}

/// Driver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hash_algorithm: HashAlgorithm,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hash_algorithm: HashAlgorithm::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup(HASH_ALGORITHM_VAR) {
            config.hash_algorithm = value.parse().map_err(|source| ConfigError::InvalidHashAlgorithm {
                var: HASH_ALGORITHM_VAR,
                source,
            })?;
        }

        let filter = [RUST_LOG_VAR, LOG_FILTER_VAR]
            .into_iter()
            .filter_map(|var| lookup(var))
            .find(|f| !f.trim().is_empty());
        if let Some(filter) = filter {
            config.log_filter = filter;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha512);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (HASH_ALGORITHM_VAR, "sha256"),
            (LOG_FILTER_VAR, "hash_ledger=debug"),
        ]))
        .unwrap();

        assert_eq!(config.hash_algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.log_filter, "hash_ledger=debug");
    }

    #[test]
    fn test_rust_log_overrides_ledger_log() {
        let config = Config::from_lookup(lookup(&[
            (LOG_FILTER_VAR, "hash_ledger=debug"),
            (RUST_LOG_VAR, "warn"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "warn");

        let blank = Config::from_lookup(lookup(&[
            (LOG_FILTER_VAR, "hash_ledger=debug"),
            (RUST_LOG_VAR, ""),
        ]))
        .unwrap();

        assert_eq!(blank.log_filter, "hash_ledger=debug");
    }

    #[test]
    fn test_blank_log_filter_keeps_default() {
        let config = Config::from_lookup(lookup(&[(LOG_FILTER_VAR, "  ")])).unwrap();

        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_unknown_algorithm() {
        let result = Config::from_lookup(lookup(&[(HASH_ALGORITHM_VAR, "md5")]));

        assert_eq!(
            result,
            Err(ConfigError::InvalidHashAlgorithm {
                var: HASH_ALGORITHM_VAR,
                source: CryptoError::UnknownHashAlgorithm("md5".to_string()),
            })
        );
    }
}
