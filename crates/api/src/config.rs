//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use stockval_valuation::{OverdrawPolicy, DEFAULT_TOP_N};

pub const BIND_ADDR_VAR: &str = "STOCKVAL_BIND_ADDR";
pub const OVERDRAW_POLICY_VAR: &str = "STOCKVAL_OVERDRAW_POLICY";
pub const TOP_N_VAR: &str = "STOCKVAL_TOP_N";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Policy used when a request does not pick one.
    pub overdraw_policy: OverdrawPolicy,
    /// Length of the summary's top-by-value list when a request does not pick one.
    pub top_n: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            overdraw_policy: OverdrawPolicy::Absorb,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of the env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = value.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    key: BIND_ADDR_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(OVERDRAW_POLICY_VAR) {
            config.overdraw_policy = value.parse().map_err(|e: stockval_valuation::ValuationError| {
                ConfigError::Invalid {
                    key: OVERDRAW_POLICY_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(value) = lookup(TOP_N_VAR) {
            config.top_n = value.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    key: TOP_N_VAR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?;
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
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = ApiConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (OVERDRAW_POLICY_VAR, "reject"),
            (TOP_N_VAR, "3"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.overdraw_policy, OverdrawPolicy::Reject);
        assert_eq!(config.top_n, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[(OVERDRAW_POLICY_VAR, "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: OVERDRAW_POLICY_VAR, .. }));

        assert!(ApiConfig::from_lookup(lookup(&[(TOP_N_VAR, "-1")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "nowhere")])).is_err());
    }
}
