//! Runtime configuration for the modeler.
//!
//! Values come from the process environment (after `.env` loading by the
//! binaries) and fall back to [`crate::defaults`] when unset or unparsable.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MODELER_DEFAULT_KEYSPACE` | `odp_modeler` | Keyspace when the request names none |
//! | `MODELER_BATCH_POLICY` | `abort` | `abort` or `isolate` invalid entities |
//! | `MODELER_LARGE_PARTITION_MB` | `100` | Bucketing warning threshold |

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::defaults;
use crate::error::{Error, Result};

/// How a batch reacts to an entity that fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Reject the whole request on the first invalid entity.
    #[default]
    AbortOnFirstError,
    /// Skip invalid entities and report them alongside the valid results.
    IsolatePerEntity,
}

impl std::fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbortOnFirstError => write!(f, "abort"),
            Self::IsolatePerEntity => write!(f, "isolate"),
        }
    }
}

impl std::str::FromStr for BatchPolicy {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "abort_on_first_error" => Ok(Self::AbortOnFirstError),
            "isolate" | "isolate_per_entity" => Ok(Self::IsolatePerEntity),
            _ => Err(Error::Config(format!("Invalid batch policy: {}", s))),
        }
    }
}

/// Modeler settings shared by every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelerConfig {
    /// Keyspace used when neither constraints nor entity provide one.
    pub default_keyspace: String,
    /// Reaction to invalid entities within a batch.
    pub batch_policy: BatchPolicy,
    /// Expected partition size (MB) above which bucketing is recommended.
    pub large_partition_mb: i64,
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            default_keyspace: defaults::KEYSPACE.to_string(),
            batch_policy: BatchPolicy::default(),
            large_partition_mb: defaults::LARGE_PARTITION_MB,
        }
    }
}

impl ModelerConfig {
    /// Build the configuration from `MODELER_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unparsable values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(keyspace) = lookup("MODELER_DEFAULT_KEYSPACE") {
            let keyspace = keyspace.trim();
            if !keyspace.is_empty() {
                config.default_keyspace = keyspace.to_string();
            }
        }

        if let Some(policy) = lookup("MODELER_BATCH_POLICY") {
            match policy.parse::<BatchPolicy>() {
                Ok(p) => config.batch_policy = p,
                Err(e) => warn!(error = %e, "Falling back to default batch policy"),
            }
        }

        if let Some(threshold) = lookup("MODELER_LARGE_PARTITION_MB") {
            match threshold.trim().parse::<i64>() {
                Ok(mb) if mb > 0 => config.large_partition_mb = mb,
                _ => warn!(
                    value = %threshold,
                    "Invalid MODELER_LARGE_PARTITION_MB, using {}",
                    defaults::LARGE_PARTITION_MB
                ),
            }
        }

        config
    }

    /// Override the batch policy.
    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ModelerConfig::from_lookup(|_| None);
        assert_eq!(config, ModelerConfig::default());
        assert_eq!(config.default_keyspace, "odp_modeler");
        assert_eq!(config.batch_policy, BatchPolicy::AbortOnFirstError);
        assert_eq!(config.large_partition_mb, 100);
    }

    #[test]
    fn test_values_from_lookup() {
        let config = ModelerConfig::from_lookup(lookup_from(&[
            ("MODELER_DEFAULT_KEYSPACE", "payments"),
            ("MODELER_BATCH_POLICY", "isolate"),
            ("MODELER_LARGE_PARTITION_MB", "250"),
        ]));
        assert_eq!(config.default_keyspace, "payments");
        assert_eq!(config.batch_policy, BatchPolicy::IsolatePerEntity);
        assert_eq!(config.large_partition_mb, 250);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ModelerConfig::from_lookup(lookup_from(&[
            ("MODELER_DEFAULT_KEYSPACE", "   "),
            ("MODELER_BATCH_POLICY", "sometimes"),
            ("MODELER_LARGE_PARTITION_MB", "-5"),
        ]));
        assert_eq!(config, ModelerConfig::default());
    }

    #[test]
    fn test_batch_policy_parse_and_display() {
        assert_eq!(
            " ABORT ".parse::<BatchPolicy>().unwrap(),
            BatchPolicy::AbortOnFirstError
        );
        assert_eq!(
            "isolate_per_entity".parse::<BatchPolicy>().unwrap(),
            BatchPolicy::IsolatePerEntity
        );
        assert!("nope".parse::<BatchPolicy>().is_err());
        assert_eq!(BatchPolicy::IsolatePerEntity.to_string(), "isolate");
    }
}
