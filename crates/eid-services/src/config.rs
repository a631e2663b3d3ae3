//! Service configuration.

use std::time::Duration;

use eid_identity::IdentityConfig;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Default request channel capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default time a client waits for a reply, in milliseconds.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 5_000;

/// Runtime settings plus the identity layer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Capacity of the bounded request channel
    pub queue_capacity: usize,
    /// How long a client waits for a reply
    pub response_timeout_ms: u64,
    /// Identity layer names
    pub identity: IdentityConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            identity: IdentityConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ServiceError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ServiceError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.queue_capacity == 0 {
            return Err(ServiceError::InvalidConfig(
                "queue_capacity must be greater than zero".into(),
            ));
        }
        if self.response_timeout_ms == 0 {
            return Err(ServiceError::InvalidConfig(
                "response_timeout_ms must be greater than zero".into(),
            ));
        }
        self.identity.validate()?;
        Ok(())
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.response_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_json_str() {
        let config = ServiceConfig::from_json_str(
            r#"{"queue_capacity": 8, "identity": {"datastore_name": "custom"}}"#,
        )
        .unwrap();
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.response_timeout_ms, DEFAULT_RESPONSE_TIMEOUT_MS);
        assert_eq!(config.identity.datastore_name, "custom");
        assert_eq!(config.identity.properties_key, "identity.properties");
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = ServiceConfig::from_json_str(r#"{"queue_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_invalid_identity_config() {
        let err =
            ServiceConfig::from_json_str(r#"{"identity": {"legacy_state_owner": ""}}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Identity(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = ServiceConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidConfig(_)));
    }
}
