//! Identity configuration.
//!
//! All names default to the values the host platform uses on the wire, so a
//! host only supplies fields it wants to override.

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::namespaces;

/// Datastore, shared-state and namespace names used by the identity layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Namespaces customers may not update or remove
    pub reserved_namespaces: Vec<String>,
    /// Collection holding the persisted properties
    pub datastore_name: String,
    /// Key of the persisted properties within `datastore_name`
    pub properties_key: String,
    /// Collection written by the legacy identity component
    pub legacy_datastore_name: String,
    /// Key of the cached legacy ECID within `legacy_datastore_name`
    pub legacy_ecid_key: String,
    /// Shared-state owner listing registered components
    pub hub_state_owner: String,
    /// Shared-state owner of the legacy identity component
    pub legacy_state_owner: String,
    /// Shared-state owner of the host configuration
    pub configuration_state_owner: String,
    /// `idType` reported in advertising consent updates
    pub consent_id_type: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            reserved_namespaces: vec![
                namespaces::ECID.into(),
                namespaces::GAID.into(),
                namespaces::IDFA.into(),
            ],
            datastore_name: "com.adobe.edge.identity".into(),
            properties_key: "identity.properties".into(),
            legacy_datastore_name: "visitorIDServiceDataStore".into(),
            legacy_ecid_key: "ADOBEMOBILE_PERSISTED_MID".into(),
            hub_state_owner: "com.adobe.module.eventhub".into(),
            legacy_state_owner: "com.adobe.module.identity".into(),
            configuration_state_owner: "com.adobe.module.configuration".into(),
            consent_id_type: namespaces::GAID.into(),
        }
    }
}

impl IdentityConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, IdentityError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every name is set and `ECID` stays reserved.
    pub fn validate(&self) -> Result<(), IdentityError> {
        let names = [
            ("datastore_name", &self.datastore_name),
            ("properties_key", &self.properties_key),
            ("legacy_datastore_name", &self.legacy_datastore_name),
            ("legacy_ecid_key", &self.legacy_ecid_key),
            ("hub_state_owner", &self.hub_state_owner),
            ("legacy_state_owner", &self.legacy_state_owner),
            ("configuration_state_owner", &self.configuration_state_owner),
            ("consent_id_type", &self.consent_id_type),
        ];
        for (field, value) in names {
            if value.is_empty() {
                return Err(IdentityError::InvalidConfig(format!("{field} must not be empty")));
            }
        }

        if !self.is_reserved(namespaces::ECID) {
            return Err(IdentityError::InvalidConfig(
                "reserved_namespaces must include ECID".into(),
            ));
        }

        Ok(())
    }

    /// Whether a namespace is reserved (ASCII case-insensitive).
    pub fn is_reserved(&self, namespace: &str) -> bool {
        self.reserved_namespaces
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(namespace))
    }
}
