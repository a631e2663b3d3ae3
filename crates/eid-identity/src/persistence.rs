//! Persistence gateway.
//!
//! Properties are stored as their wire JSON string under
//! `datastore_name`/`properties_key`. The legacy identity component caches
//! its ECID under `legacy_datastore_name`/`legacy_ecid_key`; that value is
//! only ever read here.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::ecid::Ecid;
use crate::error::StoreError;
use crate::properties::IdentityProperties;

/// Named key/value string store.
pub trait KeyValueStore {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError>;

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_string(collection, key)
    }

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_string(collection, key, value)
    }

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        (**self).remove(collection, key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_string(&self, collection: &str, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_string(collection, key)
    }

    fn set_string(&self, collection: &str, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_string(collection, key, value)
    }

    fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        (**self).remove(collection, key)
    }
}

/// Load and save identity properties.
///
/// Implementations never fail: unreadable data is absent and write failures
/// are logged.
pub trait PersistenceGateway {
    /// Previously saved properties, or `None` if absent or malformed.
    fn load_properties(&self) -> Option<IdentityProperties>;

    fn save_properties(&self, properties: &IdentityProperties);

    /// ECID cached by the legacy identity component.
    fn load_legacy_ecid(&self) -> Option<Ecid>;
}

/// Persistence gateway over a [`KeyValueStore`].
pub struct IdentityStorage<K> {
    store: K,
    datastore_name: String,
    properties_key: String,
    legacy_datastore_name: String,
    legacy_ecid_key: String,
}

impl<K: KeyValueStore> IdentityStorage<K> {
    pub fn new(store: K, config: &IdentityConfig) -> Self {
        Self {
            store,
            datastore_name: config.datastore_name.clone(),
            properties_key: config.properties_key.clone(),
            legacy_datastore_name: config.legacy_datastore_name.clone(),
            legacy_ecid_key: config.legacy_ecid_key.clone(),
        }
    }
}

impl<K: KeyValueStore> PersistenceGateway for IdentityStorage<K> {
    fn load_properties(&self) -> Option<IdentityProperties> {
        let json = match self
            .store
            .get_string(&self.datastore_name, &self.properties_key)
        {
            Ok(Some(json)) => json,
            Ok(None) => {
                debug!("IdentityStorage: no persisted identity properties");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "IdentityStorage: failed to read identity properties");
                return None;
            }
        };

        match serde_json::from_str::<Map<String, Value>>(&json) {
            Ok(object) => Some(IdentityProperties::from_wire(&object)),
            Err(e) => {
                debug!(error = %e, "IdentityStorage: persisted identity properties are malformed");
                None
            }
        }
    }

    fn save_properties(&self, properties: &IdentityProperties) {
        let json = match serde_json::to_string(&properties.to_wire(false)) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "IdentityStorage: failed to encode identity properties");
                return;
            }
        };

        match self
            .store
            .set_string(&self.datastore_name, &self.properties_key, &json)
        {
            Ok(()) => debug!("IdentityStorage: saved identity properties"),
            Err(e) => warn!(error = %e, "IdentityStorage: failed to save identity properties"),
        }
    }

    fn load_legacy_ecid(&self) -> Option<Ecid> {
        match self
            .store
            .get_string(&self.legacy_datastore_name, &self.legacy_ecid_key)
        {
            Ok(value) => value.filter(|mid| !mid.is_empty()).map(Ecid::from),
            Err(e) => {
                warn!(error = %e, "IdentityStorage: failed to read legacy ECID");
                None
            }
        }
    }
}
