//! Identity state: bootstrap state machine and mutation entry points.
//!
//! # Safety Invariants
//!
//! ## Success Conditions
//! - Bootstrap completes only when a primary ECID is present, persisted and
//!   published
//! - A deferred bootstrap leaves memory, persistence and shared state untouched
//!
//! ## Forbidden States
//! - `Booted` without a primary ECID
//! - Returning the live properties to a caller (reads are clones)

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::ad_id::{self, AdIdUpdate};
use crate::config::IdentityConfig;
use crate::ecid::Ecid;
use crate::map::IdentityMap;
use crate::persistence::PersistenceGateway;
use crate::properties::IdentityProperties;
use crate::shared_state::{self, RequestContext, SharedStatePort, SharedStateStatus};

/// Bootstrap state. `Booted` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootState {
    NotBooted,
    Booted,
}

/// Owner of the device's identity properties.
pub struct IdentityState {
    config: IdentityConfig,
    storage: Box<dyn PersistenceGateway + Send>,
    properties: IdentityProperties,
    boot_state: BootState,
}

impl IdentityState {
    pub fn new(config: IdentityConfig, storage: Box<dyn PersistenceGateway + Send>) -> Self {
        Self {
            config,
            storage,
            properties: IdentityProperties::new(),
            boot_state: BootState::NotBooted,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn boot_state(&self) -> BootState {
        self.boot_state
    }

    pub fn has_booted(&self) -> bool {
        self.boot_state == BootState::Booted
    }

    /// Complete bootstrap if every dependency is available.
    ///
    /// Returns `true` once booted. A `false` return means a shared state the
    /// bootstrap depends on is not yet available; nothing was changed and the
    /// caller should retry after the next shared-state change.
    pub fn bootup_if_ready(&mut self, port: &dyn SharedStatePort, ctx: &RequestContext) -> bool {
        if self.has_booted() {
            return true;
        }

        let mut properties = self.storage.load_properties().unwrap_or_default();

        if properties.ecid().is_some() {
            debug!("IdentityState: loaded persisted ECID");
            self.complete_boot(properties, port, ctx);
            return true;
        }

        let hub = port.get_state(&self.config.hub_state_owner, ctx);
        let Some(hub_state) = hub.value() else {
            debug!(status = ?hub.status, "IdentityState: hub shared state not available, deferring boot");
            return false;
        };

        let ecid = if shared_state::is_registered(hub_state, &self.config.legacy_state_owner) {
            match self.legacy_ecid_for_boot(port, ctx) {
                Some(ecid) => ecid,
                None => return false,
            }
        } else {
            debug!("IdentityState: legacy identity not registered, generating ECID");
            Ecid::new()
        };

        properties.set_ecid(Some(ecid));
        self.storage.save_properties(&properties);
        self.complete_boot(properties, port, ctx);
        true
    }

    /// Resolve the primary ECID when the legacy component is registered.
    ///
    /// `None` means the legacy shared state is not yet available.
    fn legacy_ecid_for_boot(&self, port: &dyn SharedStatePort, ctx: &RequestContext) -> Option<Ecid> {
        if let Some(cached) = self.storage.load_legacy_ecid() {
            debug!("IdentityState: using cached legacy ECID");
            return Some(cached);
        }

        let legacy = port.get_state(&self.config.legacy_state_owner, ctx);
        if legacy.status != SharedStateStatus::Set {
            debug!(status = ?legacy.status, "IdentityState: legacy shared state not available, deferring boot");
            return None;
        }

        match legacy.value().and_then(shared_state::legacy_ecid) {
            Some(ecid) => {
                debug!("IdentityState: adopting legacy ECID");
                Some(ecid)
            }
            None => {
                debug!("IdentityState: legacy shared state has no ECID, generating ECID");
                Some(Ecid::new())
            }
        }
    }

    fn complete_boot(
        &mut self,
        properties: IdentityProperties,
        port: &dyn SharedStatePort,
        ctx: &RequestContext,
    ) {
        self.properties = properties;
        self.boot_state = BootState::Booted;
        port.publish_xdm_state(self.xdm_state(false), ctx);
        info!("IdentityState: booted");
    }

    /// Merge customer identifiers. Reserved namespaces are filtered out.
    pub fn update_customer_identifiers(&mut self, map: &IdentityMap) {
        self.properties
            .update_customer_identifiers(map, &self.config.reserved_namespaces);
        self.storage.save_properties(&self.properties);
    }

    /// Remove customer identifiers. Reserved namespaces are filtered out.
    pub fn remove_customer_identifiers(&mut self, map: &IdentityMap) {
        self.properties
            .remove_customer_identifiers(map, &self.config.reserved_namespaces);
        self.storage.save_properties(&self.properties);
    }

    /// Replace every identifier with a freshly generated primary ECID.
    pub fn reset_identifiers(&mut self) {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::new()));
        self.properties = properties;
        self.storage.save_properties(&self.properties);
        info!("IdentityState: identifiers reset");
    }

    /// Reconcile the secondary ECID with the legacy component's ECID.
    ///
    /// Returns whether the properties changed and need republishing.
    pub fn update_legacy_experience_cloud_id(&mut self, candidate: Option<Ecid>) -> bool {
        let primary = self.properties.ecid();
        let secondary = self.properties.ecid_secondary();

        let unchanged = match &candidate {
            Some(ecid) => primary.as_ref() == Some(ecid) || secondary.as_ref() == Some(ecid),
            None => secondary.is_none(),
        };
        if unchanged {
            return false;
        }

        self.properties.set_ecid_secondary(candidate);
        self.storage.save_properties(&self.properties);
        debug!("IdentityState: updated legacy ECID");
        true
    }

    /// Apply an advertising id change and report the consent signal.
    pub fn update_advertising_identifier(&mut self, ad_id: Option<&str>) -> AdIdUpdate {
        let current = self.properties.advertising_id();
        let update = ad_id::transition(current.as_deref(), ad_id);
        if update.changed {
            self.properties.set_advertising_id(ad_id);
            self.storage.save_properties(&self.properties);
            debug!(consent = ?update.consent, "IdentityState: advertising id changed");
        }
        update
    }

    /// Copy of the current properties.
    pub fn properties(&self) -> IdentityProperties {
        self.properties.clone()
    }

    /// Copy of the current identity map.
    pub fn identity_map(&self) -> IdentityMap {
        self.properties.identity_map().clone()
    }

    /// Identity state in wire form, for publishing.
    pub fn xdm_state(&self, allow_empty: bool) -> Map<String, Value> {
        self.properties.to_wire(allow_empty)
    }
}
