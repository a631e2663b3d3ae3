//! Shared-state port.
//!
//! Other components publish state snapshots keyed by owner name. The identity
//! layer reads the hub, legacy identity and configuration states, and
//! publishes its own identity map.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::ecid::Ecid;

/// Keys inside foreign shared states.
pub mod keys {
    /// Hub state: object keyed by registered component name
    pub const EXTENSIONS: &str = "extensions";
    /// Legacy identity state: the legacy ECID
    pub const LEGACY_ECID: &str = "mid";
    /// Configuration state: the organization id
    pub const ORG_ID: &str = "experienceCloud.org";
}

/// Availability of a shared state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SharedStateStatus {
    /// A value has been published
    Set,
    /// The owner will publish but has not yet
    Pending,
    /// Nothing is known about the owner
    None,
}

/// Result of reading a shared state.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedStateResult {
    pub status: SharedStateStatus,
    pub value: Option<Map<String, Value>>,
}

impl SharedStateResult {
    pub fn set(value: Map<String, Value>) -> Self {
        Self {
            status: SharedStateStatus::Set,
            value: Some(value),
        }
    }

    pub fn pending() -> Self {
        Self {
            status: SharedStateStatus::Pending,
            value: None,
        }
    }

    pub fn none() -> Self {
        Self {
            status: SharedStateStatus::None,
            value: None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.status == SharedStateStatus::Set
    }

    /// Published value, only when the status is `Set`.
    pub fn value(&self) -> Option<&Map<String, Value>> {
        if self.is_set() {
            self.value.as_ref()
        } else {
            None
        }
    }
}

/// Context of the request on whose behalf shared state is read or published.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Id of the inbound request, if the host tracks one
    pub request_id: Option<u64>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(request_id: u64) -> Self {
        Self {
            request_id: Some(request_id),
        }
    }
}

/// Read and publish shared states.
pub trait SharedStatePort {
    /// Read the latest state published by `owner`.
    fn get_state(&self, owner: &str, ctx: &RequestContext) -> SharedStateResult;

    /// Publish this component's identity state.
    fn publish_xdm_state(&self, state: Map<String, Value>, ctx: &RequestContext);
}

impl<T: SharedStatePort + ?Sized> SharedStatePort for Arc<T> {
    fn get_state(&self, owner: &str, ctx: &RequestContext) -> SharedStateResult {
        (**self).get_state(owner, ctx)
    }

    fn publish_xdm_state(&self, state: Map<String, Value>, ctx: &RequestContext) {
        (**self).publish_xdm_state(state, ctx)
    }
}

impl<T: SharedStatePort + ?Sized> SharedStatePort for Box<T> {
    fn get_state(&self, owner: &str, ctx: &RequestContext) -> SharedStateResult {
        (**self).get_state(owner, ctx)
    }

    fn publish_xdm_state(&self, state: Map<String, Value>, ctx: &RequestContext) {
        (**self).publish_xdm_state(state, ctx)
    }
}

/// Whether `owner` is listed in the hub state's `extensions` object.
pub fn is_registered(hub_state: &Map<String, Value>, owner: &str) -> bool {
    hub_state
        .get(keys::EXTENSIONS)
        .and_then(Value::as_object)
        .is_some_and(|extensions| extensions.contains_key(owner))
}

/// Legacy ECID from the legacy identity state. Empty values are absent.
pub fn legacy_ecid(legacy_state: &Map<String, Value>) -> Option<Ecid> {
    legacy_state
        .get(keys::LEGACY_ECID)
        .and_then(Value::as_str)
        .filter(|mid| !mid.is_empty())
        .map(Ecid::from)
}

/// Organization id from the configuration state.
pub fn org_id(config_state: &Map<String, Value>) -> Option<&str> {
    config_state.get(keys::ORG_ID).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(object) => object,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_result_value_only_when_set() {
        let set = SharedStateResult::set(object(json!({"a": 1})));
        assert!(set.is_set());
        assert!(set.value().is_some());

        let pending = SharedStateResult {
            status: SharedStateStatus::Pending,
            value: Some(object(json!({"a": 1}))),
        };
        assert!(pending.value().is_none());
        assert!(SharedStateResult::none().value().is_none());
    }

    #[test]
    fn test_is_registered() {
        let hub = object(json!({"extensions": {"com.adobe.module.identity": {}}}));
        assert!(is_registered(&hub, "com.adobe.module.identity"));
        assert!(!is_registered(&hub, "com.adobe.module.other"));
        assert!(!is_registered(&object(json!({})), "com.adobe.module.identity"));
        assert!(!is_registered(
            &object(json!({"extensions": []})),
            "com.adobe.module.identity"
        ));
    }

    #[test]
    fn test_legacy_ecid() {
        assert_eq!(
            legacy_ecid(&object(json!({"mid": "1234"}))),
            Some(Ecid::from("1234"))
        );
        assert_eq!(legacy_ecid(&object(json!({"mid": ""}))), None);
        assert_eq!(legacy_ecid(&object(json!({"mid": null}))), None);
        assert_eq!(legacy_ecid(&object(json!({}))), None);
    }

    #[test]
    fn test_org_id() {
        let state = object(json!({"experienceCloud.org": "Adobe-Test@OrgId"}));
        assert_eq!(org_id(&state), Some("Adobe-Test@OrgId"));
        assert_eq!(org_id(&object(json!({}))), None);
    }
}
