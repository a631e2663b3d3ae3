//! Bootstrap scenarios driven through the public API with in-memory doubles.

use std::sync::Arc;

use eid_identity::testing::{MemoryStore, MockSharedState};
use eid_identity::{
    Ecid, IdentityConfig, IdentityItem, IdentityMap, IdentityState, IdentityStorage,
    KeyValueStore, PersistenceGateway, RequestContext, SharedStateResult,
};
use serde_json::json;

const HUB: &str = "com.adobe.module.eventhub";
const LEGACY: &str = "com.adobe.module.identity";

struct Harness {
    store: Arc<MemoryStore>,
    port: MockSharedState,
    config: IdentityConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            port: MockSharedState::new(),
            config: IdentityConfig::default(),
        }
    }

    fn state(&self) -> IdentityState {
        let storage = IdentityStorage::new(Arc::clone(&self.store), &self.config);
        IdentityState::new(self.config.clone(), Box::new(storage))
    }

    fn storage(&self) -> IdentityStorage<Arc<MemoryStore>> {
        IdentityStorage::new(Arc::clone(&self.store), &self.config)
    }

    fn boot(&self, state: &mut IdentityState) -> bool {
        state.bootup_if_ready(&self.port, &RequestContext::new(1))
    }

    fn properties_writes(&self) -> usize {
        self.store
            .write_count(&self.config.datastore_name, &self.config.properties_key)
    }
}

#[test]
fn test_fresh_install_without_legacy_generates_and_persists_once() {
    let harness = Harness::new();
    harness.port.set_json(HUB, json!({"extensions": {}}));
    let mut state = harness.state();

    assert!(harness.boot(&mut state));

    let ecid = state.properties().ecid().expect("primary ECID");
    assert_eq!(ecid.as_str().len(), 38);
    assert!(ecid.as_str().bytes().all(|b| b.is_ascii_digit()));
    assert_eq!(harness.properties_writes(), 1);
    assert_eq!(harness.storage().load_properties().unwrap().ecid(), Some(ecid));
}

#[test]
fn test_fresh_install_with_legacy_adopts_legacy_ecid() {
    let harness = Harness::new();
    harness
        .port
        .set_json(HUB, json!({"extensions": {LEGACY: {"version": "1.0"}}}));
    harness.port.set_json(LEGACY, json!({"mid": "1234"}));
    let mut state = harness.state();

    assert!(harness.boot(&mut state));
    assert_eq!(state.properties().ecid(), Some(Ecid::from("1234")));
    assert_eq!(state.properties().ecid_secondary(), None);
}

#[test]
fn test_restart_keeps_persisted_identity() {
    let harness = Harness::new();
    harness.port.set_json(HUB, json!({"extensions": {}}));

    let mut first = harness.state();
    assert!(harness.boot(&mut first));
    let mut map = IdentityMap::new();
    map.add_item(IdentityItem::new("user@example.com"), "Email");
    first.update_customer_identifiers(&map);
    let ecid = first.properties().ecid();

    // A second boot with no hub state still succeeds from persistence.
    let restarted = Harness {
        store: Arc::clone(&harness.store),
        port: MockSharedState::new(),
        config: harness.config.clone(),
    };
    let mut second = restarted.state();
    assert!(restarted.boot(&mut second));
    assert_eq!(second.properties().ecid(), ecid);
    assert_eq!(second.identity_map().items_for_namespace("Email").len(), 1);
}

#[test]
fn test_deferred_boot_then_legacy_state_arrives() {
    let harness = Harness::new();
    let mut state = harness.state();

    assert!(!harness.boot(&mut state));

    harness.port.set_json(HUB, json!({"extensions": {LEGACY: {}}}));
    harness
        .port
        .set_state(LEGACY, SharedStateResult::pending());
    assert!(!harness.boot(&mut state));
    assert_eq!(harness.properties_writes(), 0);
    assert_eq!(harness.port.publish_count(), 0);

    harness.port.set_json(LEGACY, json!({"mid": "5678"}));
    assert!(harness.boot(&mut state));
    assert_eq!(state.properties().ecid(), Some(Ecid::from("5678")));
    assert_eq!(harness.properties_writes(), 1);
    assert_eq!(harness.port.publish_count(), 1);
}

#[test]
fn test_custom_datastore_names() {
    let mut harness = Harness::new();
    harness.config = IdentityConfig::from_json_str(
        r#"{"datastore_name": "custom.identity", "properties_key": "props"}"#,
    )
    .unwrap();
    harness.port.set_json(HUB, json!({"extensions": {}}));
    let mut state = harness.state();

    assert!(harness.boot(&mut state));
    assert!(harness
        .store
        .get_string("custom.identity", "props")
        .unwrap()
        .is_some());
    assert!(harness
        .store
        .get_string("com.adobe.edge.identity", "identity.properties")
        .unwrap()
        .is_none());
}
