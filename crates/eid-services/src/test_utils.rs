//! Test utilities for service unit tests.
//!
//! These helpers build an `IdentityService` over in-memory doubles without
//! a running tokio task.

use std::sync::Arc;

use eid_identity::testing::{MemoryStore, MockSharedState};
use eid_identity::{IdentityConfig, IdentityState, IdentityStorage};
use serde_json::json;
use tokio::sync::oneshot;

use crate::events::RecordingDispatcher;
use crate::identity::IdentityService;
use crate::messages::{IdentityRequest, Reply};

pub const HUB: &str = "com.adobe.module.eventhub";
pub const LEGACY: &str = "com.adobe.module.identity";
pub const CONFIGURATION: &str = "com.adobe.module.configuration";
pub const DATASTORE: &str = "com.adobe.edge.identity";
pub const PROPERTIES_KEY: &str = "identity.properties";

/// Service under test plus handles to its doubles.
pub struct TestService {
    pub service: IdentityService,
    pub store: Arc<MemoryStore>,
    pub port: Arc<MockSharedState>,
    pub events: Arc<RecordingDispatcher>,
}

impl TestService {
    pub fn send(&mut self, request: IdentityRequest) {
        self.service.on_request(request);
    }

    pub fn properties_writes(&self) -> usize {
        self.store.write_count(DATASTORE, PROPERTIES_KEY)
    }
}

/// Service with empty persistence and no shared states.
pub fn new_service() -> TestService {
    let store = Arc::new(MemoryStore::new());
    let port = Arc::new(MockSharedState::new());
    let events = Arc::new(RecordingDispatcher::new());

    let config = IdentityConfig::default();
    let storage = IdentityStorage::new(Arc::clone(&store), &config);
    let state = IdentityState::new(config, Box::new(storage));
    let service = IdentityService::new(state, port.clone(), events.clone());

    TestService {
        service,
        store,
        port,
        events,
    }
}

/// Service booted with a generated ECID (legacy component not registered).
pub fn booted_service() -> TestService {
    let mut test = new_service();
    test.port.set_json(HUB, json!({"extensions": {}}));
    test.send(IdentityRequest::Boot);
    assert!(test.service.has_booted());
    test
}

/// Reply sender and the receiver to read it from.
pub fn reply_channel<T>() -> (Reply<T>, oneshot::Receiver<T>) {
    let (tx, rx) = oneshot::channel();
    (Some(tx), rx)
}
