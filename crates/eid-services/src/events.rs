//! Events dispatched by the identity service to the host.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

/// Event emitted by the identity service.
#[derive(Clone, Debug, PartialEq)]
pub enum IdentityEvent {
    /// Advertising consent changed; payload is the consent update body
    ConsentUpdate(Value),
    /// Identifiers were reset
    ResetComplete,
}

/// Host sink for identity events.
pub trait EventDispatcher {
    fn dispatch(&self, event: IdentityEvent);
}

impl<T: EventDispatcher + ?Sized> EventDispatcher for Arc<T> {
    fn dispatch(&self, event: IdentityEvent) {
        (**self).dispatch(event)
    }
}

/// Dispatcher that records events in memory, for tests and hosts that poll.
#[derive(Default)]
pub struct RecordingDispatcher {
    events: Mutex<Vec<IdentityEvent>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events dispatched so far, oldest first.
    pub fn events(&self) -> Vec<IdentityEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consent payloads dispatched so far.
    pub fn consent_updates(&self) -> Vec<Value> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                IdentityEvent::ConsentUpdate(payload) => Some(payload),
                IdentityEvent::ResetComplete => None,
            })
            .collect()
    }
}

impl EventDispatcher for RecordingDispatcher {
    fn dispatch(&self, event: IdentityEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
