//! Identity Service
//!
//! The IdentityService owns the device's `IdentityState`. It:
//! - Drives bootstrap from inbound requests and shared-state changes
//! - Parks requests that arrive before bootstrap and replays them in order
//! - Applies identity mutations and publishes the resulting shared state
//! - Dispatches consent and reset events to the host
//!
//! # Protocol
//!
//! Requests are [`IdentityRequest`] values:
//!
//! - `UpdateIdentities` / `RemoveIdentities`: customer identifier changes
//! - `Reset`: fresh ECID, everything else cleared
//! - `SetAdvertisingIdentifier`: advertising id with consent signalling
//! - `GetIdentities` / `GetExperienceCloudId` / `GetUrlVariables`: queries
//! - `SharedStateChanged`: reconcile the legacy ECID, retry bootstrap
//! - `Boot` / `Shutdown`: lifecycle
//!
//! # Architecture
//!
//! - `handlers`: One handler per request type
//! - `pending`: Pre-boot request queue
//! - `response`: Reply helpers

pub mod handlers;
pub(crate) mod pending;
pub mod response;


use std::sync::Arc;

use eid_identity::{IdentityState, RequestContext, SharedStatePort};
use tracing::{debug, info};

use crate::events::{EventDispatcher, IdentityEvent};
use crate::messages::IdentityRequest;
use pending::PendingQueue;

/// Whether the service loop keeps running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlFlow {
    /// Wait for the next request
    Continue,
    /// Stop the service
    Exit,
}

/// IdentityService - serialized owner of the identity state
pub struct IdentityService {
    /// Identity properties and bootstrap state
    pub(crate) state: IdentityState,
    /// Shared-state registry of the host
    pub(crate) port: Arc<dyn SharedStatePort + Send + Sync>,
    /// Host event sink
    pub(crate) events: Arc<dyn EventDispatcher + Send + Sync>,
    /// Requests received before bootstrap
    pub(crate) pending: PendingQueue,
    /// Counter for generating request ids
    next_request_id: u64,
}

impl IdentityService {
    pub fn new(
        state: IdentityState,
        port: Arc<dyn SharedStatePort + Send + Sync>,
        events: Arc<dyn EventDispatcher + Send + Sync>,
    ) -> Self {
        Self {
            state,
            port,
            events,
            pending: PendingQueue::new(),
            next_request_id: 0,
        }
    }

    pub fn has_booted(&self) -> bool {
        self.state.has_booted()
    }

    /// Number of requests parked until bootstrap.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Handle one inbound request.
    pub fn on_request(&mut self, request: IdentityRequest) -> ControlFlow {
        let ctx = self.next_context();
        debug!(
            kind = request.kind(),
            request_id = ?ctx.request_id,
            "IdentityService: received request"
        );

        match request {
            IdentityRequest::Shutdown => {
                info!(
                    pending = self.pending.len(),
                    "IdentityService: shutdown"
                );
                return ControlFlow::Exit;
            }
            IdentityRequest::Boot => {
                self.try_boot(&ctx);
            }
            request => {
                if self.try_boot(&ctx) {
                    self.dispatch(ctx, request);
                } else {
                    debug!(
                        kind = request.kind(),
                        "IdentityService: not booted, queueing request"
                    );
                    self.pending.push(ctx, request);
                }
            }
        }
        ControlFlow::Continue
    }

    /// Boot if possible, replaying parked requests on the transition.
    fn try_boot(&mut self, ctx: &RequestContext) -> bool {
        if self.state.has_booted() {
            return true;
        }
        if !self.state.bootup_if_ready(&*self.port, ctx) {
            return false;
        }

        info!(
            queued = self.pending.len(),
            "IdentityService: booted, replaying queued requests"
        );
        while let Some(parked) = self.pending.pop() {
            self.dispatch(parked.ctx, parked.request);
        }
        true
    }

    fn dispatch(&mut self, ctx: RequestContext, request: IdentityRequest) {
        match request {
            IdentityRequest::UpdateIdentities { map } => {
                handlers::handle_update_identities(self, &ctx, map)
            }
            IdentityRequest::RemoveIdentities { map } => {
                handlers::handle_remove_identities(self, &ctx, map)
            }
            IdentityRequest::Reset => handlers::handle_reset(self, &ctx),
            IdentityRequest::SetAdvertisingIdentifier { ad_id } => {
                handlers::handle_set_advertising_identifier(self, &ctx, ad_id)
            }
            IdentityRequest::GetIdentities { reply } => handlers::handle_get_identities(self, reply),
            IdentityRequest::GetExperienceCloudId { reply } => {
                handlers::handle_get_experience_cloud_id(self, reply)
            }
            IdentityRequest::GetUrlVariables { reply } => {
                handlers::handle_get_url_variables(self, &ctx, reply)
            }
            IdentityRequest::SharedStateChanged { owner } => {
                handlers::handle_shared_state_changed(self, &ctx, &owner)
            }
            IdentityRequest::Boot | IdentityRequest::Shutdown => {}
        }
    }

    /// Publish the current identity state.
    pub(crate) fn publish_state(&self, ctx: &RequestContext) {
        self.port.publish_xdm_state(self.state.xdm_state(false), ctx);
    }

    pub(crate) fn dispatch_event(&self, event: IdentityEvent) {
        self.events.dispatch(event);
    }

    fn next_context(&mut self) -> RequestContext {
        self.next_request_id += 1;
        RequestContext::new(self.next_request_id)
    }
}
