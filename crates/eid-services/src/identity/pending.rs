//! Requests parked until bootstrap completes.

use std::collections::VecDeque;

use eid_identity::RequestContext;

use crate::messages::IdentityRequest;

/// A request received before bootstrap, with the context it arrived under.
#[derive(Debug)]
pub struct PendingRequest {
    pub ctx: RequestContext,
    pub request: IdentityRequest,
}

/// FIFO of requests awaiting bootstrap.
#[derive(Debug, Default)]
pub struct PendingQueue {
    requests: VecDeque<PendingRequest>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ctx: RequestContext, request: IdentityRequest) {
        self.requests.push_back(PendingRequest { ctx, request });
    }

    /// Oldest parked request.
    pub fn pop(&mut self) -> Option<PendingRequest> {
        self.requests.pop_front()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }
}
