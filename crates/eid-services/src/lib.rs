//! Edge Identity Services
//!
//! This crate runs the identity layer as a single serialized worker:
//!
//! - **Identity Service**: Applies typed requests to one `IdentityState`
//! - **Pending queue**: Holds requests that arrive before bootstrap
//! - **Runtime**: tokio task fed by a bounded channel
//! - **Client**: Cloneable async handle used by the host
//!
//! # Architecture
//!
//! ```text
//!  IdentityClient ──mpsc──▶ runtime::run ──▶ IdentityService::on_request
//!        ▲                                        │
//!        └──────────── oneshot replies ◀──────────┤
//!                                                 ├──▶ SharedStatePort (publish)
//!                                                 └──▶ EventDispatcher (consent, reset)
//! ```
//!
//! Requests are handled one at a time in arrival order. Until bootstrap
//! succeeds every request is parked in the pending queue and replayed, in
//! order, as soon as it does.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod messages;
pub mod runtime;

#[cfg(test)]
pub mod test_utils;

pub use client::IdentityClient;
pub use config::ServiceConfig;
pub use error::{ClientError, ServiceError};
pub use events::{EventDispatcher, IdentityEvent, RecordingDispatcher};
pub use identity::{ControlFlow, IdentityService};
pub use messages::IdentityRequest;
