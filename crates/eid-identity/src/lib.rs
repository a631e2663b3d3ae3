//! Edge Identity Layer
//!
//! The Identity layer maintains the durable set of identity namespaces for a
//! single device:
//!
//! - **ECID**: Primary device identifier, plus an optional secondary ECID
//!   reconciled from the legacy identity component
//! - **Advertising ID**: Stored under the `GAID` namespace
//! - **Customer identifiers**: Arbitrary namespaces supplied by the host
//! - **IdentityState**: Bootstrap state machine and mutation entry points
//! - **Persistence**: Gateway over a named key/value store
//!
//! # Safety Invariants
//!
//! ## Success Conditions
//! - No mutation is applied until bootstrap has produced a primary ECID
//! - Every mutation of the properties is followed by a save through the gateway
//!
//! ## Acceptable Partial Failure
//! - Persisted data that cannot be decoded is treated as absent
//! - Store failures are logged and swallowed
//!
//! ## Forbidden States
//! - A secondary ECID without a primary ECID
//! - Customer writes to reserved namespaces (`ECID`, `GAID`, `IDFA`)
//! - Two items with the same id (case-insensitive) in one namespace
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         Identity Layer                           │
//! │                                                                  │
//! │  ┌──────────────────┐         ┌───────────────────────────────┐  │
//! │  │  IdentityState   │────────▶│  SharedStatePort (hub, legacy │  │
//! │  │  (bootstrap FSM) │         │  identity, configuration)     │  │
//! │  └────────┬─────────┘         └───────────────────────────────┘  │
//! │           │                                                      │
//! │  ┌────────▼─────────┐  ┌──────────────┐  ┌────────────────────┐  │
//! │  │IdentityProperties│─▶│ IdentityMap  │─▶│ IdentityItem/Ecid  │  │
//! │  └────────┬─────────┘  └──────────────┘  └────────────────────┘  │
//! │           │                                                      │
//! │  ┌────────▼─────────┐                                            │
//! │  │PersistenceGateway│                                            │
//! │  └────────┬─────────┘                                            │
//! └───────────┼──────────────────────────────────────────────────────┘
//!             ▼
//!   ┌────────────────────┐
//!   │   KeyValueStore    │
//!   └────────────────────┘
//! ```

pub mod ad_id;
pub mod config;
pub mod ecid;
pub mod error;
pub mod item;
pub mod map;
pub mod persistence;
pub mod properties;
pub mod shared_state;
pub mod state;
pub mod testing;
pub mod url_variables;

// Re-export main types
pub use ad_id::{AdIdConsent, AdIdUpdate};
pub use config::IdentityConfig;
pub use ecid::Ecid;
pub use error::{IdentityError, StoreError};
pub use item::{AuthenticatedState, IdentityItem};
pub use map::IdentityMap;
pub use persistence::{IdentityStorage, KeyValueStore, PersistenceGateway};
pub use properties::IdentityProperties;
pub use shared_state::{RequestContext, SharedStatePort, SharedStateResult, SharedStateStatus};
pub use state::{BootState, IdentityState};

/// Reserved identity namespaces.
pub mod namespaces {
    /// Experience Cloud ID namespace (primary at index 0, secondary at index 1)
    pub const ECID: &str = "ECID";
    /// Google advertising identifier namespace
    pub const GAID: &str = "GAID";
    /// Apple advertising identifier namespace
    pub const IDFA: &str = "IDFA";
}

/// Keys of the identity map wire format.
pub mod wire {
    /// Top-level key wrapping the namespace object
    pub const IDENTITY_MAP: &str = "identityMap";
    /// Item id key
    pub const ID: &str = "id";
    /// Item authenticated state key
    pub const AUTHENTICATED_STATE: &str = "authenticatedState";
    /// Item primary flag key
    pub const PRIMARY: &str = "primary";
}
