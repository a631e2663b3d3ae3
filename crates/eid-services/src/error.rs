//! Error types for the identity service.

use eid_identity::IdentityError;
use thiserror::Error;

/// Errors raised while setting up the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Service configuration failed validation
    #[error("invalid service configuration: {0}")]
    InvalidConfig(String),

    /// Identity configuration failed validation
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Errors observed by [`crate::IdentityClient`] callers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The service stopped before handling the request
    #[error("identity service is not available")]
    Closed,

    /// No reply within the configured response timeout
    #[error("identity service did not respond in time")]
    Timeout,
}
