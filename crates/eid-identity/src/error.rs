//! Error types for the Identity layer.

use thiserror::Error;

/// Errors from identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// An identity item was built without an id
    #[error("identity item requires an id")]
    MissingId,

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the key/value store behind the persistence gateway.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The named collection cannot be opened
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Read or write failed
    #[error("store I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            IdentityError::MissingId.to_string(),
            "identity item requires an id"
        );
        assert_eq!(
            IdentityError::InvalidConfig("empty datastore".into()).to_string(),
            "invalid configuration: empty datastore"
        );
        assert_eq!(
            StoreError::Unavailable("identity".into()).to_string(),
            "store unavailable: identity"
        );
    }

    #[test]
    fn test_serialization_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: IdentityError = json_err.into();
        assert!(matches!(err, IdentityError::Serialization(_)));
    }
}
