//! Typed requests accepted by the identity service.

use eid_identity::IdentityMap;
use tokio::sync::oneshot;

/// Reply channel. A request without one is still processed.
pub type Reply<T> = Option<oneshot::Sender<T>>;

/// Inbound request to the identity service.
#[derive(Debug)]
pub enum IdentityRequest {
    // =========================================================================
    // Mutations
    // =========================================================================
    /// Merge customer identifiers
    UpdateIdentities { map: IdentityMap },
    /// Remove customer identifiers
    RemoveIdentities { map: IdentityMap },
    /// Replace every identifier with a fresh ECID
    Reset,
    /// Set or clear the advertising identifier
    SetAdvertisingIdentifier { ad_id: Option<String> },

    // =========================================================================
    // Queries
    // =========================================================================
    /// Current identity map
    GetIdentities { reply: Reply<IdentityMap> },
    /// Primary ECID, empty when absent
    GetExperienceCloudId { reply: Reply<String> },
    /// `adobe_mc` URL variables, `None` when they cannot be built
    GetUrlVariables { reply: Reply<Option<String>> },

    // =========================================================================
    // Lifecycle
    // =========================================================================
    /// A shared state owned by `owner` changed
    SharedStateChanged { owner: String },
    /// Attempt bootstrap
    Boot,
    /// Stop the service
    Shutdown,
}

impl IdentityRequest {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityRequest::UpdateIdentities { .. } => "update_identities",
            IdentityRequest::RemoveIdentities { .. } => "remove_identities",
            IdentityRequest::Reset => "reset",
            IdentityRequest::SetAdvertisingIdentifier { .. } => "set_advertising_identifier",
            IdentityRequest::GetIdentities { .. } => "get_identities",
            IdentityRequest::GetExperienceCloudId { .. } => "get_experience_cloud_id",
            IdentityRequest::GetUrlVariables { .. } => "get_url_variables",
            IdentityRequest::SharedStateChanged { .. } => "shared_state_changed",
            IdentityRequest::Boot => "boot",
            IdentityRequest::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(IdentityRequest::Reset.kind(), "reset");
        assert_eq!(
            IdentityRequest::GetIdentities { reply: None }.kind(),
            "get_identities"
        );
        assert_eq!(
            IdentityRequest::SharedStateChanged {
                owner: "owner".into()
            }
            .kind(),
            "shared_state_changed"
        );
    }
}
