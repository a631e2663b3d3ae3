//! Identity Service Client
//!
//! Async handle for talking to a running identity service. Clones share the
//! same request channel, so requests from every clone are handled in the
//! order they were sent.
//!
//! # Timeout Handling
//!
//! Queries wait at most the configured response timeout (see
//! [`crate::ServiceConfig::response_timeout_ms`]). A query sent before
//! bootstrap is answered once bootstrap completes, so the timeout also
//! bounds how long a caller waits for bootstrap.
//!
//! # Example
//!
//! ```ignore
//! let (client, _task) = runtime::spawn(service, &ServiceConfig::default())?;
//!
//! client.boot().await?;
//! let ecid = client.get_experience_cloud_id().await?;
//! ```

use std::time::Duration;

use eid_identity::{IdentityItem, IdentityMap};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::ClientError;
use crate::messages::IdentityRequest;

/// Identity service client.
#[derive(Clone, Debug)]
pub struct IdentityClient {
    sender: mpsc::Sender<IdentityRequest>,
    timeout: Duration,
}

impl IdentityClient {
    pub fn new(sender: mpsc::Sender<IdentityRequest>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Merge customer identifiers. An empty map is ignored.
    pub async fn update_identities(&self, map: IdentityMap) -> Result<(), ClientError> {
        if map.is_empty() {
            debug!("IdentityClient: ignoring update with empty identity map");
            return Ok(());
        }
        self.send(IdentityRequest::UpdateIdentities { map }).await
    }

    /// Remove one customer identifier. An empty namespace is ignored.
    pub async fn remove_identity(
        &self,
        item: IdentityItem,
        namespace: &str,
    ) -> Result<(), ClientError> {
        if namespace.is_empty() {
            debug!("IdentityClient: ignoring removal with empty namespace");
            return Ok(());
        }
        let mut map = IdentityMap::new();
        map.add_item(item, namespace);
        self.send(IdentityRequest::RemoveIdentities { map }).await
    }

    /// Copy of the current identity map.
    pub async fn get_identities(&self) -> Result<IdentityMap, ClientError> {
        self.request(|reply| IdentityRequest::GetIdentities { reply: Some(reply) })
            .await
    }

    /// Primary ECID, or an empty string when none exists.
    pub async fn get_experience_cloud_id(&self) -> Result<String, ClientError> {
        self.request(|reply| IdentityRequest::GetExperienceCloudId { reply: Some(reply) })
            .await
    }

    /// `adobe_mc` URL variables, `None` without an ECID or organization id.
    pub async fn get_url_variables(&self) -> Result<Option<String>, ClientError> {
        self.request(|reply| IdentityRequest::GetUrlVariables { reply: Some(reply) })
            .await
    }

    pub async fn reset_identities(&self) -> Result<(), ClientError> {
        self.send(IdentityRequest::Reset).await
    }

    /// Set the advertising identifier. `None`, empty and all-zero values clear it.
    pub async fn set_advertising_identifier(
        &self,
        ad_id: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(IdentityRequest::SetAdvertisingIdentifier { ad_id })
            .await
    }

    /// Notify the service that `owner` published new shared state.
    pub async fn shared_state_changed(&self, owner: &str) -> Result<(), ClientError> {
        self.send(IdentityRequest::SharedStateChanged {
            owner: owner.to_owned(),
        })
        .await
    }

    pub async fn boot(&self) -> Result<(), ClientError> {
        self.send(IdentityRequest::Boot).await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(IdentityRequest::Shutdown).await
    }

    async fn send(&self, request: IdentityRequest) -> Result<(), ClientError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| ClientError::Closed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> IdentityRequest,
    ) -> Result<T, ClientError> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply)).await?;
        match tokio::time::timeout(self.timeout, response).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(ClientError::Closed),
            Err(_) => Err(ClientError::Timeout),
        }
    }
}
