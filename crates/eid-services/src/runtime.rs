//! tokio runtime for the identity service.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::client::IdentityClient;
use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::identity::{ControlFlow, IdentityService};
use crate::messages::IdentityRequest;

/// Spawn the service on the current tokio runtime.
///
/// Returns a client handle and the task handle. The task ends on
/// `Shutdown` or when every client has been dropped.
pub fn spawn(
    service: IdentityService,
    config: &ServiceConfig,
) -> Result<(IdentityClient, JoinHandle<()>), ServiceError> {
    config.validate()?;
    let (sender, receiver) = mpsc::channel(config.queue_capacity);
    let handle = tokio::spawn(run(service, receiver));
    Ok((IdentityClient::new(sender, config.response_timeout()), handle))
}

/// Process requests until shutdown or channel close.
pub async fn run(mut service: IdentityService, mut receiver: mpsc::Receiver<IdentityRequest>) {
    info!("IdentityService: started");
    while let Some(request) = receiver.recv().await {
        if service.on_request(request) == ControlFlow::Exit {
            break;
        }
    }
    info!(
        dropped = service.pending_count(),
        "IdentityService: stopped"
    );
}
