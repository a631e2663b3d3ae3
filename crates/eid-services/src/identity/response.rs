//! Reply helpers for identity service queries.

use tracing::debug;

use crate::messages::Reply;

/// Send a query reply.
///
/// A missing reply channel or a caller that stopped waiting is not an error.
pub fn send_reply<T>(reply: Reply<T>, value: T, kind: &str) {
    let Some(sender) = reply else {
        debug!(kind, "IdentityService: no reply channel, dropping response");
        return;
    };
    if sender.send(value).is_err() {
        debug!(kind, "IdentityService: caller stopped waiting for response");
    }
}
