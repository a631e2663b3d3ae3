//! Identity request handlers
//!
//! Every handler runs after bootstrap. Mutating handlers persist through
//! `IdentityState` and then publish the new shared state.

use eid_identity::shared_state;
use eid_identity::{url_variables, IdentityMap, RequestContext};
use tracing::{debug, warn};

use super::response::send_reply;
use super::IdentityService;
use crate::events::IdentityEvent;
use crate::messages::Reply;

// =============================================================================
// Customer identifiers
// =============================================================================

/// Handle update identities - merge customer identifiers
pub fn handle_update_identities(service: &mut IdentityService, ctx: &RequestContext, map: IdentityMap) {
    if map.is_empty() {
        debug!("IdentityService: ignoring update with empty identity map");
        return;
    }
    service.state.update_customer_identifiers(&map);
    service.publish_state(ctx);
}

/// Handle remove identities - remove customer identifiers
pub fn handle_remove_identities(service: &mut IdentityService, ctx: &RequestContext, map: IdentityMap) {
    if map.is_empty() {
        debug!("IdentityService: ignoring removal with empty identity map");
        return;
    }
    service.state.remove_customer_identifiers(&map);
    service.publish_state(ctx);
}

// =============================================================================
// Reset and advertising id
// =============================================================================

/// Handle reset - fresh ECID, publish, notify the host
pub fn handle_reset(service: &mut IdentityService, ctx: &RequestContext) {
    service.state.reset_identifiers();
    service.publish_state(ctx);
    service.dispatch_event(IdentityEvent::ResetComplete);
}

/// Handle set advertising identifier - store and emit consent on enable/disable
pub fn handle_set_advertising_identifier(
    service: &mut IdentityService,
    ctx: &RequestContext,
    ad_id: Option<String>,
) {
    let update = service.state.update_advertising_identifier(ad_id.as_deref());
    if update.changed {
        service.publish_state(ctx);
    }
    if let Some(consent) = update.consent {
        let payload = consent.event_data(&service.state.config().consent_id_type);
        service.dispatch_event(IdentityEvent::ConsentUpdate(payload));
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Handle get identities - reply with a copy of the identity map
pub fn handle_get_identities(service: &mut IdentityService, reply: Reply<IdentityMap>) {
    send_reply(reply, service.state.identity_map(), "get_identities");
}

/// Handle get ECID - reply with the primary ECID, empty when absent
pub fn handle_get_experience_cloud_id(service: &mut IdentityService, reply: Reply<String>) {
    let ecid = service
        .state
        .properties()
        .ecid()
        .map(|ecid| ecid.into_string())
        .unwrap_or_default();
    send_reply(reply, ecid, "get_experience_cloud_id");
}

/// Handle get URL variables - build `adobe_mc` from ECID and org id
pub fn handle_get_url_variables(
    service: &mut IdentityService,
    ctx: &RequestContext,
    reply: Reply<Option<String>>,
) {
    let owner = service.state.config().configuration_state_owner.clone();
    let config_state = service.port.get_state(&owner, ctx);
    let org_id = config_state
        .value()
        .and_then(shared_state::org_id)
        .filter(|org_id| !org_id.is_empty())
        .map(str::to_owned);

    let Some(org_id) = org_id else {
        warn!("IdentityService: organization id not found in configuration, no URL variables");
        send_reply(reply, None, "get_url_variables");
        return;
    };

    let Some(ecid) = service.state.properties().ecid() else {
        warn!("IdentityService: no ECID, no URL variables");
        send_reply(reply, None, "get_url_variables");
        return;
    };

    let timestamp = url_variables::unix_timestamp();
    let payload = url_variables::payload(
        Some(timestamp.as_str()),
        Some(ecid.as_str()),
        Some(org_id.as_str()),
    );
    send_reply(reply, Some(payload), "get_url_variables");
}

// =============================================================================
// Shared state
// =============================================================================

/// Handle shared state change - reconcile the secondary ECID with the legacy component
pub fn handle_shared_state_changed(service: &mut IdentityService, ctx: &RequestContext, owner: &str) {
    if owner != service.state.config().legacy_state_owner {
        debug!(owner, "IdentityService: ignoring shared state change");
        return;
    }

    let legacy = service.port.get_state(owner, ctx);
    if !legacy.is_set() {
        debug!(status = ?legacy.status, "IdentityService: legacy shared state not set, keeping secondary ECID");
        return;
    }

    let candidate = legacy.value().and_then(shared_state::legacy_ecid);
    if service.state.update_legacy_experience_cloud_id(candidate) {
        service.publish_state(ctx);
    }
}
