//! URL variables for handing the visitor identity to web views.
//!
//! The payload is `adobe_mc=<encoded>` where `<encoded>` is the
//! form-urlencoded form of `TS=<timestamp>|MCMID=<ecid>|MCORGID=<org id>`.

use std::time::{SystemTime, UNIX_EPOCH};

use url::form_urlencoded;

/// Query parameter name of the payload.
pub const URL_VARIABLES_KEY: &str = "adobe_mc";

const TIMESTAMP_KEY: &str = "TS";
const ECID_KEY: &str = "MCMID";
const ORG_ID_KEY: &str = "MCORGID";

/// Build the URL variables string. Empty values are skipped; when every
/// value is empty the payload is the literal `null`.
pub fn payload(timestamp: Option<&str>, ecid: Option<&str>, org_id: Option<&str>) -> String {
    let parts: Vec<String> = [
        (TIMESTAMP_KEY, timestamp),
        (ECID_KEY, ecid),
        (ORG_ID_KEY, org_id),
    ]
    .into_iter()
    .filter_map(|(key, value)| {
        value
            .filter(|value| !value.is_empty())
            .map(|value| format!("{key}={value}"))
    })
    .collect();

    if parts.is_empty() {
        return format!("{URL_VARIABLES_KEY}=null");
    }

    let joined = parts.join("|");
    let encoded: String = form_urlencoded::byte_serialize(joined.as_bytes()).collect();
    format!("{URL_VARIABLES_KEY}={encoded}")
}

/// Current Unix time in seconds, as used for the `TS` value.
pub fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
        .to_string()
}
