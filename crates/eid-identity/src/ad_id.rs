//! Advertising identifier normalization and consent transitions.

use serde_json::{json, Value};

/// Advertising id reported by devices with ad tracking disabled.
pub const ZERO_ADVERTISING_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Normalize an advertising id. Empty and all-zero values are absent.
pub fn normalize(value: Option<&str>) -> Option<&str> {
    value.filter(|id| !id.is_empty() && *id != ZERO_ADVERTISING_ID)
}

/// Ad-tracking consent signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdIdConsent {
    /// Tracking was enabled
    Yes,
    /// Tracking was disabled
    No,
}

impl AdIdConsent {
    /// Wire value of the consent.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdIdConsent::Yes => "y",
            AdIdConsent::No => "n",
        }
    }

    /// Consent update event payload.
    pub fn event_data(&self, id_type: &str) -> Value {
        json!({
            "consents": {
                "adID": {
                    "val": self.as_str(),
                    "idType": id_type,
                }
            }
        })
    }
}

/// Outcome of an advertising id update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdIdUpdate {
    /// Stored value changed; properties must be persisted and published
    pub changed: bool,
    /// Consent signal to emit, if any
    pub consent: Option<AdIdConsent>,
}

/// Decide the outcome of replacing `old` with `new`.
///
/// | old   | new       | changed | consent |
/// |-------|-----------|---------|---------|
/// | empty | empty     | no      | none    |
/// | empty | valid     | yes     | yes     |
/// | valid | empty     | yes     | no      |
/// | valid | same      | no      | none    |
/// | valid | different | yes     | none    |
pub fn transition(old: Option<&str>, new: Option<&str>) -> AdIdUpdate {
    match (normalize(old), normalize(new)) {
        (None, None) => AdIdUpdate::default(),
        (None, Some(_)) => AdIdUpdate {
            changed: true,
            consent: Some(AdIdConsent::Yes),
        },
        (Some(_), None) => AdIdUpdate {
            changed: true,
            consent: Some(AdIdConsent::No),
        },
        (Some(old), Some(new)) if old == new => AdIdUpdate::default(),
        (Some(_), Some(_)) => AdIdUpdate {
            changed: true,
            consent: None,
        },
    }
}
