//! Persisted identity properties.
//!
//! Reserved namespace layout inside the identity map:
//! - `ECID[0]`: primary ECID
//! - `ECID[1]`: secondary ECID (legacy), only while a primary exists
//! - `GAID[0]`: advertising identifier

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::ad_id;
use crate::ecid::Ecid;
use crate::item::IdentityItem;
use crate::map::IdentityMap;
use crate::namespaces;

/// The device's identity set.
#[derive(Clone, Debug, Default)]
pub struct IdentityProperties {
    identity_map: IdentityMap,
}

impl IdentityProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_identity_map(identity_map: IdentityMap) -> Self {
        Self { identity_map }
    }

    /// Primary ECID.
    pub fn ecid(&self) -> Option<Ecid> {
        self.ecid_at(0)
    }

    /// Replace the primary ECID, keeping any secondary.
    ///
    /// `None` clears the whole `ECID` namespace, secondary included.
    pub fn set_ecid(&mut self, ecid: Option<Ecid>) {
        if let Some(current) = self.ecid() {
            self.identity_map
                .remove_item(&IdentityItem::new(current.into_string()), namespaces::ECID);
        }

        match ecid {
            Some(ecid) => self
                .identity_map
                .add_item_first(IdentityItem::new(ecid.into_string()), namespaces::ECID),
            None => {
                self.identity_map.clear_namespace(namespaces::ECID);
            }
        }
    }

    /// Secondary ECID.
    pub fn ecid_secondary(&self) -> Option<Ecid> {
        self.ecid_at(1)
    }

    /// Replace the secondary ECID. Ignored when no primary exists.
    pub fn set_ecid_secondary(&mut self, ecid: Option<Ecid>) {
        if let Some(current) = self.ecid_secondary() {
            self.identity_map
                .remove_item(&IdentityItem::new(current.into_string()), namespaces::ECID);
        }

        if self.ecid().is_none() {
            debug!("IdentityProperties: no primary ECID, not setting secondary");
            return;
        }

        if let Some(ecid) = ecid {
            self.identity_map
                .add_item(IdentityItem::new(ecid.into_string()), namespaces::ECID);
        }
    }

    pub fn advertising_id(&self) -> Option<String> {
        self.identity_map
            .items_for_namespace(namespaces::GAID)
            .first()
            .map(|item| item.id().to_owned())
    }

    /// Store a valid advertising id, or clear it for empty/all-zero values.
    pub fn set_advertising_id(&mut self, ad_id: Option<&str>) {
        self.identity_map.clear_namespace(namespaces::GAID);
        if let Some(ad_id) = ad_id::normalize(ad_id) {
            self.identity_map
                .add_item(IdentityItem::new(ad_id), namespaces::GAID);
        }
    }

    /// Merge customer identifiers, ignoring reserved namespaces.
    pub fn update_customer_identifiers(&mut self, map: &IdentityMap, reserved: &[String]) {
        let filtered = without_namespaces(map, reserved);
        self.identity_map.merge(&filtered);
    }

    /// Remove customer identifiers, ignoring reserved namespaces.
    pub fn remove_customer_identifiers(&mut self, map: &IdentityMap, reserved: &[String]) {
        let filtered = without_namespaces(map, reserved);
        self.identity_map.remove(&filtered);
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity_map
    }

    /// Encode to the wire object. See [`IdentityMap::to_wire`].
    pub fn to_wire(&self, allow_empty: bool) -> Map<String, Value> {
        self.identity_map.to_wire(allow_empty)
    }

    /// Decode from the wire object. A missing identity map yields empty properties.
    pub fn from_wire(object: &Map<String, Value>) -> Self {
        Self::from_identity_map(IdentityMap::from_wire(object).unwrap_or_default())
    }

    fn ecid_at(&self, index: usize) -> Option<Ecid> {
        self.identity_map
            .items_for_namespace(namespaces::ECID)
            .get(index)
            .map(|item| Ecid::from(item.id()))
    }
}

fn without_namespaces(map: &IdentityMap, reserved: &[String]) -> IdentityMap {
    let mut filtered = map.clone();
    for namespace in reserved {
        if filtered.clear_namespace(namespace) {
            debug!(namespace = %namespace, "IdentityProperties: dropped reserved namespace");
        }
    }
    filtered
}

impl Serialize for IdentityProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire(false).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IdentityProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Object(object) => Ok(Self::from_wire(&object)),
            _ => Err(D::Error::custom("identity properties must be a JSON object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::AuthenticatedState;
    use serde_json::json;

    const AD_ID: &str = "fa181743-2520-4ebc-b125-626baf1e3db8";

    fn reserved() -> Vec<String> {
        vec!["ECID".into(), "GAID".into(), "IDFA".into()]
    }

    fn ecid_ids(properties: &IdentityProperties) -> Vec<String> {
        properties
            .identity_map()
            .items_for_namespace(namespaces::ECID)
            .iter()
            .map(|item| item.id().to_owned())
            .collect()
    }

    // =========================================================================
    // ECID
    // =========================================================================

    #[test]
    fn test_set_ecid() {
        let mut properties = IdentityProperties::new();
        let ecid = Ecid::new();
        properties.set_ecid(Some(ecid.clone()));
        assert_eq!(properties.ecid(), Some(ecid));
        assert_eq!(properties.ecid_secondary(), None);
    }

    #[test]
    fn test_replace_primary_keeps_secondary() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));
        properties.set_ecid_secondary(Some(Ecid::from("secondary")));
        properties.set_ecid(Some(Ecid::from("replacement")));

        assert_eq!(ecid_ids(&properties), vec!["replacement", "secondary"]);
    }

    #[test]
    fn test_clear_primary_clears_secondary() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));
        properties.set_ecid_secondary(Some(Ecid::from("secondary")));
        properties.set_ecid(None);

        assert_eq!(properties.ecid(), None);
        assert_eq!(properties.ecid_secondary(), None);
        assert!(properties.identity_map().is_empty());
    }

    #[test]
    fn test_secondary_requires_primary() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid_secondary(Some(Ecid::from("secondary")));
        assert_eq!(properties.ecid_secondary(), None);
        assert!(properties.identity_map().is_empty());
    }

    #[test]
    fn test_replace_and_clear_secondary() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));
        properties.set_ecid_secondary(Some(Ecid::from("old")));
        properties.set_ecid_secondary(Some(Ecid::from("new")));
        assert_eq!(ecid_ids(&properties), vec!["primary", "new"]);

        properties.set_ecid_secondary(None);
        assert_eq!(ecid_ids(&properties), vec!["primary"]);
    }

    // =========================================================================
    // Advertising id
    // =========================================================================

    #[test]
    fn test_advertising_id() {
        let mut properties = IdentityProperties::new();
        properties.set_advertising_id(Some(AD_ID));
        assert_eq!(properties.advertising_id().as_deref(), Some(AD_ID));

        properties.set_advertising_id(Some("other"));
        assert_eq!(properties.advertising_id().as_deref(), Some("other"));
        assert_eq!(
            properties
                .identity_map()
                .items_for_namespace(namespaces::GAID)
                .len(),
            1
        );
    }

    #[test]
    fn test_invalid_advertising_id_clears() {
        for invalid in [None, Some(""), Some(ad_id::ZERO_ADVERTISING_ID)] {
            let mut properties = IdentityProperties::new();
            properties.set_advertising_id(Some(AD_ID));
            properties.set_advertising_id(invalid);
            assert_eq!(properties.advertising_id(), None);
            assert!(properties.identity_map().is_empty());
        }
    }

    // =========================================================================
    // Customer identifiers
    // =========================================================================

    #[test]
    fn test_update_customer_identifiers_filters_reserved() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));

        let mut update = IdentityMap::new();
        update.add_item(IdentityItem::new("hijack"), "ECID");
        update.add_item(IdentityItem::new("hijack"), "ecid");
        update.add_item(IdentityItem::new("ad"), "gaid");
        update.add_item(IdentityItem::new("idfa"), "IDFA");
        update.add_item(
            IdentityItem::with_state("user", AuthenticatedState::Authenticated, false),
            "email",
        );

        properties.update_customer_identifiers(&update, &reserved());

        assert_eq!(ecid_ids(&properties), vec!["primary"]);
        assert_eq!(properties.advertising_id(), None);
        assert_eq!(
            properties.identity_map().namespaces(),
            vec!["ECID".to_string(), "email".to_string()]
        );
    }

    #[test]
    fn test_remove_customer_identifiers_filters_reserved() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));
        properties.set_advertising_id(Some(AD_ID));

        let mut customer = IdentityMap::new();
        customer.add_item(IdentityItem::new("user"), "email");
        properties.update_customer_identifiers(&customer, &reserved());

        let mut removal = customer.clone();
        removal.add_item(IdentityItem::new("primary"), "ECID");
        removal.add_item(IdentityItem::new(AD_ID), "GAID");
        properties.remove_customer_identifiers(&removal, &reserved());

        assert_eq!(properties.ecid(), Some(Ecid::from("primary")));
        assert_eq!(properties.advertising_id().as_deref(), Some(AD_ID));
        assert!(properties
            .identity_map()
            .items_for_namespace("email")
            .is_empty());
    }

    // =========================================================================
    // Wire format
    // =========================================================================

    #[test]
    fn test_wire_round_trip() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));
        properties.set_ecid_secondary(Some(Ecid::from("secondary")));
        properties.set_advertising_id(Some(AD_ID));

        let wire = properties.to_wire(false);
        let back = IdentityProperties::from_wire(&wire);
        assert_eq!(back.ecid(), Some(Ecid::from("primary")));
        assert_eq!(back.ecid_secondary(), Some(Ecid::from("secondary")));
        assert_eq!(back.advertising_id().as_deref(), Some(AD_ID));
        assert_eq!(back.to_wire(false), wire);
    }

    #[test]
    fn test_empty_wire() {
        let properties = IdentityProperties::new();
        assert!(properties.to_wire(true).is_empty());
        assert_eq!(
            Value::Object(properties.to_wire(false)),
            json!({"identityMap": {}})
        );
        assert!(IdentityProperties::from_wire(&Map::new())
            .identity_map()
            .is_empty());
    }

    #[test]
    fn test_serde_delegates_to_wire() {
        let mut properties = IdentityProperties::new();
        properties.set_ecid(Some(Ecid::from("primary")));

        let json = serde_json::to_string(&properties).unwrap();
        let back: IdentityProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ecid(), Some(Ecid::from("primary")));
        assert!(serde_json::from_str::<IdentityProperties>("[]").is_err());
    }
}
