//! Namespaced identity map.
//!
//! Maps a namespace to an ordered list of [`IdentityItem`]s. Within a
//! namespace ids are unique (case-insensitive); re-adding an existing id
//! replaces the item in place and keeps its position.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::item::IdentityItem;
use crate::wire;

/// Namespace to ordered item list.
#[derive(Clone, Debug, Default)]
pub struct IdentityMap {
    items: BTreeMap<String, Vec<IdentityItem>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the end of a namespace, replacing an existing item
    /// with the same id in place.
    pub fn add_item(&mut self, item: IdentityItem, namespace: &str) {
        self.insert_item(item, namespace, false);
    }

    /// Add an item at the front of a namespace. An existing item with the
    /// same id is replaced in place instead of moved.
    pub fn add_item_first(&mut self, item: IdentityItem, namespace: &str) {
        self.insert_item(item, namespace, true);
    }

    /// Remove an item from a namespace. Missing namespaces and ids are no-ops.
    pub fn remove_item(&mut self, item: &IdentityItem, namespace: &str) {
        if namespace.is_empty() {
            debug!("IdentityMap: ignoring remove for empty namespace");
            return;
        }

        let Some(list) = self.items.get_mut(namespace) else {
            return;
        };
        list.retain(|existing| existing != item);
        if list.is_empty() {
            self.items.remove(namespace);
        }
    }

    /// Copy of the items for a namespace, empty if absent.
    pub fn items_for_namespace(&self, namespace: &str) -> Vec<IdentityItem> {
        self.items.get(namespace).cloned().unwrap_or_default()
    }

    pub fn namespaces(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }

    /// Add every item of `other`, namespace by namespace.
    pub fn merge(&mut self, other: &IdentityMap) {
        for (namespace, list) in &other.items {
            for item in list {
                self.add_item(item.clone(), namespace);
            }
        }
    }

    /// Remove every item of `other`, namespace by namespace.
    pub fn remove(&mut self, other: &IdentityMap) {
        for (namespace, list) in &other.items {
            for item in list {
                self.remove_item(item, namespace);
            }
        }
    }

    /// Remove every namespace matching `namespace` ASCII case-insensitively.
    ///
    /// Returns whether anything was removed.
    pub fn clear_namespace(&mut self, namespace: &str) -> bool {
        let before = self.items.len();
        self.items
            .retain(|existing, _| !existing.eq_ignore_ascii_case(namespace));
        self.items.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Encode to the wire object.
    ///
    /// When the map is empty the `identityMap` key is omitted if
    /// `allow_empty` is true, and written as `{}` otherwise.
    pub fn to_wire(&self, allow_empty: bool) -> Map<String, Value> {
        let mut namespaces = Map::new();
        for (namespace, list) in &self.items {
            let encoded = list.iter().map(IdentityItem::to_wire).collect();
            namespaces.insert(namespace.clone(), Value::Array(encoded));
        }

        let mut object = Map::new();
        if !namespaces.is_empty() || !allow_empty {
            object.insert(wire::IDENTITY_MAP.into(), Value::Object(namespaces));
        }
        object
    }

    /// Decode from the wire object.
    ///
    /// Returns `None` when there is no `identityMap` object. Namespaces that
    /// are not arrays and entries that do not decode are skipped.
    pub fn from_wire(object: &Map<String, Value>) -> Option<Self> {
        let namespaces = object.get(wire::IDENTITY_MAP)?.as_object()?;

        let mut map = IdentityMap::new();
        for (namespace, entries) in namespaces {
            let Some(entries) = entries.as_array() else {
                debug!(namespace = %namespace, "IdentityMap: skipping non-array namespace");
                continue;
            };
            for entry in entries {
                if let Some(item) = IdentityItem::from_wire(entry) {
                    map.add_item(item, namespace);
                }
            }
        }
        Some(map)
    }

    fn insert_item(&mut self, item: IdentityItem, namespace: &str, first: bool) {
        if namespace.is_empty() {
            debug!(id = %item.id(), "IdentityMap: ignoring item for empty namespace");
            return;
        }

        let list = self.items.entry(namespace.to_owned()).or_default();
        if let Some(position) = list.iter().position(|existing| *existing == item) {
            list[position] = item;
        } else if first {
            list.insert(0, item);
        } else {
            list.push(item);
        }
    }
}

impl Serialize for IdentityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire(false).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for IdentityMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        IdentityMap::from_wire(&object)
            .ok_or_else(|| D::Error::custom("missing identityMap object"))
    }
}
