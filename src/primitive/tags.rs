//! Key/value tags and the handful of tag semantics the graph core reads.

use std::collections::BTreeMap;

/// Tag map with deterministic key order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parses an OSM boolean tag value (`yes`/`true`/`1`/`on`, `no`/`false`/`0`/`off`).
///
/// Returns `None` for anything else.
pub fn parse_osm_boolean(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Direction implied by a `oneway` tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Oneway {
    /// Travel in node order.
    Forward,
    /// `oneway=-1`: travel against node order.
    Reversed,
    /// Not a oneway, or an unrecognised value.
    No,
}

impl Oneway {
    /// Interprets the raw `oneway` tag value.
    pub fn from_tag(value: Option<&str>) -> Self {
        match value {
            Some("-1") => Oneway::Reversed,
            Some(v) if parse_osm_boolean(v) == Some(true) => Oneway::Forward,
            _ => Oneway::No,
        }
    }
}
