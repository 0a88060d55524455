//! Ordered attribute sets and the aggregation that builds them
//!
//! Every transaction event carries an [`AttributeSet`]: a string map whose
//! iteration order is the lexicographic order of its keys. The order is what
//! makes the serialized form of an event reproducible, so the set is backed by
//! a `BTreeMap` and never by a hash map.
//!
//! [`aggregate`] merges caller attributes with derived context. Derived keys
//! (`applicationId`, `transactionType`, `transactionStatus`, `transactionMsg`)
//! are written last and always win over caller keys of the same name.

use crate::message::format_message;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use tracing::debug;

pub const APPLICATION_ID: &str = "applicationId";
pub const TRANSACTION_TYPE: &str = "transactionType";
pub const TRANSACTION_STATUS: &str = "transactionStatus";
pub const TRANSACTION_MSG: &str = "transactionMsg";
pub const PAYLOAD_TYPE: &str = "payloadType";
pub const EVENT_FLOW: &str = "event.flow";
pub const EVENT_FILE_NAME: &str = "event.fileName";
pub const EVENT_LINE_NUMBER: &str = "event.lineNumber";

/// Canonical, key-ordered attributes attached to a transaction event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, String>);

impl AttributeSet {
    /// Create an empty attribute set
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert or overwrite `key`, returning the previous value
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

    /// Keys in lexicographic order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in lexicographic key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to a compact JSON object with sorted keys
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for AttributeSet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K, V> Extend<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.0.insert(k.into(), v.into());
        }
    }
}

impl IntoIterator for AttributeSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Where in the host pipeline an operation was invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    /// Root container (flow) name
    pub container_name: String,
    pub file_name: Option<String>,
    pub line_number: Option<u32>,
}

impl SourceLocation {
    pub fn new(container_name: impl Into<String>) -> Self {
        Self {
            container_name: container_name.into(),
            file_name: None,
            line_number: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_line_number(mut self, line_number: u32) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Write the `event.*` keys for this location into `attributes`
    pub fn apply_to(&self, attributes: &mut AttributeSet) {
        attributes.insert(EVENT_FLOW, self.container_name.as_str());
        if let Some(file_name) = &self.file_name {
            attributes.insert(EVENT_FILE_NAME, file_name.as_str());
        }
        if let Some(line_number) = self.line_number {
            attributes.insert(EVENT_LINE_NUMBER, line_number.to_string());
        }
    }
}

/// Copy `existing` and set `key` to `value`
///
/// `existing` is left untouched; the returned set is new.
pub fn put(
    key: impl Into<String>,
    value: impl Into<String>,
    existing: Option<&AttributeSet>,
) -> AttributeSet {
    let mut merged = existing.cloned().unwrap_or_default();
    merged.insert(key, value);
    merged
}

/// Copy `existing` and overwrite it with every entry of `new_entries`
pub fn put_all(new_entries: &AttributeSet, existing: Option<&AttributeSet>) -> AttributeSet {
    let mut merged = existing.cloned().unwrap_or_default();
    merged.extend(new_entries.iter());
    merged
}

/// Build the canonical attribute set for one transaction event
///
/// Merge precedence, lowest first: caller attributes, location keys, derived
/// keys. `transactionMsg` is formatted from the set as it stands before the
/// message itself is inserted; a caller-supplied `transactionMsg` is dropped
/// first and never appears in the formatted JSON.
pub fn aggregate(
    transaction_type: &str,
    transaction_status: &str,
    transaction_msg: &str,
    caller_attributes: Option<&AttributeSet>,
    location: Option<&SourceLocation>,
    application_id: &str,
) -> AttributeSet {
    let mut attributes = caller_attributes.cloned().unwrap_or_default();

    match location {
        Some(location) => location.apply_to(&mut attributes),
        None => debug!(transaction_type, "Missing location information"),
    }

    attributes.insert(APPLICATION_ID, application_id);
    attributes.insert(TRANSACTION_TYPE, transaction_type);
    attributes.insert(TRANSACTION_STATUS, transaction_status);
    attributes.remove(TRANSACTION_MSG);

    let message = format_message(transaction_msg, &attributes);
    attributes.insert(TRANSACTION_MSG, message);
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(entries: &[(&str, &str)]) -> AttributeSet {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_iteration_is_lexicographic() {
        let attrs = set(&[("zeta", "1"), ("alpha", "2"), ("event.flow", "3")]);
        let keys: Vec<&str> = attrs.keys().collect();
        assert_eq!(keys, vec!["alpha", "event.flow", "zeta"]);
    }

    #[test]
    fn test_put_without_existing() {
        let attrs = put("orderId", "42", None);
        assert_eq!(attrs, set(&[("orderId", "42")]));
    }

    #[test]
    fn test_put_overwrites_and_leaves_input_alone() {
        let existing = set(&[("orderId", "41"), ("region", "eu")]);
        let merged = put("orderId", "42", Some(&existing));

        assert_eq!(merged, set(&[("orderId", "42"), ("region", "eu")]));
        assert_eq!(existing.get("orderId"), Some("41"));
    }

    #[test]
    fn test_put_all_new_values_win() {
        let existing = set(&[("a", "1"), ("b", "2")]);
        let new_entries = set(&[("b", "20"), ("c", "30")]);
        let merged = put_all(&new_entries, Some(&existing));

        assert_eq!(merged, set(&[("a", "1"), ("b", "20"), ("c", "30")]));
        assert_eq!(existing, set(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_put_all_without_existing() {
        let new_entries = set(&[("b", "2")]);
        assert_eq!(put_all(&new_entries, None), new_entries);
    }

    #[test]
    fn test_location_keys() {
        let mut attrs = AttributeSet::new();
        SourceLocation::new("mainFlow")
            .with_file_name("orders.xml")
            .with_line_number(17)
            .apply_to(&mut attrs);

        assert_eq!(attrs.get(EVENT_FLOW), Some("mainFlow"));
        assert_eq!(attrs.get(EVENT_FILE_NAME), Some("orders.xml"));
        assert_eq!(attrs.get(EVENT_LINE_NUMBER), Some("17"));
    }

    #[test]
    fn test_location_without_optional_parts() {
        let mut attrs = AttributeSet::new();
        SourceLocation::new("mainFlow").apply_to(&mut attrs);

        assert_eq!(attrs, set(&[(EVENT_FLOW, "mainFlow")]));
    }

    #[test]
    fn test_aggregate_derived_keys_win() {
        let caller = set(&[
            ("applicationId", "spoofed"),
            ("transactionType", "spoofed"),
            ("transactionStatus", "spoofed"),
            ("transactionMsg", "spoofed"),
        ]);
        let attrs = aggregate("ORDER_CREATE", "FAILURE", "ERROR: ", Some(&caller), None, "real-app");

        assert_eq!(attrs.get(APPLICATION_ID), Some("real-app"));
        assert_eq!(attrs.get(TRANSACTION_TYPE), Some("ORDER_CREATE"));
        assert_eq!(attrs.get(TRANSACTION_STATUS), Some("FAILURE"));
        assert_ne!(attrs.get(TRANSACTION_MSG), Some("spoofed"));
        assert_eq!(caller.get(APPLICATION_ID), Some("spoofed"));
    }

    #[test]
    fn test_aggregate_message_excludes_itself() {
        let location = SourceLocation::new("mainFlow");
        let attrs = aggregate("ORDER_CREATE", "FAILURE", "ERROR: ", None, Some(&location), "app1");

        assert_eq!(
            attrs.get(TRANSACTION_MSG),
            Some(
                "ERROR:  {\"applicationId\":\"app1\",\"event.flow\":\"mainFlow\",\
                 \"transactionStatus\":\"FAILURE\",\"transactionType\":\"ORDER_CREATE\"}"
            )
        );
        assert_eq!(attrs.len(), 5);
    }

    #[test]
    fn test_aggregate_caller_message_key_never_reaches_formatted_json() {
        let caller = set(&[("transactionMsg", "old"), ("orderId", "42")]);
        let attrs = aggregate("T", "S", "AUDIT: ", Some(&caller), None, "app");

        assert_eq!(
            attrs.get(TRANSACTION_MSG),
            Some(
                "AUDIT:  {\"applicationId\":\"app\",\"orderId\":\"42\",\
                 \"transactionStatus\":\"S\",\"transactionType\":\"T\"}"
            )
        );
        assert_eq!(caller.get(TRANSACTION_MSG), Some("old"));
    }

    fn arb_map() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("[a-z.]{1,8}", "[a-z0-9]{0,6}", 0..8)
    }

    proptest! {
        #[test]
        fn prop_put_all_is_non_mutating_union(existing in arb_map(), new_entries in arb_map()) {
            let existing_set = AttributeSet::from(existing.clone());
            let new_set = AttributeSet::from(new_entries.clone());
            let merged = put_all(&new_set, Some(&existing_set));

            prop_assert_eq!(existing_set.clone().into_inner(), existing.clone());
            prop_assert_eq!(new_set.clone().into_inner(), new_entries.clone());

            for key in existing.keys().chain(new_entries.keys()) {
                prop_assert!(merged.contains_key(key));
            }
            prop_assert_eq!(
                merged.len(),
                existing.keys().chain(new_entries.keys()).collect::<std::collections::BTreeSet<_>>().len()
            );
            for (key, value) in &new_entries {
                prop_assert_eq!(merged.get(key), Some(value.as_str()));
            }
            for (key, value) in &existing {
                if !new_entries.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value.as_str()));
                }
            }

            let keys: Vec<&str> = merged.keys().collect();
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            prop_assert_eq!(keys, sorted);
        }

        #[test]
        fn prop_put_is_non_mutating(existing in arb_map(), key in "[a-z]{1,6}", value in "[a-z]{0,6}") {
            let existing_set = AttributeSet::from(existing.clone());
            let merged = put(key.clone(), value.clone(), Some(&existing_set));

            prop_assert_eq!(existing_set.into_inner(), existing.clone());
            prop_assert_eq!(merged.get(&key), Some(value.as_str()));
            prop_assert_eq!(merged.len(), existing.len() + usize::from(!existing.contains_key(&key)));
        }

        #[test]
        fn prop_aggregate_always_carries_derived_keys(caller in arb_map(), app in "[a-z]{1,6}") {
            let caller_set = AttributeSet::from(caller);
            let attrs = aggregate("TYPE", "STATUS", "MSG: ", Some(&caller_set), None, &app);

            prop_assert_eq!(attrs.get(APPLICATION_ID), Some(app.as_str()));
            prop_assert_eq!(attrs.get(TRANSACTION_TYPE), Some("TYPE"));
            prop_assert_eq!(attrs.get(TRANSACTION_STATUS), Some("STATUS"));
            let formatted = attrs.get(TRANSACTION_MSG).is_some_and(|m| m.starts_with("MSG:  {"));
            prop_assert!(formatted, "transactionMsg missing or unformatted: {:?}", attrs.get(TRANSACTION_MSG));
        }
    }
}
