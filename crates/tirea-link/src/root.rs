//! The host's top-level state mapping.

use crate::Item;
use im::OrdMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A partial update: the top-level entries to replace.
pub type PartialState = BTreeMap<String, Item>;

/// Flat mapping from top-level key to [`Item`].
///
/// Snapshots are cheap clones. Updates go through [`RootState::merge`],
/// which replaces the given keys wholesale and keeps every other entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootState(OrdMap<String, Item>);

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a root state from a plain JSON object, converting each
    /// top-level array or object into a persistent container.
    pub fn from_plain(entries: serde_json::Map<String, Value>) -> Self {
        entries
            .into_iter()
            .map(|(k, v)| (k, Item::Plain(v).into_persistent()))
            .collect()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Item> {
        self.0.get(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Return a new state with `key` set. `self` is untouched.
    #[must_use]
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Item>) -> Self {
        RootState(self.0.update(key.into(), value.into()))
    }

    #[must_use]
    pub fn remove(&self, key: &str) -> Self {
        RootState(self.0.without(key))
    }

    /// Shallow merge: every key of `partial` is replaced, others are kept.
    #[must_use]
    pub fn merge(&self, partial: PartialState) -> Self {
        let mut next = self.0.clone();
        for (key, value) in partial {
            next.insert(key, value);
        }
        RootState(next)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Item)> {
        self.0.iter()
    }

    /// Plain JSON view of the whole state.
    pub fn to_plain(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_plain()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<Item>> FromIterator<(K, V)> for RootState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RootState(
            iter.into_iter()
                .map(|(k, v)| -> (String, Item) { (k.into(), v.into()) })
                .collect(),
        )
    }
}

/// Every top-level value is kept plain; see [`RootState::from_plain`] to
/// convert.
impl From<serde_json::Map<String, Value>> for RootState {
    fn from(entries: serde_json::Map<String, Value>) -> Self {
        entries.into_iter().collect()
    }
}
