//! Values held by the root state.

use crate::node::{List, Map, Node, PathAccess};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A top-level state value: either a plain JSON value or a persistent
/// container.
///
/// Only `Map` and `List` items support nested paths. Plain arrays and
/// objects are opaque to path operations until converted with
/// [`Item::into_persistent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Map(Map),
    List(List),
    Plain(Value),
}

impl Item {
    /// Wrap anything convertible into a plain value.
    pub fn plain(value: impl Into<Value>) -> Self {
        Item::Plain(value.into())
    }

    /// The container capability of this item, if it has one.
    pub fn as_path_access(&self) -> Option<&dyn PathAccess> {
        match self {
            Item::Map(map) => Some(map),
            Item::List(list) => Some(list),
            Item::Plain(_) => None,
        }
    }

    /// Owned form of [`Item::as_path_access`], for holding on to a checked
    /// container across threads.
    pub fn into_path_access(self) -> Option<Arc<dyn PathAccess + Send + Sync>> {
        match self {
            Item::Map(map) => Some(Arc::new(map)),
            Item::List(list) => Some(Arc::new(list)),
            Item::Plain(_) => None,
        }
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Item::Plain(_))
    }

    #[inline]
    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            Item::Plain(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Item::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Item::List(list) => Some(list),
            _ => None,
        }
    }

    /// Convert a plain array or object into persistent containers, deeply.
    /// Scalars and items that are already persistent are returned unchanged.
    pub fn into_persistent(self) -> Self {
        match self {
            Item::Plain(value @ (Value::Array(_) | Value::Object(_))) => {
                Item::from(Node::from_plain(value))
            }
            other => other,
        }
    }

    /// Convert persistent containers back to a plain value.
    pub fn into_plain(self) -> Self {
        match self {
            Item::Map(map) => Item::Plain(map.to_plain()),
            Item::List(list) => Item::Plain(list.to_plain()),
            plain => plain,
        }
    }

    /// Plain JSON view of this item, converting containers as needed.
    pub fn to_plain(&self) -> Value {
        match self {
            Item::Map(map) => map.to_plain(),
            Item::List(list) => list.to_plain(),
            Item::Plain(value) => value.clone(),
        }
    }

    /// The node to splice into a persistent tree. A plain value is stored
    /// verbatim as a leaf, unlike `Node::from(Value)`, which deep-converts.
    pub fn into_node(self) -> Node {
        match self {
            Item::Map(map) => Node::Map(map),
            Item::List(list) => Node::List(list),
            Item::Plain(value) => Node::leaf(value),
        }
    }

    /// True when both items are the same persistent container.
    ///
    /// Plain values carry no identity and always compare false.
    pub fn ptr_eq(&self, other: &Item) -> bool {
        match (self, other) {
            (Item::Map(a), Item::Map(b)) => a.ptr_eq(b),
            (Item::List(a), Item::List(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/// Leaves surface as plain values; containers keep their identity.
impl From<Node> for Item {
    fn from(node: Node) -> Self {
        match node {
            Node::Map(map) => Item::Map(map),
            Node::List(list) => Item::List(list),
            Node::Leaf(value) => Item::Plain((*value).clone()),
        }
    }
}

impl From<Map> for Item {
    fn from(map: Map) -> Self {
        Item::Map(map)
    }
}

impl From<List> for Item {
    fn from(list: List) -> Self {
        Item::List(list)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Plain(value)
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::plain(s)
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::plain(s)
    }
}

impl From<bool> for Item {
    fn from(b: bool) -> Self {
        Item::plain(b)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::plain(n)
    }
}

impl From<f64> for Item {
    fn from(n: f64) -> Self {
        Item::plain(n)
    }
}

impl PartialEq<Value> for Item {
    fn eq(&self, other: &Value) -> bool {
        matches!(self, Item::Plain(value) if value == other)
    }
}

impl PartialEq<&str> for Item {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Item::Plain(Value::String(s)) if s == other)
    }
}
