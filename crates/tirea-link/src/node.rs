//! Persistent, structurally-shared tree nodes.
//!
//! `Map` and `List` wrap `im` collections behind an `Arc`, so cloning is a
//! reference-count bump and identity is observable through `ptr_eq`. Writing
//! at a path rebuilds only the containers along that path; every untouched
//! branch is shared with the previous version.

use crate::error::value_type_name;
use crate::{LinkError, LinkResult, Path, Seg};
use im::{OrdMap, Vector};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A node of a persistent tree.
#[derive(Clone, Debug)]
pub enum Node {
    /// A plain value stored as-is. Path operations never descend into it.
    Leaf(Arc<Value>),
    /// Persistent list.
    List(List),
    /// Persistent string-keyed map.
    Map(Map),
}

/// Capability of a persistent container: path-based read and
/// structurally-shared path-based write.
///
/// `set_in` must return a container identical (`ptr_eq`) to `self` when the
/// value already stored at `path` equals the new one.
pub trait PathAccess {
    /// Read the node at `path`. An empty path yields the container itself.
    fn get_in(&self, path: &[Seg]) -> Option<Node>;

    /// Produce a new container with `value` stored at `path`.
    fn set_in(&self, path: &[Seg], value: Node) -> LinkResult<Node>;
}

impl Node {
    /// Wrap a plain value as a leaf without converting it.
    pub fn leaf(value: impl Into<Value>) -> Self {
        Node::Leaf(Arc::new(value.into()))
    }

    /// Deep conversion from a plain value: arrays become lists, objects
    /// become maps, scalars become leaves.
    pub fn from_plain(value: Value) -> Self {
        match value {
            Value::Array(items) => Node::List(items.into_iter().map(Node::from_plain).collect()),
            Value::Object(entries) => Node::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Node::from_plain(v)))
                    .collect(),
            ),
            scalar => Node::Leaf(Arc::new(scalar)),
        }
    }

    /// Deep conversion back to a plain value.
    pub fn to_plain(&self) -> Value {
        match self {
            Node::Leaf(value) => (**value).clone(),
            Node::List(list) => Value::Array(list.iter().map(Node::to_plain).collect()),
            Node::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain()))
                    .collect(),
            ),
        }
    }

    /// The container capability of this node, if it has one.
    pub fn as_path_access(&self) -> Option<&dyn PathAccess> {
        match self {
            Node::Map(map) => Some(map),
            Node::List(list) => Some(list),
            Node::Leaf(_) => None,
        }
    }

    #[inline]
    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }

    /// Short name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Leaf(value) => value_type_name(value),
            Node::List(_) => "list",
            Node::Map(_) => "map",
        }
    }

    /// True when both nodes are the same allocation.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => Arc::ptr_eq(a, b),
            (Node::List(a), Node::List(b)) => a.ptr_eq(b),
            (Node::Map(a), Node::Map(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Borrow the node at `path`, or `None` if the path leaves the tree.
    pub fn get(&self, path: &[Seg]) -> Option<&Node> {
        match path.split_first() {
            None => Some(self),
            Some((seg, rest)) => self.child(seg)?.get(rest),
        }
    }

    /// Produce a new node with `value` stored at `path`.
    ///
    /// Missing levels along the path are created: an empty list when the
    /// next segment is an index, an empty map otherwise. An index equal to a
    /// list's length appends.
    pub fn set_in(&self, path: &[Seg], value: Node) -> LinkResult<Node> {
        splice(self, path, 0, value)
    }

    fn child(&self, seg: &Seg) -> Option<&Node> {
        match (self, seg) {
            (Node::Map(map), Seg::Key(key)) => map.get(key),
            (Node::List(list), Seg::Index(index)) => list.get(*index),
            _ => None,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => a == b,
            (Node::List(a), Node::List(b)) => a == b,
            (Node::Map(a), Node::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Recursive structurally-shared write. `depth` indexes the segment being
/// applied to `current`.
fn splice(current: &Node, path: &[Seg], depth: usize, value: Node) -> LinkResult<Node> {
    let Some(seg) = path.get(depth) else {
        return Ok(if *current == value {
            current.clone()
        } else {
            value
        });
    };

    match (current, seg) {
        (Node::Map(map), Seg::Key(key)) => {
            let next = match map.get(key) {
                Some(child) => {
                    let next = splice(child, path, depth + 1, value)?;
                    if next.ptr_eq(child) {
                        return Ok(current.clone());
                    }
                    next
                }
                None => splice(&empty_for(path.get(depth + 1)), path, depth + 1, value)?,
            };
            Ok(Node::Map(map.insert(key.clone(), next)))
        }
        (Node::List(list), Seg::Index(index)) => {
            let len = list.len();
            if *index > len {
                return Err(LinkError::index_out_of_bounds(
                    Path::from(&path[..=depth]),
                    *index,
                    len,
                ));
            }
            let next = match list.get(*index) {
                Some(child) => {
                    let next = splice(child, path, depth + 1, value)?;
                    if next.ptr_eq(child) {
                        return Ok(current.clone());
                    }
                    next
                }
                None => splice(&empty_for(path.get(depth + 1)), path, depth + 1, value)?,
            };
            Ok(Node::List(list.set_or_push(*index, next)))
        }
        (node, seg) => Err(LinkError::type_mismatch(
            Path::from(&path[..=depth]),
            match seg {
                Seg::Key(_) => "map",
                Seg::Index(_) => "list",
            },
            node.kind_name(),
        )),
    }
}

/// Empty container a missing level is filled with, shaped for the segment
/// applied to it next.
fn empty_for(next: Option<&Seg>) -> Node {
    match next {
        Some(Seg::Index(_)) => Node::List(List::new()),
        _ => Node::Map(Map::new()),
    }
}

impl From<Map> for Node {
    fn from(map: Map) -> Self {
        Node::Map(map)
    }
}

impl From<List> for Node {
    fn from(list: List) -> Self {
        Node::List(list)
    }
}

/// Deep conversion, same as [`Node::from_plain`]: `Map::insert("k", json)`
/// stores a traversable tree. A raw write goes through [`Item::into_node`]
/// instead, which keeps the value as an opaque leaf.
///
/// [`Item::into_node`]: crate::Item::into_node
impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from_plain(value)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::leaf(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::leaf(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::leaf(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::leaf(n)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Node::leaf(n)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(value) => value.serialize(serializer),
            Node::List(list) => list.serialize(serializer),
            Node::Map(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from_plain)
    }
}

// ============================================================================
// Map
// ============================================================================

/// Persistent string-keyed map with ordered iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Map(Arc<OrdMap<String, Node>>);

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.0.get(key)
    }

    /// Return a new map with `key` bound to `value`. `self` is untouched.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        Map(Arc::new(self.0.update(key.into(), value.into())))
    }

    /// Return a new map without `key`, or a clone of `self` if it is absent.
    pub fn remove(&self, key: &str) -> Self {
        if self.0.contains_key(key) {
            Map(Arc::new(self.0.without(key)))
        } else {
            self.clone()
        }
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_plain(&self) -> Value {
        Node::Map(self.clone()).to_plain()
    }
}

impl PathAccess for Map {
    fn get_in(&self, path: &[Seg]) -> Option<Node> {
        match path.split_first() {
            None => Some(Node::Map(self.clone())),
            Some((Seg::Key(key), rest)) => self.get(key)?.get(rest).cloned(),
            Some((Seg::Index(_), _)) => None,
        }
    }

    fn set_in(&self, path: &[Seg], value: Node) -> LinkResult<Node> {
        splice(&Node::Map(self.clone()), path, 0, value)
    }
}

impl<K: Into<String>, N: Into<Node>> FromIterator<(K, N)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        Map(Arc::new(
            iter.into_iter()
                .map(|(k, v)| -> (String, Node) { (k.into(), v.into()) })
                .collect(),
        ))
    }
}

impl Serialize for Map {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for Map {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|(k, v)| (k, Node::from_plain(v)))
            .collect())
    }
}

// ============================================================================
// List
// ============================================================================

/// Persistent indexed list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct List(Arc<Vector<Node>>);

impl List {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.0.get(index)
    }

    /// Return a new list with `value` at `index`, or `None` if `index` is
    /// out of bounds.
    pub fn set(&self, index: usize, value: impl Into<Node>) -> Option<Self> {
        (index < self.0.len()).then(|| List(Arc::new(self.0.update(index, value.into()))))
    }

    /// Return a new list with `value` appended.
    pub fn push_back(&self, value: impl Into<Node>) -> Self {
        let mut next = (*self.0).clone();
        next.push_back(value.into());
        List(Arc::new(next))
    }

    /// Caller guarantees `index <= len`.
    fn set_or_push(&self, index: usize, value: Node) -> Self {
        if index == self.0.len() {
            self.push_back(value)
        } else {
            List(Arc::new(self.0.update(index, value)))
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.0.iter()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn to_plain(&self) -> Value {
        Node::List(self.clone()).to_plain()
    }
}

impl PathAccess for List {
    fn get_in(&self, path: &[Seg]) -> Option<Node> {
        match path.split_first() {
            None => Some(Node::List(self.clone())),
            Some((Seg::Index(index), rest)) => self.get(*index)?.get(rest).cloned(),
            Some((Seg::Key(_), _)) => None,
        }
    }

    fn set_in(&self, path: &[Seg], value: Node) -> LinkResult<Node> {
        splice(&Node::List(self.clone()), path, 0, value)
    }
}

impl<N: Into<Node>> FromIterator<N> for List {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        List(Arc::new(iter.into_iter().map(Into::<Node>::into).collect()))
    }
}

impl Serialize for List {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for List {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Value>::deserialize(deserializer)?;
        Ok(items.into_iter().map(Node::from_plain).collect())
    }
}
