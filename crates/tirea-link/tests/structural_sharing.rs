//! Structural sharing and conversion-mode laws.

use serde_json::{json, Value};
use std::sync::Arc;
use tirea_link::{path, Item, LinkError, LinkOptions, Map, Node, RootState, StateCell};

fn cell_from(doc: Value) -> Arc<StateCell> {
    let entries = doc.as_object().cloned().unwrap_or_default();
    Arc::new(StateCell::new(RootState::from_plain(entries)))
}

fn node_at(cell: &StateCell, key: &str, rest: &tirea_link::Path) -> Node {
    let root = cell.get(key).unwrap().into_node();
    root.get(rest.segments()).unwrap().clone()
}

// ============================================================================
// Sharing along the path
// ============================================================================

#[test]
fn test_deep_write_shares_siblings_at_every_level() {
    let cell = cell_from(json!({
        "a": {
            "b": {"c": "old", "c2": {"deep": 1}},
            "b2": {"untouched": [1, 2, 3]}
        },
        "z": {"other": true}
    }));
    let before_a = node_at(&cell, "a", &path!());
    let before_b = node_at(&cell, "a", &path!("b"));
    let before_b2 = node_at(&cell, "a", &path!("b2"));
    let before_c2 = node_at(&cell, "a", &path!("b", "c2"));
    let before_z = cell.get("z").unwrap();

    cell.linker()
        .bind(["a", "b", "c"])
        .unwrap()
        .request_change("x")
        .unwrap();

    assert!(!node_at(&cell, "a", &path!()).ptr_eq(&before_a));
    assert!(!node_at(&cell, "a", &path!("b")).ptr_eq(&before_b));
    assert!(node_at(&cell, "a", &path!("b2")).ptr_eq(&before_b2));
    assert!(node_at(&cell, "a", &path!("b", "c2")).ptr_eq(&before_c2));
    assert!(cell.get("z").unwrap().ptr_eq(&before_z));
}

#[test]
fn test_equal_write_is_identity_at_every_ancestor() {
    let cell = cell_from(json!({"a": {"b": {"c": [1, {"d": "same"}]}}}));
    let before_a = node_at(&cell, "a", &path!());
    let before_b = node_at(&cell, "a", &path!("b"));
    let before_c = node_at(&cell, "a", &path!("b", "c"));

    cell.linker()
        .bind(vec![
            tirea_link::Seg::key("a"),
            "b".into(),
            "c".into(),
            1usize.into(),
            "d".into(),
        ])
        .unwrap()
        .request_change("same")
        .unwrap();

    assert!(node_at(&cell, "a", &path!()).ptr_eq(&before_a));
    assert!(node_at(&cell, "a", &path!("b")).ptr_eq(&before_b));
    assert!(node_at(&cell, "a", &path!("b", "c")).ptr_eq(&before_c));
    // A commit still happened; it just carried the same container.
    assert_eq!(cell.commit_count(), 1);
}

#[test]
fn test_equal_structure_by_value_keeps_identity() {
    let cell = cell_from(json!({"a": {"b": {"list": ["x", "y"]}}}));
    let before_a = node_at(&cell, "a", &path!());

    cell.linker()
        .bind(["a", "b"])
        .unwrap()
        .request_change(json!({"list": ["x", "y"]}))
        .unwrap();

    assert!(node_at(&cell, "a", &path!()).ptr_eq(&before_a));
}

#[test]
fn test_previous_version_survives_write() {
    let cell = cell_from(json!({"a": {"b": "old"}}));
    let before = cell.snapshot();

    cell.linker()
        .bind(["a", "b"])
        .unwrap()
        .request_change("new")
        .unwrap();

    assert_eq!(before.to_plain(), json!({"a": {"b": "old"}}));
    assert_eq!(cell.snapshot().to_plain(), json!({"a": {"b": "new"}}));
}

// ============================================================================
// Read conversion
// ============================================================================

#[test]
fn test_default_read_is_plain() {
    let cell = cell_from(json!({"a": {"b": {"c": ["one", "two"]}}}));
    let link = cell.linker().bind(["a", "b", "c"]).unwrap();
    let value = link.value().unwrap();
    assert!(!value.is_persistent());
    assert_eq!(value, &json!(["one", "two"]));
}

#[test]
fn test_default_shallow_read_of_container_is_plain() {
    let cell = cell_from(json!({"a": {"b": 1}}));
    let link = cell.linker().bind("a").unwrap();
    assert_eq!(link.value().unwrap(), &json!({"b": 1}));
}

#[test]
fn test_retained_read_is_original_instance() {
    let cell = cell_from(json!({"a": {"b": {"c": ["one", "two"]}}}));
    let original = node_at(&cell, "a", &path!("b", "c"));

    let linker = cell
        .linker()
        .with_options(LinkOptions::new().retain_persistent());
    let link = linker.bind(["a", "b", "c"]).unwrap();
    let list = link.value().and_then(Item::as_list).unwrap();
    assert!(Node::List(list.clone()).ptr_eq(&original));
}

// ============================================================================
// Write conversion
// ============================================================================

#[test]
fn test_plain_write_becomes_persistent_by_default() {
    let cell = cell_from(json!({"a": {"b": null}}));
    cell.linker()
        .bind(["a", "b"])
        .unwrap()
        .request_change(json!({"c": [1, 2]}))
        .unwrap();

    let b = node_at(&cell, "a", &path!("b"));
    assert!(b.as_map().is_some());
    assert!(node_at(&cell, "a", &path!("b", "c")).as_list().is_some());

    // Deeper links work through the converted value.
    let link = cell.linker().bind(["a", "b", "c"]).unwrap();
    assert_eq!(link.value().unwrap(), &json!([1, 2]));
}

#[test]
fn test_raw_write_is_spliced_verbatim() {
    let cell = cell_from(json!({"a": {"b": null}}));
    let linker = cell
        .linker()
        .with_options(LinkOptions::new().write_as_persistent(false));
    linker
        .bind(["a", "b"])
        .unwrap()
        .request_change(json!({"c": [1, 2]}))
        .unwrap();

    let b = node_at(&cell, "a", &path!("b"));
    assert_eq!(b.as_leaf(), Some(&json!({"c": [1, 2]})));

    // The raw object is opaque to nested paths.
    let link = linker.bind(["a", "b", "c"]).unwrap();
    assert!(link.value().is_none());
    assert!(matches!(
        link.request_change(1i64),
        Err(LinkError::TypeMismatch { .. })
    ));
}

#[test]
fn test_raw_write_keeps_persistent_input() {
    let cell = cell_from(json!({"a": {}}));
    let given = Map::new().insert("k", "v");
    cell.linker()
        .bind_with(["a", "b"], LinkOptions::new().write_as_persistent(false))
        .unwrap()
        .request_change(given.clone())
        .unwrap();

    let b = node_at(&cell, "a", &path!("b"));
    assert!(b.as_map().unwrap().ptr_eq(&given));
}

// ============================================================================
// Malformed writes
// ============================================================================

#[test]
fn test_index_past_end_commits_nothing() {
    let cell = cell_from(json!({"a": {"items": ["x"]}}));
    let link = cell
        .linker()
        .bind(vec![
            tirea_link::Seg::key("a"),
            "items".into(),
            4usize.into(),
        ])
        .unwrap();

    let err = link.request_change("y").unwrap_err();
    assert!(matches!(err, LinkError::IndexOutOfBounds { index: 4, len: 1, .. }));
    assert_eq!(err.to_string(), "index 4 out of bounds (len: 1) at path a.items[4]");
    assert!(!err.is_bind_error());
    assert_eq!(cell.commit_count(), 0);
}

#[test]
fn test_append_at_list_end() {
    let cell = cell_from(json!({"a": {"items": ["x"]}}));
    cell.linker()
        .bind(vec![
            tirea_link::Seg::key("a"),
            "items".into(),
            1usize.into(),
        ])
        .unwrap()
        .request_change("y")
        .unwrap();
    assert_eq!(
        cell.get("a").unwrap().to_plain(),
        json!({"items": ["x", "y"]})
    );
}
