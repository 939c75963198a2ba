//! Pure operations on a JSON tree with Realtime-Database node semantics.
//!
//! `null` and objects without children are both "absent". Every mutation
//! leaves the tree normalized: no `null` children and no empty objects.

use serde_json::{Map, Value};

use super::TreePath;

pub type TreeValue = Value;

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Drop `null` children and empty objects, collapsing an empty result to `null`.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let pruned: Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, normalize(child)))
                .filter(|(_, child)| !child.is_null())
                .collect();
            if pruned.is_empty() {
                Value::Null
            } else {
                Value::Object(pruned)
            }
        }
        other => other,
    }
}

/// Borrow the node at `path`, `None` when it is absent.
pub fn value_at<'a>(tree: &'a Value, path: &TreePath) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if is_absent(node) {
        None
    } else {
        Some(node)
    }
}

/// Replace the node at `path` wholesale. Writing `null` deletes the node and
/// prunes ancestors left without children.
pub fn set_at(tree: &mut Value, path: &TreePath, value: Value) {
    set_in(tree, path.segments(), normalize(value));
}

fn set_in(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }

    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        set_in(child, rest, value);
        if is_absent(child) {
            map.remove(head);
        }
    }

    if is_absent(node) {
        *node = Value::Null;
    }
}

/// Patch semantics: each child of `children` replaces the corresponding child
/// below `path`; siblings not named are kept.
pub fn merge_at(tree: &mut Value, path: &TreePath, children: Map<String, Value>) {
    for (key, child) in children {
        set_at(tree, &path.child(key), child);
    }
}
