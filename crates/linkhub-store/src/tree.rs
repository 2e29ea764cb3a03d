//! Path operations over a JSON document tree.
//!
//! The tree follows realtime-database semantics: `null` and empty objects
//! are indistinguishable from absence and are pruned after every write.

use serde_json::{Map, Value};

use linkhub_types::{DocPath, Patch};

/// Borrow the value at `path`.
pub fn get<'a>(root: &'a Value, path: &DocPath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if is_empty(node) {
        None
    } else {
        Some(node)
    }
}

/// Set `path` to `value`, creating intermediate objects. Any non-object
/// value in the way is replaced.
pub fn set(root: &mut Value, path: &DocPath, value: Value) {
    let mut node = root;
    for segment in path.segments() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Some(map) = node.as_object_mut() else {
            return;
        };
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    *node = value;
}

/// Remove the subtree at `path`. Removing the root clears the tree.
pub fn remove(root: &mut Value, path: &DocPath) {
    let Some(parent) = path.parent() else {
        *root = Value::Object(Map::new());
        return;
    };
    let Some(key) = path.last() else {
        return;
    };
    let mut node = root;
    for segment in parent.segments() {
        match node.as_object_mut().and_then(|m| m.get_mut(segment)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(map) = node.as_object_mut() {
        map.remove(key);
    }
}

/// Apply every entry of `patch` relative to `base`. Callers must have
/// validated the patch first.
pub fn apply(root: &mut Value, base: &DocPath, patch: Patch) {
    for (path, value) in patch {
        let target = base.join(&path);
        match value {
            Some(value) => set(root, &target, value),
            None => remove(root, &target),
        }
    }
    prune(root);
    if root.is_null() {
        *root = Value::Object(Map::new());
    }
}

/// Recursively drop `null` values and empty objects.
pub fn prune(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                prune(child);
            }
            map.retain(|_, child| !is_empty(child));
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                prune(item);
            }
        }
        _ => {}
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
