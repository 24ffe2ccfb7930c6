//! Depth-first traversal of a configuration subtree for diagnostics

use crate::backend::ConfigBackend;
use crate::error::{Result, StoreError};
use crate::tree::node::Node;
use crate::tree::path;
use crate::value::{Value, ValueKind};
use serde::Serialize;

/// Deepest level a JSON snapshot renders; the nested value is built and
/// dropped recursively.
pub const SNAPSHOT_DEPTH_LIMIT: usize = 256;

/// One node visited by [`walk`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub path: String,
    pub kind: ValueKind,
    pub value: Option<Value>,
}

/// Visit `start` and its descendants depth-first in insertion order.
///
/// `base` is the path of `start`; descendant paths are built beneath it.
pub fn walk(start: &Node, base: &str) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut pending = vec![(start, path::normalize_path_string(base))];

    while let Some((node, node_path)) = pending.pop() {
        for child in node.children().iter().rev() {
            if let Some(name) = child.name() {
                pending.push((child, path::join(&node_path, name)));
            }
        }
        entries.push(Entry {
            path: node_path,
            kind: node.kind(),
            value: node.value().cloned(),
        });
    }

    entries
}

/// Same traversal through the backend interface, for backends that do not
/// expose their nodes. Children come in the backend's listing order.
pub fn walk_backend(backend: &dyn ConfigBackend, base: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut pending = vec![path::normalize_path_string(base)];

    while let Some(node_path) = pending.pop() {
        let (kind, value) = backend.get_value(&node_path)?;
        if kind == ValueKind::List {
            for name in child_names(backend, &node_path)?.iter().rev() {
                pending.push(path::join(&node_path, name));
            }
        }
        entries.push(Entry {
            path: node_path,
            kind,
            value,
        });
    }

    Ok(entries)
}

/// [`snapshot`] through the backend interface
pub fn snapshot_backend(backend: &dyn ConfigBackend, base: &str) -> Result<serde_json::Value> {
    snapshot_backend_at(backend, &path::normalize_path_string(base), 0)
}

fn snapshot_backend_at(
    backend: &dyn ConfigBackend,
    node_path: &str,
    depth: usize,
) -> Result<serde_json::Value> {
    check_depth(node_path, depth)?;
    let (kind, value) = backend.get_value(node_path)?;
    if let Some(value) = value {
        return Ok(scalar_json(&value));
    }
    if kind != ValueKind::List {
        return Ok(serde_json::Value::Null);
    }

    let mut object = serde_json::Map::new();
    for name in child_names(backend, node_path)? {
        let child = snapshot_backend_at(backend, &path::join(node_path, &name), depth + 1)?;
        object.insert(name, child);
    }
    Ok(serde_json::Value::Object(object))
}

/// Children of a `List` node; a childless list has none rather than failing
fn child_names(backend: &dyn ConfigBackend, node_path: &str) -> Result<Vec<String>> {
    match backend.list_children(Some(node_path)) {
        Ok(names) => Ok(names),
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Render a subtree as JSON: `List` nodes become objects keyed by child name,
/// data payloads become hex strings.
///
/// Fails with [`StoreError::DepthExceeded`] when the subtree nests deeper
/// than [`SNAPSHOT_DEPTH_LIMIT`] levels below `start`.
pub fn snapshot(start: &Node, base: &str) -> Result<serde_json::Value> {
    snapshot_at(start, &path::normalize_path_string(base), 0)
}

fn snapshot_at(node: &Node, node_path: &str, depth: usize) -> Result<serde_json::Value> {
    check_depth(node_path, depth)?;
    if let Some(value) = node.value() {
        return Ok(scalar_json(value));
    }

    let mut object = serde_json::Map::new();
    for child in node.children() {
        if let Some(name) = child.name() {
            let rendered = snapshot_at(child, &path::join(node_path, name), depth + 1)?;
            object.insert(name.to_string(), rendered);
        }
    }
    Ok(serde_json::Value::Object(object))
}

fn check_depth(node_path: &str, depth: usize) -> Result<()> {
    if depth > SNAPSHOT_DEPTH_LIMIT {
        return Err(StoreError::DepthExceeded {
            path: node_path.to_string(),
            limit: SNAPSHOT_DEPTH_LIMIT,
        });
    }
    Ok(())
}

fn scalar_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Boolean(b) => serde_json::Value::from(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Unsigned(u) => serde_json::Value::from(*u),
        Value::String(s) => serde_json::Value::from(s.as_str()),
        Value::Data(d) => serde_json::Value::from(hex::encode(d)),
    }
}
