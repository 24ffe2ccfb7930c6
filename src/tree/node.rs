//! Configuration tree node

use crate::tree::path;
use crate::value::{Value, ValueKind};

/// One path segment of the configuration tree.
///
/// A node either holds children (kind `List`, no value) or a single scalar
/// value. The node owns its payload and its children outright.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Option<String>,
    value: Option<Value>,
    children: Vec<Node>,
}

impl Node {
    /// Create the unnamed root node
    pub fn root() -> Self {
        Self {
            name: None,
            value: None,
            children: Vec::new(),
        }
    }

    /// Create an empty `List` node with the given segment name
    pub fn list(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ValueKind {
        self.value.as_ref().map_or(ValueKind::List, Value::kind)
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether this node's own name equals `name`, ignoring case.
    /// The unnamed root never matches.
    pub fn is_named(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .map_or(false, |own| path::names_match(own, name))
    }

    /// Index of the child whose name matches `name`, ignoring case
    pub fn child_index(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|child| child.is_named(name))
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    pub(crate) fn child_at_mut(&mut self, index: usize) -> &mut Node {
        &mut self.children[index]
    }

    /// Append a new empty `List` child and return its index
    pub(crate) fn push_child(&mut self, name: &str) -> usize {
        self.children.push(Node::list(name));
        self.children.len() - 1
    }

    /// Detach a child, preserving the order of its remaining siblings
    pub(crate) fn remove_child(&mut self, index: usize) -> Option<Node> {
        (index < self.children.len()).then(|| self.children.remove(index))
    }

    /// Replace the scalar payload. The previous payload is dropped first.
    /// Callers must ensure the node has no children.
    pub(crate) fn replace_value(&mut self, value: Value) {
        self.value = Some(value);
    }
}

impl Drop for Node {
    // Release descendants with an explicit stack so deep trees cannot
    // overflow the call stack during teardown.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
