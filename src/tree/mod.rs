//! Configuration Tree
//!
//! The in-memory tree store and its path resolver. Paths are sequences of
//! case-insensitive segment names separated by `\`; resolution either finds an
//! existing node or materializes the missing segments as empty `List` nodes.

pub mod node;
pub mod path;
pub mod walker;

use crate::error::{Result, StoreError};
use crate::value::{Value, ValueKind};
use node::Node;
use path::DELIMITER;
use tracing::trace;

/// Child indices leading from the root to a node; empty for the root itself
type Location = Vec<usize>;

/// The local configuration tree
#[derive(Debug, Default)]
pub struct Tree {
    root: Option<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Whether the root has not been created yet (or was freed)
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Resolve a path to a node, creating missing segments when `create` is set
    pub fn resolve(&mut self, path: Option<&str>, create: bool) -> Result<&mut Node> {
        if create {
            self.find_or_create(path)
        } else {
            self.find_mut(path)
        }
    }

    /// Find an existing node
    pub fn find(&self, path: Option<&str>) -> Result<&Node> {
        let location = self.locate(path)?;
        self.node_at(&location)
            .ok_or_else(|| not_found(path))
    }

    /// Find an existing node for in-place mutation
    pub fn find_mut(&mut self, path: Option<&str>) -> Result<&mut Node> {
        let location = self.locate(path)?;
        self.node_at_mut(&location)
            .ok_or_else(|| not_found(path))
    }

    /// Find a node, creating the root and any missing segments on the way.
    ///
    /// New segments are appended after existing siblings. Descending beneath a
    /// node that holds a scalar value is a structural conflict.
    pub fn find_or_create(&mut self, path: Option<&str>) -> Result<&mut Node> {
        let mut node = self.root.get_or_insert_with(|| {
            trace!("Created configuration root");
            Node::root()
        });

        let mut walked = String::new();
        for segment in path::segments(path.unwrap_or("")) {
            if node.kind().is_scalar() {
                return Err(StoreError::StructuralConflict(path::normalize_path_string(
                    &walked,
                )));
            }
            walked.push(DELIMITER);
            walked.push_str(segment);

            let index = match node.child_index(segment) {
                Some(index) => index,
                None => {
                    trace!(path = %walked, "Created configuration node");
                    node.push_child(segment)
                }
            };
            node = node.child_at_mut(index);
        }

        Ok(node)
    }

    /// Walk an existing path and return the child indices leading to it.
    ///
    /// When the walk reaches a node without children while path text remains,
    /// the remaining text (delimiters included) is compared against that node's
    /// own name; a match resolves to that node. Lookups such as `\Flag\Flag`
    /// on a leaf named `Flag` therefore succeed.
    fn locate(&self, path: Option<&str>) -> Result<Location> {
        let mut node = self.root.as_ref().ok_or_else(|| not_found(path))?;
        let mut location = Location::new();

        let raw = path.unwrap_or("");
        let mut rest = raw.trim_start_matches(DELIMITER);

        while !rest.is_empty() {
            if !node.has_children() {
                if node.is_named(rest) {
                    break;
                }
                return Err(not_found(path));
            }

            let name = match rest.find(DELIMITER) {
                None => std::mem::take(&mut rest),
                Some(0) => {
                    rest = &rest[1..];
                    continue;
                }
                Some(at) => {
                    let name = &rest[..at];
                    rest = &rest[at + 1..];
                    name
                }
            };

            let index = node.child_index(name).ok_or_else(|| not_found(path))?;
            location.push(index);
            node = node.child(index).ok_or_else(|| not_found(path))?;
        }

        Ok(location)
    }

    fn node_at(&self, location: &[usize]) -> Option<&Node> {
        let mut node = self.root.as_ref()?;
        for &index in location {
            node = node.child(index)?;
        }
        Some(node)
    }

    fn node_at_mut(&mut self, location: &[usize]) -> Option<&mut Node> {
        let mut node = self.root.as_mut()?;
        for &index in location {
            if index >= node.children().len() {
                return None;
            }
            node = node.child_at_mut(index);
        }
        Some(node)
    }

    /// Remove the node at `path` and everything beneath it.
    ///
    /// Freeing a missing path succeeds. Freeing the root empties the tree.
    pub fn free(&mut self, path: Option<&str>) -> Result<()> {
        let location = match self.locate(path) {
            Ok(location) => location,
            Err(StoreError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };

        let Some((&last, parent_location)) = location.split_last() else {
            trace!("Freed configuration root");
            self.root = None;
            return Ok(());
        };

        let parent = self
            .node_at_mut(parent_location)
            .ok_or_else(|| not_found(path))?;
        if let Some(removed) = parent.remove_child(last) {
            trace!(path = ?path, name = ?removed.name(), "Freed configuration node");
        }
        Ok(())
    }

    /// Names of the children of a `List` node, de-duplicated and sorted
    /// without regard to case
    pub fn list_children(&self, path: Option<&str>) -> Result<Vec<String>> {
        let node = self.find(path)?;
        if node.kind() != ValueKind::List {
            return Err(not_found(path));
        }

        let mut names: Vec<String> = node
            .children()
            .iter()
            .filter_map(Node::name)
            .map(str::to_string)
            .collect();
        names.sort_by(|a, b| path::compare_names(a, b));
        names.dedup_by(|a, b| path::names_match(a, b));

        if names.is_empty() {
            return Err(not_found(path));
        }
        Ok(names)
    }

    pub fn get_type(&self, path: Option<&str>) -> Result<ValueKind> {
        Ok(self.find(path)?.kind())
    }

    /// Kind and owned copy of the value stored at `path`
    pub fn get_value(&self, path: Option<&str>) -> Result<(ValueKind, Option<Value>)> {
        let node = self.find(path)?;
        Ok((node.kind(), node.value().cloned()))
    }

    /// Store a scalar value, creating the node and its ancestors as needed
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        crate::backend::validate_assignment(path, value.kind(), &value)?;

        let node = self.find_or_create(Some(path))?;
        if node.has_children() {
            return Err(StoreError::StructuralConflict(
                path::normalize_path_string(path),
            ));
        }
        node.replace_value(value);
        Ok(())
    }
}

fn not_found(path: Option<&str>) -> StoreError {
    StoreError::NotFound(path::normalize_path_string(path.unwrap_or("")))
}
