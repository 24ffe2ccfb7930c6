//! Backend Seam
//!
//! The five operations every configuration backend provides. The local
//! [`Tree`] is one implementation; an external backend installed on the
//! [`Store`](crate::store::Store) replaces it for every caller.

use crate::error::{Result, StoreError};
use crate::ingest::{self, IngestContext};
use crate::tree::{path, Tree};
use crate::value::{Value, ValueKind};

/// Configuration backend interface
pub trait ConfigBackend: Send + Sync {
    /// Populate the backend from a parsed configuration document
    fn parse(&mut self, document: &roxmltree::Document<'_>, context: &IngestContext<'_>)
        -> Result<()>;

    /// Remove the subtree at `path` (`None` for everything). Missing paths succeed.
    fn free(&mut self, path: Option<&str>) -> Result<()>;

    /// Sorted, case-insensitively unique child names of a `List` node
    fn list_children(&self, path: Option<&str>) -> Result<Vec<String>>;

    /// Kind and owned copy of the value at `path`
    fn get_value(&self, path: &str) -> Result<(ValueKind, Option<Value>)>;

    /// Store a scalar value at `path`
    fn set_value(&mut self, path: &str, value: Value) -> Result<()>;
}

impl ConfigBackend for Tree {
    fn parse(
        &mut self,
        document: &roxmltree::Document<'_>,
        context: &IngestContext<'_>,
    ) -> Result<()> {
        ingest::ingest_document(self, document, context)
    }

    fn free(&mut self, path: Option<&str>) -> Result<()> {
        Tree::free(self, path)
    }

    fn list_children(&self, path: Option<&str>) -> Result<Vec<String>> {
        Tree::list_children(self, path)
    }

    fn get_value(&self, path: &str) -> Result<(ValueKind, Option<Value>)> {
        Tree::get_value(self, Some(path))
    }

    fn set_value(&mut self, path: &str, value: Value) -> Result<()> {
        Tree::set_value(self, path, value)
    }
}

/// Check a tagged assignment before it reaches any backend.
///
/// Rejects a `List` kind tag, a tag that disagrees with the value, an empty
/// data payload, and the root path (the root always holds children).
pub fn validate_assignment(target: &str, kind: ValueKind, value: &Value) -> Result<()> {
    if !kind.is_scalar() {
        return Err(StoreError::InvalidArgument(format!(
            "Cannot assign kind {} to {}",
            kind, target
        )));
    }
    if kind != value.kind() {
        return Err(StoreError::InvalidArgument(format!(
            "Kind tag {} does not match {} value for {}",
            kind,
            value.kind(),
            target
        )));
    }
    if let Value::Data(data) = value {
        if data.is_empty() {
            return Err(StoreError::InvalidArgument(format!(
                "Data value for {} is empty",
                target
            )));
        }
    }
    if path::is_root(Some(target)) {
        return Err(StoreError::InvalidArgument(
            "Cannot assign a value to the configuration root".to_string(),
        ));
    }
    Ok(())
}
