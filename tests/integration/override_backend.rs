//! Override backends replacing the local tree

use super::test_utils::test_store;
use conftree::ingest::IngestContext;
use conftree::{ConfigBackend, Result, StoreError, Tree, Value, ValueKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Read-only backend serving one fixed value and counting calls
struct FixedBackend {
    calls: Arc<AtomicUsize>,
}

impl FixedBackend {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl ConfigBackend for FixedBackend {
    fn parse(
        &mut self,
        _document: &roxmltree::Document<'_>,
        _context: &IngestContext<'_>,
    ) -> Result<()> {
        self.count();
        Err(StoreError::AccessDenied("fixed backend is read-only".to_string()))
    }

    fn free(&mut self, _path: Option<&str>) -> Result<()> {
        self.count();
        Ok(())
    }

    fn list_children(&self, path: Option<&str>) -> Result<Vec<String>> {
        self.count();
        match path {
            None | Some("\\") => Ok(vec!["Platform".to_string()]),
            Some(other) => Err(StoreError::NotFound(other.to_string())),
        }
    }

    fn get_value(&self, path: &str) -> Result<(ValueKind, Option<Value>)> {
        self.count();
        match path.to_ascii_lowercase().as_str() {
            "\\" => Ok((ValueKind::List, None)),
            "\\platform" => Ok((ValueKind::String, Some(Value::String("fixed".into())))),
            _ => Err(StoreError::NotFound(path.to_string())),
        }
    }

    fn set_value(&mut self, path: &str, _value: Value) -> Result<()> {
        self.count();
        Err(StoreError::AccessDenied(path.to_string()))
    }
}

#[test]
fn test_override_serves_every_operation() {
    let mut store = test_store();
    store.set_unsigned("\\Local", 1).unwrap();

    let (backend, calls) = FixedBackend::new();
    assert!(store.install_override(Box::new(backend)).is_none());

    assert_eq!(store.get_string("\\Platform").unwrap(), "fixed");
    assert!(store.get_unsigned("\\Local").unwrap_err().is_not_found());
    assert!(matches!(
        store.set_unsigned("\\Local", 2),
        Err(StoreError::AccessDenied(_))
    ));
    assert!(matches!(
        store.parse_bytes(b"<configuration><A>1</A></configuration>"),
        Err(StoreError::AccessDenied(_))
    ));
    assert_eq!(store.list_children(None).unwrap(), vec!["Platform"]);
    store.free_all().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 6);

    // The local tree was never touched
    assert_eq!(store.local_tree().get_value(Some("\\Local")).unwrap().1, Some(Value::Unsigned(1)));
}

#[test]
fn test_override_results_have_no_fallback() {
    let mut store = test_store();
    store.set_string("\\Platform", "local").unwrap();
    store.set_unsigned("\\OnlyLocal", 5).unwrap();

    let (backend, _) = FixedBackend::new();
    store.install_override(Box::new(backend));
    assert_eq!(store.get_unsigned_with_default("\\OnlyLocal", 9), 9);
    assert_eq!(store.get_string("\\Platform").unwrap(), "fixed");
}

#[test]
fn test_invalid_assignment_never_reaches_override() {
    let mut store = test_store();
    let (backend, calls) = FixedBackend::new();
    store.install_override(Box::new(backend));

    assert!(matches!(
        store.set_data("\\Blob", Vec::new()),
        Err(StoreError::InvalidArgument(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_last_install_wins_and_removal_restores_local() {
    let mut store = test_store();
    store.set_string("\\Owner", "local").unwrap();

    let mut first = Tree::new();
    first.set_value("\\Owner", Value::String("first".into())).unwrap();
    let mut second = Tree::new();
    second.set_value("\\Owner", Value::String("second".into())).unwrap();

    store.install_override(Box::new(first));
    let replaced = store.install_override(Box::new(second));
    assert!(replaced.is_some());
    assert_eq!(store.get_string("\\Owner").unwrap(), "second");

    // Parsing populates the override tree
    store
        .parse_bytes(b"<configuration><Parsed><true/></Parsed></configuration>")
        .unwrap();
    assert!(store.get_boolean("\\Parsed").unwrap());

    let removed = store.remove_override().unwrap();
    assert!(removed.get_value("\\Parsed").is_ok());
    assert_eq!(store.get_string("\\Owner").unwrap(), "local");
    assert!(store.get_boolean("\\Parsed").is_err());
    assert!(store.remove_override().is_none());
}

#[test]
fn test_diagnostics_through_override() {
    let mut store = test_store();
    let (backend, _) = FixedBackend::new();
    store.install_override(Box::new(backend));

    let entries = store.entries(None).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].path, "\\Platform");
    assert_eq!(entries[1].kind, ValueKind::String);

    let json = store.snapshot_json(None).unwrap();
    assert_eq!(json["Platform"], "fixed");
}

#[test]
fn test_finish_unregisters_override() {
    let mut store = test_store();
    let (backend, _) = FixedBackend::new();
    store.install_override(Box::new(backend));
    store.finish();
    assert!(!store.has_override());
    store.set_unsigned("\\After", 1).unwrap();
    assert_eq!(store.get_unsigned("\\After").unwrap(), 1);
}
