//! Thread-shareable store handle

use crate::store::Store;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// A [`Store`] behind one lock, for hosts that touch configuration from
/// several threads. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.inner.write()
    }

    /// Run `f` with shared access
    pub fn with_read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access
    pub fn with_write<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<Store> for SharedStore {
    fn from(store: Store) -> Self {
        Self::new(store)
    }
}
