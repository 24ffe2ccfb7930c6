//! Conftree: Hierarchical Firmware Configuration Store
//!
//! A path-addressed tree of typed configuration values, populated from XML
//! documents and read through a small typed API. Paths look like
//! `\Memory\Slot\0\Size` and match segment names without regard to case. An
//! external backend can be installed to serve every operation in place of the
//! local tree.

pub mod backend;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod logging;
pub mod settings;
pub mod shared;
pub mod store;
pub mod tree;
pub mod value;

pub use backend::ConfigBackend;
pub use error::{Result, StoreError};
pub use ingest::filter::PlatformIdentity;
pub use loader::{DirVolume, FileVolume, MemoryVolume, NoVolume};
pub use settings::{SettingsLoader, StoreSettings};
pub use shared::SharedStore;
pub use store::Store;
pub use tree::path::PathArg;
pub use tree::walker::Entry;
pub use tree::Tree;
pub use value::{ScalarValue, Value, ValueKind};
