//! Configuration Store
//!
//! The public face of the configuration tree: loading documents, typed reads
//! and writes, and the override seam. Every operation goes through
//! [`Store::backend`], which picks the installed override or the local tree
//! once per call.

use crate::backend::{self, ConfigBackend};
use crate::error::{Result, StoreError};
use crate::ingest::document;
use crate::ingest::filter::PlatformIdentity;
use crate::ingest::IngestContext;
use crate::loader::{self, DirVolume, FileVolume, NoVolume};
use crate::settings::StoreSettings;
use crate::tree::path::{self, PathArg};
use crate::tree::walker::{self, Entry};
use crate::tree::Tree;
use crate::value::{ScalarValue, Value, ValueKind};
use std::path::Path;
use tracing::{debug, info, instrument, trace, warn};

/// Hierarchical configuration store
pub struct Store {
    local: Tree,
    override_backend: Option<Box<dyn ConfigBackend>>,
    volume: Box<dyn FileVolume>,
    settings: StoreSettings,
    auto_groups: Vec<String>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("local", &self.local)
            .field("has_override", &self.override_backend.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Store {
    /// Empty store with default settings and no volume
    pub fn new() -> Self {
        Self::with_parts(StoreSettings::default(), Box::new(NoVolume))
    }

    /// Empty store reading documents from `volume`
    pub fn with_volume(volume: impl FileVolume + 'static) -> Self {
        Self::with_parts(StoreSettings::default(), Box::new(volume))
    }

    /// Store configured from settings. A `loader.root` opens a directory
    /// volume there.
    pub fn from_settings(settings: StoreSettings) -> Result<Self> {
        let volume: Box<dyn FileVolume> = match &settings.loader.root {
            Some(root) => Box::new(DirVolume::new(root)?),
            None => Box::new(NoVolume),
        };
        Ok(Self::with_parts(settings, volume))
    }

    fn with_parts(settings: StoreSettings, volume: Box<dyn FileVolume>) -> Self {
        let auto_groups = settings.auto_groups();
        Self {
            local: Tree::new(),
            override_backend: None,
            volume,
            settings,
            auto_groups,
        }
    }

    /// Replace the platform identity used to filter elements
    pub fn with_identity(mut self, identity: PlatformIdentity) -> Self {
        self.settings.platform = identity;
        self
    }

    /// Replace the file volume used by `load`, `initialize` and includes
    pub fn set_volume(&mut self, volume: impl FileVolume + 'static) {
        self.volume = Box::new(volume);
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn identity(&self) -> &PlatformIdentity {
        &self.settings.platform
    }

    /// The local tree, regardless of any installed override
    pub fn local_tree(&self) -> &Tree {
        &self.local
    }

    pub fn has_override(&self) -> bool {
        self.override_backend.is_some()
    }

    /// The backend serving every operation: the override when installed,
    /// otherwise the local tree
    pub fn backend(&self) -> &dyn ConfigBackend {
        match &self.override_backend {
            Some(backend) => &**backend,
            None => &self.local,
        }
    }

    fn backend_mut(&mut self) -> &mut dyn ConfigBackend {
        match &mut self.override_backend {
            Some(backend) => &mut **backend,
            None => &mut self.local,
        }
    }

    // ---- override seam ----

    /// Install an override backend. The last installed one wins; the one it
    /// replaces is handed back.
    pub fn install_override(
        &mut self,
        backend: Box<dyn ConfigBackend>,
    ) -> Option<Box<dyn ConfigBackend>> {
        let previous = self.override_backend.replace(backend);
        info!(replaced = previous.is_some(), "Installed configuration override");
        previous
    }

    /// Unregister the override, returning it; later calls reach the local tree
    pub fn remove_override(&mut self) -> Option<Box<dyn ConfigBackend>> {
        let previous = self.override_backend.take();
        if previous.is_some() {
            info!("Removed configuration override");
        }
        previous
    }

    // ---- loading ----

    /// Ingest an already parsed document
    pub fn parse_document(&mut self, document: &roxmltree::Document<'_>) -> Result<()> {
        let Store {
            local,
            override_backend,
            volume,
            settings,
            auto_groups,
        } = self;

        let context = IngestContext {
            identity: &settings.platform,
            auto_groups: auto_groups.as_slice(),
            max_depth: settings.ingest.max_depth,
            volume: &**volume,
            max_include_depth: settings.loader.max_include_depth,
            include_depth: 0,
        };
        let backend: &mut dyn ConfigBackend = match override_backend {
            Some(backend) => &mut **backend,
            None => local,
        };
        backend.parse(document, &context)
    }

    /// Decode and parse raw document bytes (UTF-8 or UTF-16), then ingest them
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn parse_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let text = document::decode_text(bytes)?;
        let document = document::parse_xml(&text)?;
        self.parse_document(&document)
    }

    /// Load a volume-relative document
    #[instrument(skip(self))]
    pub fn load(&mut self, path: &str) -> Result<()> {
        let bytes = loader::read_config(&*self.volume, path)?;
        let status = self.parse_bytes(&bytes);
        info!(file = %path, ok = status.is_ok(), "Configuration load finished");
        status
    }

    /// Load a document straight from a host path
    #[instrument(skip(self, host_path), fields(file = %host_path.as_ref().display()))]
    pub fn load_file(&mut self, host_path: impl AsRef<Path>) -> Result<()> {
        let bytes = loader::read_host_file(host_path.as_ref())?;
        let status = self.parse_bytes(&bytes);
        info!(ok = status.is_ok(), "Configuration load finished");
        status
    }

    /// Load the main document; if that fails, the architecture-specific one
    pub fn initialize(&mut self) -> Result<()> {
        let main = self.settings.loader.config_file.clone();
        let status = match self.load(&main) {
            Ok(()) => Ok(()),
            Err(e) => {
                let fallback = self
                    .settings
                    .loader
                    .arch_config_path(&self.settings.platform.arch)?;
                warn!(file = %main, error = %e, fallback = %fallback, "Main configuration failed");
                self.load(&fallback)
            }
        };
        info!(ok = status.is_ok(), "Configuration initialized");
        status
    }

    /// Unregister any override and free the whole local tree
    pub fn finish(&mut self) {
        self.remove_override();
        self.local = Tree::new();
        info!("Configuration store finished");
    }

    // ---- structure ----

    /// Remove a subtree; `None`, empty, or `\` frees everything
    pub fn free(&mut self, path: Option<&str>) -> Result<()> {
        self.backend_mut().free(path)
    }

    pub fn free_all(&mut self) -> Result<()> {
        self.free(None)
    }

    pub fn list_children(&self, path: Option<&str>) -> Result<Vec<String>> {
        self.backend().list_children(path)
    }

    pub fn get_type(&self, path: &str) -> Result<ValueKind> {
        Ok(self.backend().get_value(path)?.0)
    }

    // ---- values ----

    /// Kind and owned copy of the value at `path`
    pub fn get_value(&self, path: &str) -> Result<(ValueKind, Option<Value>)> {
        self.backend().get_value(path)
    }

    /// Store a tagged value; the tag must agree with the value
    pub fn set_value(&mut self, path: &str, kind: ValueKind, value: Value) -> Result<()> {
        backend::validate_assignment(path, kind, &value)?;
        debug!("{}={}", path::normalize_path_string(path), value);
        self.backend_mut().set_value(path, value)
    }

    /// Typed read; a value of another kind is a [`StoreError::TypeMismatch`]
    pub fn get<T: ScalarValue>(&self, path: &str) -> Result<T> {
        let (kind, value) = self.get_value(path)?;
        if kind != T::KIND {
            return Err(StoreError::TypeMismatch {
                path: path::normalize_path_string(path),
                expected: T::KIND,
                found: kind,
            });
        }
        value
            .and_then(T::from_value)
            .ok_or_else(|| StoreError::NotFound(path::normalize_path_string(path)))
    }

    /// Typed write
    pub fn set<T: ScalarValue>(&mut self, path: &str, value: T) -> Result<()> {
        self.set_value(path, T::KIND, value.into_value())
    }

    /// Typed read that falls back to `default` on any failure
    pub fn get_or<T: ScalarValue>(&self, path: &str, default: T) -> T {
        match self.get(path) {
            Ok(value) => value,
            Err(e) => {
                trace!(path = %path, error = %e, "Using default value");
                default
            }
        }
    }

    /// Tagged read that falls back to `default` when the path is missing or
    /// holds no scalar value
    pub fn get_value_with_default(&self, path: &str, default: Value) -> Value {
        match self.get_value(path) {
            Ok((_, Some(value))) => value,
            _ => default,
        }
    }

    pub fn get_boolean(&self, path: &str) -> Result<bool> {
        self.get(path)
    }

    pub fn get_integer(&self, path: &str) -> Result<i64> {
        self.get(path)
    }

    pub fn get_unsigned(&self, path: &str) -> Result<u64> {
        self.get(path)
    }

    pub fn get_string(&self, path: &str) -> Result<String> {
        self.get(path)
    }

    pub fn get_data(&self, path: &str) -> Result<Vec<u8>> {
        self.get(path)
    }

    pub fn set_boolean(&mut self, path: &str, value: bool) -> Result<()> {
        self.set(path, value)
    }

    pub fn set_integer(&mut self, path: &str, value: i64) -> Result<()> {
        self.set(path, value)
    }

    pub fn set_unsigned(&mut self, path: &str, value: u64) -> Result<()> {
        self.set(path, value)
    }

    pub fn set_string(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        self.set(path, value.into())
    }

    pub fn set_data(&mut self, path: &str, value: impl Into<Vec<u8>>) -> Result<()> {
        self.set(path, value.into())
    }

    pub fn get_boolean_with_default(&self, path: &str, default: bool) -> bool {
        self.get_or(path, default)
    }

    pub fn get_integer_with_default(&self, path: &str, default: i64) -> i64 {
        self.get_or(path, default)
    }

    pub fn get_unsigned_with_default(&self, path: &str, default: u64) -> u64 {
        self.get_or(path, default)
    }

    pub fn get_string_with_default(&self, path: &str, default: impl Into<String>) -> String {
        self.get_or(path, default.into())
    }

    pub fn get_data_with_default(&self, path: &str, default: impl Into<Vec<u8>>) -> Vec<u8> {
        self.get_or(path, default.into())
    }

    /// Render a path template, then run `op` with the rendered path.
    ///
    /// ```
    /// use conftree::{PathArg, Store};
    ///
    /// let mut store = Store::new();
    /// store
    ///     .with_path("\\Memory\\Slot\\%u\\Size", &[PathArg::from(2u32)], |s, p| {
    ///         s.set_unsigned(p, 16)
    ///     })
    ///     .unwrap();
    /// assert_eq!(store.get_unsigned("\\Memory\\Slot\\2\\Size").unwrap(), 16);
    /// ```
    pub fn with_path<R>(
        &mut self,
        template: &str,
        args: &[PathArg],
        op: impl FnOnce(&mut Self, &str) -> Result<R>,
    ) -> Result<R> {
        let rendered = path::render(template, args)?;
        op(self, &rendered)
    }

    // ---- diagnostics ----

    /// Depth-first listing of a subtree
    pub fn entries(&self, path: Option<&str>) -> Result<Vec<Entry>> {
        let base = path::normalize_path_string(path.unwrap_or(""));
        match &self.override_backend {
            Some(backend) => walker::walk_backend(&**backend, &base),
            None => Ok(walker::walk(self.local.find(path)?, &base)),
        }
    }

    /// A subtree as JSON. Subtrees nested deeper than
    /// [`walker::SNAPSHOT_DEPTH_LIMIT`] fail with `DepthExceeded`.
    pub fn snapshot_json(&self, path: Option<&str>) -> Result<serde_json::Value> {
        let base = path::normalize_path_string(path.unwrap_or(""));
        match &self.override_backend {
            Some(backend) => walker::snapshot_backend(&**backend, &base),
            None => walker::snapshot(self.local.find(path)?, &base),
        }
    }
}
