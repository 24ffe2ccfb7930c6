//! Configuration file access
//!
//! Configuration documents and their includes are addressed by
//! volume-relative paths written with `\` (firmware style) or `/`. A
//! [`FileVolume`] turns such a path into the file's bytes.

use crate::error::{Result, StoreError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Read-only file access for configuration documents
pub trait FileVolume: Send + Sync {
    /// Whole contents of the file at a volume-relative path
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Read a configuration file; a zero-length file counts as missing
pub fn read_config(volume: &dyn FileVolume, path: &str) -> Result<Vec<u8>> {
    info!(file = %path, "Loading configuration");
    let bytes = volume.read(path)?;
    if bytes.is_empty() {
        return Err(StoreError::NotFound(format!(
            "Configuration file {} is empty",
            path
        )));
    }
    debug!(file = %path, size = bytes.len(), "Read configuration file");
    Ok(bytes)
}

/// Read a host file directly, outside any volume
pub fn read_host_file(path: &Path) -> Result<Vec<u8>> {
    info!(file = %path.display(), "Loading configuration");
    let bytes = std::fs::read(path).map_err(|e| io_error(e, &path.display().to_string()))?;
    if bytes.is_empty() {
        return Err(StoreError::NotFound(format!(
            "Configuration file {} is empty",
            path.display()
        )));
    }
    Ok(bytes)
}

/// Volume rooted at a host directory
#[derive(Debug, Clone)]
pub struct DirVolume {
    root: PathBuf,
}

impl DirVolume {
    /// Open a volume at `root`, which must be an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = dunce::canonicalize(root.as_ref())
            .map_err(|e| io_error(e, &root.as_ref().display().to_string()))?;
        if !root.is_dir() {
            return Err(StoreError::InvalidArgument(format!(
                "Volume root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path for a volume-relative path. Parent references are refused
    /// so reads stay beneath the root.
    pub fn host_path(&self, path: &str) -> Result<PathBuf> {
        let mut host = self.root.clone();
        for part in path.split(['\\', '/']).filter(|part| !part.is_empty()) {
            match Path::new(part).components().next() {
                Some(Component::Normal(_)) => host.push(part),
                Some(Component::CurDir) => {}
                _ => {
                    return Err(StoreError::AccessDenied(format!(
                        "Path {} leaves the volume",
                        path
                    )))
                }
            }
        }
        Ok(host)
    }
}

impl FileVolume for DirVolume {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.host_path(path)?;
        std::fs::read(&host).map_err(|e| io_error(e, path))
    }
}

/// In-memory volume keyed by case-insensitive path
#[derive(Debug, Default)]
pub struct MemoryVolume {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryVolume {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(volume_key(path), contents.into());
    }

    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.write().remove(&volume_key(path))
    }
}

impl FileVolume for MemoryVolume {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .read()
            .get(&volume_key(path))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("File {} not found", path)))
    }
}

/// Volume with no files, for stores populated only from memory
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVolume;

impl FileVolume for NoVolume {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        Err(StoreError::NotFound(format!(
            "No volume configured to read {}",
            path
        )))
    }
}

fn volume_key(path: &str) -> String {
    path.split(['\\', '/'])
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("\\")
}

fn io_error(err: std::io::Error, path: &str) -> StoreError {
    match err.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(format!("File {} not found", path)),
        std::io::ErrorKind::PermissionDenied => StoreError::AccessDenied(path.to_string()),
        _ => StoreError::Io(err),
    }
}
