//! Shared test utilities for integration tests
//!
//! On-disk volumes built in temp directories, and serialized access to the
//! `CONFTREE_*` environment variables that settings loading reads.

use conftree::{PlatformIdentity, Store};
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Platform identity most tests ingest under
pub fn test_identity() -> PlatformIdentity {
    PlatformIdentity::new("X64", "Contoso Systems", "Contoso Rack 7")
}

/// Store with the test identity and no volume
pub fn test_store() -> Store {
    Store::new().with_identity(test_identity())
}

/// Write a file beneath `root`, taking a volume-style path with `\`
pub fn write_volume_file(root: &Path, volume_path: &str, contents: &[u8]) {
    let mut host = root.to_path_buf();
    for part in volume_path.split('\\').filter(|p| !p.is_empty()) {
        host.push(part);
    }
    if let Some(parent) = host.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(host, contents).unwrap();
}

/// Temp directory populated with the given volume files
pub fn volume_dir(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (path, contents) in files {
        write_volume_file(temp_dir.path(), path, contents.as_bytes());
    }
    temp_dir
}

/// Run `f` with the given environment variables set, restoring the previous
/// values afterwards. Variables mapped to `None` are removed for the duration.
pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(name, _)| (name.to_string(), std::env::var(name).ok()))
        .collect();

    for (name, value) in vars {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }

    let result = f();

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(&name, value),
            None => std::env::remove_var(&name),
        }
    }

    result
}
