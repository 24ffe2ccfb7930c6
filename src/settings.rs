//! Store Settings
//!
//! Layered settings for a store: merge-policy defaults, then an optional TOML
//! settings file, then `CONFTREE__`-prefixed environment variables
//! (`CONFTREE__LOADER__ROOT`, `CONFTREE__PLATFORM__ARCH`, ...).

use crate::error::{Result, StoreError};
use crate::ingest::filter::PlatformIdentity;
use crate::logging::LoggingConfig;
use crate::tree::path::{self, PathArg};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod environment;
    pub mod settings_file;
}

pub use sources::settings_file::SETTINGS_FILE_ENV;

/// Root settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Identity used to filter platform-specific elements
    #[serde(default)]
    pub platform: PlatformIdentity,

    #[serde(default)]
    pub loader: LoaderSettings,

    #[serde(default)]
    pub ingest: IngestSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where configuration documents come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Host directory backing the file volume; no volume when unset
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Main configuration document, volume-relative
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Fallback document template; `%s` is replaced by the architecture
    #[serde(default = "default_arch_config_file")]
    pub arch_config_file: String,

    /// Deepest chain of nested `<include>` documents followed
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: usize,
}

/// How documents are translated into the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Paths whose children are placed in implicit group zero
    #[serde(default = "default_auto_groups")]
    pub auto_groups: Vec<String>,

    /// Deepest element nesting accepted before ingestion fails
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

pub(crate) fn default_config_file() -> String {
    "conftree\\conftree.xml".to_string()
}

pub(crate) fn default_arch_config_file() -> String {
    "conftree\\%s\\conftree.xml".to_string()
}

pub(crate) fn default_max_include_depth() -> usize {
    8
}

pub(crate) fn default_auto_groups() -> Vec<String> {
    vec!["\\CPU\\Package".to_string(), "\\Memory\\Slot".to_string()]
}

pub(crate) fn default_max_depth() -> usize {
    64
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            root: None,
            config_file: default_config_file(),
            arch_config_file: default_arch_config_file(),
            max_include_depth: default_max_include_depth(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            auto_groups: default_auto_groups(),
            max_depth: default_max_depth(),
        }
    }
}

impl LoaderSettings {
    /// Volume path of the architecture-specific document
    pub fn arch_config_path(&self, arch: &str) -> Result<String> {
        path::render(&self.arch_config_file, &[PathArg::from(arch)])
    }
}

/// Settings validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Platform(String),
    Loader(String),
    Ingest(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Platform(msg) => write!(f, "Platform: {}", msg),
            ValidationError::Loader(msg) => write!(f, "Loader: {}", msg),
            ValidationError::Ingest(msg) => write!(f, "Ingest: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl StoreSettings {
    /// Validate every section, collecting all problems
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.platform.arch.trim().is_empty() {
            errors.push(ValidationError::Platform(
                "Architecture cannot be empty".to_string(),
            ));
        }

        if self.loader.config_file.trim().is_empty() {
            errors.push(ValidationError::Loader(
                "Config file path cannot be empty".to_string(),
            ));
        }
        if let Err(e) = self.loader.arch_config_path(&self.platform.arch) {
            errors.push(ValidationError::Loader(format!(
                "Invalid arch config file template '{}': {}",
                self.loader.arch_config_file, e
            )));
        }
        if let Some(root) = &self.loader.root {
            if !root.is_dir() {
                errors.push(ValidationError::Loader(format!(
                    "Volume root {} is not a directory",
                    root.display()
                )));
            }
        }

        if self.ingest.max_depth == 0 {
            errors.push(ValidationError::Ingest(
                "Maximum depth must be at least 1".to_string(),
            ));
        }
        for group in &self.ingest.auto_groups {
            if path::is_root(Some(group)) {
                errors.push(ValidationError::Ingest(format!(
                    "Auto-group path '{}' must name a node below the root",
                    group
                )));
            }
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Auto-group paths in canonical form
    pub fn auto_groups(&self) -> Vec<String> {
        self.ingest
            .auto_groups
            .iter()
            .map(|group| path::normalize_path_string(group))
            .collect()
    }
}

/// Builds [`StoreSettings`] from layered sources
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load from defaults, the settings file named by `CONFTREE_SETTINGS`
    /// (if any), and the environment
    pub fn load() -> Result<StoreSettings> {
        Self::build(None)
    }

    /// Load with an explicit settings file, which must exist
    pub fn load_from_file(settings_file: &Path) -> Result<StoreSettings> {
        Self::build(Some(settings_file))
    }

    fn build(settings_file: Option<&Path>) -> Result<StoreSettings> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::settings_file::add_to_builder(builder, settings_file)?;
        let builder = sources::environment::add_to_builder(builder);

        let settings: StoreSettings = builder.build()?.try_deserialize()?;
        settings.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            StoreError::Settings(format!(
                "Settings validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(settings)
    }
}
