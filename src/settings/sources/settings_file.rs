//! Settings file source: an explicit TOML file, or the one named by `CONFTREE_SETTINGS`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming a settings file
pub const SETTINGS_FILE_ENV: &str = "CONFTREE_SETTINGS";

/// Path of the settings file named by the environment, if any.
pub fn env_settings_path() -> Option<PathBuf> {
    std::env::var_os(SETTINGS_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Add the settings file source to builder.
/// An explicit file is required; one named by the environment is skipped with a
/// warning when missing.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    explicit: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(settings_path) = explicit {
        debug!(settings_path = %settings_path.display(), "Using settings file");
        return Ok(builder.add_source(
            File::from(settings_path)
                .format(FileFormat::Toml)
                .required(true),
        ));
    }

    match env_settings_path() {
        Some(settings_path) if settings_path.is_file() => {
            let canonical = dunce::canonicalize(&settings_path).unwrap_or(settings_path);
            debug!(settings_path = %canonical.display(), "Using settings file from environment");
            Ok(builder.add_source(
                File::from(canonical.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            ))
        }
        Some(settings_path) => {
            warn!(
                settings_path = %settings_path.display(),
                "Settings file named by {} not found, using defaults",
                SETTINGS_FILE_ENV
            );
            Ok(builder)
        }
        None => Ok(builder),
    }
}
