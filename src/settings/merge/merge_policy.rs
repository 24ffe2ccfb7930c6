//! Merge rules: defaults beneath every other source.

use crate::ingest::filter::default_arch;
use crate::settings::{
    default_arch_config_file, default_auto_groups, default_config_file, default_max_depth,
    default_max_include_depth,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("platform.arch", default_arch())?
        .set_default("platform.manufacturer", "")?
        .set_default("platform.product", "")?
        .set_default("loader.config_file", default_config_file())?
        .set_default("loader.arch_config_file", default_arch_config_file())?
        .set_default("loader.max_include_depth", default_max_include_depth() as u64)?
        .set_default("ingest.auto_groups", default_auto_groups())?
        .set_default("ingest.max_depth", default_max_depth() as u64)
}
