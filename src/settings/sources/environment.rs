//! Environment source: `CONFTREE__<SECTION>__<KEY>` variables

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub const ENV_PREFIX: &str = "CONFTREE";
pub const ENV_SEPARATOR: &str = "__";

/// Add environment overrides to builder. `ingest.auto_groups` accepts a
/// comma-separated list.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .list_separator(",")
            .with_list_parse_key("ingest.auto_groups")
            .try_parsing(true),
    )
}
