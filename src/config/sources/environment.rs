//! Environment variable source: SNAPSHOTS__* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `SNAPSHOTS__SNAPSHOT__FOLLOW_SYMLINKS=true` sets `snapshot.follow_symlinks`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("SNAPSHOTS")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
