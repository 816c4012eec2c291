//! Merge rules: built-in defaults below every file and environment source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with the calculation defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("calculation.concurrent_tasks", 32_i64)?
        .set_default("calculation.max_sites", 10_i64)?
        .set_default("calculation.level_warning_threshold", 25_i64)?
        .set_default("calculation.block_sizing", "per_group")?
        .set_default("storage.store_path", ".mrd/store")
}
