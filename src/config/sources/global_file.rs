//! Global config file source: the platform config directory, e.g.
//! ~/.config/mrd/config.toml on Linux.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::warn;

/// Path to the global config file, if a home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mrd").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global config file source to the builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(path) = global_config_path() {
        if path.exists() {
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            builder = builder.add_source(File::from(canonical).required(false));
        } else {
            warn!(
                config_path = %path.display(),
                "Global configuration file not found; using built-in defaults"
            );
        }
    }
    Ok(builder)
}
