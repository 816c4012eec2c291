//! Per-workspace run settings under `<workspace>/config/`.
//!
//! `config.toml` holds the shared calculation settings of a workspace and
//! `<profile>.toml` refines them for one profile, e.g. a `production.toml`
//! with a larger `concurrent_tasks`. The profile comes from `MRD_ENV`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

const PROFILE_VAR: &str = "MRD_ENV";
const DEFAULT_PROFILE: &str = "development";

/// Active profile name; blank values fall back to the default profile.
pub fn active_profile() -> String {
    std::env::var(PROFILE_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Workspace files that exist for `profile`, lowest precedence first.
pub fn layered_files(workspace_root: &Path, profile: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if profile.contains(['/', '\\']) || profile.starts_with('.') || profile == "config" {
        return Err(ConfigError::Message(format!(
            "Invalid {} profile name: {:?}",
            PROFILE_VAR, profile
        )));
    }
    let dir = workspace_root.join("config");
    Ok([dir.join("config.toml"), dir.join(format!("{}.toml", profile))]
        .into_iter()
        .filter(|path| path.is_file())
        .collect())
}

/// Adds the workspace files of the active profile to the builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let profile = active_profile();
    let files = layered_files(workspace_root, &profile)?;
    Ok(files.into_iter().fold(builder, |builder, path| {
        debug!(profile = %profile, config_path = %path.display(), "Adding workspace configuration");
        builder.add_source(File::from(path))
    }))
}
