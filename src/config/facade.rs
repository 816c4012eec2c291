//! Entry point for loading configuration.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::MrdConfig;
use crate::error::MrdError;
use config::{Environment, File};
use std::path::{Path, PathBuf};

/// Loads [`MrdConfig`] from the layered sources.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global file, then workspace files, then `MRD__*`
    /// environment variables (e.g. `MRD__CALCULATION__CONCURRENT_TASKS=8`).
    pub fn load(workspace_root: &Path) -> Result<MrdConfig, MrdError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config: MrdConfig = builder
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        config.validated()
    }

    /// Defaults plus a single explicit file; no global or environment sources.
    pub fn load_from_file(path: &Path) -> Result<MrdConfig, MrdError> {
        if !path.exists() {
            return Err(MrdError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let config: MrdConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()))
            .build()?
            .try_deserialize()?;
        config.validated()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("MRD")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
