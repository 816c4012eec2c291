//! Configuration System
//!
//! Layered configuration for calculation runs: built-in defaults, the global
//! config file, workspace config files and `MRD__*` environment variables, in
//! increasing order of precedence.

use crate::bins::{linspace, BinEdges, Bins};
use crate::error::MrdError;
use crate::logging::LoggingConfig;
use crate::partition::BlockSizing;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MrdConfig {
    #[serde(default)]
    pub calculation: CalculationConfig,

    #[serde(default)]
    pub binning: BinningConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Partitioning and validation limits for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Target number of parallel units (T).
    #[serde(default = "default_concurrent_tasks")]
    pub concurrent_tasks: usize,

    /// Hard ceiling on the number of sites (N).
    #[serde(default = "default_max_sites")]
    pub max_sites: usize,

    /// Number of intensity levels (L1 + 1) above which a warning is logged.
    #[serde(default = "default_level_warning_threshold")]
    pub level_warning_threshold: usize,

    #[serde(default)]
    pub block_sizing: BlockSizing,

    /// Units computed at once; defaults to the number of CPUs.
    #[serde(default)]
    pub max_in_flight: Option<usize>,
}

fn default_concurrent_tasks() -> usize {
    32
}

fn default_max_sites() -> usize {
    10
}

fn default_level_warning_threshold() -> usize {
    25
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            concurrent_tasks: default_concurrent_tasks(),
            max_sites: default_max_sites(),
            level_warning_threshold: default_level_warning_threshold(),
            block_sizing: BlockSizing::default(),
            max_in_flight: None,
        }
    }
}

impl CalculationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrent_tasks < 1 {
            return Err("concurrent_tasks must be at least 1".to_string());
        }
        if self.max_sites < 1 {
            return Err("max_sites must be at least 1".to_string());
        }
        if self.max_in_flight == Some(0) {
            return Err("max_in_flight must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Bin edges of the mean and sigma axes (natural-log units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningConfig {
    #[serde(default = "default_meabins")]
    pub meabins: Vec<f64>,

    #[serde(default = "default_sigbins")]
    pub sigbins: Vec<f64>,
}

fn default_meabins() -> Vec<f64> {
    linspace(-10.0, 3.0, 131)
}

fn default_sigbins() -> Vec<f64> {
    linspace(0.0, 1.5, 31)
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            meabins: default_meabins(),
            sigbins: default_sigbins(),
        }
    }
}

impl BinningConfig {
    pub fn to_bins(&self) -> Result<Bins, MrdError> {
        Bins::new(self.meabins.clone(), self.sigbins.clone())
    }

    pub fn validate(&self) -> Result<(), String> {
        BinEdges::new(self.meabins.clone()).map_err(|e| format!("meabins: {}", e))?;
        let sigbins = BinEdges::new(self.sigbins.clone()).map_err(|e| format!("sigbins: {}", e))?;
        if sigbins.edges()[0] < 0.0 {
            return Err("sigbins must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Storage paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(".mrd/store")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Store path, resolved against the workspace root when relative.
    pub fn resolve_store_path(&self, workspace_root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            workspace_root.join(&self.store_path)
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Calculation(String),
    Binning(String),
    Storage(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Calculation(msg) => write!(f, "Calculation: {}", msg),
            ValidationError::Binning(msg) => write!(f, "Binning: {}", msg),
            ValidationError::Storage(msg) => write!(f, "Storage: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl MrdConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.calculation.validate() {
            errors.push(ValidationError::Calculation(e));
        }
        if let Err(e) = self.binning.validate() {
            errors.push(ValidationError::Binning(e));
        }
        if self.storage.store_path.as_os_str().is_empty() {
            errors.push(ValidationError::Storage(
                "store_path cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one configuration error.
    pub fn validated(self) -> Result<Self, MrdError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            MrdError::config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
