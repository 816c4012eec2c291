//! CLI route: single route table and run context.

use crate::bins::Bins;
use crate::config::{ConfigLoader, MrdConfig};
use crate::error::{MrdError, StorageError};
use crate::executor::{default_parallelism, TokioExecutor};
use crate::imt::Imt;
use crate::input::{JobFile, JobOverrides};
use crate::kernel::{BinnedNormalKernel, CrossCorrelation};
use crate::orchestrator::MrdOrchestrator;
use crate::store::{ResultStore, SledResultStore};
use crate::unit::KernelComputer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_dataset_json, format_dataset_text, format_run_summary};

/// Runtime context for CLI execution: workspace root and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: MrdConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, MrdError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: MrdConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &MrdConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, MrdError> {
        let started = Instant::now();
        let result = match command {
            Commands::Compute {
                job,
                imt1,
                imt2,
                cross_correlation,
                concurrent_tasks,
                store,
            } => self.handle_compute(
                job,
                JobOverrides {
                    imt1: imt1.as_deref().map(str::parse::<Imt>).transpose()?,
                    imt2: imt2.as_deref().map(str::parse::<Imt>).transpose()?,
                    cross_correlation: cross_correlation
                        .as_deref()
                        .map(str::parse::<CrossCorrelation>)
                        .transpose()?,
                },
                *concurrent_tasks,
                store.as_deref(),
            ),
            Commands::Show {
                store,
                name,
                format,
            } => self.handle_show(store.as_deref(), name, *format),
            Commands::Config => self.handle_config(),
        };
        info!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn store_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => self.config.storage.resolve_store_path(&self.workspace_root),
        }
    }

    fn handle_compute(
        &self,
        job_path: &Path,
        overrides: JobOverrides,
        concurrent_tasks: Option<usize>,
        store: Option<&Path>,
    ) -> Result<String, MrdError> {
        let bins: Bins = self.config.binning.to_bins()?;
        let job = JobFile::load(job_path)?.into_job(overrides, bins)?;

        let mut settings = self.config.calculation.clone();
        if let Some(t) = concurrent_tasks {
            settings.concurrent_tasks = t;
        }
        settings.validate().map_err(MrdError::config)?;

        let store_path = self.store_path(store);
        std::fs::create_dir_all(&store_path).map_err(StorageError::from)?;
        let store = SledResultStore::new(&store_path)?;

        let executor =
            TokioExecutor::new(settings.max_in_flight.unwrap_or_else(default_parallelism));
        let orchestrator = MrdOrchestrator::new(
            executor,
            Arc::new(KernelComputer::new(BinnedNormalKernel)),
            settings,
        );

        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            MrdError::config(format!("Failed to create tokio runtime: {}", e))
        })?;
        let output = rt.block_on(orchestrator.run(&job, &store))?;
        Ok(format_run_summary(
            &output.summary,
            &store_path.display().to_string(),
        ))
    }

    fn handle_show(
        &self,
        store: Option<&Path>,
        name: &str,
        format: OutputFormat,
    ) -> Result<String, MrdError> {
        let store_path = self.store_path(store);
        if !store_path.exists() {
            return Err(StorageError::DatasetNotFound(format!(
                "{} (no store at {})",
                name,
                store_path.display()
            ))
            .into());
        }
        let store = SledResultStore::new(&store_path)?;
        let record = store
            .read_record(name)?
            .ok_or_else(|| StorageError::DatasetNotFound(name.to_string()))?;
        match format {
            OutputFormat::Text => format_dataset_text(&record),
            OutputFormat::Json => format_dataset_json(&record),
        }
    }

    fn handle_config(&self) -> Result<String, MrdError> {
        toml::to_string_pretty(&self.config)
            .map_err(|e| MrdError::config(format!("Failed to render configuration: {}", e)))
    }
}
