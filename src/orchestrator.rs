//! Orchestrator: validates a job, partitions it, dispatches the units,
//! combines the partials and stores the final array.

use crate::bins::Bins;
use crate::combine::combine_into;
use crate::config::CalculationConfig;
use crate::context::{ContextRecord, ModelBinding};
use crate::error::MrdError;
use crate::executor::UnitExecutor;
use crate::imt::{Imt, ImtLevels};
use crate::kernel::CrossCorrelation;
use crate::partition::Partitioner;
use crate::store::ResultStore;
use crate::types::{GroupId, MrdShape, MRD_DATASET};
use crate::unit::{PartialResult, RunParams, UnitComputer, WorkUnit};
use crate::weights::RealizationWeights;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Inputs of one calculation run.
#[derive(Debug, Clone)]
pub struct MrdJob {
    pub imt1: Imt,
    pub imt2: Imt,
    pub crosscorr: CrossCorrelation,
    pub imtls: ImtLevels,
    pub num_sites: usize,
    pub groups: BTreeMap<GroupId, Arc<[ContextRecord]>>,
    pub bindings: BTreeMap<GroupId, Arc<ModelBinding>>,
    pub weights: RealizationWeights,
    pub bins: Bins,
}

impl MrdJob {
    pub fn num_contexts(&self) -> usize {
        self.groups.values().map(|ctx| ctx.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub shape: MrdShape,
    pub num_groups: usize,
    pub num_contexts: usize,
    pub num_units: usize,
    pub total_rate: f64,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone)]
pub struct MrdOutput {
    pub mrd: Array3<f64>,
    pub summary: RunSummary,
}

/// Wires partitioning, dispatch and combination for a run.
pub struct MrdOrchestrator<E> {
    executor: E,
    computer: Arc<dyn UnitComputer>,
    settings: CalculationConfig,
}

impl<E: UnitExecutor> MrdOrchestrator<E> {
    pub fn new(executor: E, computer: Arc<dyn UnitComputer>, settings: CalculationConfig) -> Self {
        Self {
            executor,
            computer,
            settings,
        }
    }

    pub fn settings(&self) -> &CalculationConfig {
        &self.settings
    }

    /// Checks everything that can be checked before dispatch and builds the
    /// shared run parameters.
    pub fn prepare(&self, job: &MrdJob) -> Result<RunParams, MrdError> {
        if job.num_sites > self.settings.max_sites {
            return Err(MrdError::TooManySites {
                sites: job.num_sites,
                limit: self.settings.max_sites,
            });
        }
        if job.num_sites == 0 {
            return Err(MrdError::config("The number of sites must be positive"));
        }

        let l1 = job.imtls.num_cells()?;
        if l1 + 1 > self.settings.level_warning_threshold {
            warn!(
                levels = l1 + 1,
                "There are many intensity levels, the calculation can be pretty slow"
            );
        }
        let levels1 = job.imtls.levels(&job.imt1)?.to_vec();
        let levels2 = job.imtls.levels(&job.imt2)?.to_vec();
        job.crosscorr.correlation(&job.imt1, &job.imt2)?;

        for (grp_id, binding) in &job.bindings {
            if binding.grp_id != *grp_id {
                return Err(MrdError::config(format!(
                    "Binding stored under group {} names group {}",
                    grp_id, binding.grp_id
                )));
            }
            binding.validate()?;
        }
        job.weights.validate()?;

        Ok(RunParams {
            imt1: job.imt1.clone(),
            imt2: job.imt2.clone(),
            crosscorr: job.crosscorr,
            levels1,
            levels2,
            bins: job.bins.clone(),
            num_sites: job.num_sites,
        })
    }

    /// Runs the job without persisting anything.
    pub async fn compute(&self, job: &MrdJob) -> Result<MrdOutput, MrdError> {
        let started = Instant::now();
        let params = Arc::new(self.prepare(job)?);
        let shape = params.shape();

        let num_contexts = job.num_contexts();
        info!(
            contexts = num_contexts,
            groups = job.groups.len(),
            "Read contexts"
        );

        let partitioner =
            Partitioner::new(self.settings.concurrent_tasks, self.settings.block_sizing)?;
        let units = partitioner.partition(&job.groups, &job.bindings, job.num_sites)?;
        let num_units = units.len();
        info!(
            units = num_units,
            concurrent_tasks = self.settings.concurrent_tasks,
            "Submitting work units"
        );

        let expected: Vec<WorkUnit> = units.clone();
        let partials = self
            .executor
            .execute(units, Arc::clone(&self.computer), Arc::clone(&params))
            .await?;
        check_collection(&expected, &partials)?;

        let mut mrd = Array3::<f64>::zeros(shape);
        combine_into(&mut mrd, &partials, &job.weights)?;

        let summary = RunSummary {
            shape,
            num_groups: job.groups.len(),
            num_contexts,
            num_units,
            total_rate: mrd.sum(),
            elapsed_ms: started.elapsed().as_millis(),
        };
        Ok(MrdOutput { mrd, summary })
    }

    /// Runs the job and stores the result under [`MRD_DATASET`].
    pub async fn run(&self, job: &MrdJob, store: &dyn ResultStore) -> Result<MrdOutput, MrdError> {
        let output = self.compute(job).await?;
        store.write_dataset(MRD_DATASET, &output.mrd)?;
        info!(
            dataset = MRD_DATASET,
            shape = ?output.summary.shape,
            elapsed_ms = output.summary.elapsed_ms as u64,
            "Stored mean rate distribution"
        );
        Ok(output)
    }
}

/// Exactly one partial per submitted unit, each carrying its unit's declared
/// sub-model indices.
fn check_collection(units: &[WorkUnit], partials: &[PartialResult]) -> Result<(), MrdError> {
    let mut seen = vec![false; units.len()];
    for partial in partials {
        let unit = units.get(partial.unit_id).ok_or_else(|| MrdError::WorkerFailure {
            unit_id: partial.unit_id,
            message: "result for a unit that was never submitted".to_string(),
        })?;
        if std::mem::replace(&mut seen[partial.unit_id], true) {
            return Err(MrdError::WorkerFailure {
                unit_id: partial.unit_id,
                message: "more than one result collected".to_string(),
            });
        }
        if partial.grp_id != unit.grp_id() || partial.declared != unit.binding.gidx {
            return Err(MrdError::shape(format!(
                "unit {} reported group {} with sub-models {:?}, expected group {} with {:?}",
                partial.unit_id,
                partial.grp_id,
                partial.declared,
                unit.grp_id(),
                unit.binding.gidx
            )));
        }
    }
    if let Some(missing) = seen.iter().position(|done| !done) {
        return Err(MrdError::WorkerFailure {
            unit_id: missing,
            message: "no result collected".to_string(),
        });
    }
    Ok(())
}
