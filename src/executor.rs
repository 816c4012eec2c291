//! Unit executors: submit work units, wait for every partial result.
//! Executors only run units; partitioning and combination stay with the orchestrator.

use crate::error::MrdError;
use crate::unit::{PartialResult, RunParams, UnitComputer, WorkUnit};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::debug;

/// Runs every unit through a [`UnitComputer`] and collects the partials.
///
/// Implementations return either one partial per submitted unit or the first
/// error; a failed run never yields a partial collection.
#[allow(async_fn_in_trait)]
pub trait UnitExecutor: Send + Sync {
    async fn execute(
        &self,
        units: Vec<WorkUnit>,
        computer: Arc<dyn UnitComputer>,
        params: Arc<RunParams>,
    ) -> Result<Vec<PartialResult>, MrdError>;
}

/// Computes units one after the other on the calling task.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialExecutor;

impl UnitExecutor for SequentialExecutor {
    async fn execute(
        &self,
        units: Vec<WorkUnit>,
        computer: Arc<dyn UnitComputer>,
        params: Arc<RunParams>,
    ) -> Result<Vec<PartialResult>, MrdError> {
        units
            .iter()
            .map(|unit| computer.compute(unit, &params))
            .collect()
    }
}

/// Runs units on tokio's blocking pool with a bound on units in flight.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    max_in_flight: usize,
}

impl TokioExecutor {
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// One unit in flight per available CPU.
    pub fn with_default_parallelism() -> Self {
        Self::new(default_parallelism())
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }
}

impl Default for TokioExecutor {
    fn default() -> Self {
        Self::with_default_parallelism()
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl UnitExecutor for TokioExecutor {
    async fn execute(
        &self,
        units: Vec<WorkUnit>,
        computer: Arc<dyn UnitComputer>,
        params: Arc<RunParams>,
    ) -> Result<Vec<PartialResult>, MrdError> {
        let total = units.len();
        let mut pending = units.into_iter();
        let mut in_flight = FuturesUnordered::new();
        let mut results = Vec::with_capacity(total);

        loop {
            while in_flight.len() < self.max_in_flight {
                let Some(unit) = pending.next() else { break };
                let unit_id = unit.unit_id;
                let weight = unit.weight();
                let computer = Arc::clone(&computer);
                let params = Arc::clone(&params);
                let handle =
                    tokio::task::spawn_blocking(move || computer.compute(&unit, &params));
                in_flight.push(async move { (unit_id, weight, handle.await) });
            }

            let Some((unit_id, weight, outcome)) = in_flight.next().await else {
                break;
            };
            match outcome {
                Ok(Ok(partial)) => {
                    results.push(partial);
                    debug!(
                        unit_id,
                        contexts = weight,
                        completed = results.len(),
                        total,
                        "Unit completed"
                    );
                }
                // Remaining futures are dropped with `in_flight`; their
                // results are never observed.
                Ok(Err(err)) => return Err(err),
                Err(join_err) => {
                    return Err(MrdError::WorkerFailure {
                        unit_id,
                        message: join_err.to_string(),
                    })
                }
            }
        }
        Ok(results)
    }
}
