//! Shared fixtures for integration tests: jobs, stub computers and an
//! environment guard for tests that touch process-wide variables.

use mrd::bins::Bins;
use mrd::config::CalculationConfig;
use mrd::context::{ContextRecord, GmvStats, ModelBinding};
use mrd::error::MrdError;
use mrd::imt::{Imt, ImtLevels};
use mrd::kernel::CrossCorrelation;
use mrd::orchestrator::MrdJob;
use mrd::types::SubModelIndex;
use mrd::unit::{PartialResult, RunParams, UnitComputer, WorkUnit};
use mrd::weights::RealizationWeights;
use ndarray::Array3;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Global mutex serializing environment variable access across tests.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Sets environment variables for the lifetime of the guard and restores
/// the previous values on drop.
pub struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn new() -> Self {
        let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        Self {
            saved: Vec::new(),
            _lock: lock,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
        std::env::set_var(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
        std::env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..).rev() {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}

/// Fills each declared sub-model array with `value[g]` times the summed rate
/// of the unit's contexts, so contributions add up linearly across slices.
/// Sub-models listed in `omit` are left out of every partial.
pub struct StubComputer {
    pub values: BTreeMap<SubModelIndex, f64>,
    pub omit: Vec<SubModelIndex>,
    pub calls: AtomicUsize,
}

impl StubComputer {
    pub fn new(values: &[(SubModelIndex, f64)]) -> Self {
        Self {
            values: values.iter().copied().collect(),
            omit: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UnitComputer for StubComputer {
    fn compute(&self, unit: &WorkUnit, params: &RunParams) -> Result<PartialResult, MrdError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rate: f64 = unit.contexts().iter().map(|ctx| ctx.rate).sum();
        let arrays = unit
            .binding
            .gidx
            .iter()
            .filter(|g| !self.omit.contains(g))
            .map(|g| {
                let value = self.values.get(g).copied().unwrap_or(0.0);
                (*g, Array3::from_elem(params.shape(), value * rate))
            })
            .collect();
        Ok(PartialResult {
            unit_id: unit.unit_id,
            grp_id: unit.grp_id(),
            declared: unit.binding.gidx.clone(),
            arrays,
        })
    }
}

pub fn imtls(levels: &[f64]) -> ImtLevels {
    let mut imtls = BTreeMap::new();
    imtls.insert("PGA".to_string(), levels.to_vec());
    imtls.insert("SA(1.0)".to_string(), levels.to_vec());
    ImtLevels(imtls)
}

pub fn default_bins() -> Bins {
    mrd::config::BinningConfig::default().to_bins().unwrap()
}

/// Group 0 with `n` records of rate `1 / n`, bound to `gidx = [0, 1]`;
/// realization 0 (weight 0.6) uses g=0 and realization 1 (weight 0.4) uses g=1.
pub fn two_realization_job(n: usize, num_sites: usize) -> MrdJob {
    let record = ContextRecord {
        sid: 0,
        rate: 1.0 / n as f64,
        gmv: vec![
            GmvStats {
                mean: [-2.0, -2.5],
                sigma: [0.6, 0.7],
            };
            2
        ],
    };
    let contexts: Arc<[ContextRecord]> = vec![record; n].into();
    let mut groups = BTreeMap::new();
    groups.insert(0, contexts);
    let mut bindings = BTreeMap::new();
    bindings.insert(0, Arc::new(ModelBinding::new(0, vec![0, 1])));
    MrdJob {
        imt1: Imt::Pga,
        imt2: Imt::Sa(1.0),
        crosscorr: CrossCorrelation::BakerJayaram2008,
        imtls: imtls(&[0.01, 0.05, 0.1, 0.2, 0.5]),
        num_sites,
        groups,
        bindings,
        weights: RealizationWeights::new()
            .with_realization(0, 0, 0.6)
            .with_realization(1, 1, 0.4),
        bins: default_bins(),
    }
}

/// Two groups of varied contexts over `num_sites` sites, for the real kernel.
pub fn kernel_job(num_sites: usize) -> MrdJob {
    let mut groups = BTreeMap::new();
    let mut bindings = BTreeMap::new();
    for (grp_id, gidx, n) in [(0_u32, vec![0_u32, 1], 37_usize), (1, vec![2], 23)] {
        let contexts: Arc<[ContextRecord]> = (0..n)
            .map(|i| ContextRecord {
                sid: i % num_sites,
                rate: 1e-3 * (1.0 + (i % 7) as f64),
                gmv: gidx
                    .iter()
                    .map(|g| GmvStats {
                        mean: [
                            -3.0 + 0.05 * i as f64 + 0.1 * *g as f64,
                            -3.2 + 0.04 * i as f64,
                        ],
                        sigma: [0.5 + 0.01 * (i % 5) as f64, 0.6],
                    })
                    .collect(),
            })
            .collect::<Vec<_>>()
            .into();
        groups.insert(grp_id, contexts);
        bindings.insert(grp_id, Arc::new(ModelBinding::new(grp_id, gidx)));
    }
    MrdJob {
        imt1: Imt::Pga,
        imt2: Imt::Sa(1.0),
        crosscorr: CrossCorrelation::BakerJayaram2008,
        imtls: imtls(&[0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0]),
        num_sites,
        groups,
        bindings,
        weights: RealizationWeights::new()
            .with_realization(0, 0, 0.5)
            .with_realization(1, 1, 0.3)
            .with_realization(2, 2, 0.2),
        bins: default_bins(),
    }
}

pub fn settings(concurrent_tasks: usize) -> CalculationConfig {
    CalculationConfig {
        concurrent_tasks,
        ..CalculationConfig::default()
    }
}
