//! Work units and the per-unit computation contract.
//!
//! A [`WorkUnit`] is a contiguous slice of one group's contexts together with
//! the group's model binding. A [`UnitComputer`] turns one unit into a
//! [`PartialResult`]: one (L1, L1, N) array per sub-model index the binding
//! declares. Units never see each other; everything they share is read-only
//! and behind an `Arc`.

use crate::bins::Bins;
use crate::context::{ContextRecord, ModelBinding};
use crate::error::MrdError;
use crate::imt::Imt;
use crate::kernel::{CrossCorrelation, MrdKernel};
use crate::types::{GroupId, MrdShape, SubModelIndex};
use ndarray::{Array3, Array4, Axis};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// Parameters shared by every unit of a run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub imt1: Imt,
    pub imt2: Imt,
    pub crosscorr: CrossCorrelation,
    /// Intensity levels of `imt1`; L1 + 1 values.
    pub levels1: Vec<f64>,
    /// Intensity levels of `imt2`; L1 + 1 values.
    pub levels2: Vec<f64>,
    pub bins: Bins,
    pub num_sites: usize,
}

impl RunParams {
    /// L1: number of intensity cells per IMT.
    pub fn num_cells(&self) -> usize {
        self.levels1.len().saturating_sub(1)
    }

    /// Shape every per-sub-model array and the output must have.
    pub fn shape(&self) -> MrdShape {
        let l1 = self.num_cells();
        (l1, l1, self.num_sites)
    }
}

/// A contiguous slice of one group's contexts, ready for computation.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub unit_id: usize,
    contexts: Arc<[ContextRecord]>,
    range: Range<usize>,
    pub binding: Arc<ModelBinding>,
    pub num_sites: usize,
}

impl WorkUnit {
    pub fn new(
        unit_id: usize,
        contexts: Arc<[ContextRecord]>,
        range: Range<usize>,
        binding: Arc<ModelBinding>,
        num_sites: usize,
    ) -> Self {
        debug_assert!(range.end <= contexts.len());
        Self {
            unit_id,
            contexts,
            range,
            binding,
            num_sites,
        }
    }

    pub fn grp_id(&self) -> GroupId {
        self.binding.grp_id
    }

    pub fn contexts(&self) -> &[ContextRecord] {
        &self.contexts[self.range.clone()]
    }

    /// Position of this unit's slice within its group.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Load-balancing weight: the number of contexts carried.
    pub fn weight(&self) -> usize {
        self.range.len()
    }
}

/// Output of one unit: one array per declared sub-model index.
#[derive(Debug, Clone)]
pub struct PartialResult {
    pub unit_id: usize,
    pub grp_id: GroupId,
    /// Sub-model indices the originating binding declared.
    pub declared: Vec<SubModelIndex>,
    pub arrays: BTreeMap<SubModelIndex, Array3<f64>>,
}

impl PartialResult {
    /// Split a kernel's (L1, L1, N, G) output along its last axis.
    pub fn from_kernel_output(
        unit: &WorkUnit,
        mrd: Array4<f64>,
        expected: MrdShape,
    ) -> Result<Self, MrdError> {
        let (l1, l2, n) = expected;
        let g = unit.binding.num_sub_models();
        if mrd.shape() != [l1, l2, n, g] {
            return Err(MrdError::shape(format!(
                "unit {} produced shape {:?}, expected {:?}",
                unit.unit_id,
                mrd.shape(),
                [l1, l2, n, g]
            )));
        }
        let arrays = unit
            .binding
            .gidx
            .iter()
            .enumerate()
            .map(|(i, g)| (*g, mrd.index_axis(Axis(3), i).to_owned()))
            .collect();
        Ok(Self {
            unit_id: unit.unit_id,
            grp_id: unit.grp_id(),
            declared: unit.binding.gidx.clone(),
            arrays,
        })
    }

    /// Check that the returned keys are exactly the declared sub-model indices.
    pub fn validate_keys(&self) -> Result<(), MrdError> {
        let mut declared = self.declared.clone();
        declared.sort_unstable();
        declared.dedup();
        let returned: Vec<SubModelIndex> = self.arrays.keys().copied().collect();
        if declared != returned {
            return Err(MrdError::shape(format!(
                "unit {} of group {} returned sub-model indices {:?}, declared {:?}",
                self.unit_id, self.grp_id, returned, declared
            )));
        }
        Ok(())
    }
}

/// Computes the partial result of a single unit.
///
/// Implementations must be deterministic and must not mutate shared state.
pub trait UnitComputer: Send + Sync {
    fn compute(&self, unit: &WorkUnit, params: &RunParams) -> Result<PartialResult, MrdError>;
}

/// Unit computer backed by an [`MrdKernel`].
pub struct KernelComputer<K> {
    kernel: K,
}

impl<K: MrdKernel> KernelComputer<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }
}

impl<K: MrdKernel> UnitComputer for KernelComputer<K> {
    fn compute(&self, unit: &WorkUnit, params: &RunParams) -> Result<PartialResult, MrdError> {
        if unit.num_sites != params.num_sites {
            return Err(MrdError::shape(format!(
                "Unit {} was partitioned for {} sites but the run has {}",
                unit.unit_id, unit.num_sites, params.num_sites
            )));
        }
        let mrd = self
            .kernel
            .mean_rate_dist(unit.contexts(), &unit.binding, params)?;
        PartialResult::from_kernel_output(unit, mrd, params.shape())
    }
}
