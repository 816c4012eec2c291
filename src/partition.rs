//! Work partitioning: contiguous, bounded slices of each context group.

use crate::context::{ContextRecord, ModelBinding};
use crate::error::MrdError;
use crate::types::GroupId;
use crate::unit::WorkUnit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;

/// What `n` the blocksize `ceil(n / T)` is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockSizing {
    /// Each group's own size.
    #[default]
    PerGroup,
    /// The total number of contexts over all groups, one blocksize for every group.
    Total,
}

/// `ceil(n / concurrency)`.
pub fn blocksize(n: usize, concurrency: usize) -> Result<usize, MrdError> {
    if concurrency < 1 {
        return Err(MrdError::config(
            "Target concurrency must be at least 1",
        ));
    }
    Ok(n.div_ceil(concurrency))
}

/// Contiguous ranges of at most `blocksize` covering `start..stop`.
pub fn gen_slices(start: usize, stop: usize, blocksize: usize) -> impl Iterator<Item = Range<usize>> {
    let step = blocksize.max(1);
    (start..stop)
        .step_by(step)
        .map(move |lo| lo..(lo + step).min(stop))
}

/// Splits context groups into work units.
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    concurrency: usize,
    sizing: BlockSizing,
}

impl Partitioner {
    pub fn new(concurrency: usize, sizing: BlockSizing) -> Result<Self, MrdError> {
        blocksize(0, concurrency)?;
        Ok(Self {
            concurrency,
            sizing,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Slices of one group of `group_len` contexts, where `total` is the context
    /// count over every group of the run.
    pub fn slices(&self, group_len: usize, total: usize) -> Vec<Range<usize>> {
        let n = match self.sizing {
            BlockSizing::PerGroup => group_len,
            BlockSizing::Total => total,
        };
        // concurrency was validated in new()
        let size = n.div_ceil(self.concurrency);
        gen_slices(0, group_len, size).collect()
    }

    /// Partition every group independently, in group order. Unit ids are
    /// assigned sequentially from zero.
    pub fn partition(
        &self,
        groups: &BTreeMap<GroupId, Arc<[ContextRecord]>>,
        bindings: &BTreeMap<GroupId, Arc<ModelBinding>>,
        num_sites: usize,
    ) -> Result<Vec<WorkUnit>, MrdError> {
        let total: usize = groups.values().map(|ctx| ctx.len()).sum();
        let mut units = Vec::new();
        for (grp_id, contexts) in groups {
            if contexts.is_empty() {
                continue;
            }
            let binding = bindings.get(grp_id).ok_or_else(|| {
                MrdError::config(format!("No model binding for group {}", grp_id))
            })?;
            for range in self.slices(contexts.len(), total) {
                units.push(WorkUnit::new(
                    units.len(),
                    Arc::clone(contexts),
                    range,
                    Arc::clone(binding),
                    num_sites,
                ));
            }
        }
        Ok(units)
    }
}
