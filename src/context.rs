//! Context records and per-group model bindings.

use crate::error::MrdError;
use crate::types::{GroupId, SubModelIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Log-space ground-motion statistics of one sub-model for both IMTs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GmvStats {
    /// Natural-log mean for (imt1, imt2).
    pub mean: [f64; 2],
    /// Natural-log standard deviation for (imt1, imt2).
    pub sigma: [f64; 2],
}

/// One rupture/site context contributing to the distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRecord {
    /// Index of the target site, below the run's site count.
    pub sid: usize,
    /// Annual occurrence rate of the rupture.
    pub rate: f64,
    /// Ground-motion statistics, one entry per sub-model of the group's binding.
    pub gmv: Vec<GmvStats>,
}

/// Static per-group parameters shared read-only by every unit of that group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBinding {
    pub grp_id: GroupId,
    /// Sub-model indices, in the order the kernel lays out its last axis.
    pub gidx: Vec<SubModelIndex>,
    /// Ground-motion model label for each entry of `gidx`.
    #[serde(default)]
    pub gsims: Vec<String>,
}

impl ModelBinding {
    pub fn new(grp_id: GroupId, gidx: Vec<SubModelIndex>) -> Self {
        Self {
            grp_id,
            gidx,
            gsims: Vec::new(),
        }
    }

    pub fn num_sub_models(&self) -> usize {
        self.gidx.len()
    }

    pub fn validate(&self) -> Result<(), MrdError> {
        if self.gidx.is_empty() {
            return Err(MrdError::config(format!(
                "Model binding for group {} has no sub-model indices",
                self.grp_id
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.gidx.iter().find(|g| !seen.insert(**g)) {
            return Err(MrdError::config(format!(
                "Model binding for group {} repeats sub-model index {}",
                self.grp_id, dup
            )));
        }
        if !self.gsims.is_empty() && self.gsims.len() != self.gidx.len() {
            return Err(MrdError::config(format!(
                "Model binding for group {} has {} gsims for {} sub-model indices",
                self.grp_id,
                self.gsims.len(),
                self.gidx.len()
            )));
        }
        Ok(())
    }
}
