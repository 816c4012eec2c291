//! JSON job files.
//!
//! A job file carries everything about a run except the bin edges and the
//! calculation limits, which come from configuration:
//!
//! ```json
//! {
//!   "num_sites": 1,
//!   "imt1": "PGA",
//!   "imt2": "SA(1.0)",
//!   "imtls": { "PGA": [0.05, 0.1, 0.2], "SA(1.0)": [0.05, 0.1, 0.2] },
//!   "groups": [
//!     { "grp_id": 0, "gidx": [0], "contexts": [
//!       { "sid": 0, "rate": 0.01, "gmv": [{ "mean": [-2.0, -2.3], "sigma": [0.6, 0.7] }] }
//!     ] }
//!   ],
//!   "weights": { "rlzs_by_g": { "0": [0] }, "weights": { "0": 1.0 } }
//! }
//! ```

use crate::bins::Bins;
use crate::context::{ContextRecord, ModelBinding};
use crate::error::MrdError;
use crate::imt::{Imt, ImtLevels};
use crate::kernel::CrossCorrelation;
use crate::orchestrator::MrdJob;
use crate::types::{GroupId, SubModelIndex};
use crate::weights::RealizationWeights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// One group of contexts together with its model binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInput {
    pub grp_id: GroupId,
    pub gidx: Vec<SubModelIndex>,
    #[serde(default)]
    pub gsims: Vec<String>,
    #[serde(default)]
    pub contexts: Vec<ContextRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFile {
    pub num_sites: usize,
    #[serde(default)]
    pub imt1: Option<Imt>,
    #[serde(default)]
    pub imt2: Option<Imt>,
    #[serde(default)]
    pub cross_correlation: Option<CrossCorrelation>,
    pub imtls: ImtLevels,
    pub groups: Vec<GroupInput>,
    pub weights: RealizationWeights,
}

/// Values that take precedence over the job file, typically from the CLI.
#[derive(Debug, Clone, Default)]
pub struct JobOverrides {
    pub imt1: Option<Imt>,
    pub imt2: Option<Imt>,
    pub cross_correlation: Option<CrossCorrelation>,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self, MrdError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MrdError::config(format!("Failed to read job file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            MrdError::config(format!("Invalid job file {}: {}", path.display(), e))
        })
    }

    pub fn from_json(text: &str) -> Result<Self, MrdError> {
        serde_json::from_str(text).map_err(|e| MrdError::config(format!("Invalid job file: {}", e)))
    }

    /// Builds the in-memory job. Overrides win over the file; both IMTs must
    /// be known by one or the other.
    pub fn into_job(self, overrides: JobOverrides, bins: Bins) -> Result<MrdJob, MrdError> {
        let imt1 = overrides
            .imt1
            .or(self.imt1)
            .ok_or_else(|| MrdError::config("No first intensity measure type given"))?;
        let imt2 = overrides
            .imt2
            .or(self.imt2)
            .ok_or_else(|| MrdError::config("No second intensity measure type given"))?;
        let crosscorr = overrides
            .cross_correlation
            .or(self.cross_correlation)
            .unwrap_or_default();

        let mut groups = BTreeMap::new();
        let mut bindings = BTreeMap::new();
        for group in self.groups {
            if bindings.contains_key(&group.grp_id) {
                return Err(MrdError::config(format!(
                    "Group {} appears more than once in the job file",
                    group.grp_id
                )));
            }
            let binding = ModelBinding {
                grp_id: group.grp_id,
                gidx: group.gidx,
                gsims: group.gsims,
            };
            let contexts: Arc<[ContextRecord]> = group.contexts.into();
            groups.insert(group.grp_id, contexts);
            bindings.insert(group.grp_id, Arc::new(binding));
        }

        Ok(MrdJob {
            imt1,
            imt2,
            crosscorr,
            imtls: self.imtls,
            num_sites: self.num_sites,
            groups,
            bindings,
            weights: self.weights,
            bins,
        })
    }
}
