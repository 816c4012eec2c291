//! Realization weight table: which realizations each sub-model feeds, and
//! how much each realization weighs.

use crate::error::MrdError;
use crate::types::{RealizationId, SubModelIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealizationWeights {
    pub rlzs_by_g: BTreeMap<SubModelIndex, Vec<RealizationId>>,
    pub weights: BTreeMap<RealizationId, f64>,
}

impl RealizationWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper: realization `rlz` with `weight` draws on sub-model `g`.
    pub fn with_realization(mut self, g: SubModelIndex, rlz: RealizationId, weight: f64) -> Self {
        self.rlzs_by_g.entry(g).or_default().push(rlz);
        self.weights.insert(rlz, weight);
        self
    }

    pub fn realizations(&self, g: SubModelIndex) -> Result<&[RealizationId], MrdError> {
        self.rlzs_by_g
            .get(&g)
            .map(Vec::as_slice)
            .ok_or_else(|| MrdError::config(format!("No realizations for sub-model index {}", g)))
    }

    pub fn weight(&self, rlz: RealizationId) -> Result<f64, MrdError> {
        self.weights
            .get(&rlz)
            .copied()
            .ok_or_else(|| MrdError::config(format!("No weight for realization {}", rlz)))
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Whether the realization weights sum to one within `tolerance`.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total_weight() - 1.0).abs() <= tolerance
    }

    /// Copy of the table with every weight multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rlzs_by_g: self.rlzs_by_g.clone(),
            weights: self
                .weights
                .iter()
                .map(|(rlz, weight)| (*rlz, weight * factor))
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), MrdError> {
        for (rlz, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(MrdError::config(format!(
                    "Realization {} has invalid weight {}",
                    rlz, weight
                )));
            }
        }
        for (g, rlzs) in &self.rlzs_by_g {
            let mut seen = HashSet::new();
            for rlz in rlzs {
                if !seen.insert(*rlz) {
                    return Err(MrdError::config(format!(
                        "Realization {} listed twice for sub-model index {}",
                        rlz, g
                    )));
                }
                self.weight(*rlz)?;
            }
        }
        Ok(())
    }
}
