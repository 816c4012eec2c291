//! Bin edges used to discretize the mean and sigma axes.

use crate::error::MrdError;
use serde::{Deserialize, Serialize};

/// `num` evenly spaced values over `[start, stop]`, both ends included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    if num < 2 {
        return vec![start; num];
    }
    let step = (stop - start) / (num - 1) as f64;
    (0..num).map(|i| start + step * i as f64).collect()
}

/// Strictly increasing bin edges. Always holds at least two edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BinEdges(Vec<f64>);

impl BinEdges {
    pub fn new(edges: Vec<f64>) -> Result<Self, MrdError> {
        if edges.len() < 2 {
            return Err(MrdError::config(format!(
                "Bin edges need at least two values, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(MrdError::config("Bin edges must be finite"));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MrdError::config("Bin edges must be strictly increasing"));
        }
        Ok(Self(edges))
    }

    pub fn edges(&self) -> &[f64] {
        &self.0
    }

    pub fn num_bins(&self) -> usize {
        self.0.len() - 1
    }

    /// Index of the bin holding `value`; values outside the edges clamp to the
    /// first or last bin.
    pub fn bin_index(&self, value: f64) -> usize {
        let upper = self.0.partition_point(|edge| *edge <= value);
        upper.saturating_sub(1).min(self.num_bins() - 1)
    }

    pub fn midpoint(&self, index: usize) -> f64 {
        0.5 * (self.0[index] + self.0[index + 1])
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = MrdError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BinEdges> for Vec<f64> {
    fn from(value: BinEdges) -> Self {
        value.0
    }
}

/// The two binning schemes shared by every unit in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bins {
    pub meabins: BinEdges,
    pub sigbins: BinEdges,
}

impl Bins {
    pub fn new(meabins: Vec<f64>, sigbins: Vec<f64>) -> Result<Self, MrdError> {
        Ok(Self {
            meabins: BinEdges::new(meabins)?,
            sigbins: BinEdges::new(sigbins)?,
        })
    }
}
