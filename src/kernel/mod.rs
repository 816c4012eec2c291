//! Numeric kernels producing the per-unit (L1, L1, N, G) rate matrix.
//!
//! The engine only relies on the [`MrdKernel`] contract: a pure function of a
//! context slice, its model binding and the run parameters. The bundled
//! [`BinnedNormalKernel`] integrates a bivariate log-normal over every pair of
//! intensity cells.

pub mod bivariate;
pub mod crosscorr;

pub use crosscorr::CrossCorrelation;

use crate::bins::Bins;
use crate::context::{ContextRecord, GmvStats, ModelBinding};
use crate::error::MrdError;
use crate::unit::RunParams;
use ndarray::{s, Array2, Array4};
use std::collections::HashMap;

/// Computes the mean rate distribution of a block of contexts.
///
/// Must return shape (L1, L1, N, G) with G equal to `binding.gidx.len()`, the
/// last axis ordered like `binding.gidx`.
pub trait MrdKernel: Send + Sync {
    fn mean_rate_dist(
        &self,
        contexts: &[ContextRecord],
        binding: &ModelBinding,
        params: &RunParams,
    ) -> Result<Array4<f64>, MrdError>;
}

/// Bivariate normal kernel over binned means and sigmas.
///
/// Log-means snap to the midpoint of their `meabins` cell and log-sigmas to
/// the midpoint of their `sigbins` cell, so contexts landing in the same cells
/// share one cell-probability matrix. Mass outside the first and last
/// intensity level is not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinnedNormalKernel;

type CellKey = [usize; 4];

impl BinnedNormalKernel {
    fn cell_key(bins: &Bins, stats: &GmvStats) -> CellKey {
        [
            bins.meabins.bin_index(stats.mean[0]),
            bins.sigbins.bin_index(stats.sigma[0]),
            bins.meabins.bin_index(stats.mean[1]),
            bins.sigbins.bin_index(stats.sigma[1]),
        ]
    }

    fn cell_probabilities(
        key: CellKey,
        bins: &Bins,
        rho: f64,
        edges1: &[f64],
        edges2: &[f64],
    ) -> Array2<f64> {
        let mu = [bins.meabins.midpoint(key[0]), bins.meabins.midpoint(key[2])];
        let sigma = [bins.sigbins.midpoint(key[1]), bins.sigbins.midpoint(key[3])];
        let z1: Vec<f64> = edges1.iter().map(|e| (e - mu[0]) / sigma[0]).collect();
        let z2: Vec<f64> = edges2.iter().map(|e| (e - mu[1]) / sigma[1]).collect();

        bivariate::rectangle_probabilities(&z1, &z2, rho)
    }
}

impl MrdKernel for BinnedNormalKernel {
    fn mean_rate_dist(
        &self,
        contexts: &[ContextRecord],
        binding: &ModelBinding,
        params: &RunParams,
    ) -> Result<Array4<f64>, MrdError> {
        let l1 = params.num_cells();
        let num_sites = params.num_sites;
        let num_g = binding.num_sub_models();
        if params.levels2.len() != params.levels1.len() {
            return Err(MrdError::config(
                "Both intensity measure types need the same number of levels",
            ));
        }
        if params.bins.sigbins.edges()[0] < 0.0 {
            return Err(MrdError::config("Sigma bins must be non-negative"));
        }
        let rho = params.crosscorr.correlation(&params.imt1, &params.imt2)?;
        let edges1: Vec<f64> = params.levels1.iter().map(|level| level.ln()).collect();
        let edges2: Vec<f64> = params.levels2.iter().map(|level| level.ln()).collect();

        let mut out = Array4::<f64>::zeros((l1, l1, num_sites, num_g));
        let mut cache: HashMap<CellKey, Array2<f64>> = HashMap::new();
        for ctx in contexts {
            if ctx.sid >= num_sites {
                return Err(MrdError::config(format!(
                    "Context site index {} is out of range for {} sites",
                    ctx.sid, num_sites
                )));
            }
            if !(ctx.rate.is_finite() && ctx.rate >= 0.0) {
                return Err(MrdError::config(format!(
                    "Context has invalid occurrence rate {}",
                    ctx.rate
                )));
            }
            if ctx.gmv.len() != num_g {
                return Err(MrdError::shape(format!(
                    "Context of group {} carries {} sub-model entries, binding declares {}",
                    binding.grp_id,
                    ctx.gmv.len(),
                    num_g
                )));
            }
            for (g, stats) in ctx.gmv.iter().enumerate() {
                let key = Self::cell_key(&params.bins, stats);
                let cells = cache.entry(key).or_insert_with(|| {
                    Self::cell_probabilities(key, &params.bins, rho, &edges1, &edges2)
                });
                out.slice_mut(s![.., .., ctx.sid, g])
                    .scaled_add(ctx.rate, &*cells);
            }
        }
        Ok(out)
    }
}
