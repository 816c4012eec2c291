//! Weighted combination of partial results into the final (L1, L1, N) array.
//!
//! Partials are first merged per sub-model index: slices of one group cover
//! disjoint contexts, so their arrays add up. Every merged array is then added
//! to the output once per realization it feeds, scaled by that realization's
//! weight. No normalization happens here.

use crate::error::MrdError;
use crate::types::{GroupId, MrdShape, SubModelIndex};
use crate::unit::PartialResult;
use crate::weights::RealizationWeights;
use ndarray::Array3;
use std::collections::BTreeMap;

/// Combine partials into a fresh array whose shape comes from the first
/// partial. Every other array is checked against it.
pub fn combine(
    partials: &[PartialResult],
    weights: &RealizationWeights,
) -> Result<Array3<f64>, MrdError> {
    let shape = partials
        .iter()
        .flat_map(|partial| partial.arrays.values())
        .next()
        .map(|array| array.dim())
        .ok_or_else(|| MrdError::config("No partial results to combine"))?;
    let mut out = Array3::zeros(shape);
    combine_into(&mut out, partials, weights)?;
    Ok(out)
}

/// Accumulate weighted partials into a caller-owned output array.
///
/// `out` is only written once every partial has passed validation.
pub fn combine_into(
    out: &mut Array3<f64>,
    partials: &[PartialResult],
    weights: &RealizationWeights,
) -> Result<(), MrdError> {
    let merged = merge_by_sub_model(partials, out.dim())?;

    // Resolve every lookup before touching the output.
    let mut plan = Vec::with_capacity(merged.len());
    for (g, (_, array)) in &merged {
        let mut rlz_weights = Vec::new();
        for rlz in weights.realizations(*g)? {
            rlz_weights.push(weights.weight(*rlz)?);
        }
        plan.push((array, rlz_weights));
    }

    for (array, rlz_weights) in plan {
        for weight in rlz_weights {
            out.scaled_add(weight, array);
        }
    }
    Ok(())
}

/// Sum partial arrays per sub-model index, validating key sets and shapes.
pub fn merge_by_sub_model(
    partials: &[PartialResult],
    shape: MrdShape,
) -> Result<BTreeMap<SubModelIndex, (GroupId, Array3<f64>)>, MrdError> {
    let mut merged: BTreeMap<SubModelIndex, (GroupId, Array3<f64>)> = BTreeMap::new();
    for partial in partials {
        partial.validate_keys()?;
        for (g, array) in &partial.arrays {
            if array.dim() != shape {
                return Err(MrdError::shape(format!(
                    "sub-model {} of unit {} has shape {:?}, expected {:?}",
                    g,
                    partial.unit_id,
                    array.dim(),
                    shape
                )));
            }
            match merged.get_mut(g) {
                Some((grp_id, acc)) => {
                    if *grp_id != partial.grp_id {
                        return Err(MrdError::config(format!(
                            "sub-model index {} is declared by groups {} and {}",
                            g, grp_id, partial.grp_id
                        )));
                    }
                    *acc += array;
                }
                None => {
                    merged.insert(*g, (partial.grp_id, array.clone()));
                }
            }
        }
    }
    Ok(merged)
}
