//! Combination is linear in the realization weights and in the partials.

use mrd::combine::combine;
use mrd::unit::PartialResult;
use mrd::weights::RealizationWeights;
use ndarray::Array3;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn partial(unit_id: usize, values: &[f64]) -> PartialResult {
    PartialResult {
        unit_id,
        grp_id: 0,
        declared: (0..values.len() as u32).collect(),
        arrays: values
            .iter()
            .enumerate()
            .map(|(g, v)| (g as u32, Array3::from_elem((2, 2, 1), *v)))
            .collect::<BTreeMap<_, _>>(),
    }
}

proptest! {
    #[test]
    fn output_scales_with_weights(
        values in prop::collection::vec(0.0f64..10.0, 1..5),
        weights in prop::collection::vec(0.0f64..1.0, 5),
        factor in 0.0f64..100.0,
    ) {
        let mut table = RealizationWeights::new();
        for g in 0..values.len() {
            table = table.with_realization(g as u32, g as u32, weights[g]);
        }
        let partials = vec![partial(0, &values)];

        let base = combine(&partials, &table).unwrap();
        let scaled = combine(&partials, &table.scaled(factor)).unwrap();
        for (b, s) in base.iter().zip(scaled.iter()) {
            prop_assert!((b * factor - s).abs() <= 1e-9 * (1.0 + s.abs()));
        }
    }

    #[test]
    fn splitting_a_partial_does_not_change_the_sum(
        values in prop::collection::vec(0.0f64..10.0, 1..5),
        split in 0.0f64..1.0,
    ) {
        let mut table = RealizationWeights::new();
        for g in 0..values.len() {
            table = table.with_realization(g as u32, g as u32, 0.25);
        }
        let left: Vec<f64> = values.iter().map(|v| v * split).collect();
        let right: Vec<f64> = values.iter().map(|v| v * (1.0 - split)).collect();

        let whole = combine(&[partial(0, &values)], &table).unwrap();
        let parts = combine(&[partial(0, &left), partial(1, &right)], &table).unwrap();
        for (w, p) in whole.iter().zip(parts.iter()) {
            prop_assert!((w - p).abs() <= 1e-9 * (1.0 + w.abs()));
        }
    }
}
