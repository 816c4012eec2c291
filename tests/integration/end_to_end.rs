//! Whole runs through the orchestrator with a linear stub computer.

use super::test_utils::{settings, two_realization_job, StubComputer};
use mrd::context::ContextRecord;
use mrd::executor::{SequentialExecutor, TokioExecutor};
use mrd::orchestrator::MrdOrchestrator;
use mrd::partition::{BlockSizing, Partitioner};
use mrd::store::{MemoryResultStore, ResultStore};
use mrd::types::MRD_DATASET;
use std::sync::Arc;

fn assert_uniform(array: &ndarray::Array3<f64>, expected: f64) {
    for value in array.iter() {
        assert!(
            (value - expected).abs() < 1e-12,
            "expected {} everywhere, found {}",
            expected,
            value
        );
    }
}

#[test]
fn twelve_records_split_by_concurrency() {
    let job = two_realization_job(12, 1);
    let sizes = |t| {
        Partitioner::new(t, BlockSizing::PerGroup)
            .unwrap()
            .partition(&job.groups, &job.bindings, 1)
            .unwrap()
            .iter()
            .map(|unit| unit.weight())
            .collect::<Vec<_>>()
    };
    assert_eq!(sizes(3), vec![4, 4, 4]);
    assert_eq!(sizes(4), vec![3, 3, 3, 3]);
}

#[tokio::test]
async fn weighted_sub_models_combine_to_one_point_four() {
    for t in [3, 4] {
        let job = two_realization_job(12, 2);
        let computer = Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0)]));
        let orchestrator = MrdOrchestrator::new(TokioExecutor::new(2), computer.clone(), settings(t));
        let store = MemoryResultStore::new();

        let output = orchestrator.run(&job, &store).await.unwrap();

        assert_eq!(output.mrd.dim(), (4, 4, 2));
        assert_uniform(&output.mrd, 1.4);
        assert_eq!(computer.calls(), 12 / (12 / t));
        let stored = store.read_dataset(MRD_DATASET).unwrap().unwrap();
        assert_eq!(stored, output.mrd);
    }
}

#[tokio::test]
async fn executors_agree() {
    let job = two_realization_job(12, 1);
    let sequential = MrdOrchestrator::new(
        SequentialExecutor,
        Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0)])),
        settings(5),
    )
    .compute(&job)
    .await
    .unwrap();
    let parallel = MrdOrchestrator::new(
        TokioExecutor::new(4),
        Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0)])),
        settings(5),
    )
    .compute(&job)
    .await
    .unwrap();
    assert_eq!(sequential.summary.num_units, parallel.summary.num_units);
    for (a, b) in sequential.mrd.iter().zip(parallel.mrd.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
}

#[tokio::test]
async fn total_block_sizing_uses_the_run_context_count() {
    let mut job = two_realization_job(12, 1);
    let second = job.groups[&0].clone();
    job.groups.insert(1, second);
    job.bindings.insert(
        1,
        Arc::new(mrd::context::ModelBinding::new(1, vec![2])),
    );
    job.weights = job.weights.clone().with_realization(2, 2, 0.0);

    let mut config = settings(4);
    config.block_sizing = BlockSizing::Total;
    let output = MrdOrchestrator::new(
        SequentialExecutor,
        Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0), (2, 5.0)])),
        config,
    )
    .compute(&job)
    .await
    .unwrap();

    // 24 contexts over 4 tasks: blocksize 6, two units per group.
    assert_eq!(output.summary.num_units, 4);
    assert_uniform(&output.mrd, 1.4);
}

#[tokio::test]
async fn groups_without_contexts_produce_zeros() {
    let mut job = two_realization_job(12, 3);
    job.groups.insert(0, Vec::<ContextRecord>::new().into());
    let output = MrdOrchestrator::new(
        SequentialExecutor,
        Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0)])),
        settings(4),
    )
    .compute(&job)
    .await
    .unwrap();
    assert_eq!(output.summary.num_units, 0);
    assert_eq!(output.mrd.dim(), (4, 4, 3));
    assert_uniform(&output.mrd, 0.0);
}
