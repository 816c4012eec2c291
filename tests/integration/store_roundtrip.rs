//! Orchestrated runs persisted to the sled-backed store.

use super::test_utils::{settings, two_realization_job, StubComputer};
use mrd::error::{MrdError, StorageError};
use mrd::executor::TokioExecutor;
use mrd::orchestrator::MrdOrchestrator;
use mrd::store::{DatasetRecord, ResultStore, SledResultStore};
use mrd::types::MRD_DATASET;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn run_persists_the_final_array() {
    let temp_dir = TempDir::new().unwrap();
    let job = two_realization_job(12, 3);
    {
        let store = SledResultStore::new(temp_dir.path()).unwrap();
        let output = MrdOrchestrator::new(
            TokioExecutor::new(2),
            Arc::new(StubComputer::new(&[(0, 1.0), (1, 2.0)])),
            settings(4),
        )
        .run(&job, &store)
        .await
        .unwrap();
        assert_eq!(output.summary.shape, (4, 4, 3));
    }

    let store = SledResultStore::new(temp_dir.path()).unwrap();
    let record = store.read_record(MRD_DATASET).unwrap().unwrap();
    assert_eq!(record.shape, [4, 4, 3]);
    assert!(record.values.iter().all(|v| (v - 1.4).abs() < 1e-12));
    assert_eq!(store.list_names().unwrap(), vec![MRD_DATASET.to_string()]);
}

#[tokio::test]
async fn failed_run_leaves_previous_dataset_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledResultStore::new(temp_dir.path()).unwrap();
    let previous = ndarray::Array3::from_elem((4, 4, 1), 7.0);
    store.write_dataset(MRD_DATASET, &previous).unwrap();

    let mut computer = StubComputer::new(&[(0, 1.0), (1, 2.0)]);
    computer.omit = vec![0];
    let err = MrdOrchestrator::new(TokioExecutor::new(2), Arc::new(computer), settings(4))
        .run(&two_realization_job(12, 1), &store)
        .await
        .unwrap_err();
    assert!(matches!(err, MrdError::ShapeMismatch(_)));
    assert_eq!(store.read_dataset(MRD_DATASET).unwrap().unwrap(), previous);
}

#[test]
fn corrupt_record_surfaces_as_storage_error() {
    let mut record = DatasetRecord::from_array("mrd", &ndarray::Array3::zeros((2, 2, 2)));
    record.shape = [3, 3, 3];
    let err: MrdError = record.to_array().unwrap_err().into();
    assert!(matches!(
        err,
        MrdError::Storage(StorageError::CorruptDataset { .. })
    ));
}
