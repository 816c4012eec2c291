//! Result Store
//!
//! Named slots for dense result arrays. The orchestrator writes the final
//! mean rate distribution here once a run has fully succeeded.

pub mod persistence;

pub use persistence::SledResultStore;

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use ndarray::Array3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored form of a 3-D array: shape plus values in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub name: String,
    pub shape: [usize; 3],
    pub values: Vec<f64>,
    pub created_at: DateTime<Utc>,
}

impl DatasetRecord {
    pub fn from_array(name: &str, array: &Array3<f64>) -> Self {
        let (a, b, c) = array.dim();
        Self {
            name: name.to_string(),
            shape: [a, b, c],
            values: array.iter().copied().collect(),
            created_at: Utc::now(),
        }
    }

    pub fn to_array(&self) -> Result<Array3<f64>, StorageError> {
        let [a, b, c] = self.shape;
        Array3::from_shape_vec((a, b, c), self.values.clone()).map_err(|e| {
            StorageError::CorruptDataset {
                name: self.name.clone(),
                reason: e.to_string(),
            }
        })
    }
}

/// Result store interface
pub trait ResultStore: Send + Sync {
    /// Write (or overwrite) the dataset `name`.
    fn write_dataset(&self, name: &str, array: &Array3<f64>) -> Result<(), StorageError>;

    fn read_record(&self, name: &str) -> Result<Option<DatasetRecord>, StorageError>;

    fn read_dataset(&self, name: &str) -> Result<Option<Array3<f64>>, StorageError> {
        self.read_record(name)?
            .map(|record| record.to_array())
            .transpose()
    }
}

/// In-memory store, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    datasets: Mutex<HashMap<String, DatasetRecord>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.datasets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.lock().is_empty()
    }
}

impl ResultStore for MemoryResultStore {
    fn write_dataset(&self, name: &str, array: &Array3<f64>) -> Result<(), StorageError> {
        self.datasets
            .lock()
            .insert(name.to_string(), DatasetRecord::from_array(name, array));
        Ok(())
    }

    fn read_record(&self, name: &str) -> Result<Option<DatasetRecord>, StorageError> {
        Ok(self.datasets.lock().get(name).cloned())
    }
}
