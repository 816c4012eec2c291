//! Persistence layer for the Result Store

use crate::error::StorageError;
use crate::store::{DatasetRecord, ResultStore};
use ndarray::Array3;
use std::path::Path;

const DATASET_TREE: &str = "datasets";

/// Sled-based implementation of ResultStore
pub struct SledResultStore {
    datasets: sled::Tree,
    db: sled::Db,
}

fn sled_error(context: &str, e: sled::Error) -> StorageError {
    StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("{}: {}", context, e),
    ))
}

impl SledResultStore {
    /// Open (or create) a store at the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| sled_error("Failed to open sled database", e))?;
        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let datasets = db
            .open_tree(DATASET_TREE)
            .map_err(|e| sled_error("Failed to open dataset tree", e))?;
        Ok(Self { datasets, db })
    }

    /// Names of every stored dataset, sorted.
    pub fn list_names(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for item in self.datasets.iter() {
            let (key, _) = item.map_err(|e| sled_error("Failed to iterate datasets", e))?;
            names.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(names)
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| sled_error("Failed to flush database", e))?;
        Ok(())
    }
}

impl ResultStore for SledResultStore {
    fn write_dataset(&self, name: &str, array: &Array3<f64>) -> Result<(), StorageError> {
        let record = DatasetRecord::from_array(name, array);
        let value = bincode::serialize(&record).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to serialize dataset {}: {}", name, e),
            ))
        })?;
        self.datasets
            .insert(name.as_bytes(), value)
            .map_err(|e| sled_error("Failed to write dataset", e))?;
        self.flush()
    }

    fn read_record(&self, name: &str) -> Result<Option<DatasetRecord>, StorageError> {
        match self
            .datasets
            .get(name.as_bytes())
            .map_err(|e| sled_error("Failed to read dataset", e))?
        {
            Some(value) => {
                let record: DatasetRecord =
                    bincode::deserialize(&value).map_err(|e| StorageError::CorruptDataset {
                        name: name.to_string(),
                        reason: e.to_string(),
                    })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
