// lib/src/storage_engine/sled_storage.rs

use std::path::Path;

use async_trait::async_trait;
use log::{debug, error, info};
use models::errors::ClinicError;

use super::storage_engine::{StorageEngine, WriteBatch, WriteOp};
use crate::errors::Result;

/// Name of the sled tree the collections live in.
pub const CLINIC_TREE: &str = "clinic";

/// Opens (creating if needed) the sled database at `path`.
pub fn open_sled_db(path: &Path) -> Result<sled::Db> {
    if !path.exists() {
        info!("Creating database directory at {:?}", path);
        std::fs::create_dir_all(path).map_err(|e| {
            error!("Failed to create database directory at {:?}: {}", path, e);
            ClinicError::StorageError(format!("Failed to create database directory at {:?}: {}", path, e))
        })?;
    } else if !path.is_dir() {
        error!("Path {:?} exists but is not a directory", path);
        return Err(ClinicError::StorageError(format!("Path {:?} is not a directory", path)));
    }

    info!("Opening Sled database at {:?}", path);
    sled::Config::new()
        .path(path)
        .open()
        .map_err(|e| {
            error!("Failed to open Sled database at {:?}: {}", path, e);
            ClinicError::StorageError(format!(
                "Failed to open Sled database at {:?}: {}. Ensure the directory is accessible.",
                path, e
            ))
        })
}

/// Sled-backed implementation of [`StorageEngine`]. Values are UTF-8 JSON text.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStorage {
    pub fn new(db: sled::Db) -> Result<Self> {
        let tree = db.open_tree(CLINIC_TREE)?;
        Ok(Self { db, tree })
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::new(open_sled_db(path)?)
    }
}

#[async_trait]
impl StorageEngine for SledStorage {
    async fn insert(&self, key: &str, value: &str) -> Result<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(raw) => String::from_utf8(raw.to_vec())
                .map(Some)
                .map_err(|e| ClinicError::CorruptStore {
                    collection: key.to_string(),
                    reason: format!("stored bytes are not UTF-8: {}", e),
                }),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.tree.remove(key.as_bytes())?;
        Ok(())
    }

    async fn apply_batch(&self, batch: WriteBatch) -> Result<()> {
        debug!("Applying sled batch of {} ops", batch.len());
        let mut sled_batch = sled::Batch::default();
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { key, value } => sled_batch.insert(key.as_bytes(), value.as_bytes()),
                WriteOp::Remove { key } => sled_batch.remove(key.as_bytes()),
            }
        }
        self.tree.apply_batch(sled_batch)?;
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    fn get_type(&self) -> &'static str {
        "Sled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// sled's background flusher can hold the file lock briefly after the
    /// last handle is dropped.
    async fn reopen(path: &Path) -> SledStorage {
        for _ in 0..50 {
            match SledStorage::open(path) {
                Ok(storage) => return storage,
                Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        SledStorage::open(path).unwrap()
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let storage = SledStorage::open(dir.path()).unwrap();
            let mut batch = WriteBatch::new();
            batch.put("patients", "[]");
            batch.put("incidents", "[]");
            storage.apply_batch(batch).await.unwrap();
            storage.flush().await.unwrap();
        }

        let reopened = reopen(dir.path()).await;
        assert_eq!(reopened.retrieve("patients").await.unwrap(), Some("[]".to_string()));
        reopened.delete("patients").await.unwrap();
        assert_eq!(reopened.retrieve("patients").await.unwrap(), None);
        assert_eq!(reopened.get_type(), "Sled");
    }
}
