// lib/src/storage_engine/record_store.rs

// Typed access to the collections kept in a `StorageEngine`. Every
// collection is one key holding a JSON array; a save always replaces the
// whole array.

use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use models::errors::ClinicError;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::storage_engine::{StorageEngine, WriteBatch};
use crate::errors::Result;

/// The named entries of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Patients,
    Incidents,
    /// The signed-in user, kept so a restart preserves the login.
    ActiveUser,
}

impl Collection {
    pub fn key(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Patients => "patients",
            Collection::Incidents => "incidents",
            Collection::ActiveUser => "user",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// What a read found under a collection key.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome<T> {
    /// Nothing stored yet.
    Empty,
    Parsed(T),
    /// Something is stored but it doesn't decode.
    Corrupt(String),
}

impl<T> LoadOutcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, LoadOutcome::Empty)
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt(_))
    }

    /// Empty becomes `None`; corrupt content becomes `ClinicError::CorruptStore`.
    pub fn into_result(self, collection: Collection) -> Result<Option<T>> {
        match self {
            LoadOutcome::Empty => Ok(None),
            LoadOutcome::Parsed(value) => Ok(Some(value)),
            LoadOutcome::Corrupt(reason) => Err(ClinicError::CorruptStore {
                collection: collection.key().to_string(),
                reason,
            }),
        }
    }
}

#[derive(Clone)]
pub struct RecordStore {
    engine: Arc<dyn StorageEngine>,
}

impl RecordStore {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Reads and decodes one entry. Storage failures are errors; bad content is `Corrupt`.
    pub async fn load_value<T: DeserializeOwned>(&self, collection: Collection) -> Result<LoadOutcome<T>> {
        let raw = match self.engine.retrieve(collection.key()).await {
            Ok(raw) => raw,
            Err(ClinicError::CorruptStore { reason, .. }) => {
                warn!("Collection '{}' holds unreadable bytes: {}", collection, reason);
                return Ok(LoadOutcome::Corrupt(reason));
            }
            Err(e) => return Err(e),
        };
        let Some(raw) = raw else {
            debug!("Collection '{}' is empty", collection);
            return Ok(LoadOutcome::Empty);
        };
        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Ok(LoadOutcome::Parsed(value)),
            Err(e) => {
                warn!("Collection '{}' failed to decode: {}", collection, e);
                Ok(LoadOutcome::Corrupt(e.to_string()))
            }
        }
    }

    /// Reads a collection as a sequence of records.
    pub async fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<LoadOutcome<Vec<T>>> {
        self.load_value::<Vec<T>>(collection).await
    }

    /// Like [`RecordStore::load`], but an absent collection is an empty vector and
    /// a corrupt one is an error.
    pub async fn load_records<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        Ok(self.load::<T>(collection).await?.into_result(collection)?.unwrap_or_default())
    }

    /// Overwrites the whole collection with `records`.
    pub async fn save<T: Serialize>(&self, collection: Collection, records: &[T]) -> Result<()> {
        self.save_value(collection, records).await
    }

    pub async fn save_value<T: Serialize + ?Sized>(&self, collection: Collection, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)?;
        self.engine.insert(collection.key(), &encoded).await.map_err(|e| {
            error!("Failed to save collection '{}': {}", collection, e);
            e
        })?;
        debug!("Saved collection '{}' ({} bytes)", collection, encoded.len());
        Ok(())
    }

    pub async fn remove(&self, collection: Collection) -> Result<()> {
        self.engine.delete(collection.key()).await
    }

    /// Starts staging writes that will land together.
    pub fn transaction(&self) -> StoreTransaction<'_> {
        StoreTransaction { store: self, batch: WriteBatch::new(), touched: Vec::new() }
    }
}

/// Writes to several collections committed through one atomic batch.
pub struct StoreTransaction<'a> {
    store: &'a RecordStore,
    batch: WriteBatch,
    touched: Vec<Collection>,
}

impl StoreTransaction<'_> {
    pub fn put<T: Serialize>(mut self, collection: Collection, records: &[T]) -> Result<Self> {
        let encoded = serde_json::to_string(records)?;
        self.batch.put(collection.key(), encoded);
        self.touched.push(collection);
        Ok(self)
    }

    pub fn remove(mut self, collection: Collection) -> Self {
        self.batch.remove(collection.key());
        self.touched.push(collection);
        self
    }

    pub async fn commit(self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let touched = self.touched;
        self.store.engine.apply_batch(self.batch).await.map_err(|e| {
            error!("Transaction over {:?} failed: {}", touched, e);
            ClinicError::TransactionError(e.to_string())
        })?;
        debug!("Committed transaction over {:?}", touched);
        Ok(())
    }
}
