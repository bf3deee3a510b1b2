// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;

use crate::errors::Result;

/// One staged write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put { key: String, value: String },
    Remove { key: String },
}

/// A group of writes that an engine must apply all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.ops.push(WriteOp::Put { key: key.into(), value: value.into() });
    }

    pub fn remove(&mut self, key: impl Into<String>) {
        self.ops.push(WriteOp::Remove { key: key.into() });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// String key-value storage holding the serialized collections.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    async fn insert(&self, key: &str, value: &str) -> Result<()>;
    async fn retrieve(&self, key: &str) -> Result<Option<String>>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Applies every op in `batch` atomically: readers see all of it or none of it.
    async fn apply_batch(&self, batch: WriteBatch) -> Result<()>;
    async fn flush(&self) -> Result<()>;
    fn get_type(&self) -> &'static str;
}
