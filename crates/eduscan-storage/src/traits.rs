//! Storage trait definitions

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value store for small pieces of runtime state
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    /// Get a value from the store
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Set a value in the store
    async fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Delete a value from the store; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// List keys matching a prefix
    async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>>;
}
