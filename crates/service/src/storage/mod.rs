//! Storage abstractions for service layer
//!
//! The whole todo collection is loaded and saved as a single document;
//! there are no partial writes and no indexing.

mod json_file_store;
mod memory_store;

pub use json_file_store::JsonFileStorage;
pub use memory_store::MemoryStorage;

use async_trait::async_trait;

use crate::todos::Todo;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Trait abstraction for todo collection storage.
/// Implementations can be file-backed, in-memory, or a real database.
#[async_trait]
pub trait TodoStorage: Send + Sync {
    /// Load the full collection. A missing document is initialized empty.
    async fn load(&self) -> Result<Vec<Todo>>;

    /// Overwrite the persisted document with `todos`.
    async fn save(&self, todos: &[Todo]) -> Result<()>;
}
