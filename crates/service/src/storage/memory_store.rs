use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Result, StorageError, TodoStorage};
use crate::todos::Todo;

/// In-memory storage, used as a fake in tests.
///
/// `fail_saves` makes every subsequent `save` return an IO error without
/// touching the held collection.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    todos: RwLock<Vec<Todo>>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self { todos: RwLock::new(todos), ..Self::default() }
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }
}

#[async_trait]
impl TodoStorage for MemoryStorage {
    async fn load(&self) -> Result<Vec<Todo>> {
        Ok(self.todos.read().await.clone())
    }

    async fn save(&self, todos: &[Todo]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated write failure",
            )));
        }
        *self.todos.write().await = todos.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
