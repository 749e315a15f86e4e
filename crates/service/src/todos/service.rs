use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument};

use super::model::{CreateTodo, Todo, UpdateTodo};
use crate::errors::ServiceError;
use crate::storage::TodoStorage;

/// Todo operations on top of a [`TodoStorage`].
///
/// Every call reloads the whole collection. Mutations hold `write_lock` across
/// load, modify and save so two requests in this process cannot overwrite each
/// other's changes. Separate processes sharing one file still race.
pub struct TodoService {
    storage: Arc<dyn TodoStorage>,
    write_lock: Mutex<()>,
}

impl TodoService {
    pub fn new(storage: Arc<dyn TodoStorage>) -> Self {
        Self { storage, write_lock: Mutex::new(()) }
    }

    pub async fn list(&self) -> Result<Vec<Todo>, ServiceError> {
        Ok(self.storage.load().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Todo, ServiceError> {
        self.storage
            .load()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ServiceError::not_found("todo"))
    }

    /// Append a new todo and return it. No deduplication by title.
    #[instrument(skip_all)]
    pub async fn create(&self, input: CreateTodo) -> Result<Todo, ServiceError> {
        let todo = Todo::new(input);
        let _guard = self.write_lock.lock().await;
        let mut todos = self.storage.load().await?;
        todos.push(todo.clone());
        self.storage.save(&todos).await?;
        info!(id = %todo.id, count = todos.len(), "created todo");
        Ok(todo)
    }

    /// Merge `patch` into the todo with `id`, keeping its position.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: UpdateTodo) -> Result<Todo, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut todos = self.storage.load().await?;
        let index = Self::position(&todos, id)?;
        patch.apply_to(&mut todos[index]);
        let updated = todos[index].clone();
        self.storage.save(&todos).await?;
        info!(id = %id, "updated todo");
        Ok(updated)
    }

    /// Remove the todo with `id`; the rest keep their relative order.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Todo, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let mut todos = self.storage.load().await?;
        let index = Self::position(&todos, id)?;
        let removed = todos.remove(index);
        self.storage.save(&todos).await?;
        info!(id = %id, remaining = todos.len(), "deleted todo");
        Ok(removed)
    }

    fn position(todos: &[Todo], id: &str) -> Result<usize, ServiceError> {
        todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ServiceError::not_found("todo"))
    }
}
