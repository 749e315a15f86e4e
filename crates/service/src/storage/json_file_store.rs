use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Result, StorageError, TodoStorage};
use crate::todos::Todo;

/// Storage backend that persists the todo collection as a JSON array in one file.
///
/// Every call goes to disk; nothing is cached between requests.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Create the document as an empty array unless another writer got there first.
    async fn initialize(&self) -> Result<()> {
        self.ensure_parent().await?;
        match fs::OpenOptions::new().write(true).create_new(true).open(&self.path).await {
            Ok(mut file) => {
                info!(path = %self.path.display(), "storage file does not exist, initializing empty collection");
                file.write_all(b"[]").await?;
                file.flush().await?;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a uniquely named temporary sibling first, then rename over the target.
    async fn write_document(&self, bytes: Vec<u8>) -> Result<()> {
        self.ensure_parent().await?;
        let temp_path = self.path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        let written = match fs::write(&temp_path, bytes).await {
            Ok(()) => fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStorage for JsonFileStorage {
    async fn load(&self) -> Result<Vec<Todo>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.initialize().await?;
                fs::read_to_string(&self.path).await?
            }
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            debug!(path = %self.path.display(), "storage file is empty");
            return Ok(Vec::new());
        }

        let todos: Vec<Todo> = serde_json::from_str(&contents)?;
        if let Some(pos) = todos.iter().position(|t| t.id.is_empty()) {
            return Err(StorageError::Invalid(format!("todo at index {pos} has an empty id")));
        }
        debug!(count = todos.len(), "loaded todos");
        Ok(todos)
    }

    async fn save(&self, todos: &[Todo]) -> Result<()> {
        let data = serde_json::to_vec(todos)?;
        self.write_document(data).await?;
        debug!(count = todos.len(), path = %self.path.display(), "saved todos");
        Ok(())
    }
}
