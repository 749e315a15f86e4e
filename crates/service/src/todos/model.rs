use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A single todo item as persisted and returned over the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Create input. Missing or mistyped fields become empty strings; unknown fields are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTodo {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

/// Partial update. `None` means the field was not supplied, or had the wrong type.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub completed: Option<bool>,
}

/// Read any JSON value; keep it only if it has the field's type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

impl Todo {
    /// Build a fresh, not yet completed todo with a new v4 UUID.
    pub fn new(input: CreateTodo) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            completed: false,
        }
    }
}

impl UpdateTodo {
    /// Merge into `todo`, taking a supplied value only when it is truthy:
    /// a non-empty string, or `true`. `completed: false` therefore never
    /// clears a completed todo, and an empty title keeps the old one.
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            todo.title = title;
        }
        if let Some(description) = self.description.filter(|d| !d.is_empty()) {
            todo.description = description;
        }
        if self.completed == Some(true) {
            todo.completed = true;
        }
    }
}
