use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use service::todos::{CreateTodo, Todo, UpdateTodo};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::routes::AppState;

/// Body of a successful create.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedTodo {
    pub id: String,
}

#[utoipa::path(
    get, path = "/todos", tag = "todos",
    responses(
        (status = 200, description = "All todos in insertion order", body = [crate::openapi::TodoDoc]),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list().await?;
    debug!(count = todos.len(), "list todos");
    Ok(Json(todos))
}

#[utoipa::path(
    get, path = "/todos/{id}", tag = "todos",
    params(("id" = String, Path, description = "Todo id")),
    responses(
        (status = 200, description = "The todo", body = crate::openapi::TodoDoc),
        (status = 404, description = "No todo with this id")
    )
)]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    Ok(Json(state.todos.get(&id).await?))
}

/// A missing or unreadable body counts as `{}`.
#[utoipa::path(
    post, path = "/todos", tag = "todos",
    request_body = crate::openapi::CreateTodoDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CreatedTodoDoc),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Option<Json<CreateTodo>>,
) -> Result<(StatusCode, Json<CreatedTodo>), ApiError> {
    let input = payload.map(|Json(p)| p).unwrap_or_default();
    let todo = state.todos.create(input).await?;
    info!(id = %todo.id, title = %todo.title, "todo_create_request");
    Ok((StatusCode::CREATED, Json(CreatedTodo { id: todo.id })))
}

#[utoipa::path(
    put, path = "/todos/{id}", tag = "todos",
    params(("id" = String, Path, description = "Todo id")),
    request_body = crate::openapi::UpdateTodoDoc,
    responses(
        (status = 200, description = "Updated, empty body"),
        (status = 404, description = "No todo with this id")
    )
)]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<UpdateTodo>>,
) -> Result<StatusCode, ApiError> {
    let patch = payload.map(|Json(p)| p).unwrap_or_default();
    state.todos.update(&id, patch).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete, path = "/todos/{id}", tag = "todos",
    params(("id" = String, Path, description = "Todo id")),
    responses(
        (status = 200, description = "Deleted, empty body"),
        (status = 404, description = "No todo with this id")
    )
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.todos.delete(&id).await?;
    Ok(StatusCode::OK)
}
