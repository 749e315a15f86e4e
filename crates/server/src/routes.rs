use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;
use service::todos::TodoService;

use crate::openapi::ApiDoc;

pub mod todos;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<TodoService>,
}

impl AppState {
    pub fn new(todos: TodoService) -> Self {
        Self { todos: Arc::new(todos) }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Any unknown route, or unsupported method on a known one.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Build the full application router
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let todo_routes = Router::new()
        .route(
            "/todos",
            get(todos::list_todos)
                .post(todos::create_todo)
                .fallback(not_found),
        )
        .route(
            "/todos/:id",
            get(todos::get_todo)
                .put(todos::update_todo)
                .delete(todos::delete_todo)
                .fallback(not_found),
        );

    let public = Router::new()
        .route("/health", get(health).fallback(not_found))
        .route("/api-docs/openapi.json", get(openapi_json).fallback(not_found));

    public
        .merge(todo_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
