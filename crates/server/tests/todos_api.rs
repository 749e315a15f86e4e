use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::storage::{JsonFileStorage, MemoryStorage, TodoStorage};
use service::todos::TodoService;
use tower::ServiceExt;

use server::routes::{self, AppState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn app_with(storage: Arc<dyn TodoStorage>) -> Router {
    routes::build_router(AppState::new(TodoService::new(storage)), cors())
}

fn app() -> Router {
    app_with(Arc::new(MemoryStorage::new()))
}

fn json_request(method: &str, uri: &str, body: Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?)
}

fn empty_request(method: &str, uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method(method).uri(uri).body(Body::empty())?)
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Vec<u8>)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, bytes.to_vec()))
}

async fn create(app: &Router, body: Value) -> anyhow::Result<String> {
    let (status, bytes) = send(app, json_request("POST", "/todos", body)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    let v: Value = serde_json::from_slice(&bytes)?;
    let id = v["id"].as_str().unwrap_or_default().to_string();
    assert!(!id.is_empty());
    Ok(id)
}

#[tokio::test]
async fn create_then_get() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "Buy milk", "description": "2%"})).await?;
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    let (status, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo, json!({"id": id, "title": "Buy milk", "description": "2%", "completed": false}));
    Ok(())
}

#[tokio::test]
async fn create_body_is_only_the_id() -> anyhow::Result<()> {
    let app = app();
    let (status, bytes) = send(&app, json_request("POST", "/todos", json!({"title": "t"}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    let v: Value = serde_json::from_slice(&bytes)?;
    let obj = v.as_object().expect("object body");
    assert_eq!(obj.len(), 1);
    assert!(obj.contains_key("id"));
    Ok(())
}

#[tokio::test]
async fn create_ignores_client_completed_flag() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "t", "completed": true})).await?;
    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["completed"], false);
    Ok(())
}

#[tokio::test]
async fn create_without_body_defaults_fields() -> anyhow::Result<()> {
    let app = app();
    let (status, bytes) = send(&app, empty_request("POST", "/todos")?).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = serde_json::from_slice::<Value>(&bytes)?["id"].as_str().unwrap_or_default().to_string();

    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["title"], "");
    assert_eq!(todo["description"], "");
    assert_eq!(todo["completed"], false);
    Ok(())
}

#[tokio::test]
async fn list_returns_all_in_order() -> anyhow::Result<()> {
    let app = app();
    let (status, bytes) = send(&app, empty_request("GET", "/todos")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&bytes)?, json!([]));

    let a = create(&app, json!({"title": "a"})).await?;
    let b = create(&app, json!({"title": "a"})).await?;
    let (_, bytes) = send(&app, empty_request("GET", "/todos")?).await?;
    let list: Vec<Value> = serde_json::from_slice(&bytes)?;
    let ids: Vec<&str> = list.iter().filter_map(|t| t["id"].as_str()).collect();
    assert_eq!(ids, vec![a.as_str(), b.as_str()]);
    Ok(())
}

#[tokio::test]
async fn get_unknown_is_404() -> anyhow::Result<()> {
    let (status, bytes) = send(&app(), empty_request("GET", "/todos/does-not-exist")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(bytes.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_completed_then_get() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "Buy milk", "description": "2%"})).await?;

    let (status, bytes) = send(&app, json_request("PUT", &format!("/todos/{id}"), json!({"completed": true}))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());

    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["description"], "2%");
    Ok(())
}

#[tokio::test]
async fn update_false_does_not_clear_completed() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "t"})).await?;
    send(&app, json_request("PUT", &format!("/todos/{id}"), json!({"completed": true}))?).await?;
    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/todos/{id}"), json!({"completed": false, "title": "renamed"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["completed"], true);
    assert_eq!(todo["title"], "renamed");
    Ok(())
}

#[tokio::test]
async fn update_unknown_is_404() -> anyhow::Result<()> {
    let (status, _) = send(&app(), json_request("PUT", "/todos/nope", json!({"title": "x"}))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_then_get_is_404() -> anyhow::Result<()> {
    let app = app();
    let a = create(&app, json!({"title": "a"})).await?;
    let b = create(&app, json!({"title": "b"})).await?;
    let c = create(&app, json!({"title": "c"})).await?;

    let (status, bytes) = send(&app, empty_request("DELETE", &format!("/todos/{b}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.is_empty());

    let (status, _) = send(&app, empty_request("GET", &format!("/todos/{b}"))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, empty_request("DELETE", &format!("/todos/{b}"))?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bytes) = send(&app, empty_request("GET", "/todos")?).await?;
    let list: Vec<Value> = serde_json::from_slice(&bytes)?;
    let ids: Vec<&str> = list.iter().filter_map(|t| t["id"].as_str()).collect();
    assert_eq!(ids, vec![a.as_str(), c.as_str()]);
    Ok(())
}

#[tokio::test]
async fn unknown_routes_and_methods_are_404() -> anyhow::Result<()> {
    let app = app();
    for (method, uri) in [
        ("GET", "/unknown-route"),
        ("GET", "/"),
        ("PATCH", "/todos"),
        ("DELETE", "/todos"),
        ("POST", "/todos/some-id"),
        ("GET", "/todos/a/b"),
    ] {
        let (status, bytes) = send(&app, empty_request(method, uri)?).await?;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert!(bytes.is_empty(), "{method} {uri}");
    }
    Ok(())
}

#[tokio::test]
async fn health_and_openapi() -> anyhow::Result<()> {
    let app = app();
    let (status, bytes) = send(&app, empty_request("GET", "/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&bytes)?, json!({"status": "ok"}));

    let (status, bytes) = send(&app, empty_request("GET", "/api-docs/openapi.json")?).await?;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_slice(&bytes)?;
    assert!(doc["paths"]["/todos/{id}"].is_object());
    Ok(())
}

#[tokio::test]
async fn corrupt_document_is_500() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("todo_api_{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join("todos.json");
    tokio::fs::write(&path, "not json").await?;
    let app = app_with(Arc::new(JsonFileStorage::new(&path)));

    let (status, bytes) = send(&app, empty_request("GET", "/todos")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_slice(&bytes)?;
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, _) = send(&app, json_request("POST", "/todos", json!({"title": "x"}))?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(tokio::fs::read_to_string(&path).await?, "not json");

    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn failed_write_is_500_and_state_unchanged() -> anyhow::Result<()> {
    let storage = Arc::new(MemoryStorage::new());
    let app = app_with(storage.clone());
    let id = create(&app, json!({"title": "keep"})).await?;

    storage.fail_saves(true);
    let (status, _) = send(&app, empty_request("DELETE", &format!("/todos/{id}"))?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    storage.fail_saves(false);
    let (status, _) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_keeps_fields_next_to_a_mistyped_one() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "Buy milk", "description": 2})).await?;

    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["title"], "Buy milk");
    assert_eq!(todo["description"], "");
    Ok(())
}

#[tokio::test]
async fn update_keeps_fields_next_to_a_mistyped_one() -> anyhow::Result<()> {
    let app = app();
    let id = create(&app, json!({"title": "t", "description": "d"})).await?;

    let (status, _) = send(
        &app,
        json_request("PUT", &format!("/todos/{id}"), json!({"title": "renamed", "completed": "yes"}))?,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, bytes) = send(&app, empty_request("GET", &format!("/todos/{id}"))?).await?;
    let todo: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(todo["title"], "renamed");
    assert_eq!(todo["description"], "d");
    assert_eq!(todo["completed"], false);
    Ok(())
}
