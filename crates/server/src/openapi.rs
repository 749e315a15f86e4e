use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct TodoDoc {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

#[derive(ToSchema)]
pub struct CreateTodoDoc {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Empty strings and `completed: false` leave the stored value as is.
#[derive(ToSchema)]
pub struct UpdateTodoDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(ToSchema)]
pub struct CreatedTodoDoc { pub id: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::todos::list_todos,
        crate::routes::todos::get_todo,
        crate::routes::todos::create_todo,
        crate::routes::todos::update_todo,
        crate::routes::todos::delete_todo,
    ),
    components(
        schemas(
            HealthResponse,
            TodoDoc,
            CreateTodoDoc,
            UpdateTodoDoc,
            CreatedTodoDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "todos")
    )
)]
pub struct ApiDoc;
