use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use tasks_api::v1::{NewTodo, Todo, TodoFilter, TodoPatch};
use tracing::info;

use crate::{
    db,
    error::ApiError,
    extract::{Body, Path, Query},
    AppState,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/:id", patch(update_todo).delete(delete_todo))
        .route("/todos/:id/toggle", patch(toggle_todo))
}

#[derive(Debug, Serialize)]
struct Ack {
    ok: bool,
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TodoFilter>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let mut session = db::session(&state.db).await?;
    let todos = db::list(&mut session, filter).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    Body(todo): Body<NewTodo>,
) -> Result<Json<Todo>, ApiError> {
    todo.validate()?;

    let mut session = db::session(&state.db).await?;
    let todo = db::insert(&mut session, todo).await?;

    info!(
        id = todo.id,
        title = %todo.title,
        "created todo"
    );

    Ok(Json(todo))
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Body(patch): Body<TodoPatch>,
) -> Result<Json<Todo>, ApiError> {
    patch.validate()?;

    let mut session = db::session(&state.db).await?;
    let mut todo = db::get(&mut session, id).await?;

    info!(id, ?patch, "updating todo");

    patch.apply(&mut todo);
    let todo = db::update(&mut session, &todo).await?;

    Ok(Json(todo))
}

async fn toggle_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ApiError> {
    let mut session = db::session(&state.db).await?;
    let mut todo = db::get(&mut session, id).await?;

    todo.toggle();
    let todo = db::update(&mut session, &todo).await?;

    info!(
        id = todo.id,
        is_completed = todo.is_completed,
        "toggled todo"
    );

    Ok(Json(todo))
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Ack>, ApiError> {
    let mut session = db::session(&state.db).await?;
    db::delete(&mut session, id).await?;

    info!(id, "deleted todo");

    Ok(Json(Ack { ok: true }))
}
