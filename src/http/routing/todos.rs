use axum::{extract::{Path, State}, routing::{delete, get, put}, Json, Router};
use ::http::StatusCode;

use crate::{
    application::todo_service::{BulkMessage, Saved, TodoService},
    domain::todo::{NewTodo, Todo, TodoId},
    http::types::{ApiError, Data},
};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/todos", get(list_todos::<S>).post(store_todo::<S>))
        .route("/todos/:id", get(show_todo::<S>).put(update_todo::<S>).patch(update_todo::<S>).delete(destroy_todo::<S>))
        .route("/mark-all-complete/:id", put(mark_all_complete::<S>).patch(mark_all_complete::<S>))
        .route("/mark-all-incomplete/:id", put(mark_all_incomplete::<S>).patch(mark_all_incomplete::<S>))
        .route("/remove-all/:id", delete(remove_all_items::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<Data<Vec<Todo>>>, ApiError> {
    let todos = state.service.list().await?;
    Ok(Json(Data { data: todos }))
}

async fn store_todo<S: TodoService>(State(state): State<AppState<S>>, Json(payload): Json<NewTodo>) -> Result<Json<Saved>, ApiError> {
    Ok(Json(state.service.store(payload).await?))
}

async fn show_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Data<Todo>>, ApiError> {
    let todo = state.service.show(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(Data { data: todo }))
}

/// Binds the todo and does nothing else; any request body is ignored.
async fn update_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.service.update(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(StatusCode::OK)
}

async fn destroy_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<Saved>, ApiError> {
    let saved = state.service.destroy(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(saved))
}

async fn mark_all_complete<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<BulkMessage>, ApiError> {
    let msg = state.service.mark_all_complete(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(msg))
}

async fn mark_all_incomplete<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<BulkMessage>, ApiError> {
    let msg = state.service.mark_all_incomplete(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(msg))
}

async fn remove_all_items<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<BulkMessage>, ApiError> {
    let msg = state.service.remove_all_items(bind_id(&id)?).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(msg))
}

// A malformed id can never match a row, so it is reported the same way as a missing one.
fn bind_id(s: &str) -> Result<TodoId, ApiError> { s.parse().map_err(|_| ApiError::NotFound) }
