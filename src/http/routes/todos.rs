use std::num::IntErrorKind;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::application::todo_repository::TodoRepository;
use crate::domain::page::{PageRequest, TodoPage, DEFAULT_PAGE, DEFAULT_SERVER_LIMIT};
use crate::domain::todo::TodoId;
use crate::http::types::{ApiError, ContentBody, TodoEnvelope};

#[derive(Clone)]
pub struct AppState<R: TodoRepository> {
    pub repository: R,
    /// Page size used when `limit` is absent.
    pub default_limit: u32,
}

impl<R: TodoRepository> AppState<R> {
    pub fn new(repository: R) -> Self { Self { repository, default_limit: DEFAULT_SERVER_LIMIT } }
}

pub fn router<R: TodoRepository + Clone>(state: AppState<R>) -> Router {
    Router::new()
        .route("/api/todos", get(list_todos::<R>).post(create_todo::<R>).fallback(method_not_allowed))
        .route("/api/todos/:id", delete(delete_todo::<R>).patch(update_todo::<R>).fallback(method_not_allowed))
        .route("/api/todos/:id/toggle-done", put(toggle_done::<R>).fallback(method_not_allowed))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

async fn list_todos<R: TodoRepository>(
    State(state): State<AppState<R>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<TodoPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let page = parse_positive("page", query.page.as_deref(), DEFAULT_PAGE)?;
    let limit = parse_positive("limit", query.limit.as_deref(), state.default_limit)?;
    let request = PageRequest::new(page, limit).map_err(|e| ApiError::bad_request(e.to_string()))?;
    Ok(Json(state.repository.get(request).await?))
}

async fn create_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoEnvelope>), ApiError> {
    let body = parse_content(body, "You need to provide a content to create a TODO")?;
    let todo = state.repository.create_by_content(body.content).await?;
    Ok((StatusCode::CREATED, Json(TodoEnvelope { todo })))
}

async fn update_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    let body = parse_content(body, "You need to provide a content to update a TODO")?;
    let todo = state.repository.update_content(id, body.content).await?;
    Ok(Json(TodoEnvelope { todo }))
}

async fn toggle_done<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<TodoEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    let todo = state.repository.toggle_done(id).await?;
    Ok(Json(TodoEnvelope { todo }))
}

async fn delete_todo<R: TodoRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.repository.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Absent or blank means `default`; anything else must be an integer of at least 1.
fn parse_positive(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else { return Ok(default) };
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        // Integers past u32 saturate; they still mean "as many as there are".
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u32::MAX),
        _ if raw.parse::<f64>().is_ok() => Err(ApiError::bad_request(format!("`{name}` must be a positive number"))),
        _ => Err(ApiError::bad_request(format!("`{name}` must be a number"))),
    }
}

fn parse_content(body: Result<Json<Value>, JsonRejection>, message: &str) -> Result<ContentBody, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::bad_request(message).with_description(e.body_text()))?;
    let body: ContentBody = serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(message).with_description(e.to_string()))?;
    body.validate().map_err(|errors| {
        let detail = serde_json::to_value(&errors).unwrap_or(Value::Null);
        ApiError::bad_request(message).with_description(detail)
    })?;
    Ok(body)
}

fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("You must provide a valid ID"))
}
