use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use crate::{
    application::{todo_service::{TodoService, TodoStats}, validation::TodoRequest},
    domain::todo::{Priority, Todo, TodoId},
    http::types::{ApiError, DescriptionSearch, HealthBody, TitleSearch},
};

pub const BASE_PATH: &str = "/api/todos";

const MAX_RECENT_DAYS: u32 = 365;

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

/// Todo routes, relative to [`BASE_PATH`].
pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(list_todos::<S>).post(create_todo::<S>))
        .route("/health", get(health))
        .route("/stats", get(stats::<S>))
        .route("/search", get(search_by_title::<S>))
        .route("/search/description", get(search_by_description::<S>))
        .route("/status/:completed", get(list_by_status::<S>))
        .route("/priority/:priority", get(list_by_priority::<S>))
        .route("/priority/:priority/status/:completed", get(list_by_priority_and_status::<S>))
        .route("/high-priority/incomplete", get(list_high_priority_incomplete::<S>))
        .route("/recent/:days", get(list_recent::<S>))
        .route("/:id", get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .route("/:id/complete", patch(complete_todo::<S>))
        .route("/:id/incomplete", patch(reopen_todo::<S>))
        .with_state(state)
}

type ApiResult<T> = Result<T, ApiError>;

async fn create_todo<S: TodoService>(State(state): State<AppState<S>>, payload: Result<Json<TodoRequest>, JsonRejection>) -> ApiResult<(StatusCode, Json<Todo>)> {
    let draft = body(payload)?.validate()?;
    let todo = state.service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.list().await?))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    found(state.service.get(id).await?)
}

async fn update_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>, payload: Result<Json<TodoRequest>, JsonRejection>) -> ApiResult<Json<Todo>> {
    let draft = body(payload)?.validate()?;
    let id = parse_id(&id)?;
    found(state.service.update(id, draft).await?)
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if state.service.delete(id).await? { Ok(StatusCode::NO_CONTENT) } else { Err(ApiError::NotFound) }
}

async fn complete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    found(state.service.set_completed(id, true).await?)
}

async fn reopen_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> ApiResult<Json<Todo>> {
    let id = parse_id(&id)?;
    found(state.service.set_completed(id, false).await?)
}

async fn list_by_status<S: TodoService>(State(state): State<AppState<S>>, Path(completed): Path<bool>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.list_by_status(completed).await?))
}

async fn list_by_priority<S: TodoService>(State(state): State<AppState<S>>, Path(priority): Path<i64>) -> ApiResult<Json<Vec<Todo>>> {
    let priority = parse_priority(priority)?;
    Ok(Json(state.service.list_by_priority(priority).await?))
}

async fn list_by_priority_and_status<S: TodoService>(State(state): State<AppState<S>>, Path((priority, completed)): Path<(i64, bool)>) -> ApiResult<Json<Vec<Todo>>> {
    let priority = parse_priority(priority)?;
    Ok(Json(state.service.list_by_priority_and_status(priority, completed).await?))
}

async fn search_by_title<S: TodoService>(State(state): State<AppState<S>>, Query(params): Query<TitleSearch>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.search_by_title(&params.title).await?))
}

async fn search_by_description<S: TodoService>(State(state): State<AppState<S>>, Query(params): Query<DescriptionSearch>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.search_by_description(&params.description).await?))
}

async fn list_high_priority_incomplete<S: TodoService>(State(state): State<AppState<S>>) -> ApiResult<Json<Vec<Todo>>> {
    Ok(Json(state.service.list_high_priority_incomplete().await?))
}

async fn list_recent<S: TodoService>(State(state): State<AppState<S>>, Path(days): Path<i64>) -> ApiResult<Json<Vec<Todo>>> {
    let days = u32::try_from(days)
        .ok()
        .filter(|d| (1..=MAX_RECENT_DAYS).contains(d))
        .ok_or_else(|| ApiError::BadRequest(format!("days must be between 1 and {MAX_RECENT_DAYS}")))?;
    Ok(Json(state.service.list_created_within_days(days).await?))
}

async fn stats<S: TodoService>(State(state): State<AppState<S>>) -> ApiResult<Json<TodoStats>> {
    Ok(Json(state.service.stats().await?))
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "UP".into(), message: "Todo API is running".into() })
}

fn body(payload: Result<Json<TodoRequest>, JsonRejection>) -> ApiResult<TodoRequest> {
    payload.map(|Json(request)| request).map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn found(todo: Option<Todo>) -> ApiResult<Json<Todo>> { todo.map(Json).ok_or(ApiError::NotFound) }

// A malformed id cannot name a stored todo, so it is reported as a miss.
fn parse_id(s: &str) -> ApiResult<TodoId> { uuid::Uuid::parse_str(s).map(TodoId).map_err(|_| ApiError::NotFound) }

fn parse_priority(level: i64) -> ApiResult<Priority> {
    Priority::try_from(level).map_err(|_| ApiError::BadRequest("priority must be between 1 and 3".into()))
}
