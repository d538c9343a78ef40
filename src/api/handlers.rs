//! API Handlers
//!
//! HTTP request handlers for each todo service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::{CacheService, CacheSettings, Cancellation, DistributedStore};
use crate::error::{ApiError, ApiResult};
use crate::models::{CreateTodoRequest, HealthResponse, StatsResponse};
use crate::todos::{
    CacheInvalidationHandler, EventPublisher, Todo, TodoEvent, TodoRepository, TODOS_CACHE_KEY,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside coordinator
    pub cache: Arc<CacheService>,
    /// Todo storage
    pub todos: Arc<TodoRepository>,
    /// Domain event dispatch
    pub events: EventPublisher,
    /// Fires when the server shuts down
    pub shutdown: Cancellation,
}

impl AppState {
    /// Wires the coordinator, repository and invalidation handler together.
    pub fn new(store: Arc<dyn DistributedStore>, settings: CacheSettings) -> Self {
        let cache = Arc::new(CacheService::new(store, settings));
        let events = EventPublisher::new()
            .subscribe(Arc::new(CacheInvalidationHandler::new(cache.clone())));

        Self {
            cache,
            todos: Arc::new(TodoRepository::new()),
            events,
            shutdown: Cancellation::never(),
        }
    }

    /// Cancels in-flight cache work when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: Cancellation) -> Self {
        self.shutdown = shutdown;
        self
    }
}

/// Handler for GET /todos
///
/// Serves the list from the cache, loading it from the repository on a miss.
/// Responds 204 when no list could be produced.
pub async fn list_todos_handler(State(state): State<AppState>) -> ApiResult<Response> {
    let todos = state.todos.clone();
    let lookup = state
        .cache
        .get_or_create(
            TODOS_CACHE_KEY,
            move || async move { anyhow::Ok(Some(todos.list().await)) },
            None,
            &state.shutdown,
        )
        .await?;

    Ok(match lookup.into_value() {
        Some(todos) => Json::<Vec<Todo>>(todos).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Handler for POST /todos
///
/// Stores a new todo and announces it so the cached list is dropped.
pub async fn create_todo_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateTodoRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let todo = state.todos.add(req.into()).await;

    state
        .events
        .publish(
            TodoEvent::Created {
                id: todo.id,
                title: todo.title.clone(),
                description: todo.description.clone(),
            },
            &state.shutdown,
        )
        .await?;

    let location = format!("/todos/{}", todo.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(todo)))
}

/// Handler for DELETE /todos/:id
pub async fn delete_todo_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    if state.todos.remove(id).await.is_none() {
        return Err(ApiError::NotFound(format!("Todo {} does not exist", id)));
    }

    state
        .events
        .publish(TodoEvent::Deleted { id }, &state.shutdown)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
