//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::auth::{self, AuthUser, JwksVerifier};
use super::types::{
    CreateTaskRequest, CurrentUserResponse, DeleteTaskResponse, HealthResponse, UpdateTaskRequest,
};
use crate::config::Config;
use crate::error::TaskError;
use crate::service::TaskService;
use crate::store::create_task_store;
use crate::task::Task;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Token verifier built from the identity provider's key set.
    /// `None` only in dev mode, where the gate is bypassed.
    pub verifier: Option<JwksVerifier>,
    /// The task lifecycle service
    pub service: TaskService,
}

/// Error representation at the HTTP boundary. Classification happens in the
/// store and service layers; only the representation changes here.
pub struct ApiError(TaskError);

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TaskError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            TaskError::NotFound { .. } => StatusCode::NOT_FOUND,
            TaskError::DataAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self.0);
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = create_task_store(config.store_kind, config.data_dir.clone()).await?;
    tracing::info!(
        "Task store initialized (kind={:?}, persistent={})",
        config.store_kind,
        store.is_persistent()
    );
    let service = TaskService::new(store);

    let verifier = if config.auth.auth_required(config.dev_mode) {
        Some(JwksVerifier::from_config(&config.auth).await?)
    } else {
        tracing::warn!("DEV_MODE enabled, serving without authentication");
        None
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        verifier,
        service,
    });

    let public_routes = Router::new().route("/api/health", get(health));

    let protected_routes = Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/users/me", get(current_user))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install signal handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError(TaskError::invalid_parameter(
            "id",
            format!("not a valid task id: {}", raw),
        ))
    })
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        auth_required: state.config.auth.auth_required(state.config.dev_mode),
    })
}

/// The authenticated principal, as established by the bearer gate.
async fn current_user(Extension(user): Extension<AuthUser>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        username: user.username,
    })
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state.service.list_tasks().await?;
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.service.create_task(request).await?;
    tracing::info!("Task {} created by {}", task.id, user.username);
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    let task = state.service.get_task(parse_id(&id)?).await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = state.service.update_task(parse_id(&id)?, request).await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DeleteTaskResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete_task(id).await?;
    tracing::info!("Task {} deleted by {}", id, user.username);
    Ok(Json(DeleteTaskResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: TaskError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn errors_map_to_expected_status_codes() {
        assert_eq!(
            status_of(TaskError::invalid_parameter("title", "empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(TaskError::NotFound { id: Uuid::new_v4() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(TaskError::DataAccess("backend unreachable".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn current_user_echoes_the_principal() {
        let response = current_user(Extension(AuthUser {
            username: "alice".to_string(),
        }))
        .await;
        assert_eq!(response.0.username, "alice");
    }

    #[test]
    fn malformed_path_id_is_invalid_parameter() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
