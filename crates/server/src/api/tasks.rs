//! Task control endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use doctrans_core::{StopHandle, TaskError, TaskOutcome, TaskRunner};

use crate::metrics::TASK_REQUESTS;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Response for accepted start/stop requests
#[derive(Debug, Serialize)]
pub struct TaskAcceptedResponse {
    pub task_id: String,
    pub action: &'static str,
}

/// Running tasks
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TaskErrorResponse {
    pub error: String,
}

fn task_error(status: StatusCode, error: String) -> (StatusCode, Json<TaskErrorResponse>) {
    (status, Json(TaskErrorResponse { error }))
}

// ============================================================================
// Handlers
// ============================================================================

/// Start a task in the background
pub async fn start_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TaskAcceptedResponse>), impl IntoResponse> {
    if !state.is_ready() {
        TASK_REQUESTS.with_label_values(&["start", "unavailable"]).inc();
        return Err(task_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Worker is shutting down".to_string(),
        ));
    }

    let runner = Arc::clone(state.runner());
    match runner.register(&id).await {
        Ok(stop) => {
            TASK_REQUESTS.with_label_values(&["start", "accepted"]).inc();
            let task_id = id.clone();
            tokio::spawn(async move { run_in_background(runner, task_id, stop).await });

            Ok((
                StatusCode::ACCEPTED,
                Json(TaskAcceptedResponse {
                    task_id: id,
                    action: "start",
                }),
            ))
        }
        Err(TaskError::AlreadyRunning(_)) => {
            TASK_REQUESTS.with_label_values(&["start", "conflict"]).inc();
            Err(task_error(
                StatusCode::CONFLICT,
                format!("Task already running: {}", id),
            ))
        }
        Err(e) => {
            TASK_REQUESTS.with_label_values(&["start", "rejected"]).inc();
            Err(task_error(StatusCode::BAD_REQUEST, e.to_string()))
        }
    }
}

async fn run_in_background(
    runner: Arc<TaskRunner>,
    task_id: String,
    stop: StopHandle,
) {
    match runner.run_registered(&task_id, stop).await {
        Ok(TaskOutcome::Completed {
            translated_segments,
            ..
        }) => info!(task_id = %task_id, translated_segments, "Task completed"),
        Ok(TaskOutcome::Halted) => info!(task_id = %task_id, "Task halted"),
        Err(e) => error!(task_id = %task_id, error = %e, "Task failed"),
    }
}

/// Halt a running task
pub async fn stop_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<TaskAcceptedResponse>), impl IntoResponse> {
    if state.runner().stop(&id).await {
        TASK_REQUESTS.with_label_values(&["stop", "accepted"]).inc();
        Ok((
            StatusCode::ACCEPTED,
            Json(TaskAcceptedResponse {
                task_id: id,
                action: "stop",
            }),
        ))
    } else {
        TASK_REQUESTS.with_label_values(&["stop", "not_found"]).inc();
        Err(task_error(
            StatusCode::NOT_FOUND,
            format!("Task not running: {}", id),
        ))
    }
}

/// List running tasks
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<TaskListResponse> {
    Json(TaskListResponse {
        tasks: state.runner().active_tasks().await,
    })
}
