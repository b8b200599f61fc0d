use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use shared::task::{next_timestamp, normalize_description};
use shared::{CreateTaskRequest, Task, TaskPatch, TaskRow, UpdateTaskRequest};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(ApiError::Validation("title must not be blank".to_string()));
    }
    Ok(())
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskRow>>> {
    Ok(Json(state.table.list().await?))
}

pub async fn get_task(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<TaskRow>> {
    state
        .table
        .get(id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound(id))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskRow>)> {
    require_title(&payload.title)?;
    let mut task = Task::new(payload.title.trim().to_string(), payload.description);
    while state.table.get(task.id).await?.is_some() {
        task.id = Uuid::new_v4();
    }
    let row = TaskRow::from(task);
    state.table.put(&row).await?;
    info!(id = %row.id, "task created");
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update_task(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskRow>> {
    if let Some(title) = &payload.title {
        require_title(title)?;
    }
    let mut row = state.table.get(id).await?.ok_or(ApiError::NotFound(id))?;
    apply_patch(&mut row, payload);
    state.table.put(&row).await?;
    info!(%id, completed = row.completed, "task updated");
    Ok(Json(row))
}

pub async fn delete_task(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    if !state.table.delete(id).await? {
        return Err(ApiError::NotFound(id));
    }
    info!(%id, "task deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn apply_patch(row: &mut TaskRow, patch: TaskPatch) {
    if let Some(title) = patch.title {
        row.title = title;
    }
    if let Some(description) = patch.description {
        row.description = normalize_description(Some(description));
    }
    if let Some(completed) = patch.completed {
        row.completed = completed;
    }
    row.updated_at = next_timestamp(row.updated_at);
}
