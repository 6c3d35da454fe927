/// Task endpoints
///
/// - `GET /api/tasks` - Tasks in projects of the caller's teams
/// - `POST /api/tasks/create` - Create a task
///
/// A new task is assigned to the caller unless `assignee_id` names another
/// member of the project's team. Status defaults to `pending`.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::actor_of,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{
        authorization::{require, Action, Resource},
        middleware::Actor,
    },
    models::task::{status, NewTask, Task, TaskSummary},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,

    pub description: Option<String>,

    pub project_id: Option<Uuid>,

    /// Free-form; defaults to `pending`
    #[validate(length(max = 50, message = "Status must be at most 50 characters"))]
    pub status: Option<String>,

    pub assignee_id: Option<Uuid>,
}

/// A created task with its assignee's username
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(flatten)]
    pub task: Task,

    pub assignee_username: String,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> ApiResult<Json<Vec<TaskSummary>>> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Read,
        Resource::Task {
            project_id: None,
            title: None,
            assignee_id: None,
        },
    )
    .await?;

    Ok(Json(state.store.list_tasks_for_user(actor.user_id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiJson(req): ApiJson<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Create,
        Resource::Task {
            project_id: req.project_id,
            title: req.title.as_deref(),
            assignee_id: req.assignee_id,
        },
    )
    .await?;
    req.validate()?;

    let task_status = req.status.unwrap_or_else(|| status::DEFAULT.to_string());

    let (Some(title), Some(project_id)) = (req.title, req.project_id) else {
        return Err(ApiError::BadRequest(
            "Task title and project_id are required.".to_string(),
        ));
    };

    let assignee_id = req.assignee_id.unwrap_or(actor.user_id);
    let assignee_username = if assignee_id == actor.user_id {
        actor.username.clone()
    } else {
        state
            .store
            .find_user(assignee_id)
            .await?
            .map(|user| user.username)
            .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?
    };

    let task = state
        .store
        .create_task(NewTask {
            title,
            description: req.description.unwrap_or_default(),
            project_id,
            status: task_status,
            assignee_id,
        })
        .await?;

    tracing::info!(task_id = %task.id, %project_id, %assignee_id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            task,
            assignee_username,
        }),
    ))
}
