/// Project endpoints
///
/// - `GET /api/projects` - Projects of the caller's teams
/// - `POST /api/projects/create` - Create a project in a team the caller belongs to

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::actor_of,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskflow_shared::{
    auth::{
        authorization::{require, Action, Resource},
        middleware::Actor,
    },
    models::project::{NewProject, Project, ProjectSummary},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,

    pub team_id: Option<Uuid>,
}

/// Projects visible to the caller
///
/// Callers outside every team get an empty list, not 403.
pub async fn list_projects(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Read,
        Resource::Project { team_id: None, name: None },
    )
    .await?;

    Ok(Json(state.store.list_projects_for_user(actor.user_id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiJson(req): ApiJson<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Create,
        Resource::Project {
            team_id: req.team_id,
            name: req.name.as_deref(),
        },
    )
    .await?;
    req.validate()?;

    let (Some(name), Some(team_id)) = (req.name, req.team_id) else {
        return Err(ApiError::BadRequest(
            "Project name and team_id are required.".to_string(),
        ));
    };

    let project = state
        .store
        .create_project(NewProject {
            name,
            description: req.description.unwrap_or_default(),
            team_id,
        })
        .await?;

    tracing::info!(project_id = %project.id, %team_id, user_id = %actor.user_id, "Project created");

    Ok((StatusCode::CREATED, Json(project)))
}
