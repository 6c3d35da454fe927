/// Team endpoints
///
/// # Endpoints
///
/// - `GET /api/teams` - Every team with its member count
/// - `POST /api/teams/create` - Create a team (`admin` or `manager`)
/// - `GET /api/teams/:id` - Team detail with members
/// - `PUT /api/teams/:id` - Partial update (`admin`)
/// - `DELETE /api/teams/:id` - Delete with projects, tasks and comments (`admin`)
/// - `POST /api/teams/:id/members` - Add a member (`admin` or `team-admin`)
/// - `DELETE /api/teams/:id/members/:user_id` - Remove a member (`admin` or `team-admin`)

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    routes::actor_of,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{
        authorization::{require, Action, Resource},
        middleware::Actor,
    },
    models::team::{NewTeam, Team, TeamMember, TeamSummary, UpdateTeam},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Option<Uuid>,
}

/// A team with its members
#[derive(Debug, Serialize, Deserialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: Team,

    pub members: Vec<TeamMember>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub team_id: Uuid,
    pub user_id: Uuid,
}

pub async fn list_teams(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> ApiResult<Json<Vec<TeamSummary>>> {
    require(
        &*state.store,
        actor_of(&actor),
        Action::Read,
        Resource::Team { id: None, name: None },
    )
    .await?;

    Ok(Json(state.store.list_teams().await?))
}

/// Create a team
///
/// A missing or blank name is rejected with 400 before any role check. The
/// creator does not become a member.
pub async fn create_team(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiJson(req): ApiJson<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Create,
        Resource::Team {
            id: None,
            name: req.name.as_deref(),
        },
    )
    .await?;
    req.validate()?;

    let name = req
        .name
        .ok_or_else(|| ApiError::BadRequest("Team name is required.".to_string()))?;

    let team = state
        .store
        .create_team(NewTeam {
            name,
            description: req.description.unwrap_or_default(),
        })
        .await?;

    tracing::info!(team_id = %team.id, user_id = %actor.user_id, "Team created");

    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn get_team(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TeamDetail>> {
    require(
        &*state.store,
        actor_of(&actor),
        Action::Read,
        Resource::Team { id: Some(id), name: None },
    )
    .await?;

    let team = state
        .store
        .find_team(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found.".to_string()))?;
    let members = state.store.team_members(id).await?;

    Ok(Json(TeamDetail { team, members }))
}

/// Update a team's name and/or description
pub async fn update_team(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    require(
        &*state.store,
        actor_of(&actor),
        Action::Update,
        Resource::Team {
            id: Some(id),
            name: req.name.as_deref(),
        },
    )
    .await?;
    req.validate()?;

    let team = state
        .store
        .update_team(
            id,
            UpdateTeam {
                name: req.name,
                description: req.description,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found.".to_string()))?;

    Ok(Json(team))
}

/// Delete a team together with everything below it
pub async fn delete_team(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Delete,
        Resource::Team { id: Some(id), name: None },
    )
    .await?;

    let counts = state
        .store
        .delete_team(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found.".to_string()))?;

    tracing::info!(
        team_id = %id,
        user_id = %actor.user_id,
        projects = counts.projects,
        tasks = counts.tasks,
        comments = counts.comments,
        "Team deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a team
///
/// Returns 201 when the membership is new and 200 when it already existed.
pub async fn add_member(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(team_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<MembershipResponse>)> {
    let actor = actor_of(&actor);
    if actor.is_none() {
        return Err(ApiError::Unauthorized(
            "Authentication credentials were not provided".to_string(),
        ));
    }
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("user_id is required.".to_string()))?;

    require(
        &*state.store,
        actor,
        Action::Create,
        Resource::TeamMembers { team_id, user_id },
    )
    .await?;

    let added = state.store.add_team_member(team_id, user_id).await?;
    let status = if added {
        tracing::info!(%team_id, %user_id, "Team member added");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(MembershipResponse { team_id, user_id })))
}

pub async fn remove_member(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath((team_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require(
        &*state.store,
        actor_of(&actor),
        Action::Delete,
        Resource::TeamMembers { team_id, user_id },
    )
    .await?;

    if !state.store.remove_team_member(team_id, user_id).await? {
        return Err(ApiError::NotFound(
            "User is not a member of the team.".to_string(),
        ));
    }

    tracing::info!(%team_id, %user_id, "Team member removed");

    Ok(StatusCode::NO_CONTENT)
}
