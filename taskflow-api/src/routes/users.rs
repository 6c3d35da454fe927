/// Role assignment
///
/// `PUT /api/users/:id/roles` replaces a user's role set. Admin only. The
/// change applies to the user's next request, since roles are re-read per
/// request.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiResult, ValidationErrorDetail},
    routes::{actor_of, auth::UserInfo},
};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{
        authorization::{require, Action, Resource},
        middleware::Actor,
    },
    models::role::{Role, RoleSet},
};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    /// Role names: `admin`, `manager`, `team-admin`, `regular`
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: UserInfo,

    pub roles: RoleSet,
}

pub async fn update_roles(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateRolesRequest>,
) -> ApiResult<Json<UserWithRoles>> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Update,
        Resource::UserRoles { user_id },
    )
    .await?;

    let roles = req
        .roles
        .iter()
        .map(|name| name.parse::<Role>())
        .collect::<Result<RoleSet, _>>()
        .map_err(|e| {
            ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "roles".to_string(),
                message: e.to_string(),
            }])
        })?;

    state.store.set_user_roles(user_id, &roles).await?;

    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    tracing::info!(%user_id, granted_by = %actor.user_id, ?roles, "User roles updated");

    Ok(Json(UserWithRoles {
        user: user.into(),
        roles,
    }))
}
