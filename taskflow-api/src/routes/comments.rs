/// Comment endpoints
///
/// Only members of a task's team may comment on it or read its comments.

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiPath, ApiResult},
    routes::actor_of,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{
        authorization::{require, Action, Resource},
        middleware::Actor,
    },
    models::comment::{Comment, NewComment},
};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
    pub task_id: Option<Uuid>,
}

/// A comment as listed under its task
#[derive(Debug, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// `POST /api/comments/create`
pub async fn create_comment(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiJson(req): ApiJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let actor = require(
        &*state.store,
        actor_of(&actor),
        Action::Create,
        Resource::Comment {
            task_id: req.task_id,
            content: req.content.as_deref(),
        },
    )
    .await?;

    let (Some(content), Some(task_id)) = (req.content, req.task_id) else {
        return Err(ApiError::BadRequest(
            "Comment content and task_id are required.".to_string(),
        ));
    };

    let comment = state.store.create_comment(NewComment { content, task_id }).await?;

    tracing::info!(comment_id = %comment.id, %task_id, user_id = %actor.user_id, "Comment created");

    Ok((StatusCode::CREATED, Json(comment)))
}

/// `GET /api/tasks/:id/comments`
pub async fn list_comments(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<CommentView>>> {
    require(
        &*state.store,
        actor_of(&actor),
        Action::Read,
        Resource::Comment {
            task_id: Some(task_id),
            content: None,
        },
    )
    .await?;

    let comments = state.store.list_comments(task_id).await?;

    Ok(Json(comments.into_iter().map(CommentView::from).collect()))
}
