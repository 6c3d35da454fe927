/// Request actor resolution for Axum
///
/// Resolves the acting user from an `Authorization: Bearer <token>` header
/// carrying a session token from [`super::jwt`]. The user's roles are re-read
/// from the store on every request, so role changes apply immediately.
///
/// The layer is permissive about *absent* credentials: a request without an
/// `Authorization` header passes through with no [`Actor`] in its extensions
/// and the authorization engine later answers `Unauthenticated`. Credentials
/// that are present but unusable are rejected here with 401.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use std::sync::Arc;
/// use taskflow_shared::auth::middleware::{actor_middleware, Actor, ActorResolver};
/// use taskflow_shared::store::memory::MemoryStore;
///
/// async fn whoami(actor: Option<Extension<Actor>>) -> String {
///     actor.map(|Extension(a)| a.username).unwrap_or_default()
/// }
///
/// let resolver = ActorResolver::new(Arc::new(MemoryStore::new()), "secret-key-at-least-32-bytes-long!!");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(resolver, actor_middleware));
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::role::RoleSet;
use crate::store::ResourceStore;

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub username: String,
    pub roles: RoleSet,
}

/// Failures while resolving the actor
#[derive(Debug)]
pub enum AuthError {
    /// The Authorization header is not a bearer token
    InvalidFormat(String),

    /// The token failed validation or names an unknown user
    InvalidToken(String),

    /// Store failure while loading the user
    StoreError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            AuthError::StoreError(msg) => {
                tracing::error!(error = %msg, "Failed to resolve request actor");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(serde_json::json!({ "error": error, "message": message })),
        )
            .into_response()
    }
}

/// Extracts the bearer token, if an Authorization header is present
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Malformed Authorization header".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    Ok(Some(token))
}

/// Turns session tokens into actors
#[derive(Clone)]
pub struct ActorResolver {
    store: Arc<dyn ResourceStore>,
    secret: Arc<str>,
}

impl ActorResolver {
    pub fn new(store: Arc<dyn ResourceStore>, secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Validates a session token and loads its user with current roles
    pub async fn resolve(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = validate_token(token, &self.secret).map_err(|e| match e {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            _ => AuthError::InvalidToken("Invalid token".to_string()),
        })?;

        let user = self
            .store
            .find_user(claims.sub)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "Session token for unknown user");
                AuthError::InvalidToken("Invalid token".to_string())
            })?;

        let roles = self
            .store
            .user_roles(user.id)
            .await
            .map_err(|e| AuthError::StoreError(e.to_string()))?;

        Ok(Actor {
            user_id: user.id,
            username: user.username,
            roles,
        })
    }
}

/// Axum middleware inserting an [`Actor`] into request extensions
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn actor_middleware(
    State(resolver): State<ActorResolver>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?.map(str::to_owned);

    if let Some(token) = token {
        let actor = resolver.resolve(&token).await?;
        tracing::debug!(user_id = %actor.user_id, "Request actor resolved");
        req.extensions_mut().insert(actor);
    }

    Ok(next.run(req).await)
}
