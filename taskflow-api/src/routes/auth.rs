/// Authentication endpoints
///
/// SSO users exchange a provider token for a session token; local users sign
/// up and log in with a password. Both paths end in the same token response.
///
/// # Endpoints
///
/// - `POST /api/auth/verify-token` - Verify an Okta or Google token
/// - `GET /api/auth/sso-config` - Client-side SSO settings
/// - `POST /api/auth/register` - Local signup
/// - `POST /api/auth/login` - Local login
/// - `GET /api/auth/user-info` - The authenticated user

use crate::{
    app::AppState,
    error::{ApiError, ApiJson, ApiResult},
    routes::actor_of,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::{
        identity::SsoPublicConfig,
        jwt::{self, Claims},
        middleware::Actor,
        password,
    },
    models::user::{NewUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// SSO token verification request
///
/// Both fields are optional so that a missing value is reported as an invalid
/// token rather than a malformed body.
#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: Option<String>,
    pub provider: Option<String>,
}

/// Local signup request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address, which also becomes the username
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 150, message = "First name must be at most 150 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 150, message = "Last name must be at most 150 characters"))]
    pub last_name: Option<String>,
}

/// Local login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.given_name,
            last_name: user.family_name,
        }
    }
}

/// Session token issued after verification, signup or login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// Seconds until the access token expires
    pub expires_in: i64,

    pub user: UserInfo,
}

fn issue_token(state: &AppState, user: User) -> ApiResult<TokenResponse> {
    let ttl = state.config.jwt.access_token_ttl_seconds;
    let claims = Claims::new(user.id, chrono::Duration::seconds(ttl));
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: ttl,
        user: user.into(),
    })
}

/// Verify an SSO token and sign the user in
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/verify-token
/// Content-Type: application/json
///
/// { "token": "eyJ...", "provider": "okta" }
/// ```
///
/// The first successful verification for an email address provisions the
/// user. Any verification failure, including an unreachable provider, is
/// `401 {"error": "invalid_token"}`.
pub async fn verify_token(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyTokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let identity = state
        .identity
        .verify(req.provider.as_deref(), req.token.as_deref())
        .await?;

    let user = state.store.resolve_or_create(&identity).await?;
    tracing::info!(user_id = %user.id, provider = ?req.provider, "SSO sign-in");

    Ok(Json(issue_token(&state, user)?))
}

/// Client-side SSO settings
///
/// Exposes client ids, the Okta domain and redirect URIs. Never secrets.
pub async fn sso_config(State(state): State<AppState>) -> Json<SsoPublicConfig> {
    Json(state.identity.public_config())
}

/// Register a local user
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or the password is too weak
/// - `409 Conflict`: The email is already a username
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    req.validate()?;
    password::check_password_strength(&req.password, &req.email)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = state
        .store
        .create_user(NewUser {
            username: req.email.clone(),
            email: req.email,
            given_name: req.first_name.unwrap_or_default(),
            family_name: req.last_name.unwrap_or_default(),
            password_hash: Some(password_hash),
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

/// Log in with a username and password
///
/// SSO-provisioned users have no usable password and always fail here.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_stored_password(&req.password, user.password_hash.as_deref())? {
        tracing::debug!(user_id = %user.id, "Password login rejected");
        return Err(invalid());
    }

    Ok(Json(issue_token(&state, user)?))
}

/// The authenticated user
pub async fn user_info(
    State(state): State<AppState>,
    actor: Option<Extension<Actor>>,
) -> ApiResult<Json<UserInfo>> {
    let actor = actor_of(&actor).ok_or_else(|| {
        ApiError::Unauthorized("Authentication credentials were not provided".to_string())
    })?;

    let user = state
        .store
        .find_user(actor.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

    Ok(Json(user.into()))
}
