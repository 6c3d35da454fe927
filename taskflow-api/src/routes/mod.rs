/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: SSO verification, local signup and login, SSO settings
/// - `teams`: Teams and team membership
/// - `projects`, `tasks`, `comments`: The work hierarchy below teams
/// - `users`: Role assignment

pub mod auth;
pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;

use axum::Extension;
use taskflow_shared::auth::middleware::Actor;

/// The actor inserted by the auth middleware, if any
pub(crate) fn actor_of(ext: &Option<Extension<Actor>>) -> Option<&Actor> {
    ext.as_ref().map(|Extension(actor)| actor)
}
