#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - An in-memory store behind the real router
/// - Test user creation with roles and session tokens
/// - Team/project/task fixtures
/// - A request helper returning status and JSON body

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use taskflow_api::app::{build_router, AppState};
use taskflow_api::config::Config;
use taskflow_shared::auth::identity::{Identity, IdentityResolver};
use taskflow_shared::auth::jwt::{create_token, Claims};
use taskflow_shared::models::project::{NewProject, Project};
use taskflow_shared::models::role::{Role, RoleSet};
use taskflow_shared::models::task::{status, NewTask, Task};
use taskflow_shared::models::team::{NewTeam, Team};
use taskflow_shared::models::user::User;
use taskflow_shared::store::memory::MemoryStore;
use taskflow_shared::store::ResourceStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const OKTA_DOMAIN: &str = "dev.okta.test";
pub const GOOGLE_CLIENT_ID: &str = "google-client-id.apps.googleusercontent.com";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
}

/// Configuration for tests; identity providers point at `sso_base_url`
pub fn test_config(sso_base_url: &str) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DATABASE_URL", "postgresql://unused/test".to_string()),
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("OKTA_DOMAIN", OKTA_DOMAIN.to_string()),
        ("OKTA_CLIENT_ID", "okta-client-id".to_string()),
        ("OKTA_REDIRECT_URI", "http://localhost:3000/callback/okta".to_string()),
        ("OKTA_JWKS_URL", format!("{sso_base_url}/oauth2/v1/keys")),
        ("GOOGLE_CLIENT_ID", GOOGLE_CLIENT_ID.to_string()),
        ("GOOGLE_REDIRECT_URI", "http://localhost:3000/callback/google".to_string()),
        ("GOOGLE_TOKENINFO_URL", format!("{sso_base_url}/tokeninfo")),
        ("SSO_HTTP_TIMEOUT_SECONDS", "5".to_string()),
    ]);

    Config::from_lookup(|key| vars.get(key).cloned()).expect("test config should load")
}

impl TestContext {
    /// Creates a new test context with an empty store
    ///
    /// Identity providers point at a port nothing listens on.
    pub fn new() -> Self {
        Self::with_sso("http://127.0.0.1:1")
    }

    /// Creates a test context whose identity providers live at `sso_base_url`
    pub fn with_sso(sso_base_url: &str) -> Self {
        let config = test_config(sso_base_url);
        let store = Arc::new(MemoryStore::new());
        let identity = IdentityResolver::new(config.sso.identity_config())
            .expect("identity client should build");
        let state = AppState::new(store.clone(), identity, config.clone());

        Self {
            store,
            app: build_router(state),
            config,
        }
    }

    /// Creates an SSO-style user with the given roles and returns it with a
    /// session token
    pub async fn user(&self, username: &str, roles: &[Role]) -> (User, String) {
        let user = self
            .store
            .resolve_or_create(&Identity::new(username, "", ""))
            .await
            .expect("user should be created");

        let roles: RoleSet = roles.iter().copied().collect();
        self.store
            .set_user_roles(user.id, &roles)
            .await
            .expect("roles should be set");

        let token = self.token_for(user.id);
        (user, token)
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        let claims = Claims::new(user_id, chrono::Duration::hours(1));
        create_token(&claims, JWT_SECRET).expect("token should be created")
    }

    pub async fn team(&self, name: &str, members: &[Uuid]) -> Team {
        let team = self
            .store
            .create_team(NewTeam {
                name: name.to_string(),
                description: String::new(),
            })
            .await
            .expect("team should be created");

        for member in members {
            self.store
                .add_team_member(team.id, *member)
                .await
                .expect("member should be added");
        }
        team
    }

    pub async fn project(&self, name: &str, team_id: Uuid) -> Project {
        self.store
            .create_project(NewProject {
                name: name.to_string(),
                description: String::new(),
                team_id,
            })
            .await
            .expect("project should be created")
    }

    pub async fn task(&self, title: &str, project_id: Uuid, assignee_id: Uuid) -> Task {
        self.store
            .create_task(NewTask {
                title: title.to_string(),
                description: String::new(),
                project_id,
                status: status::DEFAULT.to_string(),
                assignee_id,
            })
            .await
            .expect("task should be created")
    }

    /// Sends a request through the router
    ///
    /// The body, if any, is sent as JSON. An empty response body comes back
    /// as `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request should build"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}
