/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_api::{app::AppState, config::Config};
/// use taskflow_shared::auth::identity::IdentityResolver;
/// use taskflow_shared::store::memory::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let identity = IdentityResolver::new(config.sso.identity_config())?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), identity, config);
/// let app = taskflow_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use taskflow_shared::auth::identity::IdentityResolver;
use taskflow_shared::auth::middleware::{actor_middleware, ActorResolver};
use taskflow_shared::store::ResourceStore;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, teams, projects, tasks and comments
    pub store: Arc<dyn ResourceStore>,

    /// SSO token verification
    pub identity: Arc<IdentityResolver>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn ResourceStore>, identity: IdentityResolver, config: Config) -> Self {
        Self {
            store,
            identity: Arc::new(identity),
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Resolves session tokens against this state's store
    pub fn actor_resolver(&self) -> ActorResolver {
        ActorResolver::new(self.store.clone(), self.jwt_secret())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/                       # public unless noted
///     │   ├── POST /verify-token
///     │   ├── GET  /sso-config
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── GET  /user-info          # bearer
///     ├── /teams/                      # bearer
///     │   ├── GET    /
///     │   ├── POST   /create
///     │   ├── GET    /:id
///     │   ├── PUT    /:id
///     │   ├── DELETE /:id
///     │   ├── POST   /:id/members
///     │   └── DELETE /:id/members/:user_id
///     ├── /projects/                   # bearer
///     │   ├── GET  /
///     │   └── POST /create
///     ├── /tasks/                      # bearer
///     │   ├── GET  /
///     │   ├── POST /create
///     │   └── GET  /:id/comments
///     ├── /comments/create             # bearer
///     └── /users/:id/roles             # bearer, PUT
/// ```
///
/// Bearer routes run behind [`actor_middleware`]. A request without an
/// `Authorization` header still reaches its handler, which then answers 401.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let public_routes = Router::new()
        .route("/auth/verify-token", post(routes::auth::verify_token))
        .route("/auth/sso-config", get(routes::auth::sso_config))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login));

    let protected_routes = Router::new()
        .route("/auth/user-info", get(routes::auth::user_info))
        .route("/teams", get(routes::teams::list_teams))
        .route("/teams/create", post(routes::teams::create_team))
        .route(
            "/teams/:id",
            get(routes::teams::get_team)
                .put(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route("/teams/:id/members", post(routes::teams::add_member))
        .route(
            "/teams/:id/members/:user_id",
            axum::routing::delete(routes::teams::remove_member),
        )
        .route("/projects", get(routes::projects::list_projects))
        .route("/projects/create", post(routes::projects::create_project))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/tasks/create", post(routes::tasks::create_task))
        .route("/tasks/:id/comments", get(routes::comments::list_comments))
        .route("/comments/create", post(routes::comments::create_comment))
        .route("/users/:id/roles", put(routes::users::update_roles))
        .layer(middleware::from_fn_with_state(
            state.actor_resolver(),
            actor_middleware,
        ));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        )
        .with_state(state)
}
