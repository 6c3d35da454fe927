/// Resource store contract
///
/// The store is split in two traits:
///
/// - [`MembershipQueries`]: the narrow set of lookups the authorization engine
///   needs. Nothing else is visible to access decisions.
/// - [`ResourceStore`]: full persistence for users, teams, projects, tasks and
///   comments, used by request handlers once an action has been allowed.
///
/// Two implementations are provided:
///
/// - [`PgStore`](postgres::PgStore): PostgreSQL via sqlx, delegating to
///   [`crate::models`]
/// - [`MemoryStore`](memory::MemoryStore): in-process maps behind a tokio
///   `RwLock`, for tests and embedding
///
/// Store methods perform no permission checks. Each mutation is atomic on its
/// own; there are no cross-call transactions.
///
/// # Example
///
/// ```
/// use taskflow_shared::store::{memory::MemoryStore, MembershipQueries, ResourceStore};
/// use taskflow_shared::auth::identity::Identity;
/// use taskflow_shared::models::team::NewTeam;
///
/// # async fn example() -> Result<(), taskflow_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let user = store.resolve_or_create(&Identity::new("ada@example.com", "Ada", "")).await?;
/// let team = store.create_team(NewTeam { name: "Core".into(), description: String::new() }).await?;
///
/// store.add_team_member(team.id, user.id).await?;
/// assert!(store.is_team_member(team.id, user.id).await?);
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::identity::Identity;
use crate::models::comment::{Comment, NewComment};
use crate::models::project::{NewProject, Project, ProjectSummary};
use crate::models::role::RoleSet;
use crate::models::task::{NewTask, Task, TaskSummary};
use crate::models::team::{CascadeCounts, NewTeam, Team, TeamMember, TeamSummary, UpdateTeam};
use crate::models::user::{NewUser, User};

/// Store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

/// Lookups used by the authorization engine
#[async_trait]
pub trait MembershipQueries: Send + Sync {
    async fn team_exists(&self, team_id: Uuid) -> Result<bool, StoreError>;

    async fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Owning team of a project, `None` if the project does not exist
    async fn project_team(&self, project_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    /// Owning team of a task through its project, `None` if the task does not exist
    async fn task_team(&self, task_id: Uuid) -> Result<Option<Uuid>, StoreError>;

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Full persistence contract
#[async_trait]
pub trait ResourceStore: MembershipQueries {
    /// Verifies the store is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    // Users

    /// Returns the user whose username is the identity's email, creating it
    /// with no usable password if absent. Idempotent under concurrency.
    async fn resolve_or_create(&self, identity: &Identity) -> Result<User, StoreError>;

    /// Creates a user; `Conflict` if the username is taken
    async fn create_user(&self, data: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn user_roles(&self, user_id: Uuid) -> Result<RoleSet, StoreError>;

    async fn set_user_roles(&self, user_id: Uuid, roles: &RoleSet) -> Result<(), StoreError>;

    // Teams

    async fn create_team(&self, data: NewTeam) -> Result<Team, StoreError>;

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError>;

    /// Every team, unscoped
    async fn list_teams(&self) -> Result<Vec<TeamSummary>, StoreError>;

    async fn list_teams_for_user(&self, user_id: Uuid) -> Result<Vec<TeamSummary>, StoreError>;

    async fn update_team(&self, team_id: Uuid, data: UpdateTeam) -> Result<Option<Team>, StoreError>;

    /// Deletes a team with its projects, tasks and comments
    async fn delete_team(&self, team_id: Uuid) -> Result<Option<CascadeCounts>, StoreError>;

    async fn team_members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, StoreError>;

    /// Returns false if the user was already a member
    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Returns false if the user was not a member
    async fn remove_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    // Projects

    async fn create_project(&self, data: NewProject) -> Result<Project, StoreError>;

    async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError>;

    /// Projects of the teams the user belongs to
    async fn list_projects_for_user(&self, user_id: Uuid) -> Result<Vec<ProjectSummary>, StoreError>;

    // Tasks

    async fn create_task(&self, data: NewTask) -> Result<Task, StoreError>;

    async fn find_task(&self, task_id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Tasks in projects of the teams the user belongs to
    async fn list_tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskSummary>, StoreError>;

    // Comments

    async fn create_comment(&self, data: NewComment) -> Result<Comment, StoreError>;

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError>;
}
