/// PostgreSQL resource store
///
/// Thin adapter from [`ResourceStore`] onto the model functions in
/// [`crate::models`]. Constraint violations are translated into
/// [`StoreError::Conflict`] and [`StoreError::InvalidReference`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{MembershipQueries, ResourceStore, StoreError};
use crate::auth::identity::Identity;
use crate::db::pool::health_check;
use crate::models::comment::{Comment, NewComment};
use crate::models::project::{NewProject, Project, ProjectSummary};
use crate::models::role::RoleSet;
use crate::models::task::{NewTask, Task, TaskSummary};
use crate::models::team::{CascadeCounts, NewTeam, Team, TeamMember, TeamSummary, UpdateTeam};
use crate::models::user::{NewUser, User};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_constraint(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return StoreError::InvalidReference(db.message().to_string());
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl MembershipQueries for PgStore {
    async fn team_exists(&self, team_id: Uuid) -> Result<bool, StoreError> {
        Ok(Team::exists(&self.pool, team_id).await?)
    }

    async fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(Team::is_member(&self.pool, team_id, user_id).await?)
    }

    async fn project_team(&self, project_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(Project::team_id_of(&self.pool, project_id).await?)
    }

    async fn task_team(&self, task_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(Task::team_id_of(&self.pool, task_id).await?)
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(User::exists(&self.pool, user_id).await?)
    }
}

#[async_trait]
impl ResourceStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(health_check(&self.pool).await?)
    }

    async fn resolve_or_create(&self, identity: &Identity) -> Result<User, StoreError> {
        let data = NewUser::sso(&identity.email, &identity.given_name, &identity.family_name);
        Ok(User::resolve_or_create(&self.pool, data).await?)
    }

    async fn create_user(&self, data: NewUser) -> Result<User, StoreError> {
        User::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, user_id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_username(&self.pool, username).await?)
    }

    async fn user_roles(&self, user_id: Uuid) -> Result<RoleSet, StoreError> {
        Ok(User::roles(&self.pool, user_id).await?)
    }

    async fn set_user_roles(&self, user_id: Uuid, roles: &RoleSet) -> Result<(), StoreError> {
        User::set_roles(&self.pool, user_id, roles)
            .await
            .map_err(map_constraint)
    }

    async fn create_team(&self, data: NewTeam) -> Result<Team, StoreError> {
        Ok(Team::create(&self.pool, data).await?)
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError> {
        Ok(Team::find_by_id(&self.pool, team_id).await?)
    }

    async fn list_teams(&self) -> Result<Vec<TeamSummary>, StoreError> {
        Ok(Team::list_all(&self.pool).await?)
    }

    async fn list_teams_for_user(&self, user_id: Uuid) -> Result<Vec<TeamSummary>, StoreError> {
        Ok(Team::list_for_user(&self.pool, user_id).await?)
    }

    async fn update_team(&self, team_id: Uuid, data: UpdateTeam) -> Result<Option<Team>, StoreError> {
        Ok(Team::update(&self.pool, team_id, data).await?)
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<Option<CascadeCounts>, StoreError> {
        Ok(Team::delete(&self.pool, team_id).await?)
    }

    async fn team_members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        Ok(Team::members(&self.pool, team_id).await?)
    }

    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Team::add_member(&self.pool, team_id, user_id)
            .await
            .map_err(map_constraint)
    }

    async fn remove_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(Team::remove_member(&self.pool, team_id, user_id).await?)
    }

    async fn create_project(&self, data: NewProject) -> Result<Project, StoreError> {
        Project::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(Project::find_by_id(&self.pool, project_id).await?)
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> Result<Vec<ProjectSummary>, StoreError> {
        Ok(Project::list_for_user(&self.pool, user_id).await?)
    }

    async fn create_task(&self, data: NewTask) -> Result<Task, StoreError> {
        Task::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(Task::find_by_id(&self.pool, task_id).await?)
    }

    async fn list_tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskSummary>, StoreError> {
        Ok(Task::list_for_user(&self.pool, user_id).await?)
    }

    async fn create_comment(&self, data: NewComment) -> Result<Comment, StoreError> {
        Comment::create(&self.pool, data).await.map_err(map_constraint)
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        Ok(Comment::list_for_task(&self.pool, task_id).await?)
    }
}
