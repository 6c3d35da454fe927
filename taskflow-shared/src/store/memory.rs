/// In-memory resource store
///
/// Keeps every table in a `Vec` behind a single tokio `RwLock`, so each
/// operation is atomic and listings come back in insertion order. Foreign keys
/// and cascades mirror the PostgreSQL schema.
///
/// Used by the API test-suite and anywhere a database is not wanted.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{MembershipQueries, ResourceStore, StoreError};
use crate::auth::identity::Identity;
use crate::models::comment::{Comment, NewComment};
use crate::models::project::{NewProject, Project, ProjectSummary};
use crate::models::role::RoleSet;
use crate::models::task::{NewTask, Task, TaskSummary};
use crate::models::team::{CascadeCounts, NewTeam, Team, TeamMember, TeamSummary, UpdateTeam};
use crate::models::user::{NewUser, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    roles: HashMap<Uuid, RoleSet>,
    teams: Vec<Team>,
    /// (team_id, user_id) in join order
    members: Vec<(Uuid, Uuid)>,
    projects: Vec<Project>,
    tasks: Vec<Task>,
    comments: Vec<Comment>,
}

impl Tables {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn is_member(&self, team_id: Uuid, user_id: Uuid) -> bool {
        self.members.iter().any(|&(t, u)| t == team_id && u == user_id)
    }

    fn member_count(&self, team_id: Uuid) -> i64 {
        self.members.iter().filter(|&&(t, _)| t == team_id).count() as i64
    }

    fn project_team(&self, project_id: Uuid) -> Option<Uuid> {
        self.projects
            .iter()
            .find(|p| p.id == project_id)
            .map(|p| p.team_id)
    }

    fn task_team(&self, task_id: Uuid) -> Option<Uuid> {
        self.tasks
            .iter()
            .find(|t| t.id == task_id)
            .and_then(|t| self.project_team(t.project_id))
    }

    fn summarize(&self, team: &Team) -> TeamSummary {
        TeamSummary {
            id: team.id,
            name: team.name.clone(),
            description: team.description.clone(),
            member_count: self.member_count(team.id),
            created_at: team.created_at,
            updated_at: team.updated_at,
        }
    }

    fn insert_user(&mut self, data: NewUser) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            given_name: data.given_name,
            family_name: data.family_name,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        user
    }
}

/// Resource store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipQueries for MemoryStore {
    async fn team_exists(&self, team_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.teams.iter().any(|t| t.id == team_id))
    }

    async fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.is_member(team_id, user_id))
    }

    async fn project_team(&self, project_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.tables.read().await.project_team(project_id))
    }

    async fn task_team(&self, task_id: Uuid) -> Result<Option<Uuid>, StoreError> {
        Ok(self.tables.read().await.task_team(task_id))
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.read().await.user(user_id).is_some())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn resolve_or_create(&self, identity: &Identity) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.users.iter().find(|u| u.username == identity.email) {
            return Ok(existing.clone());
        }

        let data = NewUser::sso(&identity.email, &identity.given_name, &identity.family_name);
        Ok(tables.insert_user(data))
    }

    async fn create_user(&self, data: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(StoreError::Conflict(format!(
                "username {} already exists",
                data.username
            )));
        }

        Ok(tables.insert_user(data))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.user(user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_roles(&self, user_id: Uuid) -> Result<RoleSet, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.roles.get(&user_id).cloned().unwrap_or_default())
    }

    async fn set_user_roles(&self, user_id: Uuid, roles: &RoleSet) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) else {
            return Err(StoreError::InvalidReference(format!("user {user_id} does not exist")));
        };
        user.updated_at = Utc::now();

        tables.roles.insert(user_id, roles.clone());
        Ok(())
    }

    async fn create_team(&self, data: NewTeam) -> Result<Team, StoreError> {
        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.teams.push(team.clone());
        Ok(team)
    }

    async fn find_team(&self, team_id: Uuid) -> Result<Option<Team>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().find(|t| t.id == team_id).cloned())
    }

    async fn list_teams(&self) -> Result<Vec<TeamSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.teams.iter().map(|t| tables.summarize(t)).collect())
    }

    async fn list_teams_for_user(&self, user_id: Uuid) -> Result<Vec<TeamSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .teams
            .iter()
            .filter(|t| tables.is_member(t.id, user_id))
            .map(|t| tables.summarize(t))
            .collect())
    }

    async fn update_team(&self, team_id: Uuid, data: UpdateTeam) -> Result<Option<Team>, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(team) = tables.teams.iter_mut().find(|t| t.id == team_id) else {
            return Ok(None);
        };

        if let Some(name) = data.name {
            team.name = name;
        }
        if let Some(description) = data.description {
            team.description = description;
        }
        team.updated_at = Utc::now();

        Ok(Some(team.clone()))
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<Option<CascadeCounts>, StoreError> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.teams.iter().position(|t| t.id == team_id) else {
            return Ok(None);
        };
        tables.teams.remove(index);
        tables.members.retain(|&(t, _)| t != team_id);

        let project_ids: Vec<Uuid> = tables
            .projects
            .iter()
            .filter(|p| p.team_id == team_id)
            .map(|p| p.id)
            .collect();
        let task_ids: Vec<Uuid> = tables
            .tasks
            .iter()
            .filter(|t| project_ids.contains(&t.project_id))
            .map(|t| t.id)
            .collect();

        let comments_before = tables.comments.len();
        tables.comments.retain(|c| !task_ids.contains(&c.task_id));
        let comments = comments_before - tables.comments.len();

        tables.tasks.retain(|t| !task_ids.contains(&t.id));
        tables.projects.retain(|p| p.team_id != team_id);

        Ok(Some(CascadeCounts {
            projects: project_ids.len() as u64,
            tasks: task_ids.len() as u64,
            comments: comments as u64,
        }))
    }

    async fn team_members(&self, team_id: Uuid) -> Result<Vec<TeamMember>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .members
            .iter()
            .filter(|&&(t, _)| t == team_id)
            .filter_map(|&(_, u)| tables.user(u))
            .map(|u| TeamMember {
                id: u.id,
                username: u.username.clone(),
            })
            .collect())
    }

    async fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.teams.iter().any(|t| t.id == team_id) {
            return Err(StoreError::InvalidReference(format!("team {team_id} does not exist")));
        }
        if tables.user(user_id).is_none() {
            return Err(StoreError::InvalidReference(format!("user {user_id} does not exist")));
        }
        if tables.is_member(team_id, user_id) {
            return Ok(false);
        }

        tables.members.push((team_id, user_id));
        Ok(true)
    }

    async fn remove_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.members.len();
        tables.members.retain(|&(t, u)| !(t == team_id && u == user_id));
        Ok(tables.members.len() < before)
    }

    async fn create_project(&self, data: NewProject) -> Result<Project, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.teams.iter().any(|t| t.id == data.team_id) {
            return Err(StoreError::InvalidReference(format!(
                "team {} does not exist",
                data.team_id
            )));
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            team_id: data.team_id,
            created_at: now,
            updated_at: now,
        };
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn find_project(&self, project_id: Uuid) -> Result<Option<Project>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == project_id).cloned())
    }

    async fn list_projects_for_user(&self, user_id: Uuid) -> Result<Vec<ProjectSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .filter(|p| tables.is_member(p.team_id, user_id))
            .filter_map(|p| {
                let team = tables.teams.iter().find(|t| t.id == p.team_id)?;
                Some(ProjectSummary {
                    id: p.id,
                    name: p.name.clone(),
                    description: p.description.clone(),
                    team_name: team.name.clone(),
                    created_at: p.created_at,
                    updated_at: p.updated_at,
                })
            })
            .collect())
    }

    async fn create_task(&self, data: NewTask) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.project_team(data.project_id).is_none() {
            return Err(StoreError::InvalidReference(format!(
                "project {} does not exist",
                data.project_id
            )));
        }
        if tables.user(data.assignee_id).is_none() {
            return Err(StoreError::InvalidReference(format!(
                "user {} does not exist",
                data.assignee_id
            )));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            project_id: data.project_id,
            status: data.status,
            assignee_id: data.assignee_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, task_id: Uuid) -> Result<Option<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == task_id).cloned())
    }

    async fn list_tasks_for_user(&self, user_id: Uuid) -> Result<Vec<TaskSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter_map(|t| {
                let project = tables.projects.iter().find(|p| p.id == t.project_id)?;
                if !tables.is_member(project.team_id, user_id) {
                    return None;
                }
                let assignee = tables.user(t.assignee_id)?;
                Some(TaskSummary {
                    id: t.id,
                    title: t.title.clone(),
                    status: t.status.clone(),
                    project_name: project.name.clone(),
                    assignee_username: assignee.username.clone(),
                    created_at: t.created_at,
                })
            })
            .collect())
    }

    async fn create_comment(&self, data: NewComment) -> Result<Comment, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.tasks.iter().any(|t| t.id == data.task_id) {
            return Err(StoreError::InvalidReference(format!(
                "task {} does not exist",
                data.task_id
            )));
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: data.content,
            task_id: data.task_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, task_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect())
    }
}
