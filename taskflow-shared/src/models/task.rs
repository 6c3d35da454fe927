/// Task model and database operations
///
/// A task belongs to one project and is assigned to one user who must be a
/// member of the project's team. `status` is free-form text of at most 50
/// characters.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::task::{NewTask, Task};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     title: "Write release notes".to_string(),
///     description: String::new(),
///     project_id,
///     status: "in_progress".to_string(),
///     assignee_id: user_id,
/// }).await?;
/// assert_eq!(task.status, "in_progress");
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

pub mod status {
    /// Status given to tasks created without one
    pub const DEFAULT: &str = "pending";
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub project_id: Uuid,
    pub status: String,
    pub assignee_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task row as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskSummary {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub project_name: String,
    pub assignee_username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub project_id: Uuid,
    pub status: String,
    pub assignee_id: Uuid,
}

impl Task {
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, status, assignee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, project_id, status, assignee_id,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.status)
        .bind(data.assignee_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, project_id, status, assignee_id,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// The team that owns a task through its project
    pub async fn team_id_of(pool: &PgPool, id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT p.team_id
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            WHERE t.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Tasks in projects of teams the user is a member of
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<TaskSummary>, sqlx::Error> {
        sqlx::query_as::<_, TaskSummary>(
            r#"
            SELECT t.id, t.title, t.status, p.name AS project_name,
                   u.username AS assignee_username, t.created_at
            FROM tasks t
            JOIN projects p ON p.id = t.project_id
            JOIN users u ON u.id = t.assignee_id
            JOIN team_members tm ON tm.team_id = p.team_id
            WHERE tm.user_id = $1
            ORDER BY t.created_at, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
