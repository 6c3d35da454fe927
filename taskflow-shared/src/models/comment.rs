/// Comment model and database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub task_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub task_id: Uuid,
}

impl Comment {
    pub async fn create(pool: &PgPool, data: NewComment) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (content, task_id)
            VALUES ($1, $2)
            RETURNING id, content, task_id, created_at, updated_at
            "#,
        )
        .bind(data.content)
        .bind(data.task_id)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Comments on a task, oldest first
    pub async fn list_for_task(pool: &PgPool, task_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, content, task_id, created_at, updated_at
            FROM comments
            WHERE task_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }
}
