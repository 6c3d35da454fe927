/// Team model, membership, and database operations
///
/// Teams own projects, and team membership governs access to everything below
/// a team. Deleting a team removes its projects, their tasks, and the tasks'
/// comments through `ON DELETE CASCADE`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(200) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE team_members (
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (team_id, user_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::team::{Team, NewTeam};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
/// let team = Team::create(&pool, NewTeam {
///     name: "Platform".to_string(),
///     description: String::new(),
/// }).await?;
///
/// Team::add_member(&pool, team.id, user_id).await?;
/// assert!(Team::is_member(&pool, team.id, user_id).await?);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A team row as shown in listings
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A member entry in a team's detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub description: String,
}

/// Partial update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Rows removed together with a team
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeCounts {
    pub projects: u64,
    pub tasks: u64,
    pub comments: u64,
}

impl Team {
    pub async fn create(pool: &PgPool, data: NewTeam) -> Result<Self, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(team)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, name, description, created_at, updated_at FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM teams WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Lists every team with its member count, oldest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<TeamSummary>, sqlx::Error> {
        sqlx::query_as::<_, TeamSummary>(
            r#"
            SELECT t.id, t.name, t.description,
                   (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count,
                   t.created_at, t.updated_at
            FROM teams t
            ORDER BY t.created_at, t.id
            "#,
        )
        .fetch_all(pool)
        .await
    }

    /// Lists the teams a user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<TeamSummary>, sqlx::Error> {
        sqlx::query_as::<_, TeamSummary>(
            r#"
            SELECT t.id, t.name, t.description,
                   (SELECT COUNT(*) FROM team_members m WHERE m.team_id = t.id) AS member_count,
                   t.created_at, t.updated_at
            FROM teams t
            JOIN team_members tm ON tm.team_id = t.id
            WHERE tm.user_id = $1
            ORDER BY t.created_at, t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Deletes a team and everything it owns
    ///
    /// Descendant rows are counted and the team removed inside one
    /// transaction. Returns `None` if the team did not exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<CascadeCounts>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Lock the team row so the counts match what the cascade removes.
        let locked: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Ok(None);
        }

        let (projects, tasks, comments): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM projects p WHERE p.team_id = $1),
                (SELECT COUNT(*) FROM tasks t JOIN projects p ON p.id = t.project_id
                  WHERE p.team_id = $1),
                (SELECT COUNT(*) FROM comments c JOIN tasks t ON t.id = c.task_id
                  JOIN projects p ON p.id = t.project_id WHERE p.team_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(CascadeCounts {
            projects: projects as u64,
            tasks: tasks as u64,
            comments: comments as u64,
        }))
    }

    pub async fn members(pool: &PgPool, id: Uuid) -> Result<Vec<TeamMember>, sqlx::Error> {
        sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT u.id, u.username
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = $1
            ORDER BY tm.joined_at, u.username
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await
    }

    pub async fn is_member(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Adds a member; returns false if the user already belonged to the team
    pub async fn add_member(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (team_id, user_id) DO NOTHING
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes a member; returns false if the user was not a member
    pub async fn remove_member(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
