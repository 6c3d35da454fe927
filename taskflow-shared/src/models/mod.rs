/// Database models for TaskFlow
///
/// Each model owns its rows and SQL. Access rules live in
/// [`crate::auth::authorization`]; these functions do no permission checks.
///
/// # Models
///
/// - `role`: Named roles and role sets
/// - `user`: User accounts, including get-or-create for SSO identities
/// - `team`: Teams and team membership
/// - `project`: Projects owned by a team
/// - `task`: Tasks within a project, each with an assignee
/// - `comment`: Comments on a task
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::team::{Team, NewTeam};
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let team = Team::create(&pool, NewTeam {
///     name: "Platform".to_string(),
///     description: "Infra and tooling".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod comment;
pub mod project;
pub mod role;
pub mod task;
pub mod team;
pub mod user;
