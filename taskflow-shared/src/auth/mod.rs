/// Authentication and authorization
///
/// # Modules
///
/// - [`identity`]: SSO token verification for Okta and Google
/// - [`authorization`]: Allow/deny decisions over teams, projects, tasks and comments
/// - [`jwt`]: Session access tokens issued after login
/// - [`password`]: Argon2id hashing for local accounts
/// - [`middleware`]: Resolving the acting user for Axum requests
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::identity::{IdentityConfig, IdentityResolver};
/// use taskflow_shared::auth::jwt::{create_token, Claims};
/// use taskflow_shared::store::{memory::MemoryStore, ResourceStore};
/// use chrono::Duration;
///
/// # async fn example(sso_token: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = IdentityResolver::new(IdentityConfig::default())?;
/// let store = MemoryStore::new();
///
/// // SSO token in, session token out
/// let identity = resolver.verify(Some("google"), Some(sso_token)).await?;
/// let user = store.resolve_or_create(&identity).await?;
/// let session = create_token(&Claims::new(user.id, Duration::hours(10)), "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
