/// Configuration management for the API server
///
/// Configuration comes from environment variables, with a `.env` file honoured
/// in development.
///
/// # Environment Variables
///
/// - `API_HOST` / `API_PORT`: Bind address (default: 0.0.0.0:8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Session token signing secret, at least 32 characters (required)
/// - `ACCESS_TOKEN_EXPIRE_SECONDS`: Session token lifetime (default: 36000)
/// - `OKTA_DOMAIN`, `OKTA_CLIENT_ID`, `OKTA_REDIRECT_URI`: Okta settings
/// - `OKTA_ISSUER`, `OKTA_JWKS_URL`: Overrides for values derived from the domain
/// - `GOOGLE_CLIENT_ID`, `GOOGLE_REDIRECT_URI`: Google settings
/// - `GOOGLE_TOKENINFO_URL`: Override for Google's token-info endpoint
/// - `SSO_HTTP_TIMEOUT_SECONDS`: Timeout for calls to identity providers (default: 10)
/// - `RUST_LOG`, `LOG_FORMAT`: Logging filter and `json` output (read in `main`)
///
/// # Example
///
/// ```no_run
/// use taskflow_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use taskflow_shared::auth::identity::{
    GoogleConfig, IdentityConfig, OktaConfig, DEFAULT_TIMEOUT_SECONDS, GOOGLE_TOKENINFO_URL,
};
use taskflow_shared::auth::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub sso: SsoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for session token signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    pub access_token_ttl_seconds: i64,
}

/// Identity provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SsoConfig {
    pub okta_domain: String,
    pub okta_client_id: String,
    pub okta_redirect_uri: String,
    pub okta_issuer: Option<String>,
    pub okta_jwks_url: Option<String>,
    pub google_client_id: String,
    pub google_redirect_uri: String,
    pub google_tokeninfo_url: String,
    pub timeout_seconds: u64,
}

impl SsoConfig {
    /// Settings for the identity resolver
    pub fn identity_config(&self) -> IdentityConfig {
        IdentityConfig {
            okta: OktaConfig {
                domain: self.okta_domain.clone(),
                client_id: self.okta_client_id.clone(),
                redirect_uri: self.okta_redirect_uri.clone(),
                issuer: self.okta_issuer.clone(),
                jwks_url: self.okta_jwks_url.clone(),
            },
            google: GoogleConfig {
                client_id: self.google_client_id.clone(),
                redirect_uri: self.google_redirect_uri.clone(),
                tokeninfo_url: self.google_tokeninfo_url.clone(),
            },
            timeout_seconds: self.timeout_seconds,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        None => Ok(default),
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing, a value fails to
    /// parse, or `JWT_SECRET` is shorter than 32 characters.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |key: &str| var(key).unwrap_or_default();

        let database_url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = var("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let access_token_ttl_seconds =
            parse_or(&var, "ACCESS_TOKEN_EXPIRE_SECONDS", DEFAULT_ACCESS_TOKEN_TTL_SECONDS)?;
        if access_token_ttl_seconds <= 0 {
            anyhow::bail!("ACCESS_TOKEN_EXPIRE_SECONDS must be positive");
        }

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&var, "API_PORT", 8080)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_ttl_seconds,
            },
            sso: SsoConfig {
                okta_domain: text("OKTA_DOMAIN"),
                okta_client_id: text("OKTA_CLIENT_ID"),
                okta_redirect_uri: text("OKTA_REDIRECT_URI"),
                okta_issuer: var("OKTA_ISSUER"),
                okta_jwks_url: var("OKTA_JWKS_URL"),
                google_client_id: text("GOOGLE_CLIENT_ID"),
                google_redirect_uri: text("GOOGLE_REDIRECT_URI"),
                google_tokeninfo_url: var("GOOGLE_TOKENINFO_URL")
                    .unwrap_or_else(|| GOOGLE_TOKENINFO_URL.to_string()),
                timeout_seconds: parse_or(&var, "SSO_HTTP_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/test"), ("JWT_SECRET", SECRET)])
            .unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_ttl_seconds, 36_000);
        assert_eq!(config.sso.google_tokeninfo_url, GOOGLE_TOKENINFO_URL);
        assert_eq!(config.sso.timeout_seconds, 10);
        assert!(config.sso.okta_issuer.is_none());
    }

    #[test]
    fn test_required_variables() {
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgresql://localhost/test")]).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = load(&[("DATABASE_URL", "postgresql://x"), ("JWT_SECRET", "short")]).unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgresql://x"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }

    #[test]
    fn test_sso_settings_flow_into_identity_config() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://x"),
            ("JWT_SECRET", SECRET),
            ("OKTA_DOMAIN", "dev-1.okta.com"),
            ("OKTA_CLIENT_ID", "okta-client"),
            ("GOOGLE_CLIENT_ID", "google-client"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ])
        .unwrap();

        let identity = config.sso.identity_config();
        assert_eq!(identity.okta.issuer(), "https://dev-1.okta.com/oauth2/default");
        assert_eq!(identity.okta.client_id, "okta-client");
        assert_eq!(identity.google.client_id, "google-client");
        assert_eq!(config.api.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
