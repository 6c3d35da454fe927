/// SSO identity resolution
///
/// Turns an opaque bearer token issued by an external identity provider into a
/// verified [`Identity`]. Two providers are supported:
///
/// - **Okta**: the token is an RS256 JWT. Its `kid` is looked up in the
///   provider's JWKS, which is fetched on every verification, and the
///   signature, expiry, audience and issuer are checked.
/// - **Google**: the token is sent to the token-info endpoint and the returned
///   `aud` must equal the configured client id.
///
/// Every rejection is reported as [`IdentityError::InvalidToken`] except
/// transport failures reaching the provider, which are
/// [`IdentityError::UpstreamUnavailable`]. Neither variant carries provider
/// detail; the cause is logged.
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::auth::identity::{IdentityConfig, IdentityResolver, OktaConfig};
///
/// # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let config = IdentityConfig {
///     okta: OktaConfig::new("dev-123.okta.com", "0oa-client", "http://localhost:3000/callback"),
///     ..Default::default()
/// };
/// let resolver = IdentityResolver::new(config)?;
///
/// let identity = resolver.verify(Some("okta"), Some(token)).await?;
/// println!("verified {}", identity.email);
/// # Ok(())
/// # }
/// ```

use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Google's public token-info endpoint
pub const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Default timeout for calls to identity providers
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Identity verification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The token could not be verified
    #[error("Invalid token")]
    InvalidToken,

    /// The identity provider could not be reached
    #[error("Identity provider unavailable")]
    UpstreamUnavailable,
}

/// Supported identity providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProvider {
    Okta,
    Google,
}

impl FromStr for IdentityProvider {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "okta" => Ok(IdentityProvider::Okta),
            "google" => Ok(IdentityProvider::Google),
            _ => Err(IdentityError::InvalidToken),
        }
    }
}

impl fmt::Display for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityProvider::Okta => f.write_str("okta"),
            IdentityProvider::Google => f.write_str("google"),
        }
    }
}

/// A verified identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub given_name: String,
    pub family_name: String,
}

impl Identity {
    pub fn new(
        email: impl Into<String>,
        given_name: impl Into<String>,
        family_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            given_name: given_name.into(),
            family_name: family_name.into(),
        }
    }
}

/// Okta settings
#[derive(Debug, Clone, Default)]
pub struct OktaConfig {
    /// Okta org domain, e.g. `dev-123.okta.com`
    pub domain: String,

    /// Expected token audience
    pub client_id: String,

    pub redirect_uri: String,

    /// Overrides the issuer derived from `domain`
    pub issuer: Option<String>,

    /// Overrides the JWKS URL derived from `domain`
    pub jwks_url: Option<String>,
}

impl OktaConfig {
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            issuer: None,
            jwks_url: None,
        }
    }

    /// Expected `iss` claim
    pub fn issuer(&self) -> String {
        self.issuer
            .clone()
            .unwrap_or_else(|| format!("https://{}/oauth2/default", self.domain))
    }

    pub fn jwks_url(&self) -> String {
        self.jwks_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/oauth2/v1/keys", self.domain))
    }
}

/// Google settings
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Expected `aud` value in the token-info response
    pub client_id: String,

    pub redirect_uri: String,

    pub tokeninfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: String::new(),
            tokeninfo_url: GOOGLE_TOKENINFO_URL.to_string(),
        }
    }
}

/// Settings for all providers
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub okta: OktaConfig,
    pub google: GoogleConfig,
    pub timeout_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            okta: OktaConfig::default(),
            google: GoogleConfig::default(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

/// Client-facing SSO settings; contains no secrets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoPublicConfig {
    pub okta: OktaPublicConfig,
    pub google: GooglePublicConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OktaPublicConfig {
    pub domain: String,
    pub client_id: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GooglePublicConfig {
    pub client_id: String,
    pub redirect_uri: String,
}

/// Claims read from a verified Okta ID token
#[derive(Debug, Clone, Deserialize)]
struct OktaClaims {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

/// Fields read from Google's token-info response
#[derive(Debug, Clone, Deserialize)]
struct GoogleTokenInfo {
    #[serde(default)]
    aud: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
}

/// Verifies SSO tokens against the configured providers
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityResolver {
    /// Builds a resolver with its own HTTP client
    pub fn new(config: IdentityConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self::with_client(config, http))
    }

    pub fn with_client(config: IdentityConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Settings a browser client needs to start an SSO flow
    pub fn public_config(&self) -> SsoPublicConfig {
        SsoPublicConfig {
            okta: OktaPublicConfig {
                domain: self.config.okta.domain.clone(),
                client_id: self.config.okta.client_id.clone(),
                redirect_uri: self.config.okta.redirect_uri.clone(),
            },
            google: GooglePublicConfig {
                client_id: self.config.google.client_id.clone(),
                redirect_uri: self.config.google.redirect_uri.clone(),
            },
        }
    }

    /// Verifies `token` with the named provider
    ///
    /// A missing or blank token, or a missing or unknown provider, is an
    /// invalid token.
    pub async fn verify(
        &self,
        provider: Option<&str>,
        token: Option<&str>,
    ) -> Result<Identity, IdentityError> {
        let token = token.map(str::trim).filter(|t| !t.is_empty()).ok_or_else(|| {
            tracing::debug!("SSO verification without a token");
            IdentityError::InvalidToken
        })?;

        let provider: IdentityProvider = provider
            .ok_or(IdentityError::InvalidToken)?
            .parse()
            .map_err(|e| {
                tracing::debug!(provider = ?provider, "Unknown SSO provider");
                e
            })?;

        let result = match provider {
            IdentityProvider::Okta => self.verify_okta(token).await,
            IdentityProvider::Google => self.verify_google(token).await,
        };

        match &result {
            Ok(identity) => tracing::info!(%provider, email = %identity.email, "SSO token verified"),
            Err(e) => tracing::warn!(%provider, error = %e, "SSO token rejected"),
        }

        result
    }

    async fn verify_okta(&self, token: &str) -> Result<Identity, IdentityError> {
        let okta = &self.config.okta;

        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode Okta token header");
            IdentityError::InvalidToken
        })?;

        // Only RS256 is accepted; anything else could be an algorithm-confusion attempt.
        if header.alg != Algorithm::RS256 {
            tracing::warn!(algorithm = ?header.alg, "Okta token uses a disallowed algorithm");
            return Err(IdentityError::InvalidToken);
        }

        let kid = header.kid.ok_or_else(|| {
            tracing::debug!("Okta token missing key ID (kid)");
            IdentityError::InvalidToken
        })?;

        let jwks = self.fetch_jwks(&okta.jwks_url()).await?;

        let jwk = jwks.find(&kid).ok_or_else(|| {
            tracing::warn!(kid = %kid, "Key ID not found in Okta JWKS");
            IdentityError::InvalidToken
        })?;

        let key = DecodingKey::from_jwk(jwk).map_err(|e| {
            tracing::warn!(kid = %kid, error = %e, "Failed to convert JWK to decoding key");
            IdentityError::InvalidToken
        })?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[okta.client_id.as_str()]);
        validation.set_issuer(&[okta.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let data = decode::<OktaClaims>(token, &key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Okta token validation failed");
            IdentityError::InvalidToken
        })?;

        let claims = data.claims;
        let email = claims.email.filter(|e| !e.is_empty()).ok_or_else(|| {
            tracing::debug!("Okta token has no email claim");
            IdentityError::InvalidToken
        })?;

        Ok(Identity {
            email,
            given_name: claims.given_name.unwrap_or_default(),
            family_name: claims.family_name.unwrap_or_default(),
        })
    }

    async fn fetch_jwks(&self, url: &str) -> Result<JwkSet, IdentityError> {
        tracing::debug!(url = %url, "Fetching JWKS");

        let response = self.http.get(url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to fetch JWKS");
            IdentityError::UpstreamUnavailable
        })?;

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), url = %url, "JWKS endpoint returned error");
            return Err(IdentityError::InvalidToken);
        }

        response.json::<JwkSet>().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            body_error(&e)
        })
    }

    async fn verify_google(&self, token: &str) -> Result<Identity, IdentityError> {
        let google = &self.config.google;

        let response = self
            .http
            .get(&google.tokeninfo_url)
            .query(&[("id_token", token)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach Google token-info endpoint");
                IdentityError::UpstreamUnavailable
            })?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "Google rejected the token");
            return Err(IdentityError::InvalidToken);
        }

        let info: GoogleTokenInfo = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Google token-info response");
            body_error(&e)
        })?;

        if google.client_id.is_empty() || info.aud.as_deref() != Some(google.client_id.as_str()) {
            tracing::debug!(aud = ?info.aud, "Google token audience mismatch");
            return Err(IdentityError::InvalidToken);
        }

        let email = info.email.filter(|e| !e.is_empty()).ok_or_else(|| {
            tracing::debug!("Google token-info has no email");
            IdentityError::InvalidToken
        })?;

        Ok(Identity {
            email,
            given_name: info.given_name.unwrap_or_default(),
            family_name: info.family_name.unwrap_or_default(),
        })
    }
}

/// A timeout while reading a body is a transport failure; anything else
/// means the provider sent something unusable.
fn body_error(e: &reqwest::Error) -> IdentityError {
    if e.is_timeout() || e.is_connect() {
        IdentityError::UpstreamUnavailable
    } else {
        IdentityError::InvalidToken
    }
}
