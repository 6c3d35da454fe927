/// Integration tests for SSO identity resolution
///
/// Okta and Google are replaced by wiremock servers. Okta tokens are signed
/// with the RSA key in `fixtures/okta_test_key.pem`, whose public half is
/// served from `fixtures/okta_jwks.json` under kid `test-key-1`.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use taskflow_shared::auth::identity::{
    GoogleConfig, Identity, IdentityConfig, IdentityError, IdentityResolver, OktaConfig,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OKTA_DOMAIN: &str = "dev.okta.test";
const OKTA_CLIENT_ID: &str = "okta-client-id";
const GOOGLE_CLIENT_ID: &str = "google-client-id.apps.googleusercontent.com";
const KID: &str = "test-key-1";

const PRIVATE_KEY: &[u8] = include_bytes!("fixtures/okta_test_key.pem");
const JWKS: &str = include_str!("fixtures/okta_jwks.json");

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn okta_claims() -> Value {
    json!({
        "iss": format!("https://{OKTA_DOMAIN}/oauth2/default"),
        "aud": OKTA_CLIENT_ID,
        "sub": "00u-okta-user",
        "iat": now(),
        "exp": now() + 3600,
        "email": "ada@example.com",
        "given_name": "Ada",
        "family_name": "Lovelace",
    })
}

fn sign(claims: &Value, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY).expect("test key should parse");
    encode(&header, claims, &key).expect("signing should succeed")
}

fn resolver(okta_jwks_url: String, google_tokeninfo_url: String) -> IdentityResolver {
    let config = IdentityConfig {
        okta: OktaConfig {
            jwks_url: Some(okta_jwks_url),
            ..OktaConfig::new(OKTA_DOMAIN, OKTA_CLIENT_ID, "http://localhost:3000/okta")
        },
        google: GoogleConfig {
            client_id: GOOGLE_CLIENT_ID.to_string(),
            redirect_uri: "http://localhost:3000/google".to_string(),
            tokeninfo_url: google_tokeninfo_url,
        },
        timeout_seconds: 5,
    };
    IdentityResolver::new(config).expect("client should build")
}

async fn okta_server(expected_fetches: u64) -> (MockServer, IdentityResolver) {
    let server = MockServer::start().await;
    let jwks: Value = serde_json::from_str(JWKS).expect("fixture is valid JSON");

    Mock::given(method("GET"))
        .and(path("/oauth2/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks))
        .expect(expected_fetches)
        .mount(&server)
        .await;

    let r = resolver(
        format!("{}/oauth2/v1/keys", server.uri()),
        format!("{}/tokeninfo", server.uri()),
    );
    (server, r)
}

#[tokio::test]
async fn test_okta_valid_token() {
    let (_server, r) = okta_server(1).await;
    let token = sign(&okta_claims(), KID);

    let identity = r.verify(Some("okta"), Some(&token)).await.unwrap();
    assert_eq!(identity, Identity::new("ada@example.com", "Ada", "Lovelace"));
}

#[tokio::test]
async fn test_okta_names_default_to_empty() {
    let (_server, r) = okta_server(1).await;
    let mut claims = okta_claims();
    claims.as_object_mut().unwrap().remove("given_name");
    claims.as_object_mut().unwrap().remove("family_name");

    let identity = r.verify(Some("okta"), Some(&sign(&claims, KID))).await.unwrap();
    assert_eq!(identity.given_name, "");
    assert_eq!(identity.family_name, "");
}

#[tokio::test]
async fn test_okta_audience_mismatch() {
    let (_server, r) = okta_server(1).await;
    let mut claims = okta_claims();
    claims["aud"] = json!("some-other-client");

    let result = r.verify(Some("okta"), Some(&sign(&claims, KID))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_issuer_mismatch() {
    let (_server, r) = okta_server(1).await;
    let mut claims = okta_claims();
    claims["iss"] = json!("https://evil.example.com/oauth2/default");

    let result = r.verify(Some("okta"), Some(&sign(&claims, KID))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_expired_token() {
    let (_server, r) = okta_server(1).await;
    let mut claims = okta_claims();
    claims["iat"] = json!(now() - 7200);
    claims["exp"] = json!(now() - 3600);

    let result = r.verify(Some("okta"), Some(&sign(&claims, KID))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_unknown_kid() {
    let (_server, r) = okta_server(1).await;

    let result = r.verify(Some("okta"), Some(&sign(&okta_claims(), "rotated-away"))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_missing_email() {
    let (_server, r) = okta_server(1).await;
    let mut claims = okta_claims();
    claims.as_object_mut().unwrap().remove("email");

    let result = r.verify(Some("okta"), Some(&sign(&claims, KID))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_key_set_fetched_on_every_verification() {
    let (_server, r) = okta_server(2).await;
    let token = sign(&okta_claims(), KID);

    r.verify(Some("okta"), Some(&token)).await.unwrap();
    r.verify(Some("OKTA"), Some(&token)).await.unwrap();
    // MockServer checks the expected fetch count when dropped
}

#[tokio::test]
async fn test_okta_key_set_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v1/keys"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let r = resolver(format!("{}/oauth2/v1/keys", server.uri()), server.uri());

    let result = r.verify(Some("okta"), Some(&sign(&okta_claims(), KID))).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_okta_unreachable_key_set() {
    // Nothing listens on port 1
    let r = resolver(
        "http://127.0.0.1:1/oauth2/v1/keys".to_string(),
        "http://127.0.0.1:1/tokeninfo".to_string(),
    );

    let result = r.verify(Some("okta"), Some(&sign(&okta_claims(), KID))).await;
    assert_eq!(result, Err(IdentityError::UpstreamUnavailable));
}

async fn google_server(status: u16, body: Value) -> (MockServer, IdentityResolver) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tokeninfo"))
        .and(query_param("id_token", "google-id-token"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;

    let r = resolver(
        format!("{}/oauth2/v1/keys", server.uri()),
        format!("{}/tokeninfo", server.uri()),
    );
    (server, r)
}

#[tokio::test]
async fn test_google_valid_token() {
    let (_server, r) = google_server(
        200,
        json!({
            "aud": GOOGLE_CLIENT_ID,
            "email": "grace@example.com",
            "email_verified": "true",
            "given_name": "Grace",
            "family_name": "Hopper",
        }),
    )
    .await;

    let identity = r.verify(Some("google"), Some("google-id-token")).await.unwrap();
    assert_eq!(identity, Identity::new("grace@example.com", "Grace", "Hopper"));
}

#[tokio::test]
async fn test_google_audience_mismatch() {
    let (_server, r) = google_server(
        200,
        json!({ "aud": "someone-elses-app", "email": "grace@example.com" }),
    )
    .await;

    let result = r.verify(Some("google"), Some("google-id-token")).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_google_rejected_token() {
    let (_server, r) = google_server(400, json!({ "error": "invalid_token" })).await;

    let result = r.verify(Some("google"), Some("google-id-token")).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}

#[tokio::test]
async fn test_google_missing_email() {
    let (_server, r) = google_server(200, json!({ "aud": GOOGLE_CLIENT_ID })).await;

    let result = r.verify(Some("google"), Some("google-id-token")).await;
    assert_eq!(result, Err(IdentityError::InvalidToken));
}
