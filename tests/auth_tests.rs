//! Token service and request gate tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use bookstore::auth::{require_admin, require_auth, Identity, TokenService, UserRole};
use bookstore::config::AuthConfig;
use bookstore::Error;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

fn service(secret: &str) -> TokenService {
    TokenService::new(&AuthConfig::new(secret))
}

/// Sign arbitrary claims with the shared secret
fn sign_raw(secret: &str, claims: &Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn hour_from_now() -> i64 {
    (Utc::now() + Duration::hours(1)).timestamp()
}

async fn whoami(identity: Identity) -> String {
    format!("{}:{}", identity.user_id, identity.user_role)
}

fn gated_router(tokens: TokenService) -> Router {
    let general = Router::new()
        .route("/me", get(whoami))
        .route_layer(from_fn_with_state(tokens.clone(), require_auth));
    let admin = Router::new()
        .route("/admin/me", get(whoami))
        .route_layer(from_fn_with_state(tokens, require_admin));
    general.merge(admin)
}

async fn send(app: Router, path: &str, token: Option<&str>) -> (StatusCode, String) {
    let mut builder = Request::builder().uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", token);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[test]
fn test_token_is_three_segments() {
    let token = service("secret").issue("u1", UserRole::User).unwrap();
    assert!(!token.is_empty());
    assert_eq!(token.split('.').count(), 3); // JWT format: header.payload.signature
}

#[test]
fn test_roundtrip_preserves_subject_and_role() {
    let tokens = service("secret");
    for (subject, role) in [
        ("alice", UserRole::User),
        ("bob", UserRole::Admin),
        ("", UserRole::User),
        ("ünïcødé-id", UserRole::Admin),
    ] {
        let claims = tokens.verify(&tokens.issue(subject, role).unwrap()).unwrap();
        assert_eq!(claims.user_id, subject);
        assert_eq!(claims.user_role, role);
    }
}

#[test]
fn test_repeated_verification_is_stable() {
    let tokens = service("secret");
    let token = tokens.issue("alice", UserRole::User).unwrap();

    let first = tokens.verify(&token).unwrap();
    let second = tokens.verify(&token).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_different_subjects_produce_different_claims() {
    let tokens = service("secret");
    let alice = tokens.issue("alice", UserRole::User).unwrap();
    let bob = tokens.issue("bob", UserRole::User).unwrap();

    assert_ne!(alice, bob);
    assert_ne!(tokens.verify(&alice).unwrap(), tokens.verify(&bob).unwrap());
}

#[test]
fn test_expired_token_with_valid_signature_rejected() {
    let tokens = service("secret");
    let token = tokens
        .issue_at("alice", UserRole::User, Utc::now() - Duration::hours(25))
        .unwrap();
    assert!(matches!(tokens.verify(&token), Err(Error::InvalidToken)));
}

#[test]
fn test_token_from_other_secret_rejected() {
    let token = service("secret-a").issue("alice", UserRole::Admin).unwrap();
    assert!(matches!(
        service("secret-b").verify(&token),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn test_tampered_payload_rejected() {
    let tokens = service("secret");
    let user_token = tokens.issue("alice", UserRole::User).unwrap();
    let admin_token = tokens.issue("alice", UserRole::Admin).unwrap();

    // Splice the admin payload onto the user signature
    let user_parts: Vec<&str> = user_token.split('.').collect();
    let admin_parts: Vec<&str> = admin_token.split('.').collect();
    let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

    assert!(matches!(tokens.verify(&forged), Err(Error::InvalidToken)));
}

#[test]
fn test_malformed_token_rejected() {
    let tokens = service("secret");
    assert!(tokens.verify("not-a-jwt-token").is_err());
    assert!(tokens.verify("").is_err());
    assert!(tokens.verify("a.b.c").is_err());
}

#[tokio::test]
async fn test_missing_header_is_unauthorized() {
    let (status, body) = send(gated_router(service("secret")), "/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Unauthorized"}"#);
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized_with_generic_body() {
    let expired = service("secret")
        .issue_at("alice", UserRole::User, Utc::now() - Duration::hours(48))
        .unwrap();

    for token in ["garbage", expired.as_str()] {
        let (status, body) = send(gated_router(service("secret")), "/me", Some(token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"error":"Unauthorized"}"#);
    }
}

#[tokio::test]
async fn test_general_gate_attaches_identity() {
    let tokens = service("secret");
    let token = tokens.issue("alice", UserRole::User).unwrap();

    let (status, body) = send(gated_router(tokens), "/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "alice:user");
}

#[tokio::test]
async fn test_admin_gate_forbids_non_admin() {
    let tokens = service("secret");
    let token = tokens.issue("alice", UserRole::User).unwrap();

    let (status, body) = send(gated_router(tokens.clone()), "/admin/me", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Forbidden"}"#);

    // Same token passes the general gate
    let (status, _) = send(gated_router(tokens), "/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_gate_allows_admin() {
    let tokens = service("secret");
    let token = tokens.issue("root", UserRole::Admin).unwrap();

    let (status, body) = send(gated_router(tokens), "/admin/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "root:admin");
}

#[tokio::test]
async fn test_admin_gate_missing_header_is_unauthorized() {
    let (status, _) = send(gated_router(service("secret")), "/admin/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_identity_without_gate_is_unauthorized() {
    let app = Router::new().route("/open", get(whoami));
    let (status, _) = send(app, "/open", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[test]
fn test_unknown_role_rejected() {
    let token = sign_raw(
        "secret",
        &json!({ "userID": "x", "userRole": "superuser", "exp": hour_from_now() }),
    );
    assert!(matches!(
        service("secret").verify(&token),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn test_missing_exp_rejected() {
    let token = sign_raw("secret", &json!({ "userID": "x", "userRole": "user" }));
    assert!(matches!(
        service("secret").verify(&token),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn test_exp_equal_to_now_rejected() {
    let token = sign_raw(
        "secret",
        &json!({ "userID": "x", "userRole": "user", "exp": Utc::now().timestamp() }),
    );
    assert!(matches!(
        service("secret").verify(&token),
        Err(Error::InvalidToken)
    ));
}

#[test]
fn test_raw_claims_with_known_role_accepted() {
    let token = sign_raw(
        "secret",
        &json!({ "userID": "x", "userRole": "admin", "exp": hour_from_now() }),
    );
    let claims = service("secret").verify(&token).unwrap();
    assert_eq!(claims.user_id, "x");
    assert_eq!(claims.user_role, UserRole::Admin);
}

#[tokio::test]
async fn test_gate_rejects_out_of_shape_claims() {
    let tokens = [
        sign_raw(
            "secret",
            &json!({ "userID": "x", "userRole": "superuser", "exp": hour_from_now() }),
        ),
        sign_raw("secret", &json!({ "userID": "x", "userRole": "user" })),
        sign_raw(
            "secret",
            &json!({ "userID": "x", "userRole": "user", "exp": Utc::now().timestamp() }),
        ),
    ];

    for token in &tokens {
        for path in ["/me", "/admin/me"] {
            let (status, body) =
                send(gated_router(service("secret")), path, Some(token.as_str())).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, r#"{"error":"Unauthorized"}"#);
        }
    }
}
