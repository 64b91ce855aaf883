// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use bson::oid::ObjectId;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mini_social::config::Config;
use mini_social::db::SocialDb;
use mini_social::routes::create_router;
use mini_social::AppState;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

#[allow(dead_code)]
const MULTIPART_BOUNDARY: &str = "mini-social-test-boundary";

/// Check if a MongoDB test server is configured via environment variable.
#[allow(dead_code)]
pub fn mongo_available() -> bool {
    std::env::var("MONGO_TEST_URI").is_ok()
}

/// Skip test with message if no MongoDB test server is configured.
#[macro_export]
macro_rules! require_mongo {
    () => {
        if !crate::common::mongo_available() {
            eprintln!("⚠️  Skipping: MONGO_TEST_URI not set");
            return;
        }
    };
}

/// Connect to the MongoDB test server with a fresh database per call.
#[allow(dead_code)]
pub async fn test_db_mongo() -> (SocialDb, Config) {
    let mut config = Config::test_default();
    config.mongo_uri = std::env::var("MONGO_TEST_URI").expect("MONGO_TEST_URI not set");
    config.db_name = format!("mini-social-test-{}", ObjectId::new().to_hex());

    let db = SocialDb::connect(&config)
        .await
        .expect("Failed to connect to MongoDB test server");
    (db, config)
}

/// Create a test app backed by a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    app_with_db(SocialDb::new_in_memory())
}

/// Create a test app whose store fails every call.
#[allow(dead_code)]
pub fn create_offline_app() -> (axum::Router, Arc<AppState>) {
    app_with_db(SocialDb::new_mock())
}

#[allow(dead_code)]
pub fn app_with_db(db: SocialDb) -> (axum::Router, Arc<AppState>) {
    let mut config = Config::test_default();
    config.upload_dir = std::env::temp_dir().join(format!("mini-social-test-{}", ObjectId::new()));

    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

#[allow(dead_code)]
fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Create a test JWT token valid for one hour.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: ObjectId, signing_key: &[u8]) -> String {
    let now = now_secs();
    sign(user_id, now, now + 3600, signing_key)
}

/// Create a JWT whose expiry is already in the past.
#[allow(dead_code)]
pub fn create_expired_jwt(user_id: ObjectId, signing_key: &[u8]) -> String {
    let now = now_secs();
    sign(user_id, now - 7200, now - 3600, signing_key)
}

#[allow(dead_code)]
fn sign(user_id: ObjectId, iat: usize, exp: usize, signing_key: &[u8]) -> String {
    let claims = Claims {
        sub: user_id.to_hex(),
        exp,
        iat,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Send a request and return the status with the body parsed as JSON
/// (`Value::Null` for an empty body).
#[allow(dead_code)]
pub async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A file part for [`multipart_request`].
#[allow(dead_code)]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

/// Build an authenticated `multipart/form-data` request.
#[allow(dead_code)]
pub fn multipart_request(
    method: Method,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                file.field, file.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Sign up a user through the API. Returns `(token, user_id)`.
#[allow(dead_code)]
pub async fn signup(app: &axum::Router, name: &str, email: &str) -> (String, String) {
    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(serde_json::json!({
                "name": name,
                "email": email,
                "password": "secret123",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);

    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

/// Create a text-only post through the API and return its JSON.
#[allow(dead_code)]
pub async fn create_text_post(app: &axum::Router, token: &str, text: &str) -> Value {
    let (status, body) = send(
        app,
        multipart_request(Method::POST, "/api/posts", token, &[("text", text)], &[]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create post failed: {}", body);
    body
}
