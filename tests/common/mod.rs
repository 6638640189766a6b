#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::{to_bytes, MessageBody};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web};
use serde_json::{json, Value};
use std::sync::Arc;

use taskkeeper::auth::TokenService;
use taskkeeper::config::JwtConfig;
use taskkeeper::store::MemoryStore;
use taskkeeper::AppState;

pub const JWT_SECRET: &str = "integration-test-secret";

/// Application state over a fresh in-memory store.
pub fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new(&JwtConfig::new(JWT_SECRET)),
    ))
}

/// Builds the full application around `$state`, the same way `main` does.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(taskkeeper::auth::AuthMiddleware)
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskkeeper::routes::config),
        )
        .await
    };
}

/// Sends a request and returns the status and the JSON body (`Value::Null` when empty).
///
/// Rejections raised by middleware come back as service errors; they are
/// rendered the way the server would render them.
pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    req: test::TestRequest,
) -> (StatusCode, Value) {
    let (status, bytes) = match test::try_call_service(app, req.to_request()).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let bytes = to_bytes(resp.into_body())
                .await
                .expect("error body should be readable");
            (status, bytes)
        }
    };
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))
    };
    (status, body)
}

pub fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }));
    send(app, req).await
}

pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> (StatusCode, Value) {
    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }));
    send(app, req).await
}

/// Registers and logs in, returning the access token.
pub async fn signup(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
) -> String {
    let (status, body) = register(app, email, "password123").await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let (status, body) = login(app, email, "password123").await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["access_token"]
        .as_str()
        .expect("access_token missing")
        .to_string()
}

pub async fn create_task(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    body: Value,
) -> Value {
    let req = authed(test::TestRequest::post().uri("/tasks"), token).set_json(body);
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
    body
}
