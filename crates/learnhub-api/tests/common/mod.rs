#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use learnhub_api::{AppState, build_router};
use learnhub_auth::JwtEncoder;
use learnhub_core::config::AppConfig;
use learnhub_core::traits::FixedClock;
use learnhub_database::memory::MemoryStore;
use learnhub_database::store::Stores;
use learnhub_entity::user::Role;
use learnhub_storage::MemoryStorageProvider;

pub const BOUNDARY: &str = "learnhub-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub organization_id: Uuid,
    encoder: JwtEncoder,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()));
        let state = AppState::new(
            config.clone(),
            Stores::memory(store.clone()),
            Arc::new(MemoryStorageProvider::new()),
            clock,
        );
        Self {
            router: build_router(state),
            store,
            organization_id: Uuid::new_v4(),
            encoder: JwtEncoder::new(&config.auth),
        }
    }

    /// Bearer token for a fresh user of `role` in the test organization.
    pub fn token(&self, role: Role) -> String {
        self.token_for(Uuid::new_v4(), role, Some(self.organization_id))
    }

    pub fn token_for(&self, user_id: Uuid, role: Role, organization_id: Option<Uuid>) -> String {
        let (token, _) = self.encoder.issue(user_id, role, organization_id, Utc::now()).unwrap();
        token
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(request("DELETE", uri, Some(token)).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: &str, uri: &str, token: &str, body: Value) -> TestResponse {
        let request = request(method, uri, Some(token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn multipart(&self, uri: &str, token: &str, parts: &[Part<'_>]) -> TestResponse {
        let request = request("POST", uri, Some(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(request).await
    }

    /// Create a course and return its id.
    pub async fn course(&self, token: &str, title: &str) -> String {
        let response = self
            .json("POST", "/api/courses", token, serde_json::json!({ "title": title }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.json()["data"]["id"].as_str().unwrap().to_string()
    }
}

fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
                );
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
