//! Helpers for driving the router in tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use thoughtline_db::Database;

use crate::{AppStateInner, app};

pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let state = Arc::new(AppStateInner { db });
        Self { router: app(state) }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(req).await
    }

    /// Sends `raw` verbatim as a JSON body.
    pub async fn send_raw(&self, method: &str, uri: &str, raw: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.dispatch(req).await
    }

    async fn dispatch(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// Creates `<name>` with email `<name>@example.com`; returns its id.
pub async fn create_user(app: &TestApp, name: &str) -> String {
    let (status, body) = app
        .send(
            "POST",
            "/api/users",
            Some(json!({ "username": name, "email": format!("{}@example.com", name) })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["_id"].as_str().unwrap().to_string()
}

/// Creates a thought for `user_id`; returns its id.
pub async fn create_thought(app: &TestApp, user_id: &str, username: &str, text: &str) -> String {
    let (status, body) = app
        .send(
            "POST",
            "/api/thoughts",
            Some(json!({ "userId": user_id, "thoughtText": text, "username": username })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["_id"].as_str().unwrap().to_string()
}
