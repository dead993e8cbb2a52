//! Fake backend for integration tests.
//!
//! Serves the endpoints the stores talk to on an ephemeral port, records the
//! cookie of every request and answers with canned envelopes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use stash_client::{ClientConfig, ErrorPolicy};

pub const SESSION_COOKIE: &str = "token=valid-session";

/// What the fake backend has seen.
#[derive(Debug, Default)]
pub struct Recorded {
    /// `(path, cookie)` for every request, in arrival order
    pub requests: Mutex<Vec<(String, Option<String>)>>,
    /// Bodies of POST requests by path
    pub bodies: Mutex<HashMap<String, Value>>,
}

impl Recorded {
    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn body(&self, path: &str) -> Option<Value> {
        self.bodies.lock().unwrap().get(path).cloned()
    }
}

pub struct FakeBackend {
    pub url: String,
    pub recorded: Arc<Recorded>,
}

impl FakeBackend {
    /// Start the backend on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let recorded = Arc::new(Recorded::default());

        let app = Router::new()
            .route("/api/v1/user/me", get(current_user))
            .route("/api/v1/user/profile/edit", post(edit_profile))
            .route("/api/food/list", get(foods))
            .route("/api/order/userorders", post(user_orders))
            .route("/api/order/place", post(place_order))
            .route("/api/order/status", post(order_status))
            .route("/api/v1/message/all/{id}", get(messages))
            .route("/api/v1/message/send/{id}", post(send_message))
            .route("/api/v1/job/get", get(jobs))
            .route("/api/v1/course/published", get(courses))
            .route("/api/v1/post/all", get(posts))
            .route("/api/v1/post/addpost", post(add_post))
            .route("/api/v1/post/delete/{id}", delete(delete_post))
            .route("/api/v1/live", get(live))
            .route("/test/slow/{ms}", get(slow))
            .route("/test/server-error", get(server_error))
            .route("/test/app-error", get(app_error))
            .route("/test/malformed", get(malformed))
            .route("/test/not-json", get(not_json))
            .layer(middleware::from_fn_with_state(recorded.clone(), record))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            recorded,
        }
    }

    /// Client configuration pointing at this backend.
    pub fn config(&self, cookie: Option<&str>, policy: ErrorPolicy) -> ClientConfig {
        let mut config = ClientConfig::new(&self.url);
        config.session_cookie = cookie.map(String::from);
        config.error_policy = policy;
        config.request_timeout = Duration::from_secs(5);
        config
    }
}

async fn record(State(recorded): State<Arc<Recorded>>, request: Request, next: Next) -> Response {
    let cookie = request
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);
    recorded
        .requests
        .lock()
        .unwrap()
        .push((request.uri().path().to_string(), cookie));
    next.run(request).await
}

fn authenticated(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookie| cookie.contains(SESSION_COOKIE))
}

fn store_body(recorded: &Recorded, path: &str, body: &Value) {
    recorded
        .bodies
        .lock()
        .unwrap()
        .insert(path.to_string(), body.clone());
}

// ============================================================================
// Session
// ============================================================================

async fn current_user(headers: HeaderMap) -> Response {
    if !authenticated(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "User not authenticated"})),
        )
            .into_response();
    }
    Json(json!({
        "success": true,
        "user": {"_id": "u1", "username": "ada", "email": "ada@example.com", "role": "student"}
    }))
    .into_response()
}

async fn edit_profile(State(recorded): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    store_body(&recorded, "/api/v1/user/profile/edit", &body);
    let mut user = json!({"_id": "u1", "username": "ada", "email": "ada@example.com"});
    if let Some(bio) = body.get("bio") {
        user["bio"] = bio.clone();
    }
    Json(json!({"success": true, "message": "Profile updated.", "user": user}))
}

// ============================================================================
// Food ordering
// ============================================================================

async fn foods() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            {"_id": "f1", "name": "Greek Salad", "price": 12, "category": "Salad"},
            {"_id": "f2", "name": "Veg Rolls", "price": 18, "category": "Rolls"},
            {"_id": "f3", "name": "Peri Peri Rolls", "price": 12, "category": "Rolls"}
        ]
    }))
}

async fn user_orders() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": [
            {"_id": "o1", "items": [{"_id": "f1", "name": "Greek Salad", "price": 12, "quantity": 1}],
             "amount": 12, "status": "Delivered", "payment": true}
        ]
    }))
}

async fn place_order(State(recorded): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    store_body(&recorded, "/api/order/place", &body);
    Json(json!({
        "success": true,
        "order": {
            "_id": "o2",
            "items": body["items"],
            "amount": body["amount"],
            "address": body["address"],
            "status": "Food Processing",
            "payment": false
        }
    }))
}

async fn order_status(State(recorded): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    store_body(&recorded, "/api/order/status", &body);
    Json(json!({"success": true, "message": "Status Updated"}))
}

// ============================================================================
// Chat
// ============================================================================

async fn messages(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "success": true,
        "messages": [
            {"_id": "m1", "senderId": id, "receiverId": "u1", "text": "hello"},
            {"_id": "m2", "senderId": "u1", "receiverId": id, "text": "hi there"}
        ]
    }))
}

async fn send_message(Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "newMessage": {"_id": "m-sent", "senderId": "u1", "receiverId": id, "text": body["text"]}
    }))
}

async fn live() -> Response {
    let body = concat!(
        ": connected\n\n",
        "event: newMessage\n",
        "data: {\"_id\": \"m10\", \"text\": \"first\"}\n\n",
        "event: typing\n",
        "data: {\"userId\": \"u2\"}\n\n",
        "event: newMessage\n",
        "data: {\"_id\": \"m11\", \"text\": \"second\"}\n\n",
    );
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

// ============================================================================
// Jobs, courses and posts
// ============================================================================

async fn jobs(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let all = vec![
        json!({"_id": "j1", "title": "Rust Engineer", "salary": 120, "location": "Berlin"}),
        json!({"_id": "j2", "title": "Frontend Developer", "salary": 90, "location": "Paris"}),
    ];
    let keyword = query.get("keyword").cloned().unwrap_or_default().to_lowercase();
    let jobs: Vec<Value> = all
        .into_iter()
        .filter(|job| {
            job["title"]
                .as_str()
                .is_some_and(|title| title.to_lowercase().contains(&keyword))
        })
        .collect();
    Json(json!({"success": true, "jobs": jobs}))
}

async fn courses() -> Json<Value> {
    Json(json!({
        "success": true,
        "courses": [{"_id": "c1", "title": "Rust 101", "category": "Programming", "isPublished": true}]
    }))
}

async fn posts() -> Json<Value> {
    Json(json!({
        "success": true,
        "posts": [
            {"_id": "p2", "caption": "newer"},
            {"_id": "p1", "caption": "older"}
        ]
    }))
}

async fn add_post(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "New post added",
        "post": {"_id": "p3", "caption": body["caption"]}
    }))
}

async fn delete_post() -> Json<Value> {
    Json(json!({"success": true, "message": "Post deleted"}))
}

// ============================================================================
// Failure modes
// ============================================================================

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({"success": true, "posts": [{"_id": format!("slow-{}", ms), "caption": "x"}]}))
}

async fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn app_error() -> Json<Value> {
    Json(json!({"success": false, "message": "Something went wrong"}))
}

async fn malformed() -> Json<Value> {
    Json(json!({"success": true, "posts": {"_id": "p1"}}))
}

async fn not_json() -> Response {
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}
