//! In-process stand-in for the PHP API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Form, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json};
use serde_json::{json, Value};

use regatta_client::alerts::{AlertReceiver, Alerts};
use regatta_client::screens::AppContext;
use regatta_client::session::SessionStore;
use regatta_client::Api;
use regatta_common::Url;

pub const EMAIL: &str = "sailor@example.com";
pub const PASSWORD: &str = "secret";

#[derive(Clone, Default)]
pub struct Stub {
    hits: Arc<Mutex<HashMap<&'static str, usize>>>,
    messages: Arc<Mutex<Vec<Value>>>,
    group_messages: Arc<Mutex<Vec<Value>>>,
    bodies: Arc<Mutex<HashMap<&'static str, Value>>>,
    failing: Arc<AtomicBool>,
}

impl Stub {
    pub fn hits(&self, endpoint: &str) -> usize {
        self.hits.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    /// Makes the message endpoints answer with HTTP 500 until turned off again.
    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn push_message(&self, sender_id: u64, receiver_id: u64, text: &str) {
        let mut messages = self.messages.lock().unwrap();
        let id = messages.len() + 1;
        messages.push(json!({
            "id": id,
            "sender_id": sender_id,
            "receiver_id": receiver_id.to_string(),
            "message": text,
            "timestamp": "2024-06-01 10:00:00",
        }));
    }

    /// The last JSON body posted to `endpoint`.
    pub fn body(&self, endpoint: &str) -> Option<Value> {
        self.bodies.lock().unwrap().get(endpoint).cloned()
    }

    fn hit(&self, endpoint: &'static str) {
        *self.hits.lock().unwrap().entry(endpoint).or_default() += 1;
    }

    fn record(&self, endpoint: &'static str, body: Value) {
        self.hit(endpoint);
        self.bodies.lock().unwrap().insert(endpoint, body);
    }

    fn failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

pub fn sailor() -> Value {
    json!({
        "id": 7,
        "username": "malek",
        "email": EMAIL,
        "usertitle": "Skipper",
        "user_image": "uploads/u7.jpg",
        "created_at": "2024-01-01 00:00:00",
    })
}

/// Starts the stub on an ephemeral port and returns its API base address.
pub async fn serve(stub: Stub) -> Url {
    let app = axum::Router::new()
        .route("/api/login.php", get(login))
        .route("/api/signup.php", post(signup))
        .route("/api/user.php", post(update_profile))
        .route("/api/get_messages.php", get(get_messages))
        .route("/api/send_message.php", post(send_message))
        .route("/api/get_group_messages.php", get(get_group_messages))
        .route("/api/send_group_message.php", post(send_group_message))
        .route("/api/chatlist.php", get(chat_list))
        .route("/api/accept_friend_request.php", get(friend_requests).post(answer_friend_request))
        .route("/api/get_users.php", get(users))
        .route("/api/get_friends.php", get(friends))
        .route("/api/recomendedUsers.php", get(recommended_users))
        .route("/api/userDetail.php", get(user_detail))
        .route("/api/send_friend_request.php", get(send_friend_request))
        .route("/api/check_friend_request_status.php", get(friend_request_status))
        .route("/api/get_outgoing_requests.php", get(outgoing_requests))
        .route("/api/create_group.php", post(create_group))
        .route("/api/get_user_groups.php", get(broken))
        .route("/api/add_member_to_group.php", post(add_member))
        .route("/api/add_users_to_group.php", post(add_users))
        .route("/api/create_event.php", post(create_event))
        .route("/api/get_invitations.php", post(invitations))
        .route("/api/update_invitation_status.php", post(update_invitation))
        .route("/api/leave_event.php", post(leave_event))
        .route("/api/get_users_selection.php", post(users_selection))
        .route("/api/send_additional_invitations.php", post(additional_invitations))
        .layer(Extension(stub));
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);
    Url::new(format!("http://{addr}/api"))
}

/// A base address nothing listens on.
pub fn dead_base() -> Url {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::new(format!("http://{addr}/api"))
}

pub fn context(base: Url) -> (AppContext, AlertReceiver) {
    let (alerts, rx) = Alerts::channel();
    let ctx = AppContext::new(Api::new(base), SessionStore::in_memory(), alerts, Duration::from_millis(50));
    (ctx, rx)
}

/// Polls `check` until it holds, for at most five seconds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within 5s");
}

async fn login(Extension(stub): Extension<Stub>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    stub.hit("login.php");
    let email = params.get("email").map(String::as_str);
    let password = params.get("password").map(String::as_str);
    if params.get("login").map(String::as_str) == Some("1") && email == Some(EMAIL) && password == Some(PASSWORD) {
        Json(json!({ "message": "Login successful", "user": sailor() }))
    } else {
        Json(json!({ "message": "Invalid email or password" }))
    }
}

async fn signup(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("signup.php");
    Json(json!({ "message": "User registered successfully" }))
}

async fn update_profile(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("user.php");
    Json(json!({ "message": "Profile updated successfully" }))
}

async fn get_messages(Extension(stub): Extension<Stub>) -> Response {
    stub.hit("get_messages.php");
    if stub.failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "database unavailable" }))).into_response();
    }
    let messages = stub.messages.lock().unwrap().clone();
    Json(Value::Array(messages)).into_response()
}

async fn send_message(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.hit("send_message.php");
    let sender = body["sender_id"].as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
    let receiver = body["receiver_id"].as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
    stub.push_message(sender, receiver, body["message"].as_str().unwrap_or_default());
    Json(json!({ "status": "success" }))
}

async fn get_group_messages(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("get_group_messages.php");
    Json(Value::Array(stub.group_messages.lock().unwrap().clone()))
}

async fn send_group_message(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("send_group_message.php", body.clone());
    let mut messages = stub.group_messages.lock().unwrap();
    let id = messages.len() + 1;
    messages.push(json!({
        "id": id,
        "sender_id": body["sender_id"],
        "group_id": body["group_id"],
        "message": body["message"],
    }));
    Json(json!({ "status": "success" }))
}

async fn chat_list(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("chatlist.php");
    Json(json!({
        "status": "success",
        "chats": [
            { "chat_start": 7, "chat_end": "9", "user1_name": "Amanda" },
            { "chat_start": "12", "chat_end": 7, "user1_name": null },
        ],
    }))
}

async fn friend_requests(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("accept_friend_request.php");
    Json(json!([
        { "id": 1, "sender_id": 9, "receiver_id": 7, "status": "pending", "sender_name": "Amanda" },
        { "id": "2", "sender_id": 12, "receiver_id": 7, "status": "pending" },
    ]))
}

async fn answer_friend_request(Extension(stub): Extension<Stub>, Form(params): Form<HashMap<String, String>>) -> Json<Value> {
    stub.hit("accept_friend_request.php");
    match params.get("action").map(String::as_str) {
        Some("accept") => Json(json!({ "message": "Friend request accepted" })),
        _ => Json(json!({ "message": "Friend request rejected" })),
    }
}

async fn users(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("get_users.php");
    Json(json!([
        { "id": 9, "username": "amanda", "email": "amanda@example.com" },
        { "id": 12, "username": "bob", "email": "bob@example.com" },
    ]))
}

async fn friends(Extension(stub): Extension<Stub>) -> Response {
    stub.hit("get_friends.php");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "db down" }))).into_response()
}

async fn recommended_users(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("recomendedUsers.php");
    Json(json!({ "users": [{ "id": "12", "username": "bob", "email": "bob@example.com" }] }))
}

async fn user_detail(Extension(stub): Extension<Stub>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    stub.hit("userDetail.php");
    match params.get("user_id").map(String::as_str) {
        Some("404") | None => Json(json!({ "status": "error", "message": "User not found" })),
        Some(id) => Json(json!({
            "status": "success",
            "user": { "id": id, "username": "amanda", "email": "amanda@example.com", "usertitle": "Bowman" },
        })),
    }
}

async fn send_friend_request(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("send_friend_request.php");
    Json(json!({ "message": "Friend request sent" }))
}

/// User 9 is already a friend of everyone.
async fn friend_request_status(Extension(stub): Extension<Stub>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    stub.hit("check_friend_request_status.php");
    let accepted = params.get("receiver_id").map(String::as_str) == Some("9");
    Json(json!({ "accepted": accepted }))
}

/// Only user 12 has a request waiting.
async fn outgoing_requests(Extension(stub): Extension<Stub>, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    stub.hit("get_outgoing_requests.php");
    if params.get("receiver_id").map(String::as_str) == Some("12") {
        Json(json!([{ "id": 5, "sender_id": 7, "receiver_id": 12, "status": "pending" }]))
    } else {
        Json(json!([]))
    }
}

async fn create_group(Extension(stub): Extension<Stub>) -> Json<Value> {
    stub.hit("create_group.php");
    Json(json!({ "success": true, "group_id": 17 }))
}

async fn broken(Extension(stub): Extension<Stub>) -> &'static str {
    stub.hit("get_user_groups.php");
    "<html>Fatal error</html>"
}

async fn add_member(Extension(stub): Extension<Stub>, Form(params): Form<HashMap<String, String>>) -> Json<Value> {
    stub.hit("add_member_to_group.php");
    match params.get("user_id").map(String::as_str) {
        Some("404") => Json(json!({ "success": false, "message": "User does not exist" })),
        _ => Json(json!({ "success": true, "message": "User added to group" })),
    }
}

async fn add_users(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("add_users_to_group.php", body);
    Json(json!({ "success": "1", "message": "Users added successfully" }))
}

async fn create_event(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("create_event.php", body);
    Json(json!({ "status": "success", "message": "Event created" }))
}

async fn invitations(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("get_invitations.php", body);
    Json(json!({
        "invitations": [
            {
                "event_id": 1,
                "invite_id": 11,
                "event_name": "Harbour Cup",
                "status": "accepted",
                "crew_members_seeking": "6",
                "accepted_members": 2,
            },
            { "event_id": "2", "invite_id": "12", "event_name": "Round the Island", "status": "pending" },
            { "event_id": "3", "invite_id": "404", "event_name": "Night Race", "status": "pending" },
        ],
    }))
}

/// Invite 404 is gone on the server.
fn invitation_reply(body: &Value) -> Json<Value> {
    if body["invite_id"] == "404" {
        Json(json!({ "status": "error", "message": "Invitation not found" }))
    } else {
        Json(json!({ "status": "success" }))
    }
}

async fn update_invitation(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    let reply = invitation_reply(&body);
    stub.record("update_invitation_status.php", body);
    reply
}

async fn leave_event(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    let reply = invitation_reply(&body);
    stub.record("leave_event.php", body);
    reply
}

async fn users_selection(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("get_users_selection.php", body);
    Json(json!({
        "status": "success",
        "users": [
            { "id": 9, "username": "amanda", "email": "amanda@example.com" },
            { "id": 12, "username": "bob", "email": "bob@example.com" },
            { "id": 14, "username": "carla", "email": "carla@example.com" },
        ],
    }))
}

async fn additional_invitations(Extension(stub): Extension<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.record("send_additional_invitations.php", body);
    Json(json!({ "status": "success" }))
}
