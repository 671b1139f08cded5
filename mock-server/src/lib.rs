use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

pub const PUSH_PATH: &str = "/v2/bot/message/push";
pub const REPLY_PATH: &str = "/v2/bot/message/reply";
pub const REQUEST_ID_HEADER: &str = "x-line-request-id";

const MAX_MESSAGES: usize = 5;

#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Delay applied before every handler answers.
    pub latency: Duration,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    pub property: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub picture_url: String,
    pub status_message: String,
}

/// A push or reply the mock accepted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Delivery {
    pub kind: String,
    pub target: String,
    pub messages: Vec<Value>,
}

#[derive(Clone, Debug)]
pub struct Content {
    pub content_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushRequest {
    to: String,
    #[serde(default)]
    messages: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest {
    reply_token: String,
    #[serde(default)]
    messages: Vec<Value>,
}

pub struct MockState {
    config: MockConfig,
    deliveries: RwLock<Vec<Delivery>>,
    profiles: HashMap<String, Profile>,
    contents: HashMap<String, Content>,
}

pub type Db = Arc<MockState>;

pub type Failure = (StatusCode, Json<ErrorBody>);

pub fn app() -> Router {
    app_with(MockConfig::default())
}

pub fn app_with(config: MockConfig) -> Router {
    let state: Db = Arc::new(MockState {
        config,
        deliveries: RwLock::new(Vec::new()),
        profiles: seed_profiles(),
        contents: seed_contents(),
    });
    Router::new()
        .route(PUSH_PATH, post(push_message))
        .route(REPLY_PATH, post(reply_message))
        .route("/v2/bot/profile/{user_id}", get(get_profile))
        .route("/v2/bot/message/{message_id}/content", get(get_content))
        .route("/_mock/deliveries", get(list_deliveries))
        .layer(middleware::map_response(stamp_request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, MockConfig::default()).await
}

pub async fn run_with(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn seed_profiles() -> HashMap<String, Profile> {
    let profile = Profile {
        user_id: "U4af4980629".to_string(),
        display_name: "LINE taro".to_string(),
        picture_url: "https://obs.line-apps.com/abcdefghijklmn".to_string(),
        status_message: "Hello, LINE!".to_string(),
    };
    HashMap::from([(profile.user_id.clone(), profile)])
}

fn seed_contents() -> HashMap<String, Content> {
    let image = Content {
        content_type: "image/png",
        file_name: "325708.png".to_string(),
        bytes: b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR".to_vec(),
    };
    let audio = Content {
        content_type: "audio/x-m4a",
        file_name: "325709.m4a".to_string(),
        bytes: vec![0u8; 64 * 1024],
    };
    HashMap::from([("325708".to_string(), image), ("325709".to_string(), audio)])
}

async fn stamp_request_id(mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().simple().to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(ErrorBody {
            message: message.into(),
            details: Vec::new(),
        }),
    )
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(token) if !token.trim().is_empty() => Ok(()),
        _ => Err(failure(
            StatusCode::UNAUTHORIZED,
            "Authentication failed. Confirm that the access token in the authorization header is valid.",
        )),
    }
}

async fn simulate_latency(state: &MockState) {
    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }
}

/// Validate messages the way the platform does, one detail per violation.
pub fn validate_messages(messages: &[Value]) -> Result<(), Failure> {
    let mut details = Vec::new();
    if messages.is_empty() || messages.len() > MAX_MESSAGES {
        details.push(ErrorDetail {
            message: format!("size must be between 1 and {MAX_MESSAGES}"),
            property: "messages".to_string(),
        });
    }
    for (i, message) in messages.iter().enumerate() {
        match message.get("type").and_then(Value::as_str) {
            Some("text") => {
                let empty = message.get("text").and_then(Value::as_str).map_or(true, str::is_empty);
                if empty {
                    details.push(ErrorDetail {
                        message: "may not be empty".to_string(),
                        property: format!("messages[{i}].text"),
                    });
                }
            }
            Some("image" | "video" | "audio" | "location" | "sticker") => {}
            _ => details.push(ErrorDetail {
                message: "invalid message type".to_string(),
                property: format!("messages[{i}].type"),
            }),
        }
    }
    if details.is_empty() {
        return Ok(());
    }
    Err((
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            message: format!("Request body has {} error(s).", details.len()),
            details,
        }),
    ))
}

async fn deliver(state: &MockState, kind: &str, target: String, messages: Vec<Value>) -> Result<Json<Value>, Failure> {
    validate_messages(&messages)?;
    state.deliveries.write().await.push(Delivery {
        kind: kind.to_string(),
        target,
        messages,
    });
    Ok(Json(serde_json::json!({})))
}

async fn push_message(
    State(state): State<Db>,
    headers: HeaderMap,
    Json(input): Json<PushRequest>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    simulate_latency(&state).await;
    deliver(&state, "push", input.to, input.messages).await
}

async fn reply_message(
    State(state): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ReplyRequest>,
) -> Result<Json<Value>, Failure> {
    authorize(&headers)?;
    simulate_latency(&state).await;
    deliver(&state, "reply", input.reply_token, input.messages).await
}

async fn get_profile(
    State(state): State<Db>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>, Failure> {
    authorize(&headers)?;
    simulate_latency(&state).await;
    state
        .profiles
        .get(&user_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Not found"))
}

async fn get_content(
    State(state): State<Db>,
    headers: HeaderMap,
    Path(message_id): Path<String>,
) -> Result<Response, Failure> {
    authorize(&headers)?;
    simulate_latency(&state).await;
    let content = state
        .contents
        .get(&message_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Not found"))?;
    let disposition = format!("attachment; filename={}", content.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, content.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content.bytes.clone(),
    )
        .into_response())
}

async fn list_deliveries(State(state): State<Db>) -> Json<Vec<Delivery>> {
    Json(state.deliveries.read().await.clone())
}
