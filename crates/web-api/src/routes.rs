use std::time::Duration;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use application::{LoginRequest, RegisterAccountRequest, MAX_PASSWORD_BYTES};
use domain::{AccountId, Friend, FriendRequestId, Username};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct CredentialsPayload {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SendFriendRequestPayload {
    sender_id: i64,
    recipient_id: i64,
}

#[derive(Debug, Serialize)]
struct IdResponse {
    id: i64,
}

/// 请求体解析失败时返回统一的错误结构
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
struct JsonBody<T>(T);

#[derive(FromRequestParts, Deserialize)]
#[serde(transparent)]
#[from_request(via(Path), rejection(ApiError))]
struct IdPath(i64);

/// 构建路由。每个请求都在超时层内执行，超时即取消处理中的存储操作。
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/register", post(register))
        .route("/accounts/login", post(login))
        .route("/accounts/{id}/deactivate", post(deactivate))
        .route("/accounts/{id}/friends", get(get_friends))
        .route("/friend-requests", post(send_friend_request))
        .route("/friend-requests/{id}/accept", post(accept_friend_request))
        .route("/friend-requests/{id}", delete(delete_friend_request))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

fn parse_credentials(payload: CredentialsPayload) -> Result<(Username, String), ApiError> {
    let username = Username::parse(payload.username)?;
    if payload.password.is_empty() {
        return Err(ApiError::bad_request("password: cannot be empty"));
    }
    if payload.password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::bad_request(format!(
            "password: cannot exceed {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok((username, payload.password))
}

fn parse_id(field: &str, value: i64) -> Result<i64, ApiError> {
    if value <= 0 {
        return Err(ApiError::bad_request(format!("{field}: must be positive")));
    }
    Ok(value)
}

async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsPayload>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let (username, password) = parse_credentials(payload)?;
    let id = state
        .account_service
        .register(RegisterAccountRequest { username, password })
        .await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id: id.value() })))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsPayload>,
) -> Result<Json<IdResponse>, ApiError> {
    let (username, password) = parse_credentials(payload)?;
    let id = state
        .account_service
        .login(LoginRequest { username, password })
        .await?;

    Ok(Json(IdResponse { id: id.value() }))
}

async fn deactivate(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let id = AccountId::new(parse_id("account_id", id)?);
    state.account_service.make_inactive(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_friends(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<Json<Vec<Friend>>, ApiError> {
    let id = AccountId::new(parse_id("account_id", id)?);
    let friends = state.friend_request_service.get_friends(id).await?;
    Ok(Json(friends))
}

async fn send_friend_request(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SendFriendRequestPayload>,
) -> Result<(StatusCode, Json<IdResponse>), ApiError> {
    let sender_id = AccountId::new(parse_id("sender_id", payload.sender_id)?);
    let recipient_id = AccountId::new(parse_id("recipient_id", payload.recipient_id)?);
    let id = state
        .friend_request_service
        .send(sender_id, recipient_id)
        .await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id: id.value() })))
}

async fn accept_friend_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let id = FriendRequestId::new(parse_id("friend_request_id", id)?);
    state.friend_request_service.accept(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_friend_request(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> Result<StatusCode, ApiError> {
    let id = FriendRequestId::new(parse_id("friend_request_id", id)?);
    state.friend_request_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
