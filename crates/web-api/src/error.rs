use application::{ApplicationError, ErrorKind};
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", message)
    }

    pub fn internal_server_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "internal error",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        // 内部错误的原因已在服务层记录，这里只返回通用信息
        match error.kind() {
            ErrorKind::InvalidCredentials => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CREDENTIALS",
                "invalid credentials",
            ),
            ErrorKind::UserAlreadyExists => {
                ApiError::new(StatusCode::BAD_REQUEST, "USER_EXISTS", "user already exists")
            }
            ErrorKind::SelfFriendRequest => ApiError::new(
                StatusCode::BAD_REQUEST,
                "SELF_FRIEND_REQUEST",
                "cannot send a friend request to yourself",
            ),
            ErrorKind::UserNotFound => {
                ApiError::new(StatusCode::NOT_FOUND, "USER_NOT_FOUND", "user not found")
            }
            ErrorKind::FriendRequestNotFound => ApiError::new(
                StatusCode::NOT_FOUND,
                "FRIEND_REQUEST_NOT_FOUND",
                "friend request not found",
            ),
            ErrorKind::AlreadyFriends => {
                ApiError::new(StatusCode::CONFLICT, "ALREADY_FRIENDS", "already friends")
            }
            ErrorKind::UserAlreadyInactive => ApiError::new(
                StatusCode::CONFLICT,
                "USER_INACTIVE",
                "user already inactive",
            ),
            ErrorKind::Internal => ApiError::internal_server_error(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::InvalidArgument { field, reason } => {
                ApiError::bad_request(format!("{}: {}", field, reason))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
