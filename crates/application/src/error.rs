use std::fmt;

use domain::BoxError;
use thiserror::Error;

/// 面向调用方的错误分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCredentials,
    UserAlreadyExists,
    UserAlreadyInactive,
    UserNotFound,
    AlreadyFriends,
    FriendRequestNotFound,
    SelfFriendRequest,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 应用层错误。
///
/// 除 `Internal` 外的变体都不携带底层原因：原因在服务边界记录日志后丢弃，
/// 避免把存储细节泄露给调用方。
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user already inactive")]
    UserAlreadyInactive,
    #[error("user not found")]
    UserNotFound,
    #[error("users are already friends")]
    AlreadyFriends,
    #[error("friend request not found")]
    FriendRequestNotFound,
    #[error("cannot send a friend request to yourself")]
    SelfFriendRequest,
    #[error("{operation}: internal error")]
    Internal {
        operation: &'static str,
        #[source]
        source: BoxError,
    },
}

impl ApplicationError {
    pub fn internal(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Internal {
            operation,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::UserAlreadyExists => ErrorKind::UserAlreadyExists,
            Self::UserAlreadyInactive => ErrorKind::UserAlreadyInactive,
            Self::UserNotFound => ErrorKind::UserNotFound,
            Self::AlreadyFriends => ErrorKind::AlreadyFriends,
            Self::FriendRequestNotFound => ErrorKind::FriendRequestNotFound,
            Self::SelfFriendRequest => ErrorKind::SelfFriendRequest,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
