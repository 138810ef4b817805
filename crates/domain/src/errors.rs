//! 领域模型错误定义
//!
//! `DomainError` 描述输入校验失败；`RepositoryError` 描述存储层的失败，
//! 按 `RepositoryErrorKind` 比较，原始错误作为 source 保留，只用于日志。

use std::fmt;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 参数校验失败
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储错误的分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// 目标记录不存在（包括外键引用的账户不存在）
    NotFound,
    /// 唯一约束冲突
    Conflict,
    /// 账户已经是非活跃状态
    AlreadyInactive,
    /// 其他存储失败
    StorageFailure,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "record not found",
            Self::Conflict => "unique constraint violated",
            Self::AlreadyInactive => "account already inactive",
            Self::StorageFailure => "storage failure",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
#[error("{operation}: {kind}")]
pub struct RepositoryError {
    kind: RepositoryErrorKind,
    operation: &'static str,
    #[source]
    source: Option<BoxError>,
}

impl RepositoryError {
    pub fn new(kind: RepositoryErrorKind, operation: &'static str) -> Self {
        Self {
            kind,
            operation,
            source: None,
        }
    }

    pub fn not_found(operation: &'static str) -> Self {
        Self::new(RepositoryErrorKind::NotFound, operation)
    }

    pub fn conflict(operation: &'static str) -> Self {
        Self::new(RepositoryErrorKind::Conflict, operation)
    }

    pub fn already_inactive(operation: &'static str) -> Self {
        Self::new(RepositoryErrorKind::AlreadyInactive, operation)
    }

    pub fn storage(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self::new(RepositoryErrorKind::StorageFailure, operation).with_source(source)
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> RepositoryErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is(&self, kind: RepositoryErrorKind) -> bool {
        self.kind == kind
    }
}
