use async_trait::async_trait;
use domain::PasswordHash;
use thiserror::Error;

/// bcrypt 只使用密码的前 72 个字节，更长的密码直接拒绝而不是截断。
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, Error)]
pub enum PasswordHasherError {
    #[error("hash error: {0}")]
    Hash(String),
    #[error("verify error: {0}")]
    Verify(String),
    #[error("password exceeds 72 bytes")]
    TooLong,
    /// 密码与哈希不匹配，属于预期结果而不是系统故障。
    #[error("password mismatch")]
    Mismatch,
}

impl PasswordHasherError {
    pub fn hash_error(message: impl Into<String>) -> Self {
        Self::Hash(message.into())
    }

    pub fn verify_error(message: impl Into<String>) -> Self {
        Self::Verify(message.into())
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch)
    }
}

/// 单向密码哈希。无状态，代价参数在构造时固定。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// 超过 `MAX_PASSWORD_BYTES` 的密码返回 `PasswordHasherError::TooLong`。
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// 不匹配时返回 `PasswordHasherError::Mismatch`。
    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<(), PasswordHasherError>;
}
