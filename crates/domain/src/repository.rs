//! 仓储接口
//!
//! 按能力拆分为读写两组，服务只依赖自己需要的那部分。
//! 所有实现都必须保证：调用方放弃（future 被 drop）时，底层存储操作随之中止。

use async_trait::async_trait;

use crate::account::Account;
use crate::errors::RepositoryError;
use crate::friend_request::Friend;
use crate::value_objects::{AccountId, FriendRequestId, PasswordHash, Username};

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// 只返回活跃账户；非活跃账户对登录不可见。
    async fn fetch_active_by_username(&self, username: &Username) -> RepositoryResult<Account>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait AccountWriter: Send + Sync {
    /// 用户名冲突时返回 `Conflict`。
    async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> RepositoryResult<AccountId>;

    /// 原子地把账户置为非活跃：不存在返回 `NotFound`，已非活跃返回 `AlreadyInactive`。
    async fn deactivate(&self, id: AccountId) -> RepositoryResult<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait FriendRequestWriter: Send + Sync {
    /// 同一对账户已有请求时返回 `Conflict`，任一账户不存在时返回 `NotFound`。
    async fn save(
        &self,
        sender_id: AccountId,
        recipient_id: AccountId,
    ) -> RepositoryResult<FriendRequestId>;

    async fn accept(&self, id: FriendRequestId) -> RepositoryResult<()>;

    async fn delete(&self, id: FriendRequestId) -> RepositoryResult<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait FriendRequestReader: Send + Sync {
    async fn friends_of(&self, account_id: AccountId) -> RepositoryResult<Vec<Friend>>;
}
