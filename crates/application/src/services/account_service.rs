use std::sync::Arc;

use domain::{AccountId, AccountReader, AccountWriter, RepositoryErrorKind, Username};
use tracing::{error, info, warn};

use crate::{
    error::{ApplicationError, ApplicationResult},
    password::PasswordHasher,
};

#[derive(Debug, Clone)]
pub struct RegisterAccountRequest {
    pub username: Username,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: Username,
    pub password: String,
}

pub struct AccountServiceDependencies {
    pub account_reader: Arc<dyn AccountReader>,
    pub account_writer: Arc<dyn AccountWriter>,
    pub password_hasher: Arc<dyn PasswordHasher>,
}

/// 账户用例：登录、注册、停用。
///
/// "账户不存在"与"密码错误"对调用方不可区分，统一返回 `InvalidCredentials`。
pub struct AccountService {
    deps: AccountServiceDependencies,
}

impl AccountService {
    pub fn new(deps: AccountServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn login(&self, request: LoginRequest) -> ApplicationResult<AccountId> {
        const OP: &str = "accounts.login";

        let account = match self
            .deps
            .account_reader
            .fetch_active_by_username(&request.username)
            .await
        {
            Ok(account) => account,
            Err(err) if err.is(RepositoryErrorKind::NotFound) => {
                warn!(op = OP, username = %request.username, "账户不存在或已停用: {}", err);
                return Err(ApplicationError::InvalidCredentials);
            }
            Err(err) => {
                error!(op = OP, username = %request.username, "查询账户失败: {}", err);
                return Err(ApplicationError::internal(OP, err));
            }
        };

        match self
            .deps
            .password_hasher
            .verify(&request.password, &account.password_hash)
            .await
        {
            Ok(()) => Ok(account.id),
            Err(err) if err.is_mismatch() => {
                warn!(op = OP, account_id = %account.id, "密码不匹配");
                Err(ApplicationError::InvalidCredentials)
            }
            Err(err) => {
                error!(op = OP, account_id = %account.id, "校验密码失败: {}", err);
                Err(ApplicationError::internal(OP, err))
            }
        }
    }

    pub async fn register(&self, request: RegisterAccountRequest) -> ApplicationResult<AccountId> {
        const OP: &str = "accounts.register";

        let password_hash = self
            .deps
            .password_hasher
            .hash(&request.password)
            .await
            .map_err(|err| {
                error!(op = OP, "生成密码哈希失败: {}", err);
                ApplicationError::internal(OP, err)
            })?;

        match self
            .deps
            .account_writer
            .create(&request.username, &password_hash)
            .await
        {
            Ok(id) => {
                info!(op = OP, account_id = %id, username = %request.username, "账户注册成功");
                Ok(id)
            }
            Err(err) if err.is(RepositoryErrorKind::Conflict) => {
                warn!(op = OP, username = %request.username, "用户名已存在: {}", err);
                Err(ApplicationError::UserAlreadyExists)
            }
            Err(err) => {
                error!(op = OP, username = %request.username, "保存账户失败: {}", err);
                Err(ApplicationError::internal(OP, err))
            }
        }
    }

    pub async fn make_inactive(&self, id: AccountId) -> ApplicationResult<()> {
        const OP: &str = "accounts.make_inactive";

        match self.deps.account_writer.deactivate(id).await {
            Ok(()) => {
                info!(op = OP, account_id = %id, "账户已停用");
                Ok(())
            }
            Err(err) => match err.kind() {
                // 与登录保持一致，不暴露账户是否存在
                RepositoryErrorKind::NotFound => {
                    warn!(op = OP, account_id = %id, "账户不存在: {}", err);
                    Err(ApplicationError::InvalidCredentials)
                }
                RepositoryErrorKind::AlreadyInactive => {
                    warn!(op = OP, account_id = %id, "账户已是停用状态: {}", err);
                    Err(ApplicationError::UserAlreadyInactive)
                }
                _ => {
                    error!(op = OP, account_id = %id, "停用账户失败: {}", err);
                    Err(ApplicationError::internal(OP, err))
                }
            },
        }
    }
}
