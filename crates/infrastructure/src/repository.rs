use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use domain::{
    Account, AccountId, AccountReader, AccountWriter, Friend, FriendRequestId,
    FriendRequestReader, FriendRequestWriter, PasswordHash, RepositoryError, RepositoryResult,
    Username,
};
use sqlx::{error::ErrorKind, postgres::PgPoolOptions, FromRow, PgPool};

/// 存储层错误分类，只在本模块内使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    Other,
}

pub(crate) fn classify(err: &sqlx::Error) -> StorageErrorKind {
    match err {
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation => StorageErrorKind::UniqueViolation,
            ErrorKind::ForeignKeyViolation => StorageErrorKind::ForeignKeyViolation,
            _ => StorageErrorKind::Other,
        },
        _ => StorageErrorKind::Other,
    }
}

pub(crate) fn map_sqlx_err(operation: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |err| RepositoryError::storage(operation, err)
}

fn invalid_data(operation: &'static str, message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(operation, message.into())
}

#[derive(Debug, FromRow)]
struct AccountRecord {
    id: i64,
    username: String,
    password_hash: String,
    is_active: bool,
}

impl TryFrom<AccountRecord> for Account {
    type Error = RepositoryError;

    fn try_from(value: AccountRecord) -> Result<Self, Self::Error> {
        const OP: &str = "accounts.decode";
        let username =
            Username::parse(value.username).map_err(|err| invalid_data(OP, err.to_string()))?;
        let password_hash = PasswordHash::new(value.password_hash)
            .map_err(|err| invalid_data(OP, err.to_string()))?;

        Ok(Account {
            id: AccountId::from(value.id),
            username,
            password_hash,
            is_active: value.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
struct FriendRecord {
    id: i64,
    accepted: bool,
    username: String,
}

impl TryFrom<FriendRecord> for Friend {
    type Error = RepositoryError;

    fn try_from(value: FriendRecord) -> Result<Self, Self::Error> {
        let friend_name = Username::parse(value.username)
            .map_err(|err| invalid_data("friend_requests.decode", err.to_string()))?;

        Ok(Friend {
            friend_request_id: FriendRequestId::from(value.id),
            friend_name,
            accepted: value.accepted,
        })
    }
}

#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountReader for PgAccountRepository {
    async fn fetch_active_by_username(&self, username: &Username) -> RepositoryResult<Account> {
        const OP: &str = "accounts.fetch_active_by_username";

        let record = sqlx::query_as::<_, AccountRecord>(
            r#"
            SELECT id, username, password_hash, is_active
            FROM accounts
            WHERE username = $1 AND is_active = TRUE
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err(OP))?;

        match record {
            Some(record) => Account::try_from(record),
            None => Err(RepositoryError::not_found(OP)),
        }
    }
}

#[async_trait]
impl AccountWriter for PgAccountRepository {
    async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> RepositoryResult<AccountId> {
        const OP: &str = "accounts.create";

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO accounts (username, password_hash, is_active)
            VALUES ($1, $2, TRUE)
            RETURNING id
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(AccountId::from(id)),
            Err(err) if classify(&err) == StorageErrorKind::UniqueViolation => {
                Err(RepositoryError::conflict(OP).with_source(err))
            }
            Err(err) => Err(RepositoryError::storage(OP, err)),
        }
    }

    async fn deactivate(&self, id: AccountId) -> RepositoryResult<()> {
        const OP: &str = "accounts.deactivate";

        let mut tx = self.pool.begin().await.map_err(map_sqlx_err(OP))?;

        // 必须是事务中的第一条语句
        if let Err(err) = sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await
        {
            let _ = tx.rollback().await;
            return Err(RepositoryError::storage(OP, err));
        }

        // FOR UPDATE 让并发的停用请求在行锁上排队，后到者读到已提交的 false
        let is_active = match sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(i64::from(id))
        .fetch_optional(&mut *tx)
        .await
        {
            Ok(Some(is_active)) => is_active,
            Ok(None) => {
                let _ = tx.rollback().await;
                return Err(RepositoryError::not_found(OP));
            }
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(RepositoryError::storage(OP, err));
            }
        };

        if !is_active {
            let _ = tx.rollback().await;
            return Err(RepositoryError::already_inactive(OP));
        }

        if let Err(err) = sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = $1")
            .bind(i64::from(id))
            .execute(&mut *tx)
            .await
        {
            let _ = tx.rollback().await;
            return Err(RepositoryError::storage(OP, err));
        }

        tx.commit().await.map_err(map_sqlx_err(OP))
    }
}

#[derive(Clone)]
pub struct PgFriendRequestRepository {
    pool: PgPool,
}

impl PgFriendRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRequestWriter for PgFriendRequestRepository {
    async fn save(
        &self,
        sender_id: AccountId,
        recipient_id: AccountId,
    ) -> RepositoryResult<FriendRequestId> {
        const OP: &str = "friend_requests.save";

        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO friend_requests (sender_id, recipient_id, accepted)
            VALUES ($1, $2, FALSE)
            RETURNING id
            "#,
        )
        .bind(i64::from(sender_id))
        .bind(i64::from(recipient_id))
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(FriendRequestId::from(id)),
            Err(err) => match classify(&err) {
                StorageErrorKind::UniqueViolation => {
                    Err(RepositoryError::conflict(OP).with_source(err))
                }
                StorageErrorKind::ForeignKeyViolation => {
                    Err(RepositoryError::not_found(OP).with_source(err))
                }
                StorageErrorKind::Other => Err(RepositoryError::storage(OP, err)),
            },
        }
    }

    async fn accept(&self, id: FriendRequestId) -> RepositoryResult<()> {
        const OP: &str = "friend_requests.accept";

        // 无条件更新：已接受的请求再次接受仍命中一行
        let result = sqlx::query("UPDATE friend_requests SET accepted = TRUE WHERE id = $1")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err(OP))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(OP));
        }
        Ok(())
    }

    async fn delete(&self, id: FriendRequestId) -> RepositoryResult<()> {
        const OP: &str = "friend_requests.delete";

        let result = sqlx::query("DELETE FROM friend_requests WHERE id = $1")
            .bind(i64::from(id))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err(OP))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(OP));
        }
        Ok(())
    }
}

#[async_trait]
impl FriendRequestReader for PgFriendRequestRepository {
    async fn friends_of(&self, account_id: AccountId) -> RepositoryResult<Vec<Friend>> {
        const OP: &str = "friend_requests.friends_of";

        let records = sqlx::query_as::<_, FriendRecord>(
            r#"
            WITH friends AS (
                SELECT id,
                    CASE
                        WHEN sender_id = $1 THEN recipient_id
                        WHEN recipient_id = $1 THEN sender_id
                    END AS friend_id,
                    accepted
                FROM friend_requests
                WHERE sender_id = $1 OR recipient_id = $1
            )
            SELECT f.id, f.accepted, a.username
            FROM friends f
            JOIN accounts a ON a.id = f.friend_id
            ORDER BY f.id
            "#,
        )
        .bind(i64::from(account_id))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err(OP))?;

        records.into_iter().map(Friend::try_from).collect()
    }
}

pub struct PgStorage {
    pub pool: PgPool,
    pub account_repository: Arc<PgAccountRepository>,
    pub friend_request_repository: Arc<PgFriendRequestRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            account_repository: Arc::new(PgAccountRepository::new(pool.clone())),
            friend_request_repository: Arc::new(PgFriendRequestRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_classify_as_other() {
        assert_eq!(classify(&sqlx::Error::RowNotFound), StorageErrorKind::Other);
        assert_eq!(classify(&sqlx::Error::PoolTimedOut), StorageErrorKind::Other);
    }

    #[test]
    fn record_with_blank_username_is_rejected() {
        let record = AccountRecord {
            id: 1,
            username: "  ".to_string(),
            password_hash: "$2b$04$x".to_string(),
            is_active: true,
        };
        let err = Account::try_from(record).unwrap_err();
        assert_eq!(err.kind(), domain::RepositoryErrorKind::StorageFailure);
    }

    #[test]
    fn friend_record_decodes() {
        let record = FriendRecord {
            id: 10,
            accepted: true,
            username: "bob".to_string(),
        };
        let friend = Friend::try_from(record).unwrap();
        assert_eq!(friend.friend_request_id, FriendRequestId::new(10));
        assert_eq!(friend.friend_name.as_str(), "bob");
        assert!(friend.accepted);
    }
}
