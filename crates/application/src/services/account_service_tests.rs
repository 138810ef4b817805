//! 账户服务单元测试
//!
//! 仓储与哈希器均为 mockall 生成的替身，只验证服务层的错误归类。

#[cfg(test)]
mod account_service_tests {
    use std::sync::Arc;

    use domain::{
        Account, AccountId, MockAccountReader, MockAccountWriter, PasswordHash, RepositoryError,
        Username,
    };

    use crate::error::{ApplicationError, ErrorKind};
    use crate::password::{MockPasswordHasher, PasswordHasherError};
    use crate::services::account_service::*;

    fn username(value: &str) -> Username {
        Username::parse(value).unwrap()
    }

    fn stored_account(id: i64, name: &str) -> Account {
        Account::new(
            AccountId::new(id),
            username(name),
            PasswordHash::new("$2b$04$stored").unwrap(),
        )
    }

    fn service(
        reader: MockAccountReader,
        writer: MockAccountWriter,
        hasher: MockPasswordHasher,
    ) -> AccountService {
        AccountService::new(AccountServiceDependencies {
            account_reader: Arc::new(reader),
            account_writer: Arc::new(writer),
            password_hasher: Arc::new(hasher),
        })
    }

    fn login_request(name: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username(name),
            password: password.to_string(),
        }
    }

    fn register_request(name: &str, password: &str) -> RegisterAccountRequest {
        RegisterAccountRequest {
            username: username(name),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_returns_account_id() {
        let mut reader = MockAccountReader::new();
        reader
            .expect_fetch_active_by_username()
            .withf(|name| name.as_str() == "alice")
            .times(1)
            .returning(|_| Ok(stored_account(7, "alice")));

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .withf(|plain, hash| plain.to_string() == "pw1" && hash.as_str() == "$2b$04$stored")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service(reader, MockAccountWriter::new(), hasher);
        let id = service.login(login_request("alice", "pw1")).await.unwrap();

        assert_eq!(id, AccountId::new(7));
    }

    #[tokio::test]
    async fn test_login_unknown_user_is_invalid_credentials() {
        let mut reader = MockAccountReader::new();
        reader
            .expect_fetch_active_by_username()
            .returning(|_| Err(RepositoryError::not_found("accounts.fetch_active_by_username")));

        let mut hasher = MockPasswordHasher::new();
        hasher.expect_verify().never();

        let service = service(reader, MockAccountWriter::new(), hasher);
        let err = service.login(login_request("ghost", "pw")).await.unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let mut reader = MockAccountReader::new();
        reader
            .expect_fetch_active_by_username()
            .returning(|_| Ok(stored_account(1, "alice")));

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .returning(|_, _| Err(PasswordHasherError::Mismatch));

        let service = service(reader, MockAccountWriter::new(), hasher);
        let err = service.login(login_request("alice", "wrong")).await.unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidCredentials));
        assert_eq!(err.to_string(), ApplicationError::InvalidCredentials.to_string());
    }

    #[tokio::test]
    async fn test_login_storage_failure_is_internal() {
        let mut reader = MockAccountReader::new();
        reader.expect_fetch_active_by_username().returning(|_| {
            Err(RepositoryError::storage(
                "accounts.fetch_active_by_username",
                std::io::Error::new(std::io::ErrorKind::TimedOut, "pool timed out"),
            ))
        });

        let service = service(reader, MockAccountWriter::new(), MockPasswordHasher::new());
        let err = service.login(login_request("alice", "pw")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_login_malformed_hash_is_internal() {
        let mut reader = MockAccountReader::new();
        reader
            .expect_fetch_active_by_username()
            .returning(|_| Ok(stored_account(1, "alice")));

        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_verify()
            .returning(|_, _| Err(PasswordHasherError::verify_error("invalid hash")));

        let service = service(reader, MockAccountWriter::new(), hasher);
        let err = service.login(login_request("alice", "pw")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_register_hashes_then_creates() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .withf(|plain| plain.to_string() == "pw1")
            .times(1)
            .returning(|_| Ok(PasswordHash::new("$2b$04$fresh").unwrap()));

        let mut writer = MockAccountWriter::new();
        writer
            .expect_create()
            .withf(|name, hash| name.as_str() == "alice" && hash.as_str() == "$2b$04$fresh")
            .times(1)
            .returning(|_, _| Ok(AccountId::new(1)));

        let service = service(MockAccountReader::new(), writer, hasher);
        let id = service.register(register_request("alice", "pw1")).await.unwrap();

        assert_eq!(id, AccountId::new(1));
    }

    #[tokio::test]
    async fn test_register_conflict_is_user_already_exists() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Ok(PasswordHash::new("$2b$04$fresh").unwrap()));

        let mut writer = MockAccountWriter::new();
        writer
            .expect_create()
            .returning(|_, _| Err(RepositoryError::conflict("accounts.create")));

        let service = service(MockAccountReader::new(), writer, hasher);
        let err = service.register(register_request("alice", "pw1")).await.unwrap_err();

        assert!(matches!(err, ApplicationError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_register_hash_failure_skips_storage() {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|_| Err(PasswordHasherError::hash_error("rng unavailable")));

        let mut writer = MockAccountWriter::new();
        writer.expect_create().never();

        let service = service(MockAccountReader::new(), writer, hasher);
        let err = service.register(register_request("alice", "pw1")).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_make_inactive_maps_repository_kinds() {
        let mut writer = MockAccountWriter::new();
        writer
            .expect_deactivate()
            .withf(|id| *id == AccountId::new(1))
            .returning(|_| Ok(()));
        writer
            .expect_deactivate()
            .withf(|id| *id == AccountId::new(2))
            .returning(|_| Err(RepositoryError::not_found("accounts.deactivate")));
        writer
            .expect_deactivate()
            .withf(|id| *id == AccountId::new(3))
            .returning(|_| Err(RepositoryError::already_inactive("accounts.deactivate")));
        writer.expect_deactivate().returning(|_| {
            Err(RepositoryError::storage(
                "accounts.deactivate",
                std::io::Error::new(std::io::ErrorKind::Other, "serialization failure"),
            ))
        });

        let service = service(MockAccountReader::new(), writer, MockPasswordHasher::new());

        assert!(service.make_inactive(AccountId::new(1)).await.is_ok());
        assert_eq!(
            service.make_inactive(AccountId::new(2)).await.unwrap_err().kind(),
            ErrorKind::InvalidCredentials
        );
        assert_eq!(
            service.make_inactive(AccountId::new(3)).await.unwrap_err().kind(),
            ErrorKind::UserAlreadyInactive
        );
        assert_eq!(
            service.make_inactive(AccountId::new(4)).await.unwrap_err().kind(),
            ErrorKind::Internal
        );
    }
}
