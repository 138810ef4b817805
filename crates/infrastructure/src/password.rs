use application::{PasswordHasher, PasswordHasherError, MAX_PASSWORD_BYTES};
use async_trait::async_trait;
use bcrypt::{hash, verify, DEFAULT_COST};
use domain::PasswordHash;

/// 基于 bcrypt 的密码哈希器。哈希与校验在阻塞线程池中执行。
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: Option<u32>) -> Self {
        Self {
            cost: cost.unwrap_or(DEFAULT_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        // bcrypt 只取前 72 字节，超出部分不参与哈希
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordHasherError::TooLong);
        }
        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(plaintext, cost))
            .await
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
            .and_then(|res| res.map_err(|err| PasswordHasherError::hash_error(err.to_string())))?;

        PasswordHash::new(hashed).map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<(), PasswordHasherError> {
        // 超长密码不可能被哈希保存过
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordHasherError::Mismatch);
        }
        let plaintext = plaintext.to_owned();
        let hashed = hashed.as_str().to_owned();
        let matched = tokio::task::spawn_blocking(move || verify(plaintext, &hashed))
            .await
            .map_err(|err| PasswordHasherError::verify_error(err.to_string()))
            .and_then(|res| res.map_err(|err| PasswordHasherError::verify_error(err.to_string())))?;

        if matched {
            Ok(())
        } else {
            Err(PasswordHasherError::Mismatch)
        }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(Some(DEFAULT_COST))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(Some(4))
    }

    #[tokio::test]
    async fn hash_then_verify_succeeds() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("pw1").await.unwrap();

        assert_ne!(hashed.as_str(), "pw1");
        assert!(hasher.verify("pw1", &hashed).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_password_is_mismatch() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("pw1").await.unwrap();

        let err = hasher.verify("pw2", &hashed).await.unwrap_err();
        assert!(err.is_mismatch());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("same").await.unwrap();
        let second = hasher.hash("same").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_is_not_a_mismatch() {
        let hasher = fast_hasher();
        let garbage = PasswordHash::new("not-a-bcrypt-hash").unwrap();

        let err = hasher.verify("pw1", &garbage).await.unwrap_err();
        assert!(matches!(err, PasswordHasherError::Verify(_)));
    }

    #[tokio::test]
    async fn invalid_cost_fails_hashing() {
        let hasher = BcryptPasswordHasher::new(Some(40));
        let err = hasher.hash("pw1").await.unwrap_err();
        assert!(matches!(err, PasswordHasherError::Hash(_)));
    }

    #[tokio::test]
    async fn password_over_limit_is_refused() {
        let hasher = fast_hasher();
        let err = hasher
            .hash(&"a".repeat(MAX_PASSWORD_BYTES + 1))
            .await
            .unwrap_err();
        assert!(matches!(err, PasswordHasherError::TooLong));
    }

    #[tokio::test]
    async fn shared_prefix_beyond_limit_does_not_verify() {
        let hasher = fast_hasher();
        let stored = "a".repeat(MAX_PASSWORD_BYTES);
        let hashed = hasher.hash(&stored).await.unwrap();
        assert!(hasher.verify(&stored, &hashed).await.is_ok());

        let longer = format!("{stored}totally-different");
        let err = hasher.verify(&longer, &hashed).await.unwrap_err();
        assert!(err.is_mismatch());
    }

    #[test]
    fn default_cost_is_bcrypt_default() {
        assert_eq!(BcryptPasswordHasher::default().cost(), DEFAULT_COST);
    }
}
