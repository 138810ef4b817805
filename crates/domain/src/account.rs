use crate::value_objects::{AccountId, PasswordHash, Username};

/// 已注册的账户。
///
/// `is_active` 只会从 `true` 变为 `false` 一次，没有物理删除。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Account {
    pub id: AccountId,
    pub username: Username,
    #[serde(skip_serializing)] // 密码哈希不暴露给调用方
    pub password_hash: PasswordHash,
    pub is_active: bool,
}

impl Account {
    pub fn new(id: AccountId, username: Username, password_hash: PasswordHash) -> Self {
        Self {
            id,
            username,
            password_hash,
            is_active: true,
        }
    }

    /// 返回 `false` 表示账户早已是非活跃状态。
    pub fn deactivate(&mut self) -> bool {
        if !self.is_active {
            return false;
        }
        self.is_active = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            AccountId::new(1),
            Username::parse("alice").unwrap(),
            PasswordHash::new("hash").unwrap(),
        )
    }

    #[test]
    fn new_account_is_active() {
        assert!(account().is_active);
    }

    #[test]
    fn deactivate_flips_once() {
        let mut account = account();
        assert!(account.deactivate());
        assert!(!account.is_active);
        assert!(!account.deactivate());
    }

    #[test]
    fn serialization_skips_password_hash() {
        let json = serde_json::to_value(account()).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("password_hash").is_none());
    }
}
