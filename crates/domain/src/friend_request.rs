use serde::{Deserialize, Serialize};

use crate::value_objects::{AccountId, FriendRequestId, Username};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
}

/// 两个账户之间的好友请求。
///
/// 同一对账户（不区分方向）最多存在一条请求记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendRequest {
    pub id: FriendRequestId,
    pub sender_id: AccountId,
    pub recipient_id: AccountId,
    pub accepted: bool,
}

impl FriendRequest {
    pub fn new(id: FriendRequestId, sender_id: AccountId, recipient_id: AccountId) -> Self {
        Self {
            id,
            sender_id,
            recipient_id,
            accepted: false,
        }
    }

    pub fn status(&self) -> FriendRequestStatus {
        if self.accepted {
            FriendRequestStatus::Accepted
        } else {
            FriendRequestStatus::Pending
        }
    }

    /// 重复接受不会报错，状态保持 `Accepted`。
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    pub fn involves(&self, account_id: AccountId) -> bool {
        self.sender_id == account_id || self.recipient_id == account_id
    }

    /// 以 `account_id` 为视角返回对方账户。
    pub fn counterparty(&self, account_id: AccountId) -> Option<AccountId> {
        if self.sender_id == account_id {
            Some(self.recipient_id)
        } else if self.recipient_id == account_id {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// 与方向无关的账户对，用于唯一性判断。
    pub fn pair(&self) -> (AccountId, AccountId) {
        unordered_pair(self.sender_id, self.recipient_id)
    }
}

pub fn unordered_pair(a: AccountId, b: AccountId) -> (AccountId, AccountId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// 好友列表的读模型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub friend_request_id: FriendRequestId,
    pub friend_name: Username,
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FriendRequest {
        FriendRequest::new(FriendRequestId::new(10), AccountId::new(1), AccountId::new(2))
    }

    #[test]
    fn pending_then_accepted() {
        let mut request = request();
        assert_eq!(request.status(), FriendRequestStatus::Pending);
        request.accept();
        request.accept();
        assert_eq!(request.status(), FriendRequestStatus::Accepted);
    }

    #[test]
    fn counterparty_resolves_both_directions() {
        let request = request();
        assert_eq!(request.counterparty(AccountId::new(1)), Some(AccountId::new(2)));
        assert_eq!(request.counterparty(AccountId::new(2)), Some(AccountId::new(1)));
        assert_eq!(request.counterparty(AccountId::new(3)), None);
    }

    #[test]
    fn pair_ignores_direction() {
        let forward = request();
        let backward =
            FriendRequest::new(FriendRequestId::new(11), AccountId::new(2), AccountId::new(1));
        assert_eq!(forward.pair(), backward.pair());
    }
}
