//! 内存存储
//!
//! 与 PostgreSQL 仓储遵守同一套约束：用户名唯一、好友请求按无序账户对唯一、
//! 外键存在性检查、停用的读改写在同一把写锁内完成。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use domain::{
    unordered_pair, Account, AccountId, AccountReader, AccountWriter, Friend, FriendRequest,
    FriendRequestId, FriendRequestReader, FriendRequestWriter, PasswordHash, RepositoryError,
    RepositoryResult, Username,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    accounts: BTreeMap<AccountId, Account>,
    usernames: HashMap<Username, AccountId>,
    requests: BTreeMap<FriendRequestId, FriendRequest>,
    next_account_id: i64,
    next_request_id: i64,
}

impl State {
    fn allocate_account_id(&mut self) -> AccountId {
        self.next_account_id += 1;
        AccountId::new(self.next_account_id)
    }

    fn allocate_request_id(&mut self) -> FriendRequestId {
        self.next_request_id += 1;
        FriendRequestId::new(self.next_request_id)
    }
}

pub struct InMemoryStorage {
    state: RwLock<State>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

#[async_trait]
impl AccountReader for InMemoryStorage {
    async fn fetch_active_by_username(&self, username: &Username) -> RepositoryResult<Account> {
        let state = self.state.read().await;
        state
            .usernames
            .get(username)
            .and_then(|id| state.accounts.get(id))
            .filter(|account| account.is_active)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("accounts.fetch_active_by_username"))
    }
}

#[async_trait]
impl AccountWriter for InMemoryStorage {
    async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> RepositoryResult<AccountId> {
        let mut state = self.state.write().await;
        if state.usernames.contains_key(username) {
            return Err(RepositoryError::conflict("accounts.create"));
        }

        let id = state.allocate_account_id();
        state.usernames.insert(username.clone(), id);
        state.accounts.insert(
            id,
            Account::new(id, username.clone(), password_hash.clone()),
        );
        Ok(id)
    }

    async fn deactivate(&self, id: AccountId) -> RepositoryResult<()> {
        const OP: &str = "accounts.deactivate";

        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(OP))?;

        if account.deactivate() {
            Ok(())
        } else {
            Err(RepositoryError::already_inactive(OP))
        }
    }
}

#[async_trait]
impl FriendRequestWriter for InMemoryStorage {
    async fn save(
        &self,
        sender_id: AccountId,
        recipient_id: AccountId,
    ) -> RepositoryResult<FriendRequestId> {
        const OP: &str = "friend_requests.save";

        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&sender_id) || !state.accounts.contains_key(&recipient_id)
        {
            return Err(RepositoryError::not_found(OP));
        }

        let pair = unordered_pair(sender_id, recipient_id);
        if state.requests.values().any(|request| request.pair() == pair) {
            return Err(RepositoryError::conflict(OP));
        }

        let id = state.allocate_request_id();
        state
            .requests
            .insert(id, FriendRequest::new(id, sender_id, recipient_id));
        Ok(id)
    }

    async fn accept(&self, id: FriendRequestId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let request = state
            .requests
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found("friend_requests.accept"))?;
        request.accept();
        Ok(())
    }

    async fn delete(&self, id: FriendRequestId) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state
            .requests
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("friend_requests.delete"))
    }
}

#[async_trait]
impl FriendRequestReader for InMemoryStorage {
    async fn friends_of(&self, account_id: AccountId) -> RepositoryResult<Vec<Friend>> {
        let state = self.state.read().await;
        let friends = state
            .requests
            .values()
            .filter_map(|request| {
                let friend_id = request.counterparty(account_id)?;
                let friend = state.accounts.get(&friend_id)?;
                Some(Friend {
                    friend_request_id: request.id,
                    friend_name: friend.username.clone(),
                    accepted: request.accepted,
                })
            })
            .collect();
        Ok(friends)
    }
}
