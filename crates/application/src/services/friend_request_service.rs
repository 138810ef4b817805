use std::sync::Arc;

use domain::{
    AccountId, Friend, FriendRequestId, FriendRequestReader, FriendRequestWriter,
    RepositoryErrorKind,
};
use tracing::{error, info, warn};

use crate::error::{ApplicationError, ApplicationResult};

pub struct FriendRequestServiceDependencies {
    pub friend_request_writer: Arc<dyn FriendRequestWriter>,
    pub friend_request_reader: Arc<dyn FriendRequestReader>,
}

/// 好友请求用例：发送、接受、删除、查询好友列表。
pub struct FriendRequestService {
    deps: FriendRequestServiceDependencies,
}

impl FriendRequestService {
    pub fn new(deps: FriendRequestServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn send(
        &self,
        sender_id: AccountId,
        recipient_id: AccountId,
    ) -> ApplicationResult<FriendRequestId> {
        const OP: &str = "friend_requests.send";

        if sender_id == recipient_id {
            warn!(op = OP, account_id = %sender_id, "拒绝向自己发送好友请求");
            return Err(ApplicationError::SelfFriendRequest);
        }

        match self
            .deps
            .friend_request_writer
            .save(sender_id, recipient_id)
            .await
        {
            Ok(id) => {
                info!(op = OP, request_id = %id, %sender_id, %recipient_id, "好友请求已发送");
                Ok(id)
            }
            Err(err) => match err.kind() {
                RepositoryErrorKind::Conflict => {
                    warn!(op = OP, %sender_id, %recipient_id, "好友关系已存在: {}", err);
                    Err(ApplicationError::AlreadyFriends)
                }
                RepositoryErrorKind::NotFound => {
                    warn!(op = OP, %sender_id, %recipient_id, "账户不存在: {}", err);
                    Err(ApplicationError::UserNotFound)
                }
                _ => {
                    error!(op = OP, %sender_id, %recipient_id, "发送好友请求失败: {}", err);
                    Err(ApplicationError::internal(OP, err))
                }
            },
        }
    }

    pub async fn accept(&self, request_id: FriendRequestId) -> ApplicationResult<()> {
        const OP: &str = "friend_requests.accept";

        match self.deps.friend_request_writer.accept(request_id).await {
            Ok(()) => {
                info!(op = OP, %request_id, "好友请求已接受");
                Ok(())
            }
            Err(err) if err.is(RepositoryErrorKind::NotFound) => {
                warn!(op = OP, %request_id, "好友请求不存在: {}", err);
                Err(ApplicationError::FriendRequestNotFound)
            }
            Err(err) => {
                error!(op = OP, %request_id, "接受好友请求失败: {}", err);
                Err(ApplicationError::internal(OP, err))
            }
        }
    }

    pub async fn delete(&self, request_id: FriendRequestId) -> ApplicationResult<()> {
        const OP: &str = "friend_requests.delete";

        match self.deps.friend_request_writer.delete(request_id).await {
            Ok(()) => {
                info!(op = OP, %request_id, "好友请求已删除");
                Ok(())
            }
            Err(err) if err.is(RepositoryErrorKind::NotFound) => {
                warn!(op = OP, %request_id, "好友请求不存在: {}", err);
                Err(ApplicationError::FriendRequestNotFound)
            }
            Err(err) => {
                error!(op = OP, %request_id, "删除好友请求失败: {}", err);
                Err(ApplicationError::internal(OP, err))
            }
        }
    }

    pub async fn get_friends(&self, account_id: AccountId) -> ApplicationResult<Vec<Friend>> {
        const OP: &str = "friend_requests.get_friends";

        self.deps
            .friend_request_reader
            .friends_of(account_id)
            .await
            .map_err(|err| {
                error!(op = OP, %account_id, "查询好友列表失败: {}", err);
                ApplicationError::internal(OP, err)
            })
    }
}
