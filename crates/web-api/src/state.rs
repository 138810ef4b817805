use std::sync::Arc;

use application::{AccountService, FriendRequestService};

#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<AccountService>,
    pub friend_request_service: Arc<FriendRequestService>,
}

impl AppState {
    pub fn new(
        account_service: Arc<AccountService>,
        friend_request_service: Arc<FriendRequestService>,
    ) -> Self {
        Self {
            account_service,
            friend_request_service,
        }
    }
}
