mod account_service;
mod friend_request_service;

#[cfg(test)]
mod account_service_tests;

pub use account_service::{
    AccountService, AccountServiceDependencies, LoginRequest, RegisterAccountRequest,
};
pub use friend_request_service::{FriendRequestService, FriendRequestServiceDependencies};
