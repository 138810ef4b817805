//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：账户登录/注册/停用与好友请求，
//! 负责把仓储层错误归类为面向调用方的错误，并定义密码哈希器的抽象。

pub mod error;
pub mod password;
pub mod services;

pub use error::{ApplicationError, ApplicationResult, ErrorKind};
pub use password::{PasswordHasher, PasswordHasherError, MAX_PASSWORD_BYTES};
pub use services::{
    AccountService, AccountServiceDependencies, FriendRequestService,
    FriendRequestServiceDependencies, LoginRequest, RegisterAccountRequest,
};
