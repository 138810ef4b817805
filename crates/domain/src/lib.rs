//! 身份与社交关系服务的核心领域模型
//!
//! 包含账户、好友请求等实体，仓储接口以及仓储层错误类型。

pub mod account;
pub mod errors;
pub mod friend_request;
pub mod repository;
pub mod value_objects;

// 重新导出常用类型
pub use account::Account;
pub use errors::*;
pub use friend_request::{unordered_pair, Friend, FriendRequest, FriendRequestStatus};
pub use repository::*;
pub use value_objects::*;
