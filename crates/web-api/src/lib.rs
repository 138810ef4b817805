//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给账户与好友请求服务，并把领域错误映射为状态码。

mod error;
mod routes;
mod state;

pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::AppState;
