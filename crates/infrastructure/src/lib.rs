//! 基础设施层实现。
//!
//! 提供 PostgreSQL 与内存两种仓储、bcrypt 密码哈希器以及数据库迁移，
//! 实现领域/应用层定义的接口。

pub mod builder;
pub mod memory;
pub mod migrations;
pub mod password;
pub mod repository;

pub use builder::{
    Infrastructure, InfrastructureConfig, InfrastructureError, Repositories, StorageBackend,
};
pub use memory::InMemoryStorage;
pub use migrations::{migrate_down, migrate_up, MIGRATOR};
pub use password::BcryptPasswordHasher;
pub use repository::{create_pg_pool, PgAccountRepository, PgFriendRequestRepository, PgStorage};
