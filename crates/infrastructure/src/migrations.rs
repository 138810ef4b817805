use std::collections::HashSet;

use sqlx::migrate::{Migrate, MigrateError, Migrator};
use sqlx::PgPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// 应用所有待执行的迁移，返回本次应用的数量。
pub async fn migrate_up(pool: &PgPool) -> Result<usize, MigrateError> {
    let applied = applied_versions(pool).await?;
    let pending = MIGRATOR
        .iter()
        .filter(|migration| migration.migration_type.is_up_migration())
        .filter(|migration| !applied.contains(&migration.version))
        .count();

    MIGRATOR.run(pool).await?;
    Ok(pending)
}

/// 回滚最近一次迁移，返回被回滚的版本；没有可回滚的迁移时返回 `None`。
pub async fn migrate_down(pool: &PgPool) -> Result<Option<i64>, MigrateError> {
    let applied = applied_versions(pool).await?;
    let Some(latest) = applied.iter().copied().max() else {
        return Ok(None);
    };
    let target = applied
        .iter()
        .copied()
        .filter(|version| *version < latest)
        .max()
        .unwrap_or(0);

    MIGRATOR.undo(pool, target).await?;
    Ok(Some(latest))
}

async fn applied_versions(pool: &PgPool) -> Result<HashSet<i64>, MigrateError> {
    let mut conn = pool.acquire().await?;
    conn.ensure_migrations_table().await?;
    let applied = conn.list_applied_migrations().await?;
    Ok(applied.into_iter().map(|migration| migration.version).collect())
}
