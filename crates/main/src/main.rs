//! 主应用程序入口
//!
//! `serve` 启动 HTTP 服务（默认子命令），`migrate up|down` 管理数据库结构。

use std::{future::Future, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::{AppConfig, StorageKind};
use infrastructure::{
    create_pg_pool, migrate_down, migrate_up, Infrastructure, InfrastructureConfig,
    StorageBackend,
};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "identity-service", version, about = "Account and friend graph service")]
struct Args {
    /// YAML 配置文件路径
    #[arg(short, long, env = "APP_CONFIG_FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 启动 HTTP 服务
    Serve,
    /// 执行数据库迁移
    Migrate {
        #[command(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum MigrateDirection {
    /// 应用所有待执行的迁移
    Up,
    /// 回滚最近一次迁移
    Down,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "identity_service=info,infrastructure=info,application=info,tower_http=info".into()
            }),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref()).context("加载配置失败")?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate { direction } => migrate(config, direction).await,
    }
}

fn infrastructure_config(config: &AppConfig) -> InfrastructureConfig {
    let backend = match config.storage {
        StorageKind::Postgres => StorageBackend::Postgres,
        StorageKind::Memory => StorageBackend::Memory,
    };

    InfrastructureConfig {
        backend,
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        acquire_timeout: config.acquire_timeout(),
        bcrypt_cost: config.security.bcrypt_cost,
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    match config.storage {
        StorageKind::Postgres => {
            tracing::info!("连接数据库: {}", config.sanitized_database_url());
        }
        StorageKind::Memory => {
            tracing::warn!("使用内存存储，进程退出后数据将丢失");
        }
    }

    let infrastructure = Infrastructure::connect(infrastructure_config(&config))
        .await
        .context("初始化存储失败")?;

    let state = AppState::new(
        Arc::new(infrastructure.account_service()),
        Arc::new(infrastructure.friend_request_service()),
    );
    let app = router(state, config.request_timeout());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("无法监听 {address}"))?;

    tracing::info!("身份服务启动在 http://{}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn migrate(config: AppConfig, direction: MigrateDirection) -> anyhow::Result<()> {
    if config.storage == StorageKind::Memory {
        anyhow::bail!("内存存储不需要迁移");
    }

    tracing::info!("连接数据库: {}", config.sanitized_database_url());
    let pool = create_pg_pool(
        &config.database.url,
        config.database.max_connections,
        config.acquire_timeout(),
    )
    .await
    .context("连接数据库失败")?;

    match direction {
        MigrateDirection::Up => {
            let applied = migrate_up(&pool).await?;
            if applied == 0 {
                println!("no migrations to apply");
            } else {
                println!("applied {applied} migration(s)");
            }
        }
        MigrateDirection::Down => match migrate_down(&pool).await? {
            Some(version) => println!("reverted migration {version}"),
            None => println!("no migrations to revert"),
        },
    }

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    wait_for_signal(tokio::signal::ctrl_c()).await;
}

async fn wait_for_signal(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(err) = signal.await {
        tracing::error!("监听退出信号失败: {}", err);
        // 无法监听信号时保持运行，由外部终止进程
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，开始优雅停机");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_triggers_shutdown() {
        let finished =
            tokio::time::timeout(Duration::from_millis(100), wait_for_signal(async { Ok(()) }))
                .await;
        assert!(finished.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let failing = async {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "signal driver unavailable",
            ))
        };
        let finished =
            tokio::time::timeout(Duration::from_millis(100), wait_for_signal(failing)).await;
        assert!(finished.is_err());
    }
}
