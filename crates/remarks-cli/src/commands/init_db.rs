//! 데이터베이스 테이블 초기화 기능.
//!
//! 서버의 `database.auto_migrate`를 끈 배포에서 미리 테이블을 만들 때 사용합니다.

use anyhow::{Context, Result};
use remarks_api::repository::{ensure_postgres_schema, ensure_users_schema};
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{info, warn};

use super::connect_users_db;

/// 초기화 설정.
#[derive(Debug)]
pub struct InitDbConfig {
    /// 사용자 저장소 URL (SQLite)
    pub users_db: String,
    /// PostgreSQL URL (없으면 사용자 저장소만 초기화)
    pub db_url: Option<String>,
}

/// 초기화 결과.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InitDbReport {
    pub users_ready: bool,
    pub postgres_ready: bool,
}

/// 두 저장소의 테이블을 생성합니다. 이미 있는 테이블은 그대로 둡니다.
pub async fn init_db(config: InitDbConfig) -> Result<InitDbReport> {
    let mut report = InitDbReport::default();

    let users_pool = connect_users_db(&config.users_db).await?;
    ensure_users_schema(&users_pool)
        .await
        .context("Failed to create user table")?;
    users_pool.close().await;
    report.users_ready = true;
    info!(url = %config.users_db, "User store ready");

    match config.db_url.as_deref() {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(1)
                .acquire_timeout(Duration::from_secs(10))
                .connect(url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            ensure_postgres_schema(&pool)
                .await
                .context("Failed to create PostgreSQL tables")?;
            pool.close().await;
            report.postgres_ready = true;
            info!("PostgreSQL tables ready (blacklisted_tokens, remarks, asin_info)");
        }
        None => {
            warn!("No PostgreSQL URL given (--db-url / DATABASE_URL), skipping");
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_users_only() {
        let report = init_db(InitDbConfig {
            users_db: "sqlite::memory:".to_string(),
            db_url: None,
        })
        .await
        .unwrap();

        assert_eq!(
            report,
            InitDbReport {
                users_ready: true,
                postgres_ready: false,
            }
        );
    }

    #[tokio::test]
    async fn test_init_fails_when_users_db_unreachable() {
        let result = init_db(InitDbConfig {
            users_db: "sqlite:///nonexistent-remarks-dir/users.db".to_string(),
            db_url: None,
        })
        .await;

        assert!(result.is_err());
    }
}
