//! CLI 명령어 구현 모듈.

pub mod init_db;
pub mod users;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// 사용자 저장소 기본 경로.
pub const DEFAULT_USERS_DB: &str = "sqlite://users.db";

/// 사용자 저장소 URL 결정 (인자 > USERS_DB > REMARKS__DATABASE__USERS_URL > 기본값).
pub fn resolve_users_db(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var("USERS_DB").ok())
        .or_else(|| std::env::var("REMARKS__DATABASE__USERS_URL").ok())
        .unwrap_or_else(|| DEFAULT_USERS_DB.to_string())
}

/// PostgreSQL URL 결정 (인자 > DATABASE_URL > DB_URL > REMARKS__DATABASE__URL).
pub fn resolve_db_url(arg: Option<String>) -> Option<String> {
    arg.or_else(|| std::env::var("DATABASE_URL").ok())
        .or_else(|| std::env::var("DB_URL").ok())
        .or_else(|| std::env::var("REMARKS__DATABASE__URL").ok())
}

/// 사용자 저장소에 연결합니다. 파일이 없으면 새로 만듭니다.
///
/// CLI는 한 번에 한 작업만 수행하므로 연결은 하나만 엽니다.
/// (`sqlite::memory:`도 같은 연결을 재사용해야 테이블이 유지됩니다.)
pub async fn connect_users_db(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("Invalid users database URL: {}", url))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open users database: {}", url))
}
