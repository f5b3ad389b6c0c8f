//! 사용자 저장소 관리 기능.
//!
//! 서비스에는 사용자 등록 API가 없으므로 계정은 이 명령으로 추가합니다.

use anyhow::{bail, Context, Result};
use remarks_api::repository::{ensure_users_schema, UserRepository};
use remarks_core::UserRecord;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: table, json", s)),
        }
    }
}

/// 출력용 사용자 행. 비밀번호는 항상 마스킹됩니다.
#[derive(Debug, Serialize)]
struct UserRow<'a> {
    email: &'a str,
    password: String,
}

impl<'a> From<&'a UserRecord> for UserRow<'a> {
    fn from(user: &'a UserRecord) -> Self {
        Self {
            email: &user.email,
            password: user.masked_password(),
        }
    }
}

/// 사용자 목록을 조회해 지정한 형식의 문자열로 반환합니다.
pub async fn list_users(pool: &SqlitePool, format: OutputFormat) -> Result<String> {
    ensure_users_schema(pool)
        .await
        .context("Failed to prepare user table")?;

    let users = UserRepository::list(pool)
        .await
        .context("Failed to query users")?;
    info!("Found {} users", users.len());

    match format {
        OutputFormat::Table => Ok(format_table(&users)),
        OutputFormat::Json => format_json(&users),
    }
}

/// 사용자를 추가합니다.
///
/// 같은 이메일이 이미 있으면 기존 계정을 건드리지 않고 `false`를 반환합니다.
///
/// # Arguments
///
/// * `email` - 로그인 이메일 (앞뒤 공백 제거)
/// * `password` - 저장소에 그대로 저장되는 비밀번호
pub async fn add_user(pool: &SqlitePool, email: &str, password: &str) -> Result<bool> {
    let email = email.trim();
    if email.is_empty() {
        bail!("Email must not be empty");
    }
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    ensure_users_schema(pool)
        .await
        .context("Failed to prepare user table")?;

    let created = UserRepository::insert(pool, email, password)
        .await
        .with_context(|| format!("Failed to insert user: {}", email))?;

    if created {
        info!(email = %email, "User created");
    } else {
        info!(email = %email, "User already exists, left unchanged");
    }

    Ok(created)
}

/// 테이블 형식 출력.
fn format_table(users: &[UserRecord]) -> String {
    let mut output = String::new();

    output.push_str(&format!("{:<40} {:<10}\n", "EMAIL", "PASSWORD"));
    output.push_str(&"-".repeat(51));
    output.push('\n');

    for user in users {
        output.push_str(&format!(
            "{:<40} {:<10}\n",
            user.email,
            user.masked_password()
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {} users", users.len()));
    output
}

/// JSON 형식 출력.
fn format_json(users: &[UserRecord]) -> Result<String> {
    let rows: Vec<UserRow<'_>> = users.iter().map(UserRow::from).collect();
    serde_json::to_string_pretty(&rows).context("Failed to serialize to JSON")
}
