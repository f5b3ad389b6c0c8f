//! 사용자 Repository (SQLite).
//!
//! 자격증명은 `user(email, password)` 테이블에 평문으로 저장되며 정확히 일치해야 합니다.

use async_trait::async_trait;
use remarks_core::{RemarksResult, UserRecord};
use sqlx::SqlitePool;

use crate::auth::CredentialStore;

/// 사용자 Repository
pub struct UserRepository;

impl UserRepository {
    /// 이메일과 비밀번호가 모두 일치하는 사용자 조회.
    pub async fn find_by_credentials(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT email, password FROM "user" WHERE email = ? AND password = ?"#,
        )
        .bind(email)
        .bind(password)
        .fetch_optional(pool)
        .await
    }

    /// 전체 사용자 목록.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<UserRecord>, sqlx::Error> {
        sqlx::query_as::<_, UserRecord>(r#"SELECT email, password FROM "user" ORDER BY email"#)
            .fetch_all(pool)
            .await
    }

    /// 사용자 추가.
    ///
    /// 이미 같은 이메일이 있으면 `false`를 반환합니다.
    pub async fn insert(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO "user" (email, password) VALUES (?, ?) ON CONFLICT (email) DO NOTHING"#,
        )
        .bind(email)
        .bind(password)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// SQLite 기반 자격증명 저장소.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn find(&self, email: &str, password: &str) -> RemarksResult<Option<UserRecord>> {
        Ok(UserRepository::find_by_credentials(&self.pool, email, password).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::ensure_users_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        ensure_users_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_exact_match_required() {
        let pool = setup_pool().await;
        assert!(UserRepository::insert(&pool, "a@x.com", "p1").await.unwrap());

        let store = SqliteCredentialStore::new(pool);
        assert!(store.find("a@x.com", "p1").await.unwrap().is_some());
        assert!(store.find("a@x.com", "wrong").await.unwrap().is_none());
        assert!(store.find("A@X.COM", "p1").await.unwrap().is_none());
        assert!(store.find("nobody@x.com", "p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_and_list() {
        let pool = setup_pool().await;
        assert!(UserRepository::insert(&pool, "b@x.com", "p2").await.unwrap());
        assert!(UserRepository::insert(&pool, "a@x.com", "p1").await.unwrap());
        assert!(!UserRepository::insert(&pool, "a@x.com", "other").await.unwrap());

        let users = UserRepository::list(&pool).await.unwrap();
        let emails: Vec<_> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com"]);
        assert_eq!(users[0].password, "p1");
    }

    #[tokio::test]
    async fn test_missing_table_is_storage_fault() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let store = SqliteCredentialStore::new(pool);
        let err = store.find("a@x.com", "p1").await.unwrap_err();
        assert!(err.is_storage_fault());
    }
}
