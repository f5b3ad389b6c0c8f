//! 폐기 토큰 Repository.
//!
//! `blacklisted_tokens` 테이블은 토큰 문자열을 기본 키로 사용하며,
//! 동일 토큰의 중복 등록은 에러 없이 무시됩니다.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// 폐기 토큰 Repository
pub struct RevokedTokenRepository;

impl RevokedTokenRepository {
    /// 토큰 등록 (이미 있으면 무시).
    ///
    /// 새로 등록되었으면 `true`, 이미 있었으면 `false`를 반환합니다.
    pub async fn insert_if_absent(
        pool: &PgPool,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO blacklisted_tokens (token, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 토큰 등록 여부 조회.
    pub async fn exists(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let found: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM blacklisted_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(pool)
                .await?;

        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::test_pg_pool;
    use chrono::Duration;

    fn unique_token() -> String {
        format!("test-token-{}", uuid::Uuid::new_v4())
    }

    async fn row_count(pool: &PgPool, token: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM blacklisted_tokens WHERE token = $1")
            .bind(token)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // DB 연결 필요
    async fn test_insert_if_absent_then_exists() {
        let pool = test_pg_pool().await;
        let token = unique_token();
        let until = Utc::now() + Duration::days(1);

        assert!(!RevokedTokenRepository::exists(&pool, &token).await.unwrap());

        assert!(RevokedTokenRepository::insert_if_absent(&pool, &token, until)
            .await
            .unwrap());
        assert!(!RevokedTokenRepository::insert_if_absent(&pool, &token, until)
            .await
            .unwrap());

        assert!(RevokedTokenRepository::exists(&pool, &token).await.unwrap());
        assert_eq!(row_count(&pool, &token).await, 1);
    }

    #[tokio::test]
    #[ignore] // DB 연결 필요
    async fn test_concurrent_inserts_leave_single_row() {
        let pool = test_pg_pool().await;
        let token = unique_token();
        let until = Utc::now() + Duration::days(1);

        let results = futures::future::join_all(
            (0..16).map(|_| RevokedTokenRepository::insert_if_absent(&pool, &token, until)),
        )
        .await;

        // 모든 요청이 성공하고, 새로 등록한 요청은 정확히 하나
        let inserted = results
            .into_iter()
            .map(Result::unwrap)
            .filter(|inserted| *inserted)
            .count();
        assert_eq!(inserted, 1);
        assert_eq!(row_count(&pool, &token).await, 1);
    }
}
