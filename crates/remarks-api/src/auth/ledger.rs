//! 폐기 원장.
//!
//! 로그아웃된 토큰 문자열을 기록합니다. 원장은 추가 전용이며 삭제 연산이 없습니다.
//! 등록은 멱등이고, 동시에 같은 토큰을 등록해도 한 건만 남습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use remarks_core::RemarksResult;
use sqlx::PgPool;

use crate::repository::RevokedTokenRepository;

/// 등록 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// 새로 등록됨
    Revoked,
    /// 이미 등록되어 있었음
    AlreadyRevoked,
}

/// 폐기 토큰 저장소.
#[async_trait]
pub trait RevocationLedger: Send + Sync {
    /// 토큰 등록. 이미 있으면 기존 항목을 유지합니다.
    ///
    /// # Arguments
    ///
    /// * `token` - 폐기할 토큰 문자열
    /// * `revoked_until` - 보존 기한 (정보용, 조회 판정에는 사용하지 않음)
    async fn revoke(&self, token: &str, revoked_until: DateTime<Utc>)
        -> RemarksResult<RevokeOutcome>;

    /// 토큰 등록 여부.
    ///
    /// 저장소 장애는 반드시 `Err`로 반환해야 하며 "미등록"으로 취급하면 안 됩니다.
    async fn is_revoked(&self, token: &str) -> RemarksResult<bool>;
}

/// PostgreSQL 기반 폐기 원장.
#[derive(Clone)]
pub struct PgRevocationLedger {
    pool: PgPool,
}

impl PgRevocationLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationLedger for PgRevocationLedger {
    async fn revoke(
        &self,
        token: &str,
        revoked_until: DateTime<Utc>,
    ) -> RemarksResult<RevokeOutcome> {
        let inserted =
            RevokedTokenRepository::insert_if_absent(&self.pool, token, revoked_until).await?;
        Ok(if inserted {
            RevokeOutcome::Revoked
        } else {
            RevokeOutcome::AlreadyRevoked
        })
    }

    async fn is_revoked(&self, token: &str) -> RemarksResult<bool> {
        Ok(RevokedTokenRepository::exists(&self.pool, token).await?)
    }
}

/// 인메모리 폐기 원장 (테스트용).
///
/// `set_failing(true)`로 저장소 장애를 흉내낼 수 있습니다.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MemoryRevocationLedger {
    entries: tokio::sync::RwLock<std::collections::HashMap<String, DateTime<Utc>>>,
    failing: std::sync::atomic::AtomicBool,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryRevocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 등록된 토큰 수.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 등록된 토큰이 없는지 여부.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 토큰의 보존 기한.
    pub async fn revoked_until(&self, token: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(token).copied()
    }

    /// 장애 모드 전환.
    pub fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    fn check_available(&self) -> RemarksResult<()> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(remarks_core::RemarksError::Database(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RevocationLedger for MemoryRevocationLedger {
    async fn revoke(
        &self,
        token: &str,
        revoked_until: DateTime<Utc>,
    ) -> RemarksResult<RevokeOutcome> {
        self.check_available()?;

        let mut entries = self.entries.write().await;
        if entries.contains_key(token) {
            return Ok(RevokeOutcome::AlreadyRevoked);
        }
        entries.insert(token.to_string(), revoked_until);
        Ok(RevokeOutcome::Revoked)
    }

    async fn is_revoked(&self, token: &str) -> RemarksResult<bool> {
        self.check_available()?;
        Ok(self.entries.read().await.contains_key(token))
    }
}
