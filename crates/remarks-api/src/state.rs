//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.
//! 요청 사이에 유지되는 가변 상태는 없으며, 모든 영속 상태는 저장소에 있습니다.

use std::sync::Arc;

use sqlx::{PgPool, SqlitePool};

use crate::auth::{
    AccessGate, CredentialStore, CredentialVerifier, RevocationLedger, SessionController,
    TokenIssuer,
};
use crate::repository::RecordStore;
use crate::storage::ObjectStore;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 로그인 / 로그아웃
    pub session: SessionController,

    /// 보호된 요청의 토큰 판정
    pub gate: AccessGate,

    /// 리마크 / ASIN 정보 저장소
    pub records: Arc<dyn RecordStore>,

    /// 스크린샷 저장소 (미설정 시 업로드 불가)
    pub objects: Option<Arc<dyn ObjectStore>>,

    /// PostgreSQL 연결 풀 (헬스 체크용)
    pub db_pool: Option<PgPool>,

    /// 사용자 저장소 연결 풀 (헬스 체크용)
    pub users_pool: Option<SqlitePool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # Arguments
    ///
    /// * `issuer` - 토큰 발급기
    /// * `credentials` - 사용자 자격증명 저장소
    /// * `ledger` - 폐기 원장
    /// * `records` - 리마크 레코드 저장소
    pub fn new(
        issuer: TokenIssuer,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<dyn RevocationLedger>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let issuer = Arc::new(issuer);
        let verifier = CredentialVerifier::new(credentials);

        Self {
            session: SessionController::new(verifier, issuer.clone(), ledger.clone()),
            gate: AccessGate::new(issuer, ledger),
            records,
            objects: None,
            db_pool: None,
            users_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 오브젝트 저장소 설정.
    pub fn with_object_store(mut self, objects: Arc<dyn ObjectStore>) -> Self {
        self.objects = Some(objects);
        self
    }

    /// PostgreSQL 연결 풀 설정.
    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 사용자 저장소 연결 풀 설정.
    pub fn with_users_pool(mut self, pool: SqlitePool) -> Self {
        self.users_pool = Some(pool);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        if let Some(pool) = &self.db_pool {
            sqlx::query("SELECT 1").execute(pool).await.is_ok()
        } else {
            false
        }
    }

    /// 사용자 저장소 연결 상태 확인.
    pub async fn is_users_db_healthy(&self) -> bool {
        if let Some(pool) = &self.users_pool {
            sqlx::query("SELECT 1").execute(pool).await.is_ok()
        } else {
            false
        }
    }
}

/// 테스트용 서명 키.
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_SECRET: &str = "test-secret-key-for-remarks-api";

/// 테스트용 저장소 핸들.
///
/// 상태에 주입된 인메모리 저장소를 테스트에서 직접 들여다볼 때 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestBackends {
    pub ledger: Arc<crate::auth::MemoryRevocationLedger>,
    pub records: Arc<crate::repository::MemoryRecordStore>,
    pub objects: Arc<crate::storage::MemoryObjectStore>,
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 인메모리 저장소로 동작합니다.
/// 사용자 `a@x.com` / `p1`이 등록되어 있습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with_backends().0
}

/// 테스트용 AppState와 저장소 핸들 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with_backends() -> (AppState, TestBackends) {
    use crate::auth::{MemoryCredentialStore, MemoryRevocationLedger};
    use crate::repository::MemoryRecordStore;
    use crate::storage::MemoryObjectStore;

    let issuer = TokenIssuer::new(TEST_SECRET.as_bytes(), jsonwebtoken::Algorithm::HS256);
    let credentials = Arc::new(MemoryCredentialStore::new().with_user("a@x.com", "p1"));
    let backends = TestBackends {
        ledger: Arc::new(MemoryRevocationLedger::new()),
        records: Arc::new(MemoryRecordStore::new()),
        objects: Arc::new(MemoryObjectStore::new()),
    };

    let state = AppState::new(
        issuer,
        credentials,
        backends.ledger.clone(),
        backends.records.clone(),
    )
    .with_object_store(backends.objects.clone());

    (state, backends)
}
