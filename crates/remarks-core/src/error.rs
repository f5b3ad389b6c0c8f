//! 서비스 공통 에러 타입.
//!
//! 저장소, 설정, 외부 스토리지에서 발생하는 장애를 하나의 타입으로 모읍니다.
//! 클라이언트 응답 매핑은 API 크레이트의 경계 계층이 담당합니다.

use thiserror::Error;

/// 핵심 서비스 에러.
#[derive(Debug, Error)]
pub enum RemarksError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 오브젝트 스토리지 에러
    #[error("오브젝트 스토리지 에러: {0}")]
    ObjectStorage(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type RemarksResult<T> = Result<T, RemarksError>;

impl RemarksError {
    /// 저장 계층(DB, 오브젝트 스토리지)에서 발생한 에러인지 확인합니다.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            RemarksError::Database(_) | RemarksError::ObjectStorage(_)
        )
    }
}

impl From<config::ConfigError> for RemarksError {
    fn from(err: config::ConfigError) -> Self {
        RemarksError::Config(err.to_string())
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for RemarksError {
    fn from(err: sqlx::Error) -> Self {
        RemarksError::Database(err.to_string())
    }
}
