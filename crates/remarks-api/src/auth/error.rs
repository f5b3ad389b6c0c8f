//! 인증 에러 분류.

use remarks_core::RemarksError;

/// 인증 하위 시스템의 결과 분류.
///
/// `Unauthorized`, `Malformed`, `Revoked`는 클라이언트가 예상할 수 있는 결과이며
/// 시스템 에러로 기록하지 않습니다. `Internal`만 저장소 장애를 의미합니다.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 로그인 자격증명 불일치
    #[error("자격증명이 일치하지 않습니다")]
    Unauthorized,
    /// 서명 검증 또는 디코딩 실패, 혹은 식별자 클레임 누락
    #[error("유효하지 않은 토큰")]
    Malformed,
    /// 폐기 원장에 등록된 토큰
    #[error("폐기된 토큰")]
    Revoked,
    /// 저장소/백엔드 장애
    #[error("{context}: {detail}")]
    Internal {
        /// 클라이언트에 노출되는 메시지
        context: &'static str,
        /// 서버 로그에만 남는 상세 정보
        detail: String,
    },
}

impl AuthError {
    /// 저장소 장애를 문맥 메시지와 함께 감쌉니다.
    pub fn internal(context: &'static str, err: RemarksError) -> Self {
        AuthError::Internal {
            context,
            detail: err.to_string(),
        }
    }

    /// 메트릭 라벨용 사유 문자열.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::Unauthorized => "unauthorized",
            AuthError::Malformed => "malformed",
            AuthError::Revoked => "revoked",
            AuthError::Internal { .. } => "internal",
        }
    }
}
