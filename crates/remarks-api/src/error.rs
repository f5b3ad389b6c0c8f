//! API 에러 응답 타입.
//!
//! 모든 에러 응답은 `{"detail": "..."}` 형식의 JSON 본문을 가집니다.
//! 인증 결과([`AuthError`])와 저장소 장애([`RemarksError`])를 HTTP 상태 코드로
//! 변환하는 규칙은 이 모듈에만 있습니다.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use remarks_core::RemarksError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthError;

/// API 에러 응답 본문.
///
/// ```json
/// { "detail": "Token has been revoked" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 사람이 읽을 수 있는 에러 메시지
    pub detail: String,
}

impl ApiErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// API 에러.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 로그인 자격증명 불일치 (401)
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Authorization 헤더 없음 또는 bearer 형식 아님 (401)
    #[error("Not authenticated")]
    NotAuthenticated,
    /// 로그아웃 요청의 토큰 검증 실패 (400)
    #[error("Invalid token")]
    InvalidLogoutToken,
    /// 보호된 요청의 토큰 검증 실패 (403)
    #[error("Invalid token")]
    InvalidToken,
    /// 폐기된 토큰 (403)
    #[error("Token has been revoked")]
    TokenRevoked,
    /// 요청 형식 오류 (422)
    #[error("{0}")]
    Validation(String),
    /// 업로드 크기 초과 (413)
    #[error("Request body too large")]
    PayloadTooLarge,
    /// 서버 내부 에러 (500). 메시지만 노출하고 상세 원인은 로그로 남깁니다.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidCredentials | ApiError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidLogoutToken => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken | ApiError::TokenRevoked => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 로그아웃 경로의 변환.
    ///
    /// 로그아웃에서는 검증 실패가 403이 아니라 400으로 보고됩니다.
    pub fn from_logout(err: AuthError) -> Self {
        match err {
            AuthError::Malformed => ApiError::InvalidLogoutToken,
            other => ApiError::from(other),
        }
    }

    /// 저장소 장애를 문맥 메시지와 함께 500으로 변환합니다.
    pub fn storage(context: &str, err: RemarksError) -> Self {
        tracing::error!(error = %err, "{}", context);
        ApiError::Internal(context.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::InvalidCredentials,
            AuthError::Malformed => ApiError::InvalidToken,
            AuthError::Revoked => ApiError::TokenRevoked,
            AuthError::Internal { context, detail } => {
                tracing::error!(error = %detail, "{}", context);
                ApiError::Internal(context.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ApiErrorResponse::new(self.to_string()));

        let mut response = (status, body).into_response();
        if matches!(self, ApiError::NotAuthenticated) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
