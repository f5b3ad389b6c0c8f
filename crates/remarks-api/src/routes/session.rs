//! 로그인 / 로그아웃 endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::FormRejection, State},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::auth::{AuthError, BearerToken};
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::{record_login, record_logout};
use crate::routes::MessageResponse;
use crate::state::AppState;

/// 로그인 폼.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    /// 사용자 이메일
    pub email: String,
    /// 비밀번호
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// bearer 토큰
    pub access_token: String,
    /// 항상 "bearer"
    pub token_type: String,
}

/// 로그인.
///
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "토큰 발급", body = TokenResponse),
        (status = 401, description = "자격증명 불일치", body = ApiErrorResponse),
        (status = 422, description = "폼 필드 누락", body = ApiErrorResponse),
        (status = 500, description = "사용자 저장소 장애", body = ApiErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = form.map_err(|e| ApiError::Validation(e.body_text()))?;

    match state.session.login(&form.email, &form.password).await {
        Ok(access_token) => {
            record_login("success");
            info!(identity = %form.email, "로그인 성공");
            Ok(Json(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
            }))
        }
        Err(AuthError::Unauthorized) => {
            record_login("unauthorized");
            info!(identity = %form.email, "로그인 실패: 자격증명 불일치");
            Err(ApiError::InvalidCredentials)
        }
        Err(e) => {
            record_login("error");
            Err(ApiError::from(e))
        }
    }
}

/// 로그아웃.
///
/// 토큰을 폐기 원장에 등록합니다. 이미 폐기된 토큰도 성공으로 응답합니다.
///
/// POST /logout
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "로그아웃 완료", body = MessageResponse),
        (status = 400, description = "토큰 검증 실패", body = ApiErrorResponse),
        (status = 401, description = "토큰 없음", body = ApiErrorResponse),
        (status = 500, description = "폐기 원장 장애", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<MessageResponse>> {
    match state.session.logout(&token).await {
        Ok(()) => {
            record_logout("success");
            debug!("로그아웃 완료");
            Ok(Json(MessageResponse::new("Successfully logged out")))
        }
        Err(e) => {
            record_logout(if matches!(e, AuthError::Malformed) {
                "invalid"
            } else {
                "error"
            });
            Err(ApiError::from_logout(e))
        }
    }
}
