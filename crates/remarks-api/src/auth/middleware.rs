//! Axum용 bearer 토큰 추출기.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use remarks_core::Identity;

use crate::error::ApiError;
use crate::metrics::record_auth_rejection;
use crate::state::AppState;

/// Authorization 헤더의 bearer 토큰 문자열.
///
/// 스킴 비교는 대소문자를 구분하지 않으며, 첫 공백 뒤의 값을 그대로 토큰으로 사용합니다.
/// 헤더가 없거나 bearer 스킴이 아니면 401 `Not authenticated`로 거부합니다.
/// `Bearer` 뒤가 비어 있으면 빈 토큰으로 통과시키고 검증 단계에서 거부됩니다.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::NotAuthenticated)?;

        parse_bearer(header)
            .map(|token| BearerToken(token.to_string()))
            .ok_or(ApiError::NotAuthenticated)
    }
}

fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    scheme.eq_ignore_ascii_case("bearer").then_some(token)
}

/// 접근 게이트를 통과한 사용자.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn get_remarks(
///     State(state): State<Arc<AppState>>,
///     AuthUser(identity): AuthUser,
/// ) -> ApiResult<Json<RemarksResponse>> { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state)
            .await
            .inspect_err(|_| record_auth_rejection("missing"))?;

        state
            .gate
            .authorize(&token)
            .await
            .map(AuthUser)
            .map_err(|e| {
                record_auth_rejection(e.reason());
                ApiError::from(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(parse_bearer("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("BEARER abc"), Some("abc"));
        assert_eq!(parse_bearer("Bearer "), Some(""));
        assert_eq!(parse_bearer("Bearer"), Some(""));
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("abc.def.ghi"), None);
    }
}
