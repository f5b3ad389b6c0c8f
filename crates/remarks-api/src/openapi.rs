//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use remarks_core::{AsinInfo, RemarkRecord};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    AsinInfoResponse, ComponentHealth, ComponentStatus, HealthResponse, LoginForm,
    MessageResponse, RemarksResponse, TokenResponse, UploadRemarksForm, UploadResponse,
};

/// bearer 토큰 보안 스키마 등록.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// CRM Remarks API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CRM Remarks API",
        description = r#"
# CRM Remarks REST API

상품 리마크와 스크린샷을 관리하는 API입니다.

## 인증

`POST /login`으로 토큰을 발급받아 `Authorization: Bearer <token>` 헤더에 포함하세요.
`POST /logout` 이후 해당 토큰은 영구히 거부됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "auth", description = "인증 - 토큰 발급 및 폐기"),
        (name = "remarks", description = "리마크 - 업로드 및 조회")
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Common =====
            ApiErrorResponse,
            MessageResponse,

            // ===== Auth =====
            LoginForm,
            TokenResponse,

            // ===== Remarks =====
            UploadRemarksForm,
            UploadResponse,
            RemarksResponse,
            AsinInfoResponse,
            RemarkRecord,
            AsinInfo,
        )
    ),
    paths(
        crate::routes::root,
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::session::login,
        crate::routes::session::logout,
        crate::routes::remarks::upload_remarks,
        crate::routes::remarks::get_remarks,
        crate::routes::remarks::get_asin_info,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_contains_all_paths() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        for path in [
            "\"/login\"",
            "\"/logout\"",
            "\"/upload-remarks/\"",
            "\"/get-remarks/\"",
            "\"/get-asin-info/\"",
            "\"/health/ready\"",
        ] {
            assert!(json.contains(path), "missing path {path}");
        }
        assert!(json.contains("bearer_auth"));
        assert!(json.contains("ApiErrorResponse"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
