//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/` - 환영 메시지
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/login`, `/logout` - 토큰 발급 / 폐기
//! - `/upload-remarks/`, `/get-remarks/`, `/get-asin-info/` - 보호된 데이터 엔드포인트

pub mod health;
pub mod remarks;
pub mod session;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use remarks::{AsinInfoResponse, RemarksResponse, UploadRemarksForm, UploadResponse};
pub use session::{LoginForm, TokenResponse};

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::middleware::metrics_layer;
use crate::state::AppState;

/// 단순 메시지 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 환영 메시지.
///
/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "환영 메시지", body = MessageResponse)),
    tag = "health"
)]
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the CRM Remarks API!"))
}

/// 전체 API 라우터 생성.
///
/// # Arguments
///
/// * `max_upload_bytes` - `/upload-remarks/` 요청 본문 최대 크기
pub fn create_api_router(max_upload_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/login", post(session::login))
        .route("/logout", post(session::logout))
        .route(
            "/upload-remarks/",
            post(remarks::upload_remarks).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/get-remarks/", get(remarks::get_remarks))
        .route("/get-asin-info/", get(remarks::get_asin_info))
        .nest("/health", health_router())
        .route_layer(middleware::from_fn(metrics_layer))
}
