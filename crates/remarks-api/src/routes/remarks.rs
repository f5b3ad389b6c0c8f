//! 리마크 / ASIN 정보 endpoint.
//!
//! 모든 엔드포인트는 접근 게이트를 통과한 요청만 처리합니다.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use remarks_core::{AsinInfo, RemarkRecord};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::metrics::record_upload_bytes;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// 업로드 폼 (문서용).
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadRemarksForm {
    /// 상품 ASIN
    pub asin: String,
    /// 리마크 본문
    pub remarks: String,
    /// 상품 페이지 링크
    pub product_link: String,
    /// 스크린샷 파일
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// 업로드 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// 업로드된 스크린샷 URL
    pub media_url: String,
}

/// 리마크 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemarksResponse {
    pub remarks: Vec<RemarkRecord>,
}

/// ASIN 정보 목록 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AsinInfoResponse {
    pub asin_info: Vec<AsinInfo>,
}

/// 업로드 파일.
struct UploadedFile {
    bytes: Vec<u8>,
    file_name: Option<String>,
    content_type: Option<String>,
}

/// 파싱된 업로드 폼.
#[derive(Default)]
struct UploadFields {
    asin: Option<String>,
    remarks: Option<String>,
    product_link: Option<String>,
    file: Option<UploadedFile>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::Validation(err.body_text())
    }
}

fn require(value: Option<String>, field: &str) -> ApiResult<String> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing form field: {}", field)))
}

async fn read_upload_fields(mut multipart: Multipart) -> ApiResult<UploadFields> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "asin" => fields.asin = Some(field.text().await.map_err(multipart_error)?),
            "remarks" => fields.remarks = Some(field.text().await.map_err(multipart_error)?),
            "product_link" => {
                fields.product_link = Some(field.text().await.map_err(multipart_error)?)
            }
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                fields.file = Some(UploadedFile {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                });
            }
            // 알 수 없는 필드는 무시
            _ => {}
        }
    }

    Ok(fields)
}

/// 원본 파일명의 확장자 (점 포함). 없으면 빈 문자열.
fn file_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

/// 스크린샷 객체 키 생성.
pub fn screenshot_key(file_name: Option<&str>) -> String {
    format!("screenshot-{}{}", Uuid::new_v4(), file_extension(file_name))
}

/// 리마크 업로드.
///
/// 스크린샷을 오브젝트 스토리지에 올린 뒤 리마크 레코드를 저장합니다.
///
/// POST /upload-remarks/
#[utoipa::path(
    post,
    path = "/upload-remarks/",
    request_body(content = UploadRemarksForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "업로드 완료", body = UploadResponse),
        (status = 401, description = "토큰 없음", body = ApiErrorResponse),
        (status = 403, description = "유효하지 않거나 폐기된 토큰", body = ApiErrorResponse),
        (status = 422, description = "폼 필드 누락", body = ApiErrorResponse),
        (status = 500, description = "스토리지 장애", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "remarks"
)]
pub async fn upload_remarks(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| ApiError::Validation(e.body_text()))?;
    let fields = read_upload_fields(multipart).await?;

    let asin = require(fields.asin, "asin")?;
    let remarks = require(fields.remarks, "remarks")?;
    let product_link = require(fields.product_link, "product_link")?;
    let file = fields
        .file
        .ok_or_else(|| ApiError::Validation("Missing form field: file".to_string()))?;

    let objects = state
        .objects
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Object storage not configured".to_string()))?;

    let key = screenshot_key(file.file_name.as_deref());
    let content_type = file
        .content_type
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let size = file.bytes.len();

    let media_url = objects
        .put(file.bytes, &key, &content_type)
        .await
        .map_err(|e| ApiError::storage("Error uploading to S3", e))?;
    record_upload_bytes(size);

    let record = RemarkRecord {
        asin,
        remarks,
        image_link: media_url.clone(),
        product_link,
    };
    state
        .records
        .insert_remark(&record)
        .await
        .map_err(|e| ApiError::storage("Error saving to database", e))?;

    info!(identity = %identity, asin = %record.asin, key = %key, size, "리마크 업로드");

    Ok(Json(UploadResponse {
        message: "Data uploaded successfully".to_string(),
        media_url,
    }))
}

/// 리마크 목록.
///
/// GET /get-remarks/
#[utoipa::path(
    get,
    path = "/get-remarks/",
    responses(
        (status = 200, description = "리마크 목록", body = RemarksResponse),
        (status = 401, description = "토큰 없음", body = ApiErrorResponse),
        (status = 403, description = "유효하지 않거나 폐기된 토큰", body = ApiErrorResponse),
        (status = 500, description = "저장소 장애", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "remarks"
)]
pub async fn get_remarks(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
) -> ApiResult<Json<RemarksResponse>> {
    let remarks = state
        .records
        .list_remarks()
        .await
        .map_err(|e| ApiError::storage("Error fetching remarks", e))?;

    Ok(Json(RemarksResponse { remarks }))
}

/// ASIN 정보 목록.
///
/// GET /get-asin-info/
#[utoipa::path(
    get,
    path = "/get-asin-info/",
    responses(
        (status = 200, description = "ASIN 정보 목록", body = AsinInfoResponse),
        (status = 401, description = "토큰 없음", body = ApiErrorResponse),
        (status = 403, description = "유효하지 않거나 폐기된 토큰", body = ApiErrorResponse),
        (status = 500, description = "저장소 장애", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "remarks"
)]
pub async fn get_asin_info(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
) -> ApiResult<Json<AsinInfoResponse>> {
    let asin_info = state
        .records
        .list_asin_info()
        .await
        .map_err(|e| ApiError::storage("Error fetching asin_info", e))?;

    Ok(Json(AsinInfoResponse { asin_info }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Some("shot.png")), ".png");
        assert_eq!(file_extension(Some("archive.tar.gz")), ".gz");
        assert_eq!(file_extension(Some("README")), "");
        assert_eq!(file_extension(Some(".bashrc")), "");
        assert_eq!(file_extension(None), "");
    }

    #[test]
    fn test_screenshot_key_shape() {
        let key = screenshot_key(Some("capture.jpeg"));
        assert!(key.starts_with("screenshot-"));
        assert!(key.ends_with(".jpeg"));

        let uuid_part = &key["screenshot-".len()..key.len() - ".jpeg".len()];
        assert!(Uuid::parse_str(uuid_part).is_ok());
        assert_ne!(key, screenshot_key(Some("capture.jpeg")));
    }
}
