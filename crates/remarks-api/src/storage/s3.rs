//! S3 업로드 클라이언트.
//!
//! AWS Signature Version 4로 서명한 단일 PUT 요청으로 객체를 올립니다.
//! `storage.endpoint`가 설정되면 path-style(`{endpoint}/{bucket}/{key}`)로,
//! 아니면 가상 호스트 방식(`https://{bucket}.s3.{region}.amazonaws.com/{key}`)으로 접근합니다.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use remarks_core::{RemarksError, RemarksResult, StorageConfig};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// SigV4 요청 서명기.
pub struct SigV4Signer<'a> {
    access_key_id: &'a str,
    secret_access_key: &'a str,
    region: &'a str,
    service: &'a str,
}

impl<'a> SigV4Signer<'a> {
    pub fn new(
        access_key_id: &'a str,
        secret_access_key: &'a str,
        region: &'a str,
        service: &'a str,
    ) -> Self {
        Self {
            access_key_id,
            secret_access_key,
            region,
            service,
        }
    }

    /// Authorization 헤더 값 생성.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP 메서드
    /// * `canonical_uri` - 인코딩된 경로
    /// * `headers` - 서명할 헤더 (이름은 소문자)
    /// * `payload_hash` - 본문 SHA-256 (hex)
    /// * `at` - 요청 시각 (`x-amz-date`와 같아야 함)
    pub fn authorization(
        &self,
        method: &str,
        canonical_uri: &str,
        headers: &BTreeMap<String, String>,
        payload_hash: &str,
        at: DateTime<Utc>,
    ) -> RemarksResult<String> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = at.format("%Y%m%d").to_string();

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();
        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");

        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, canonical_uri, canonical_headers, signed_headers, payload_hash
        );

        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date,
            scope,
            sha256_hex(canonical_request.as_bytes())
        );

        let signing_key = self.signing_key(&date_stamp)?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{},SignedHeaders={},Signature={}",
            self.access_key_id, scope, signed_headers, signature
        ))
    }

    fn signing_key(&self, date_stamp: &str) -> RemarksResult<Vec<u8>> {
        let secret = format!("AWS4{}", self.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes())?;
        let k_region = hmac_sha256(&k_date, self.region.as_bytes())?;
        let k_service = hmac_sha256(&k_region, self.service.as_bytes())?;
        hmac_sha256(&k_service, b"aws4_request")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> RemarksResult<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| RemarksError::Internal(format!("HMAC 키 초기화 실패: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// S3 경로 인코딩 (비예약 문자와 `/`만 그대로 둔다).
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// S3 오브젝트 저장소.
pub struct S3ObjectStore {
    client: reqwest::Client,
    bucket: String,
    region: String,
    access_key_id: String,
    secret_access_key: SecretString,
    endpoint: Option<String>,
}

impl S3ObjectStore {
    /// 스토리지 설정에서 생성.
    pub fn from_config(config: &StorageConfig) -> RemarksResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemarksError::ObjectStorage(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            access_key_id: config.access_key_id.clone(),
            secret_access_key: SecretString::new(
                config
                    .secret_access_key
                    .expose_secret()
                    .to_owned()
                    .into_boxed_str(),
            ),
            endpoint: config
                .endpoint
                .as_ref()
                .map(|e| e.trim_end_matches('/').to_string()),
        })
    }

    /// 객체 URL.
    pub fn object_url(&self, key: &str) -> String {
        let key = encode_key(key);
        match &self.endpoint {
            Some(endpoint) => format!("{}/{}/{}", endpoint, self.bucket, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> RemarksResult<String> {
        let url = self.object_url(key);
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| RemarksError::ObjectStorage(format!("잘못된 객체 URL {}: {}", url, e)))?;

        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(RemarksError::ObjectStorage(format!(
                    "객체 URL에 호스트가 없습니다: {}",
                    url
                )))
            }
        };

        let now = Utc::now();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sha256_hex(&bytes);

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());
        headers.insert("host".to_string(), host);
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.clone());
        headers.insert("x-amz-date".to_string(), amz_date.clone());

        let signer = SigV4Signer::new(
            &self.access_key_id,
            self.secret_access_key.expose_secret(),
            &self.region,
            "s3",
        );
        let authorization = signer.authorization("PUT", parsed.path(), &headers, &payload_hash, now)?;

        debug!(bucket = %self.bucket, key = %key, size = bytes.len(), "S3 업로드");

        let response = self
            .client
            .put(parsed)
            .header("content-type", content_type)
            .header("x-amz-content-sha256", payload_hash)
            .header("x-amz-date", amz_date)
            .header("authorization", authorization)
            .body(bytes)
            .send()
            .await
            .map_err(|e| RemarksError::ObjectStorage(format!("S3 요청 실패: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemarksError::ObjectStorage(format!(
                "S3 업로드 실패 (HTTP {}): {}",
                status, body
            )));
        }

        Ok(url)
    }

    fn name(&self) -> &str {
        "s3"
    }
}
