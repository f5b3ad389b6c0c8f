//! 오브젝트 스토리지.
//!
//! 업로드된 스크린샷을 저장하고 공개 URL을 돌려줍니다.

mod s3;

pub use s3::{S3ObjectStore, SigV4Signer};

use async_trait::async_trait;
use remarks_core::RemarksResult;

/// 오브젝트 저장소.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 객체 저장 후 공개 URL 반환.
    ///
    /// # Arguments
    ///
    /// * `bytes` - 객체 내용
    /// * `key` - 객체 키
    /// * `content_type` - MIME 타입
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> RemarksResult<String>;

    /// 저장소 식별 이름 (헬스 체크 표시용).
    fn name(&self) -> &str;
}

/// 인메모리 오브젝트 저장소 (테스트용).
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: tokio::sync::RwLock<std::collections::HashMap<String, (Vec<u8>, String)>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryObjectStore {
    /// 반환 URL 접두사.
    pub const BASE_URL: &'static str = "https://objects.test";

    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 객체 (내용, MIME 타입).
    pub async fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.read().await.get(key).cloned()
    }

    /// 저장된 객체 키 목록.
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, bytes: Vec<u8>, key: &str, content_type: &str) -> RemarksResult<String> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(format!("{}/{}", Self::BASE_URL, key))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
