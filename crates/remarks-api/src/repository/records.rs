//! 리마크 / ASIN 정보 Repository.

use async_trait::async_trait;
use remarks_core::{AsinInfo, RemarkRecord, RemarksResult};
use sqlx::PgPool;

// ================================================================================================
// Store trait
// ================================================================================================

/// 리마크 레코드 저장소.
///
/// 조회 결과의 순서는 저장소 기본 순서를 따르며 별도로 보장하지 않습니다.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 리마크 한 건 저장.
    async fn insert_remark(&self, remark: &RemarkRecord) -> RemarksResult<()>;

    /// 전체 리마크 조회.
    async fn list_remarks(&self) -> RemarksResult<Vec<RemarkRecord>>;

    /// 전체 ASIN 정보 조회.
    async fn list_asin_info(&self) -> RemarksResult<Vec<AsinInfo>>;
}

// ================================================================================================
// Repository
// ================================================================================================

/// Remarks Repository
pub struct RemarksRepository;

impl RemarksRepository {
    /// 리마크 저장
    pub async fn insert(pool: &PgPool, remark: &RemarkRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO remarks (asin, remarks, image_link, product_link)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&remark.asin)
        .bind(&remark.remarks)
        .bind(&remark.image_link)
        .bind(&remark.product_link)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// 전체 리마크 조회
    pub async fn list(pool: &PgPool) -> Result<Vec<RemarkRecord>, sqlx::Error> {
        sqlx::query_as::<_, RemarkRecord>(
            "SELECT asin, remarks, image_link, product_link FROM remarks",
        )
        .fetch_all(pool)
        .await
    }

    /// 전체 ASIN 정보 조회
    pub async fn list_asin_info(pool: &PgPool) -> Result<Vec<AsinInfo>, sqlx::Error> {
        sqlx::query_as::<_, AsinInfo>("SELECT asin_id, sku_id, image_link FROM asin_info")
            .fetch_all(pool)
            .await
    }
}

/// PostgreSQL 기반 레코드 저장소.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_remark(&self, remark: &RemarkRecord) -> RemarksResult<()> {
        Ok(RemarksRepository::insert(&self.pool, remark).await?)
    }

    async fn list_remarks(&self) -> RemarksResult<Vec<RemarkRecord>> {
        Ok(RemarksRepository::list(&self.pool).await?)
    }

    async fn list_asin_info(&self) -> RemarksResult<Vec<AsinInfo>> {
        Ok(RemarksRepository::list_asin_info(&self.pool).await?)
    }
}

// ================================================================================================
// In-memory store
// ================================================================================================

/// 인메모리 레코드 저장소 (테스트용).
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MemoryRecordStore {
    remarks: tokio::sync::RwLock<Vec<RemarkRecord>>,
    asin_info: tokio::sync::RwLock<Vec<AsinInfo>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// ASIN 정보 시드.
    pub async fn seed_asin_info(&self, rows: Vec<AsinInfo>) {
        self.asin_info.write().await.extend(rows);
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_remark(&self, remark: &RemarkRecord) -> RemarksResult<()> {
        self.remarks.write().await.push(remark.clone());
        Ok(())
    }

    async fn list_remarks(&self) -> RemarksResult<Vec<RemarkRecord>> {
        Ok(self.remarks.read().await.clone())
    }

    async fn list_asin_info(&self) -> RemarksResult<Vec<AsinInfo>> {
        Ok(self.asin_info.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_keeps_insert_order() {
        let store = MemoryRecordStore::new();
        for asin in ["B001", "B002"] {
            store
                .insert_remark(&RemarkRecord {
                    asin: asin.to_string(),
                    remarks: "damaged box".to_string(),
                    image_link: format!("https://media.example.com/{asin}.png"),
                    product_link: "https://shop.example.com/p".to_string(),
                })
                .await
                .unwrap();
        }

        let remarks = store.list_remarks().await.unwrap();
        assert_eq!(remarks.len(), 2);
        assert_eq!(remarks[0].asin, "B001");
        assert!(store.list_asin_info().await.unwrap().is_empty());
    }
}
