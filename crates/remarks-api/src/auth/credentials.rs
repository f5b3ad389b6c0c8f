//! 자격증명 검증.

use std::sync::Arc;

use async_trait::async_trait;
use remarks_core::{RemarksResult, UserRecord};

use super::AuthError;

/// 사용자 자격증명 저장소.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 식별자와 비밀번호가 모두 정확히 일치하는 사용자 조회.
    async fn find(&self, email: &str, password: &str) -> RemarksResult<Option<UserRecord>>;
}

/// 자격증명 검증기.
///
/// 일치하는 레코드가 하나라도 있으면 유효한 자격증명입니다.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn CredentialStore>,
}

impl CredentialVerifier {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// 자격증명 검증.
    ///
    /// 불일치는 `Ok(false)`, 저장소 장애는 `Err`입니다.
    pub async fn verify(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        self.store
            .find(email, password)
            .await
            .map(|user| user.is_some())
            .map_err(|e| AuthError::internal("Error verifying credentials", e))
    }
}

/// 인메모리 자격증명 저장소 (테스트용).
#[cfg(any(test, feature = "test-utils"))]
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: std::collections::HashMap<String, String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 추가.
    pub fn with_user(mut self, email: &str, password: &str) -> Self {
        self.users.insert(email.to_string(), password.to_string());
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find(&self, email: &str, password: &str) -> RemarksResult<Option<UserRecord>> {
        Ok(self
            .users
            .get(email)
            .filter(|stored| stored.as_str() == password)
            .map(|stored| UserRecord {
                email: email.to_string(),
                password: stored.clone(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remarks_core::RemarksError;

    struct FailingStore;

    #[async_trait]
    impl CredentialStore for FailingStore {
        async fn find(&self, _: &str, _: &str) -> RemarksResult<Option<UserRecord>> {
            Err(RemarksError::Database("unable to open database file".to_string()))
        }
    }

    #[tokio::test]
    async fn test_verify() {
        let verifier =
            CredentialVerifier::new(Arc::new(MemoryCredentialStore::new().with_user("a@x.com", "p1")));

        assert!(verifier.verify("a@x.com", "p1").await.unwrap());
        assert!(!verifier.verify("a@x.com", "p2").await.unwrap());
        assert!(!verifier.verify("b@x.com", "p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_storage_fault_is_internal() {
        let verifier = CredentialVerifier::new(Arc::new(FailingStore));
        assert!(matches!(
            verifier.verify("a@x.com", "p1").await,
            Err(AuthError::Internal { .. })
        ));
    }
}
