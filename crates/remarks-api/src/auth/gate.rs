//! 접근 게이트.
//!
//! 보호된 요청마다 bearer 토큰을 검사합니다. 판정 순서는 고정입니다:
//!
//! 1. 폐기 원장 조회 (등록되어 있으면 `Revoked`)
//! 2. 서명 검증 (실패하면 `Malformed`)
//! 3. 식별자 클레임 확인 (없으면 `Malformed`)
//!
//! 폐기된 토큰은 서명이 깨져 있어도 `Revoked`로 보고됩니다.

use std::sync::Arc;

use remarks_core::Identity;

use super::{AuthError, RevocationLedger, TokenIssuer};

/// 접근 게이트.
#[derive(Clone)]
pub struct AccessGate {
    issuer: Arc<TokenIssuer>,
    ledger: Arc<dyn RevocationLedger>,
}

impl AccessGate {
    pub fn new(issuer: Arc<TokenIssuer>, ledger: Arc<dyn RevocationLedger>) -> Self {
        Self { issuer, ledger }
    }

    /// 토큰을 검사하고 식별자를 반환합니다.
    ///
    /// 원장 조회 장애는 `Internal`로 전파되며 절대 통과로 처리하지 않습니다.
    pub async fn authorize(&self, token: &str) -> Result<Identity, AuthError> {
        let revoked = self
            .ledger
            .is_revoked(token)
            .await
            .map_err(|e| AuthError::internal("Error checking blacklist", e))?;
        if revoked {
            return Err(AuthError::Revoked);
        }

        self.issuer
            .verify(token)?
            .identity()
            .ok_or(AuthError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryRevocationLedger;
    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    const TEST_SECRET: &[u8] = b"gate-test-secret";

    fn setup() -> (AccessGate, Arc<TokenIssuer>, Arc<MemoryRevocationLedger>) {
        let issuer = Arc::new(TokenIssuer::new(TEST_SECRET, Algorithm::HS256));
        let ledger = Arc::new(MemoryRevocationLedger::new());
        let gate = AccessGate::new(issuer.clone(), ledger.clone());
        (gate, issuer, ledger)
    }

    #[tokio::test]
    async fn test_valid_token_authorized() {
        let (gate, issuer, _) = setup();
        let token = issuer.issue(&Identity::new("a@x.com")).unwrap();

        assert_eq!(gate.authorize(&token).await.unwrap(), Identity::new("a@x.com"));
    }

    #[tokio::test]
    async fn test_revoked_token_rejected() {
        let (gate, issuer, ledger) = setup();
        let token = issuer.issue(&Identity::new("a@x.com")).unwrap();
        ledger.revoke(&token, Utc::now()).await.unwrap();

        assert!(matches!(gate.authorize(&token).await, Err(AuthError::Revoked)));
    }

    #[tokio::test]
    async fn test_revocation_checked_before_signature() {
        let (gate, _, ledger) = setup();
        ledger.revoke("garbage", Utc::now()).await.unwrap();

        assert!(matches!(gate.authorize("garbage").await, Err(AuthError::Revoked)));
    }

    #[tokio::test]
    async fn test_garbage_token_malformed() {
        let (gate, _, _) = setup();
        assert!(matches!(gate.authorize("garbage").await, Err(AuthError::Malformed)));
    }

    #[tokio::test]
    async fn test_missing_subject_malformed() {
        let (gate, _, _) = setup();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": null }),
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert!(matches!(gate.authorize(&token).await, Err(AuthError::Malformed)));
    }

    #[tokio::test]
    async fn test_expired_claim_still_authorized() {
        let (gate, _, _) = setup();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": "a@x.com", "exp": 1 }),
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(gate.authorize(&token).await.unwrap(), Identity::new("a@x.com"));
    }

    #[tokio::test]
    async fn test_numeric_subject_authorized() {
        let (gate, _, _) = setup();
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "sub": 123 }),
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert_eq!(gate.authorize(&token).await.unwrap(), Identity::new("123"));
    }

    #[tokio::test]
    async fn test_ledger_fault_is_not_a_pass() {
        let (gate, issuer, ledger) = setup();
        let token = issuer.issue(&Identity::new("a@x.com")).unwrap();
        ledger.set_failing(true);

        assert!(matches!(
            gate.authorize(&token).await,
            Err(AuthError::Internal { .. })
        ));
    }
}
