//! 로그인 / 로그아웃.

use std::sync::Arc;

use chrono::{Duration, Utc};
use remarks_core::Identity;

use super::{AuthError, CredentialVerifier, RevocationLedger, RevokeOutcome, TokenIssuer};

/// 폐기 항목 보존 기한 (일).
pub const REVOCATION_RETENTION_DAYS: i64 = 3650;

/// 세션 컨트롤러.
///
/// 자격증명 검증, 토큰 발급, 폐기 원장 등록을 묶어 로그인/로그아웃을 처리합니다.
#[derive(Clone)]
pub struct SessionController {
    verifier: CredentialVerifier,
    issuer: Arc<TokenIssuer>,
    ledger: Arc<dyn RevocationLedger>,
}

impl SessionController {
    pub fn new(
        verifier: CredentialVerifier,
        issuer: Arc<TokenIssuer>,
        ledger: Arc<dyn RevocationLedger>,
    ) -> Self {
        Self {
            verifier,
            issuer,
            ledger,
        }
    }

    /// 로그인.
    ///
    /// # Arguments
    ///
    /// * `email` - 사용자 식별자
    /// * `password` - 비밀번호
    ///
    /// # Returns
    ///
    /// 발급된 토큰 문자열
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if !self.verifier.verify(email, password).await? {
            return Err(AuthError::Unauthorized);
        }

        self.issuer.issue(&Identity::new(email))
    }

    /// 로그아웃.
    ///
    /// 서명이 유효한 토큰만 원장에 등록합니다. 식별자 클레임 여부는 보지 않으며,
    /// 이미 폐기된 토큰의 재로그아웃도 성공으로 처리합니다.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.issuer.verify(token)?;

        let revoked_until = Utc::now() + Duration::days(REVOCATION_RETENTION_DAYS);
        let outcome = self
            .ledger
            .revoke(token, revoked_until)
            .await
            .map_err(|e| AuthError::internal("Error blacklisting token", e))?;

        if outcome == RevokeOutcome::AlreadyRevoked {
            tracing::debug!("이미 폐기된 토큰에 대한 로그아웃 요청");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AccessGate, MemoryCredentialStore, MemoryRevocationLedger};
    use jsonwebtoken::Algorithm;

    struct Fixture {
        session: SessionController,
        gate: AccessGate,
        issuer: Arc<TokenIssuer>,
        ledger: Arc<MemoryRevocationLedger>,
    }

    fn setup() -> Fixture {
        let issuer = Arc::new(TokenIssuer::new(b"session-test-secret", Algorithm::HS256));
        let ledger = Arc::new(MemoryRevocationLedger::new());
        let verifier = CredentialVerifier::new(Arc::new(
            MemoryCredentialStore::new().with_user("a@x.com", "p1"),
        ));
        Fixture {
            session: SessionController::new(verifier, issuer.clone(), ledger.clone()),
            gate: AccessGate::new(issuer.clone(), ledger.clone()),
            issuer,
            ledger,
        }
    }

    #[tokio::test]
    async fn test_login_then_authorize() {
        let f = setup();
        let token = f.session.login("a@x.com", "p1").await.unwrap();

        assert_eq!(f.gate.authorize(&token).await.unwrap(), Identity::new("a@x.com"));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let f = setup();
        assert!(matches!(
            f.session.login("a@x.com", "wrong").await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            f.session.login("nobody@x.com", "p1").await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let f = setup();
        let token = f.session.login("a@x.com", "p1").await.unwrap();

        f.session.logout(&token).await.unwrap();
        assert!(matches!(f.gate.authorize(&token).await, Err(AuthError::Revoked)));

        let until = f.ledger.revoked_until(&token).await.unwrap();
        let days = (until - Utc::now()).num_days();
        assert!((REVOCATION_RETENTION_DAYS - 1..=REVOCATION_RETENTION_DAYS).contains(&days));
    }

    #[tokio::test]
    async fn test_logout_twice_succeeds() {
        let f = setup();
        let token = f.session.login("a@x.com", "p1").await.unwrap();

        f.session.logout(&token).await.unwrap();
        f.session.logout(&token).await.unwrap();
        assert_eq!(f.ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_logout_rejects_unsigned_token() {
        let f = setup();
        assert!(matches!(f.session.logout("garbage").await, Err(AuthError::Malformed)));
        assert!(f.ledger.is_empty().await);
    }

    #[tokio::test]
    async fn test_relogin_after_logout_yields_revoked_token() {
        let f = setup();
        let token = f.session.login("a@x.com", "p1").await.unwrap();
        f.session.logout(&token).await.unwrap();

        // 토큰이 결정적이므로 재로그인해도 같은 (폐기된) 토큰이 나온다
        let again = f.session.login("a@x.com", "p1").await.unwrap();
        assert_eq!(again, token);
        assert!(matches!(f.gate.authorize(&again).await, Err(AuthError::Revoked)));
    }

    #[tokio::test]
    async fn test_concurrent_logout_leaves_single_entry() {
        let f = setup();
        let token = f.issuer.issue(&Identity::new("a@x.com")).unwrap();

        let (first, second) = tokio::join!(f.session.logout(&token), f.session.logout(&token));
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(f.ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_many_concurrent_logouts() {
        let f = setup();
        let token = f.issuer.issue(&Identity::new("a@x.com")).unwrap();

        let results =
            futures::future::join_all((0..16).map(|_| f.session.logout(&token))).await;
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(f.ledger.len().await, 1);
    }

    #[tokio::test]
    async fn test_logout_ledger_fault_is_internal() {
        let f = setup();
        let token = f.session.login("a@x.com", "p1").await.unwrap();
        f.ledger.set_failing(true);

        assert!(matches!(
            f.session.logout(&token).await,
            Err(AuthError::Internal { .. })
        ));
    }
}
