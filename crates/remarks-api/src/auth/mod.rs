//! 인증 및 토큰 폐기.
//!
//! # 구성 요소
//!
//! - [`CredentialVerifier`]: 사용자 저장소 대조
//! - [`TokenIssuer`]: 서명 토큰 발급/검증
//! - [`RevocationLedger`]: 로그아웃된 토큰 원장
//! - [`AccessGate`]: 보호된 요청의 토큰 판정
//! - [`SessionController`]: 로그인/로그아웃
//! - [`AuthUser`], [`BearerToken`]: Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(AuthUser(identity): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", identity)
//! }
//! ```

mod credentials;
mod error;
mod gate;
mod jwt;
mod ledger;
mod middleware;
mod session;

pub use credentials::{CredentialStore, CredentialVerifier};
pub use error::AuthError;
pub use gate::AccessGate;
pub use jwt::{Claims, TokenIssuer, VerifiedClaims};
pub use ledger::{PgRevocationLedger, RevocationLedger, RevokeOutcome};
pub use middleware::{AuthUser, BearerToken};
pub use session::{SessionController, REVOCATION_RETENTION_DAYS};

#[cfg(any(test, feature = "test-utils"))]
pub use credentials::MemoryCredentialStore;
#[cfg(any(test, feature = "test-utils"))]
pub use ledger::MemoryRevocationLedger;
