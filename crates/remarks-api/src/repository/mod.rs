//! 데이터베이스 연산.
//!
//! 라우트 핸들러와 인증 계층에서 SQL을 분리합니다.
//! 모든 Repository는 static methods 패턴을 사용합니다.

pub mod records;
pub mod revoked_tokens;
pub mod schema;
pub mod users;

pub use records::{PgRecordStore, RecordStore, RemarksRepository};
pub use revoked_tokens::RevokedTokenRepository;
pub use schema::{ensure_postgres_schema, ensure_users_schema};
pub use users::{SqliteCredentialStore, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use records::MemoryRecordStore;
