//! # Remarks Core
//!
//! CRM remarks 서비스의 공통 타입과 인프라를 제공합니다.
//!
//! - 설정 관리 (파일 + 환경 변수)
//! - 에러 타입
//! - 로깅 인프라
//! - 도메인 레코드 (사용자, 리마크, ASIN 정보)

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
