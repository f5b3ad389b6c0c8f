//! CRM remarks 운영 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 사용자 저장소 관리 (목록 조회, 계정 추가)
//! - 데이터베이스 테이블 초기화

pub mod commands;

pub use commands::*;
