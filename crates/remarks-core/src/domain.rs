//! 도메인 레코드.
//!
//! 인증 주체(Identity)와 저장소에서 읽고 쓰는 레코드 타입을 정의합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 인증된 사용자 식별자.
///
/// 로그인에 사용한 이메일 문자열입니다. 형식이나 유일성은 이 타입이 보장하지 않으며
/// 사용자 저장소의 책임입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// 사용자 저장소 레코드 (`user` 테이블).
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct UserRecord {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

impl UserRecord {
    /// 화면 출력용으로 마스킹된 비밀번호.
    pub fn masked_password(&self) -> String {
        mask_secret(&self.password)
    }
}

/// 첫 글자만 남기고 가린 문자열.
pub fn mask_secret(secret: &str) -> String {
    match secret.chars().next() {
        Some(first) => format!("{}{}", first, "*".repeat(7)),
        None => String::new(),
    }
}

/// 리마크 레코드 (`remarks` 테이블).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct RemarkRecord {
    pub asin: String,
    pub remarks: String,
    pub image_link: String,
    pub product_link: String,
}

/// ASIN 정보 레코드 (`asin_info` 테이블).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct AsinInfo {
    pub asin_id: String,
    pub sku_id: Option<String>,
    pub image_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_serializes_as_plain_string() {
        let identity = Identity::new("a@x.com");
        assert_eq!(serde_json::to_string(&identity).unwrap(), r#""a@x.com""#);
        assert_eq!(identity.to_string(), "a@x.com");
    }

    #[test]
    fn test_user_record_hides_password() {
        let user = UserRecord {
            email: "a@x.com".to_string(),
            password: "p1-secret".to_string(),
        };
        assert!(!format!("{:?}", user).contains("p1-secret"));
        assert!(!serde_json::to_string(&user).unwrap().contains("p1-secret"));
        assert_eq!(user.masked_password(), "p*******");
    }

    #[test]
    fn test_mask_empty_secret() {
        assert_eq!(mask_secret(""), "");
    }

    proptest! {
        #[test]
        fn masked_secret_has_fixed_shape(secret in "[a-zA-Z0-9!@#]{2,40}") {
            let masked = mask_secret(&secret);
            prop_assert_eq!(masked.chars().count(), 8);
            prop_assert!(masked.ends_with("*******"));
            prop_assert_ne!(masked, secret);
        }
    }
}
