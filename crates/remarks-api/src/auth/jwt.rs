//! 토큰 발급 및 검증.
//!
//! 서명된 bearer 토큰을 발급하고, 서명을 검증하여 클레임을 복원합니다.
//! 토큰에는 만료 시각이 없으며 유효성은 오직 서명 검증과 폐기 원장으로 결정됩니다.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use remarks_core::{AuthConfig, Identity, RemarksError};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use super::AuthError;

/// 발급 토큰 페이로드.
///
/// 식별자(`sub`)만 포함합니다. 만료(`exp`), 발급 시각(`iat`), 토큰 ID(`jti`)는 넣지 않으므로
/// 같은 식별자로 두 번 로그인하면 동일한 토큰 문자열이 나옵니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 식별자
    pub sub: String,
}

/// 검증을 통과한 토큰의 클레임.
///
/// `sub`가 없거나 null인 토큰도 서명이 유효하면 여기까지는 도달합니다.
/// 문자열이 아닌 `sub`(숫자 등)도 거부하지 않고 JSON 표기 그대로 식별자로 씁니다.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedClaims {
    #[serde(default)]
    sub: serde_json::Value,
}

impl VerifiedClaims {
    /// 식별자 클레임 (없거나 null이면 None).
    pub fn identity(&self) -> Option<Identity> {
        match &self.sub {
            serde_json::Value::Null => None,
            serde_json::Value::String(sub) => Some(Identity::from(sub.as_str())),
            other => Some(Identity::new(other.to_string())),
        }
    }
}

/// 토큰 발급기.
///
/// 프로세스 시작 시 한 번 생성되며 서명 키와 알고리즘은 이후 변경되지 않습니다.
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// 새 발급기 생성.
    ///
    /// # Arguments
    ///
    /// * `secret` - 서명 비밀 키
    /// * `algorithm` - HMAC 계열 서명 알고리즘
    pub fn new(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // 만료 없는 토큰: exp 검사와 필수 클레임 검사를 모두 끈다
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// 인증 설정에서 발급기 생성.
    pub fn from_config(config: &AuthConfig) -> Result<Self, RemarksError> {
        let algorithm = Algorithm::from_str(&config.algorithm.to_uppercase()).map_err(|e| {
            RemarksError::Config(format!("서명 알고리즘 파싱 실패 ({}): {}", config.algorithm, e))
        })?;

        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(RemarksError::Config(format!(
                "공유 키 서명 알고리즘만 지원합니다: {:?}",
                algorithm
            )));
        }

        Ok(Self::new(
            config.secret_key.expose_secret().as_bytes(),
            algorithm,
        ))
    }

    /// 사용 중인 알고리즘.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// 식별자에 대한 토큰 발급.
    ///
    /// 동일한 식별자에 대해 항상 동일한 토큰을 반환합니다.
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.as_str().to_string(),
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key).map_err(|e| {
            AuthError::Internal {
                context: "Could not issue token",
                detail: e.to_string(),
            }
        })
    }

    /// 토큰 서명을 검증하고 클레임을 복원합니다.
    ///
    /// 서명 불일치, 형식 오류, 다른 알고리즘으로 서명된 토큰은 모두 `Malformed`입니다.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        decode::<VerifiedClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "토큰 검증 실패");
                AuthError::Malformed
            })
    }
}
