//! 설정 관리.
//!
//! 애플리케이션 설정은 프로세스 시작 시 한 번 로드되며 이후 변경되지 않습니다.
//! 로드 순서 (뒤가 우선):
//!
//! 1. 기본값
//! 2. 설정 파일 (`config/default.toml`, 선택)
//! 3. `REMARKS__SECTION__KEY` 형식의 환경 변수
//! 4. 기존 배포에서 사용하던 단일 환경 변수 (`SECRET_KEY`, `DB_URL`, `S3_BUCKET` 등)

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::error::{RemarksError, RemarksResult};

/// 지원하는 서명 알고리즘 (공유 비밀 키 기반 HMAC 계열).
pub const SUPPORTED_ALGORITHMS: [&str; 3] = ["HS256", "HS384", "HS512"];

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 토큰 서명 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 오브젝트 스토리지(S3) 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// CORS 설정
    #[serde(default)]
    pub cors: CorsConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// 업로드 요청 본문 최대 크기 (바이트)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: default_request_timeout(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// `host:port` 형식의 바인딩 주소.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

/// 데이터베이스 설정.
///
/// 폐기 토큰 원장과 리마크 레코드는 PostgreSQL에, 사용자 자격증명은 SQLite에 저장됩니다.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL (폐기 원장, 리마크, ASIN 정보)
    #[serde(default)]
    pub url: Option<String>,
    /// 사용자 저장소 SQLite URL
    #[serde(default = "default_users_url")]
    pub users_url: String,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 연결 획득 타임아웃 (초)
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
    /// 시작 시 테이블 자동 생성 여부
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            users_url: default_users_url(),
            max_connections: default_max_connections(),
            connection_timeout_secs: default_connection_timeout(),
            auto_migrate: true,
        }
    }
}

fn default_users_url() -> String {
    "sqlite://users.db".to_string()
}
fn default_max_connections() -> u32 {
    10
}
fn default_connection_timeout() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

/// 토큰 서명 설정.
///
/// 서명 키는 프로세스 수명 동안 상수로 취급되며 교체(rotation)를 지원하지 않습니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// 서명 비밀 키
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub secret_key: SecretString,
    /// 서명 알고리즘 식별자 (기본값: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: empty_secret(),
            algorithm: default_algorithm(),
        }
    }
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

/// 오브젝트 스토리지(S3) 설정.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// 버킷 이름
    #[serde(default)]
    pub bucket: String,
    /// 리전 (예: ap-northeast-2)
    #[serde(default = "default_region")]
    pub region: String,
    /// 액세스 키 ID
    #[serde(default)]
    pub access_key_id: String,
    /// 시크릿 액세스 키
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub secret_access_key: SecretString,
    /// S3 호환 스토리지 엔드포인트 (미설정 시 AWS 가상 호스트 방식)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: default_region(),
            access_key_id: String::new(),
            secret_access_key: empty_secret(),
            endpoint: None,
        }
    }
}

impl StorageConfig {
    /// 업로드에 필요한 값이 모두 설정되었는지 확인.
    pub fn is_configured(&self) -> bool {
        !self.bucket.is_empty()
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.expose_secret().is_empty()
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// CORS 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    /// 쉼표로 구분된 허용 origin 목록 (미설정 시 모든 origin 허용, 자격증명 미포함)
    #[serde(default)]
    pub allowed_origins: Option<String>,
}

impl CorsConfig {
    /// 허용 origin 목록.
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨 필터
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "remarks_api=info,tower_http=info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new().into_boxed_str())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| SecretString::new(s.into_boxed_str()))
}

/// 기존 배포 환경 변수 → 설정 키 매핑.
const LEGACY_ENV_KEYS: [(&str, &str); 11] = [
    ("SECRET_KEY", "auth.secret_key"),
    ("JWT_ALGORITHM", "auth.algorithm"),
    ("DB_URL", "database.url"),
    ("USERS_DB", "database.users_url"),
    ("S3_BUCKET", "storage.bucket"),
    ("AWS_REGION", "storage.region"),
    ("AWS_ACCESS_KEY_ID", "storage.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "storage.secret_access_key"),
    ("API_HOST", "server.host"),
    ("API_PORT", "server.port"),
    ("CORS_ORIGINS", "cors.allowed_origins"),
];

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 존재하지 않으면 건너뜁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> RemarksResult<Self> {
        Self::load_from(config::File::from(path.as_ref()).required(false))
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> RemarksResult<Self> {
        Self::load("config/default.toml")
    }

    /// 주어진 파일 소스 위에 환경 변수를 겹쳐 설정을 만듭니다.
    pub fn load_from<S>(source: S) -> RemarksResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .add_source(source)
            .add_source(
                config::Environment::with_prefix("REMARKS")
                    .separator("__")
                    .try_parsing(true),
            );

        // DATABASE_URL은 DB_URL보다 우선
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| std::env::var("DB_URL").ok());

        for (env_key, config_key) in LEGACY_ENV_KEYS {
            if env_key == "DB_URL" {
                continue;
            }
            builder = builder.set_override_option(config_key, std::env::var(env_key).ok())?;
        }
        builder = builder.set_override_option("database.url", database_url)?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 시작 시 설정 유효성 검사.
    ///
    /// 서명 키가 비어 있거나 HMAC 계열이 아닌 알고리즘이면 실패합니다.
    pub fn validate(&self) -> RemarksResult<()> {
        if self.auth.secret_key.expose_secret().is_empty() {
            return Err(RemarksError::Config(
                "서명 키가 설정되지 않았습니다 (SECRET_KEY 또는 REMARKS__AUTH__SECRET_KEY)"
                    .to_string(),
            ));
        }

        let algorithm = self.auth.algorithm.to_uppercase();
        if !SUPPORTED_ALGORITHMS.contains(&algorithm.as_str()) {
            return Err(RemarksError::Config(format!(
                "지원하지 않는 서명 알고리즘: {} (지원: {})",
                self.auth.algorithm,
                SUPPORTED_ALGORITHMS.join(", ")
            )));
        }

        if self.database.max_connections == 0 {
            return Err(RemarksError::Config(
                "database.max_connections는 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn from_toml(toml: &str) -> RemarksResult<AppConfig> {
        AppConfig::load_from(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn test_load_from_toml() {
        let config = from_toml(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [auth]
            secret_key = "file-secret-for-testing"

            [storage]
            bucket = "remarks-media"
            region = "ap-northeast-2"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.storage.region, "ap-northeast-2");
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_partial_logging_section_keeps_defaults() {
        let config = from_toml(
            r#"
            [auth]
            secret_key = "file-secret-for-testing"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "remarks_api=info,tower_http=info");
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let mut config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig {
                secret_key: SecretString::new("secret".to_string().into_boxed_str()),
                algorithm: "RS256".to_string(),
            },
            storage: StorageConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        };
        assert!(matches!(config.validate(), Err(RemarksError::Config(_))));

        config.auth.algorithm = "hs512".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::default(),
        };
        assert!(matches!(config.validate(), Err(RemarksError::Config(_))));
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let auth = AuthConfig {
            secret_key: SecretString::new("super-secret-value".to_string().into_boxed_str()),
            algorithm: "HS256".to_string(),
        };
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_cors_origins_parsing() {
        let cors = CorsConfig {
            allowed_origins: Some("https://a.example.com, ,https://b.example.com".to_string()),
        };
        assert_eq!(
            cors.origins(),
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(CorsConfig::default().origins().is_empty());
    }

    #[test]
    fn test_storage_configured() {
        let mut storage = StorageConfig::default();
        assert!(!storage.is_configured());

        storage.bucket = "bucket".to_string();
        storage.access_key_id = "AKIA".to_string();
        storage.secret_access_key = SecretString::new("key".to_string().into_boxed_str());
        assert!(storage.is_configured());
    }
}
