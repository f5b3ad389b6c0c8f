//! CRM Remarks API 서버 진입점.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{http::StatusCode, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use remarks_api::auth::{PgRevocationLedger, TokenIssuer};
use remarks_api::openapi::swagger_ui_router;
use remarks_api::repository::{
    ensure_postgres_schema, ensure_users_schema, PgRecordStore, SqliteCredentialStore,
};
use remarks_api::storage::S3ObjectStore;
use remarks_api::{create_api_router, setup_metrics_recorder, AppState};
use remarks_core::{init_logging, AppConfig, CorsConfig, LogConfig};

/// CORS 레이어 생성.
///
/// 허용 origin이 설정되어 있으면 해당 origin만 자격 증명과 함께 허용합니다.
/// 설정되지 않으면 모든 origin을 허용하되 자격 증명은 허용하지 않습니다.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .origins()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        warn!("CORS origins not set, allowing any origin");
        layer.allow_origin(AllowOrigin::any())
    } else {
        info!("CORS configured with {} allowed origins", origins.len());
        layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// /metrics 엔드포인트 핸들러.
async fn metrics_handler(
    axum::extract::State(handle): axum::extract::State<PrometheusHandle>,
) -> String {
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    config: &AppConfig,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router(config.server.max_upload_bytes).with_state(state))
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer(&config.cors))
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그가 있으면 OpenAPI JSON을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> anyhow::Result<()> {
    use remarks_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    if std::env::args().any(|arg| arg == "--export-openapi") {
        println!("{}", serde_json::to_string_pretty(&ApiDoc::openapi())?);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    handle_export_openapi()?;

    let config = AppConfig::load_default().context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    info!("Starting CRM Remarks API server...");

    let metrics_handle = setup_metrics_recorder().context("Prometheus 레코더 설치 실패")?;

    let issuer = TokenIssuer::from_config(&config.auth)?;
    info!(algorithm = ?issuer.algorithm(), "토큰 발급기 초기화");

    // 폐기 원장 / 리마크 저장소 (PostgreSQL)
    let database_url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL (또는 DB_URL, REMARKS__DATABASE__URL)이 설정되지 않았습니다")?;
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(database_url)
        .await
        .context("PostgreSQL 연결 실패")?;
    info!("Connected to PostgreSQL");

    // 사용자 저장소 (SQLite)
    let users_options = SqliteConnectOptions::from_str(&config.database.users_url)
        .context("사용자 저장소 URL 파싱 실패")?
        .create_if_missing(true);
    let users_pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect_with(users_options)
        .await
        .context("사용자 저장소 연결 실패")?;
    info!(url = %config.database.users_url, "Connected to user store");

    if config.database.auto_migrate {
        ensure_postgres_schema(&db_pool).await?;
        ensure_users_schema(&users_pool).await?;
    }

    let mut state = AppState::new(
        issuer,
        Arc::new(SqliteCredentialStore::new(users_pool.clone())),
        Arc::new(PgRevocationLedger::new(db_pool.clone())),
        Arc::new(PgRecordStore::new(db_pool.clone())),
    )
    .with_db_pool(db_pool)
    .with_users_pool(users_pool);

    if config.storage.is_configured() {
        state = state.with_object_store(Arc::new(S3ObjectStore::from_config(&config.storage)?));
        info!(
            bucket = %config.storage.bucket,
            region = %config.storage.region,
            "S3 storage configured"
        );
    } else {
        warn!("S3 storage not configured, uploads will fail");
    }

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .context("바인딩 주소 파싱 실패")?;

    let app = create_router(Arc::new(state), metrics_handle, &config);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 반환합니다.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
