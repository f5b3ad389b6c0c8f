//! CRM remarks 운영 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 테이블 생성 (사용자 저장소 + PostgreSQL)
//! remarks init-db --db-url postgres://localhost/remarks
//!
//! # 계정 추가
//! remarks users add a@x.com p1
//!
//! # 계정 목록 (비밀번호는 마스킹)
//! remarks users list --format json
//! ```

use clap::{Parser, Subcommand};
use remarks_cli::commands::init_db::{init_db, InitDbConfig};
use remarks_cli::commands::users::{add_user, list_users, OutputFormat};
use remarks_cli::commands::{connect_users_db, resolve_db_url, resolve_users_db};
use remarks_core::{init_logging, LogConfig, LogFormat};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "remarks")]
#[command(about = "CRM remarks CLI - 사용자 저장소 및 테이블 관리", long_about = None)]
#[command(version)]
struct Cli {
    /// 사용자 저장소 URL (기본: USERS_DB 환경변수 또는 sqlite://users.db)
    #[arg(long, global = true)]
    users_db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 사용자 계정 관리
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },

    /// 테이블 생성 (이미 있으면 유지)
    InitDb {
        /// PostgreSQL URL (기본: DATABASE_URL 또는 DB_URL 환경변수)
        #[arg(long)]
        db_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// 계정 목록 보기
    List {
        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 계정 추가 (같은 이메일이 있으면 변경하지 않음)
    Add {
        /// 로그인 이메일
        email: String,

        /// 비밀번호
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    init_logging(LogConfig::new("warn").with_format(LogFormat::Compact))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let cli = Cli::parse();
    let users_db = resolve_users_db(cli.users_db);

    match cli.command {
        Commands::Users { action } => {
            let pool = connect_users_db(&users_db).await?;

            match action {
                UsersAction::List { format } => {
                    let format = OutputFormat::parse(&format)?;
                    let content = list_users(&pool, format).await?;
                    println!("{}", content);
                }
                UsersAction::Add { email, password } => {
                    match add_user(&pool, &email, &password).await {
                        Ok(true) => println!("Created user {}", email.trim()),
                        Ok(false) => println!("User {} already exists", email.trim()),
                        Err(e) => {
                            error!("Add user failed: {}", e);
                            return Err(e);
                        }
                    }
                }
            }

            pool.close().await;
        }

        Commands::InitDb { db_url } => {
            let config = InitDbConfig {
                users_db,
                db_url: resolve_db_url(db_url),
            };

            let report = init_db(config).await?;
            info!(?report, "Initialization complete");
            println!(
                "users: {}, postgres: {}",
                if report.users_ready { "ready" } else { "skipped" },
                if report.postgres_ready { "ready" } else { "skipped" }
            );
        }
    }

    Ok(())
}
