//! Shelf HTTP API：账户认证流程 + 图书/书评/书单目录。
//!
//! 启动顺序：.env → 配置 → 日志 → 存储（Postgres 或内存）→ 邮件 → 路由。

mod handlers;
mod middleware;
mod routes;
mod utils;

#[cfg(test)]
mod tests;

use shelf_auth::{AccountConfig, AccountService, PasswordParams};
use shelf_config::AppConfig;
use shelf_mailer::{Mailer, NoopMailer, SmtpMailer, SmtpSettings};
use shelf_storage::{
    BookStore, InMemoryBookStore, InMemoryReadingListStore, InMemoryReviewStore,
    InMemoryTokenStore, InMemoryUserStore, PgBookStore, PgReadingListStore, PgReviewStore,
    PgTokenStore, PgUserStore, PoolSettings, ReadingListStore, ReviewStore, TokenStore,
    UserStore, connect_pool,
};
use shelf_telemetry::init_tracing;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// 请求处理共享的句柄（全部通过构造注入）。
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub users: Arc<dyn UserStore>,
    pub books: Arc<dyn BookStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub lists: Arc<dyn ReadingListStore>,
    pub db_pool: Option<PgPool>,
    pub environment: String,
}

/// 一组存储实现。
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<dyn TokenStore>,
    pub books: Arc<dyn BookStore>,
    pub reviews: Arc<dyn ReviewStore>,
    pub lists: Arc<dyn ReadingListStore>,
}

impl Stores {
    /// 内存存储：token 存储与账户存储共享同一份账户数据。
    pub fn in_memory() -> Self {
        let users = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(InMemoryTokenStore::new(users.clone()));
        let reviews = Arc::new(InMemoryReviewStore::new());
        Self {
            users,
            tokens,
            books: Arc::new(InMemoryBookStore::new(reviews.clone())),
            reviews,
            lists: Arc::new(InMemoryReadingListStore::new()),
        }
    }

    pub fn postgres(pool: PgPool, timeout: Duration) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone(), timeout)),
            tokens: Arc::new(PgTokenStore::new(pool.clone(), timeout)),
            books: Arc::new(PgBookStore::new(pool.clone(), timeout)),
            reviews: Arc::new(PgReviewStore::new(pool.clone(), timeout)),
            lists: Arc::new(PgReadingListStore::new(pool, timeout)),
        }
    }
}

impl AppState {
    pub fn new(
        stores: Stores,
        mailer: Arc<dyn Mailer>,
        account_config: AccountConfig,
        db_pool: Option<PgPool>,
        environment: impl Into<String>,
    ) -> Self {
        let accounts = AccountService::new(
            stores.users.clone(),
            stores.tokens,
            mailer,
            account_config,
        );
        Self {
            accounts: Arc::new(accounts),
            users: stores.users,
            books: stores.books,
            reviews: stores.reviews,
            lists: stores.lists,
            db_pool,
            environment: environment.into(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    // 从环境变量加载运行配置
    let config = AppConfig::from_env()?;
    // 初始化结构化日志
    init_tracing();

    let store_timeout = Duration::from_millis(config.store_timeout_ms);
    let (stores, db_pool) = match config.database_url.as_deref() {
        Some(database_url) => {
            // 需先执行 migrations/0001_init.sql
            let settings = PoolSettings {
                max_connections: config.db_max_connections,
                store_timeout,
            };
            let pool = connect_pool(database_url, &settings).await?;
            (Stores::postgres(pool.clone(), store_timeout), Some(pool))
        }
        None => {
            warn!(target: "shelf.api", "database_not_configured");
            (Stores::in_memory(), None)
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(SmtpSettings {
            host: smtp.host.clone(),
            port: smtp.port,
            username: smtp.username.clone(),
            password: smtp.password.clone(),
            sender: config.mail_sender.clone(),
            max_attempts: config.mail_max_attempts,
            backoff: Duration::from_millis(config.mail_backoff_ms),
            timeout: Duration::from_secs(config.mail_timeout_seconds),
        })?),
        None => {
            warn!(target: "shelf.api", "smtp_not_configured");
            Arc::new(NoopMailer)
        }
    };

    let account_config = AccountConfig {
        activation_ttl: Duration::from_secs(config.activation_ttl_seconds),
        auth_token_ttl: Duration::from_secs(config.auth_token_ttl_seconds),
        password_reset_ttl: Duration::from_secs(config.password_reset_ttl_seconds),
        password: PasswordParams {
            m_cost: config.argon2_m_cost,
            t_cost: config.argon2_t_cost,
            p_cost: config.argon2_p_cost,
        },
    };
    let state = AppState::new(
        stores,
        mailer,
        account_config,
        db_pool,
        config.environment.clone(),
    );
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    info!(
        target: "shelf.api",
        addr = %config.http_addr,
        environment = %config.environment,
        "server_listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
