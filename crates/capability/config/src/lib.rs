//! 应用运行配置加载。

use std::env;

/// 配置加载错误。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// SMTP 投递配置；未配置主机时邮件只记日志。
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 应用运行配置。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: String,
    pub environment: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub store_timeout_ms: u64,
    pub activation_ttl_seconds: u64,
    pub auth_token_ttl_seconds: u64,
    pub password_reset_ttl_seconds: u64,
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
    pub smtp: Option<SmtpConfig>,
    pub mail_sender: String,
    pub mail_max_attempts: u32,
    pub mail_backoff_ms: u64,
    pub mail_timeout_seconds: u64,
}

impl AppConfig {
    /// 从环境变量读取配置。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_addr =
            env::var("SHELF_HTTP_ADDR").unwrap_or_else(|_| "127.0.0.1:4000".to_string());
        let environment = env::var("SHELF_ENV").unwrap_or_else(|_| "development".to_string());
        let database_url = read_optional("SHELF_DATABASE_URL");
        let db_max_connections = read_u32_with_default("SHELF_DB_MAX_CONNECTIONS", 8)?;
        let store_timeout_ms = read_u64_with_default("SHELF_STORE_TIMEOUT_MS", 3_000)?;
        let activation_ttl_seconds =
            read_u64_with_default("SHELF_ACTIVATION_TTL_SECONDS", 3 * 24 * 60 * 60)?;
        let auth_token_ttl_seconds =
            read_u64_with_default("SHELF_AUTH_TOKEN_TTL_SECONDS", 24 * 60 * 60)?;
        let password_reset_ttl_seconds =
            read_u64_with_default("SHELF_PASSWORD_RESET_TTL_SECONDS", 60 * 60)?;
        // argon2 0.5 推荐参数：19 MiB、2 次迭代、1 路并行
        let argon2_m_cost = read_u32_with_default("SHELF_ARGON2_M_COST", 19 * 1024)?;
        let argon2_t_cost = read_u32_with_default("SHELF_ARGON2_T_COST", 2)?;
        let argon2_p_cost = read_u32_with_default("SHELF_ARGON2_P_COST", 1)?;
        let smtp = match read_optional("SHELF_SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: read_u16_with_default("SHELF_SMTP_PORT", 2525)?,
                username: read_optional("SHELF_SMTP_USERNAME"),
                password: read_optional("SHELF_SMTP_PASSWORD"),
            }),
            None => None,
        };
        let mail_sender = env::var("SHELF_SMTP_SENDER")
            .unwrap_or_else(|_| "Shelf <no-reply@shelf.example.com>".to_string());
        let mail_max_attempts = read_u32_with_default("SHELF_MAIL_MAX_ATTEMPTS", 3)?;
        let mail_backoff_ms = read_u64_with_default("SHELF_MAIL_BACKOFF_MS", 500)?;
        let mail_timeout_seconds = read_u64_with_default("SHELF_MAIL_TIMEOUT_SECONDS", 5)?;

        if mail_max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "SHELF_MAIL_MAX_ATTEMPTS".to_string(),
                "0".to_string(),
            ));
        }

        Ok(Self {
            http_addr,
            environment,
            database_url,
            db_max_connections,
            store_timeout_ms,
            activation_ttl_seconds,
            auth_token_ttl_seconds,
            password_reset_ttl_seconds,
            argon2_m_cost,
            argon2_t_cost,
            argon2_p_cost,
            smtp,
            mail_sender,
            mail_max_attempts,
            mail_backoff_ms,
            mail_timeout_seconds,
        })
    }
}

fn read_u16_with_default(key: &str, default: u16) -> Result<u16, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u16>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u32_with_default(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_u64_with_default(key: &str, default: u64) -> Result<u64, ConfigError> {
    let value = match env::var(key) {
        Ok(value) => value,
        Err(_) => return Ok(default),
    };
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(key.to_string(), value))
}

fn read_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}
