//! 账户生命周期：注册→激活、登录→认证 token、忘记口令→重置。
//!
//! 所有账户修改都走 `UserStore::update_user` 的 version 条件更新；
//! 一次性 token 兑现后删除该账户同作用域的全部 token。

use crate::password::{PasswordParams, hash_password_blocking, verify_password_blocking};
use crate::token::{IssuedToken, generate_token, hash_token, is_well_formed};
use crate::validation::{
    ValidationErrors, validate_email, validate_password_plaintext, validate_token_plaintext,
    validate_username,
};
use crate::AuthError;
use domain::TokenScope;
use serde_json::json;
use shelf_mailer::{MailTemplate, Mailer, spawn_mail};
use shelf_storage::{NewUser, TokenStore, UserRecord, UserStore, UserUpdate};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// 时间来源（epoch 毫秒）。
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// 系统时钟。
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// token 有效期与口令哈希参数。
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub activation_ttl: Duration,
    pub auth_token_ttl: Duration,
    pub password_reset_ttl: Duration,
    pub password: PasswordParams,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            activation_ttl: Duration::from_secs(3 * 24 * 60 * 60),
            auth_token_ttl: Duration::from_secs(24 * 60 * 60),
            password_reset_ttl: Duration::from_secs(60 * 60),
            password: PasswordParams::default(),
        }
    }
}

/// 注册输入。
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// 登录成功返回的认证 token（明文只返回这一次）。
#[derive(Debug, Clone)]
pub struct AuthenticationToken {
    pub plaintext: String,
    pub expires_at_ms: i64,
}

/// 申请重置口令的结果。
///
/// 邮箱不存在与正常受理返回同一个值，调用方无法区分。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequestOutcome {
    Accepted,
}

/// 未知邮箱登录时用于校验的占位口令。
const DECOY_PASSWORD: &str = "shelf-decoy-password";

pub struct AccountService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenStore>,
    mailer: Arc<dyn Mailer>,
    config: AccountConfig,
    clock: Arc<dyn Clock>,
    decoy_hash: OnceCell<String>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenStore>,
        mailer: Arc<dyn Mailer>,
        config: AccountConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            config,
            clock: Arc::new(SystemClock),
            decoy_hash: OnceCell::new(),
        }
    }

    /// 替换时间来源（测试中推进时间用）。
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 注册未激活账户，签发激活 token 并异步发送欢迎邮件。
    pub async fn register(&self, input: RegisterInput) -> Result<UserRecord, AuthError> {
        let mut v = ValidationErrors::new();
        validate_username(&mut v, &input.username);
        validate_email(&mut v, &input.email);
        validate_password_plaintext(&mut v, &input.password);
        v.into_result()?;

        let password_hash = hash_password_blocking(self.config.password, input.password).await?;
        let user = self
            .users
            .insert_user(NewUser {
                user_id: uuid::Uuid::new_v4().to_string(),
                username: input.username,
                email: input.email,
                password_hash,
                created_at_ms: self.clock.now_ms(),
            })
            .await?;

        let issued = self
            .issue(&user.user_id, TokenScope::Activation, self.config.activation_ttl)
            .await?;
        spawn_mail(
            self.mailer.clone(),
            user.email.clone(),
            MailTemplate::UserWelcome,
            json!({
                "userId": user.user_id,
                "activationToken": issued.plaintext,
            }),
        );
        info!(target: "shelf.auth", user_id = %user.user_id, "account_registered");
        Ok(user)
    }

    /// 兑现激活 token：置 activated，删除全部激活 token。
    pub async fn activate(&self, token: &str) -> Result<UserRecord, AuthError> {
        let mut v = ValidationErrors::new();
        validate_token_plaintext(&mut v, token);
        v.into_result()?;

        let user = self.resolve_token(token, TokenScope::Activation).await?;
        let update = UserUpdate {
            activated: Some(true),
            ..UserUpdate::default()
        };
        let user = self.guarded_update(&user, update).await?;
        self.tokens
            .delete_tokens_for_user(TokenScope::Activation, &user.user_id)
            .await?;
        shelf_telemetry::record_token_redeemed();
        info!(target: "shelf.auth", user_id = %user.user_id, "account_activated");
        Ok(user)
    }

    /// 校验邮箱与口令，签发认证 token。
    ///
    /// 邮箱不存在与口令错误返回同一个 `InvalidCredentials`。
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticationToken, AuthError> {
        let mut v = ValidationErrors::new();
        validate_email(&mut v, email);
        validate_password_plaintext(&mut v, password);
        v.into_result()?;

        let Some(user) = self.users.find_user_by_email(email).await? else {
            // 未知邮箱同样做一次 argon2 校验，耗时与口令错误一致
            let decoy = self.decoy_hash().await?.to_string();
            verify_password_blocking(decoy, password.to_string()).await?;
            shelf_telemetry::record_login_failure();
            return Err(AuthError::InvalidCredentials);
        };
        let verified =
            verify_password_blocking(user.password_hash.clone(), password.to_string()).await?;
        if !verified {
            shelf_telemetry::record_login_failure();
            warn!(target: "shelf.auth", user_id = %user.user_id, "login_failed");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self
            .issue(&user.user_id, TokenScope::Authentication, self.config.auth_token_ttl)
            .await?;
        info!(target: "shelf.auth", user_id = %user.user_id, "authentication_token_issued");
        Ok(AuthenticationToken {
            plaintext: issued.plaintext,
            expires_at_ms: issued.record.expires_at_ms,
        })
    }

    /// 申请重置口令：仅已激活账户会收到 token 邮件。
    pub async fn request_password_reset(
        &self,
        email: &str,
    ) -> Result<ResetRequestOutcome, AuthError> {
        let mut v = ValidationErrors::new();
        validate_email(&mut v, email);
        v.into_result()?;

        let Some(user) = self.users.find_user_by_email(email).await? else {
            return Ok(ResetRequestOutcome::Accepted);
        };
        if !user.activated {
            return Err(AuthError::Validation(ValidationErrors::single(
                "email",
                "this account is not activated",
            )));
        }

        let issued = self
            .issue(
                &user.user_id,
                TokenScope::PasswordReset,
                self.config.password_reset_ttl,
            )
            .await?;
        spawn_mail(
            self.mailer.clone(),
            user.email.clone(),
            MailTemplate::PasswordReset,
            json!({
                "userId": user.user_id,
                "passwordResetToken": issued.plaintext,
            }),
        );
        info!(target: "shelf.auth", user_id = %user.user_id, "password_reset_requested");
        Ok(ResetRequestOutcome::Accepted)
    }

    /// 兑现重置 token：写入新口令哈希，删除全部重置 token。
    pub async fn reset_password(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<UserRecord, AuthError> {
        let mut v = ValidationErrors::new();
        validate_password_plaintext(&mut v, new_password);
        validate_token_plaintext(&mut v, token);
        v.into_result()?;

        let user = self.resolve_token(token, TokenScope::PasswordReset).await?;
        let password_hash =
            hash_password_blocking(self.config.password, new_password.to_string()).await?;
        let update = UserUpdate {
            password_hash: Some(password_hash),
            ..UserUpdate::default()
        };
        let user = self.guarded_update(&user, update).await?;
        self.tokens
            .delete_tokens_for_user(TokenScope::PasswordReset, &user.user_id)
            .await?;
        shelf_telemetry::record_token_redeemed();
        info!(target: "shelf.auth", user_id = %user.user_id, "password_reset");
        Ok(user)
    }

    /// token 明文 + 期望作用域 → 账户（不检查激活状态）。
    pub async fn resolve_token(
        &self,
        plaintext: &str,
        scope: TokenScope,
    ) -> Result<UserRecord, AuthError> {
        if !is_well_formed(plaintext) {
            return Err(AuthError::TokenNotFound);
        }
        let hash = hash_token(plaintext);
        self.tokens
            .find_user_for_token(&hash, scope, self.clock.now_ms())
            .await?
            .ok_or(AuthError::TokenNotFound)
    }

    async fn issue(
        &self,
        user_id: &str,
        scope: TokenScope,
        ttl: Duration,
    ) -> Result<IssuedToken, AuthError> {
        let issued = generate_token(user_id, scope, ttl, self.clock.now_ms())?;
        self.tokens.insert_token(issued.record.clone()).await?;
        shelf_telemetry::record_token_issued();
        Ok(issued)
    }

    /// 以当前哈希参数生成的占位哈希，首次使用时计算。
    async fn decoy_hash(&self) -> Result<&str, AuthError> {
        let params = self.config.password;
        self.decoy_hash
            .get_or_try_init(|| hash_password_blocking(params, DECOY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    async fn guarded_update(
        &self,
        user: &UserRecord,
        update: UserUpdate,
    ) -> Result<UserRecord, AuthError> {
        match self.users.update_user(&user.user_id, user.version, update).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                let err = AuthError::from(err);
                if matches!(err, AuthError::EditConflict) {
                    shelf_telemetry::record_edit_conflict();
                    warn!(
                        target: "shelf.auth",
                        user_id = %user.user_id,
                        version = user.version,
                        "account_edit_conflict"
                    );
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::verify_password;
    use shelf_mailer::NoopMailer;
    use shelf_storage::{InMemoryTokenStore, InMemoryUserStore};

    fn service() -> AccountService {
        let users = Arc::new(InMemoryUserStore::new());
        let tokens = Arc::new(InMemoryTokenStore::new(users.clone()));
        let config = AccountConfig {
            password: PasswordParams {
                m_cost: 8,
                t_cost: 1,
                p_cost: 1,
            },
            ..AccountConfig::default()
        };
        AccountService::new(users, tokens, Arc::new(NoopMailer), config)
    }

    #[tokio::test]
    async fn unknown_email_is_verified_against_a_decoy_hash() {
        let service = service();
        assert!(service.decoy_hash.get().is_none());

        let err = service
            .authenticate("nobody@example.com", "pa55word123")
            .await
            .expect_err("unknown email");
        assert!(matches!(err, AuthError::InvalidCredentials));

        let decoy = service.decoy_hash.get().expect("decoy hash");
        assert!(decoy.starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
        assert!(!verify_password(decoy, "pa55word123").expect("verify"));
    }

    #[tokio::test]
    async fn decoy_hash_is_computed_once() {
        let service = service();
        let first = service.decoy_hash().await.expect("decoy").to_string();
        let second = service.decoy_hash().await.expect("decoy");
        assert_eq!(first, second);
    }
}
