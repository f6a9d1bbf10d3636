//! 不透明 token：签发与摘要。
//!
//! - 明文：16 字节 OS 随机数，URL 安全 base64（无填充），固定 22 字符
//! - 摘要：明文的 SHA-256，只有摘要会持久化

use crate::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use domain::TokenScope;
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use shelf_storage::TokenRecord;
use std::time::Duration;

/// token 明文长度（字符）。
pub const TOKEN_PLAINTEXT_LEN: usize = 22;

const TOKEN_ENTROPY_BYTES: usize = 16;

/// 新签发的 token：明文只在这里出现一次。
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub plaintext: String,
    pub record: TokenRecord,
}

/// 生成 token 明文及其持久化记录。
///
/// 随机源失败返回 `AuthError::Fatal`，不会签发任何 token。
pub fn generate_token(
    user_id: &str,
    scope: TokenScope,
    ttl: Duration,
    now_ms: i64,
) -> Result<IssuedToken, AuthError> {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| AuthError::Fatal(format!("random source: {err}")))?;
    let plaintext = URL_SAFE_NO_PAD.encode(bytes);
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    let record = TokenRecord {
        hash: hash_token(&plaintext),
        user_id: user_id.to_string(),
        scope,
        expires_at_ms: now_ms.saturating_add(ttl_ms),
        created_at_ms: now_ms,
    };
    Ok(IssuedToken { plaintext, record })
}

/// 明文 → 持久化摘要。
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// 明文形状检查：长度与 URL 安全字母表。
pub fn is_well_formed(plaintext: &str) -> bool {
    plaintext.len() == TOKEN_PLAINTEXT_LEN
        && plaintext
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}
