//! 邮件模板：主题、纯文本正文与 HTML 正文。

use crate::MailError;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTemplate {
    /// 注册欢迎邮件，携带激活 token。
    UserWelcome,
    /// 重置口令邮件，携带重置 token。
    PasswordReset,
}

impl MailTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MailTemplate::UserWelcome => "user_welcome",
            MailTemplate::PasswordReset => "password_reset",
        }
    }
}

impl fmt::Display for MailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMail {
    pub subject: String,
    pub plain_body: String,
    pub html_body: String,
}

fn field<'a>(data: &'a Value, key: &str) -> Result<&'a str, MailError> {
    data.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| MailError::Template(format!("missing field {key}")))
}

/// HTML 正文中插值前做最小转义。
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// 渲染模板；缺少必需字段返回 `MailError::Template`。
pub fn render(template: MailTemplate, data: &Value) -> Result<RenderedMail, MailError> {
    match template {
        MailTemplate::UserWelcome => {
            let user_id = field(data, "userId")?;
            let token = field(data, "activationToken")?;
            Ok(RenderedMail {
                subject: "Welcome to Shelf!".to_string(),
                plain_body: format!(
                    "Hi,\n\n\
                     Thanks for signing up for a Shelf account. Your user ID is {user_id}.\n\n\
                     Please send a PUT request to /v1/users/activated with the following body \
                     to activate your account:\n\n\
                     {{\"token\": \"{token}\"}}\n\n\
                     This token expires in 3 days and can only be used once.\n\n\
                     Thanks,\nThe Shelf Team\n"
                ),
                html_body: format!(
                    "<!doctype html>\n<html>\n<body>\n\
                     <p>Hi,</p>\n\
                     <p>Thanks for signing up for a Shelf account. Your user ID is {}.</p>\n\
                     <p>Please send a <code>PUT /v1/users/activated</code> request with the \
                     following body to activate your account:</p>\n\
                     <pre><code>{{\"token\": \"{}\"}}</code></pre>\n\
                     <p>This token expires in 3 days and can only be used once.</p>\n\
                     <p>Thanks,</p>\n<p>The Shelf Team</p>\n\
                     </body>\n</html>\n",
                    escape_html(user_id),
                    escape_html(token)
                ),
            })
        }
        MailTemplate::PasswordReset => {
            let token = field(data, "passwordResetToken")?;
            Ok(RenderedMail {
                subject: "Reset your Shelf password".to_string(),
                plain_body: format!(
                    "Hi,\n\n\
                     Please send a PUT request to /v1/users/password with the following body \
                     to set a new password:\n\n\
                     {{\"password\": \"your new password\", \"token\": \"{token}\"}}\n\n\
                     This token expires in 1 hour. If you did not request a reset, \
                     you can ignore this email.\n\n\
                     Thanks,\nThe Shelf Team\n"
                ),
                html_body: format!(
                    "<!doctype html>\n<html>\n<body>\n\
                     <p>Hi,</p>\n\
                     <p>Please send a <code>PUT /v1/users/password</code> request with the \
                     following body to set a new password:</p>\n\
                     <pre><code>{{\"password\": \"your new password\", \"token\": \"{}\"}}</code></pre>\n\
                     <p>This token expires in 1 hour. If you did not request a reset, \
                     you can ignore this email.</p>\n\
                     <p>Thanks,</p>\n<p>The Shelf Team</p>\n\
                     </body>\n</html>\n",
                    escape_html(token)
                ),
            })
        }
    }
}
