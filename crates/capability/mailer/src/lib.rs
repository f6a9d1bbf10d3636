//! 邮件投递能力。
//!
//! - [`Mailer`]：按模板向单个收件人发送邮件
//! - [`SmtpMailer`]：基于 lettre 的 SMTP 实现，带固定退避重试
//! - [`NoopMailer`]：未配置 SMTP 时只记日志
//! - [`RecordingMailer`]：测试用，记录所有发送请求
//! - [`spawn_mail`]：在独立任务中发送，调用方不等待结果

mod smtp;
mod templates;

pub use smtp::{SmtpMailer, SmtpSettings};
pub use templates::{MailTemplate, RenderedMail, render};

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{info, warn};

/// 邮件投递错误。
#[derive(Debug, Clone, thiserror::Error)]
pub enum MailError {
    #[error("template error: {0}")]
    Template(String),
    #[error("invalid address: {0}")]
    Address(String),
    #[error("transport error: {0}")]
    Transport(String),
}

/// 邮件发送接口。
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        template: MailTemplate,
        data: &Value,
    ) -> Result<(), MailError>;
}

/// 丢弃所有邮件（仍会校验模板能否渲染）。
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        recipient: &str,
        template: MailTemplate,
        data: &Value,
    ) -> Result<(), MailError> {
        render(template, data)?;
        info!(
            target: "shelf.mail",
            recipient = %recipient,
            template = %template.name(),
            "mail_dropped"
        );
        Ok(())
    }
}

/// 已记录的一封邮件。
#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub template: MailTemplate,
    pub data: Value,
}

/// 测试用 Mailer：记录每次发送，并可等待异步任务投递完成。
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    notify: Notify,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    /// 等待至少 `count` 封邮件被记录；超时返回当前已记录的邮件。
    pub async fn wait_for(&self, count: usize, limit: Duration) -> Vec<SentMail> {
        let deadline = tokio::time::Instant::now() + limit;
        loop {
            let notified = self.notify.notified();
            let sent = self.sent();
            if sent.len() >= count {
                return sent;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.sent();
            }
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(
        &self,
        recipient: &str,
        template: MailTemplate,
        data: &Value,
    ) -> Result<(), MailError> {
        render(template, data)?;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentMail {
                recipient: recipient.to_string(),
                template,
                data: data.clone(),
            });
        }
        self.notify.notify_waiters();
        Ok(())
    }
}

/// 固定退避重试：最多尝试 `max_attempts` 次，返回最后一次的错误。
pub async fn deliver_with_retry<F, Fut>(
    max_attempts: u32,
    backoff: Duration,
    mut attempt: F,
) -> Result<(), MailError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<(), MailError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut current = 1u32;
    loop {
        match attempt(current).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                warn!(
                    target: "shelf.mail",
                    attempt = current,
                    error = %err,
                    "mail_attempt_failed"
                );
                if current >= max_attempts {
                    return Err(err);
                }
                current += 1;
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// 在独立任务中发送邮件；失败只记日志与指标，不影响调用方。
pub fn spawn_mail(
    mailer: Arc<dyn Mailer>,
    recipient: String,
    template: MailTemplate,
    data: Value,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match mailer.send(&recipient, template, &data).await {
            Ok(()) => {
                shelf_telemetry::record_mail_sent();
                info!(
                    target: "shelf.mail",
                    recipient = %recipient,
                    template = %template.name(),
                    "mail_sent"
                );
            }
            Err(err) => {
                shelf_telemetry::record_mail_failed();
                warn!(
                    target: "shelf.mail",
                    recipient = %recipient,
                    template = %template.name(),
                    error = %err,
                    "mail_send_failed"
                );
            }
        }
    })
}
