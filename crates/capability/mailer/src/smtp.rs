//! 基于 lettre 的 SMTP 投递。

use crate::templates::{MailTemplate, render};
use crate::{MailError, Mailer, deliver_with_retry};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// SMTP 连接与重试参数。
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub sender: String,
    pub max_attempts: u32,
    pub backoff: Duration,
    pub timeout: Duration,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    max_attempts: u32,
    backoff: Duration,
}

impl SmtpMailer {
    /// 建立 SMTP transport（STARTTLS，不在此处连接）。
    pub fn new(settings: SmtpSettings) -> Result<Self, MailError> {
        let sender: Mailbox = settings
            .sender
            .parse()
            .map_err(|err| MailError::Address(format!("{}: {err}", settings.sender)))?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| MailError::Transport(err.to_string()))?
            .port(settings.port)
            .timeout(Some(settings.timeout));
        if let (Some(username), Some(password)) = (settings.username, settings.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }
        info!(
            target: "shelf.mail",
            host = %settings.host,
            port = settings.port,
            "smtp_transport_ready"
        );
        Ok(Self {
            transport: builder.build(),
            sender,
            max_attempts: settings.max_attempts,
            backoff: settings.backoff,
        })
    }

    fn build_message(
        &self,
        recipient: &str,
        template: MailTemplate,
        data: &Value,
    ) -> Result<Message, MailError> {
        let rendered = render(template, data)?;
        let to: Mailbox = recipient
            .parse()
            .map_err(|err| MailError::Address(format!("{recipient}: {err}")))?;
        Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(rendered.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.plain_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html_body),
                    ),
            )
            .map_err(|err| MailError::Template(err.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        recipient: &str,
        template: MailTemplate,
        data: &Value,
    ) -> Result<(), MailError> {
        let message = self.build_message(recipient, template, data)?;
        deliver_with_retry(self.max_attempts, self.backoff, |_| {
            let message = message.clone();
            async move {
                self.transport
                    .send(message)
                    .await
                    .map(|_| ())
                    .map_err(|err| MailError::Transport(err.to_string()))
            }
        })
        .await
    }
}
