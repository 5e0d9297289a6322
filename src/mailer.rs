use anyhow::Context;
use axum::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()>;
}

/// SMTP mailer over implicit TLS, credentials from config.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("smtp relay")?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = format!("\"{}\" <{}>", config.sender_name, config.from_address)
            .parse()
            .context("sender mailbox")?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse().context("recipient mailbox")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .context("build message")?;

        self.transport.send(message).await.context("smtp send")?;
        Ok(())
    }
}

pub fn verification_email(fullname: &str, code: &str) -> (String, String) {
    (
        "Verify your account".into(),
        format!("<p>Hello {fullname},</p><p>Your verification code is <b>{code}</b></p>"),
    )
}

pub fn resend_email(code: &str) -> (String, String) {
    (
        "New Verification Code".into(),
        format!("<p>Your new verification code is <b>{code}</b></p>"),
    )
}

pub fn reset_email(fullname: &str, code: &str) -> (String, String) {
    (
        "Password Reset Code".into(),
        format!(
            "<p>Hello {fullname},</p><p>Your reset code is: <b>{code}</b></p><p>Expires in 15 minutes.</p>"
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_email_carries_name_and_code() {
        let (subject, body) = verification_email("Ann", "123456");
        assert_eq!(subject, "Verify your account");
        assert!(body.contains("Ann"));
        assert!(body.contains("<b>123456</b>"));
    }

    #[test]
    fn resend_email_carries_code() {
        let (_, body) = resend_email("654321");
        assert!(body.contains("<b>654321</b>"));
    }

    #[test]
    fn reset_email_mentions_expiry() {
        let (subject, body) = reset_email("Ann", "111111");
        assert_eq!(subject, "Password Reset Code");
        assert!(body.contains("15 minutes"));
    }
}
