pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;

/// Outbound account emails. Implementations must not block the caller for long.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, to_email: &str, to_name: &str, code: &str)
        -> Result<(), String>;

    async fn send_password_reset_code(&self, to_email: &str, to_name: &str, code: &str)
        -> Result<(), String>;
}

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    base_url: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig, base_url: &str) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            base_url: base_url.to_string(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SystemMailer {
    async fn send_verification_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), String> {
        let html = templates::render_verification_code(to_name, code, &self.base_url);
        self.send(to_email, "Confirme seu email - Intranet", &html).await
    }

    async fn send_password_reset_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
    ) -> Result<(), String> {
        let html = templates::render_password_reset_code(to_name, code);
        self.send(to_email, "Redefinição de senha - Intranet", &html)
            .await
    }
}

/// Used when no SMTP relay is configured: codes only reach the server log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_verification_code(
        &self,
        to_email: &str,
        _to_name: &str,
        code: &str,
    ) -> Result<(), String> {
        tracing::warn!("System SMTP not configured. Verification code for {to_email}: {code}");
        Ok(())
    }

    async fn send_password_reset_code(
        &self,
        to_email: &str,
        _to_name: &str,
        code: &str,
    ) -> Result<(), String> {
        tracing::warn!("System SMTP not configured. Password reset code for {to_email}: {code}");
        Ok(())
    }
}
