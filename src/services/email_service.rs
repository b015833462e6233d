use crate::utils::error::ApiError;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::env;
use std::error::Error;

/// SMTP mailer, configured once at startup and injected into handlers.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        let host = env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let from = env::var("EMAIL_FROM")
            .unwrap_or_else(|_| "Finance <no-reply@finance.app>".to_string())
            .parse::<Mailbox>()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?;
        if let (Ok(username), Ok(password)) =
            (env::var("SMTP_USERNAME"), env::var("SMTP_PASSWORD"))
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    /// Emails the plaintext 6-digit code. Any SMTP failure aborts the
    /// surrounding request.
    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), ApiError> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| ApiError::Internal(format!("Invalid recipient address: {}", e)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject("Your verification code")
            .body(format!(
                "Your verification code is {}. It expires in 9 minutes.",
                code
            ))
            .map_err(|e| ApiError::Internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to send email: {}", e)))?;

        log::info!("📧 Verification code sent to {}", to);
        Ok(())
    }
}
