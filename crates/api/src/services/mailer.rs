//! Email delivery for verification and password-reset codes.
//!
//! SMTP via lettre when configured; without SMTP settings the mailer logs
//! the code instead of sending, which is what development and tests want.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::Mailbox,
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use tricity_core::Email;

/// SMTP settings.
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub username: String,
    pub password: SecretString,
    /// From header, e.g. `Tricity Commerce <no-reply@tricity-commerce.in>`.
    pub from: String,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from", &self.from)
            .finish()
    }
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailerError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

enum Transport {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    /// No SMTP configured; log the code and report success.
    Log,
}

/// Outbound mailer for one-time codes.
pub struct Mailer {
    transport: Transport,
}

impl Mailer {
    /// Build a mailer from optional SMTP settings.
    ///
    /// # Errors
    ///
    /// Returns `MailerError::InvalidAddress` if the configured from address
    /// doesn't parse, and `MailerError::Smtp` if the relay is unusable.
    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, MailerError> {
        let Some(config) = config else {
            return Ok(Self {
                transport: Transport::Log,
            });
        };

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| MailerError::InvalidAddress(config.from.clone()))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_owned(),
            ))
            .build();

        Ok(Self {
            transport: Transport::Smtp { transport, from },
        })
    }

    /// Send a registration verification code.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the message cannot be built or delivered.
    pub async fn send_verification_code(&self, to: &Email, code: &str) -> Result<(), MailerError> {
        let subject = format!("Your Verification Code is {code} - Tricity Commerce");
        let body = format!(
            "Welcome to Tricity Commerce!\n\n\
             Use the verification code below to complete your registration:\n\n\
             {code}\n\n\
             This code will expire in 10 minutes. If you didn't request this \
             code, please ignore this email.\n"
        );

        self.send(to, &subject, &body).await
    }

    /// Send a password-reset code.
    ///
    /// # Errors
    ///
    /// Returns `MailerError` if the message cannot be built or delivered.
    pub async fn send_password_reset_code(
        &self,
        to: &Email,
        code: &str,
    ) -> Result<(), MailerError> {
        let subject = format!("Your Password Reset Code is {code} - Tricity Commerce");
        let body = format!(
            "You requested to reset your password. Use the code below to proceed:\n\n\
             {code}\n\n\
             This code will expire in 10 minutes. If you didn't request this \
             password reset, please ignore this email.\n"
        );

        self.send(to, &subject, &body).await
    }

    async fn send(&self, to: &Email, subject: &str, body: &str) -> Result<(), MailerError> {
        match &self.transport {
            Transport::Smtp { transport, from } => {
                let to: Mailbox = to
                    .as_str()
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(to.as_str().to_owned()))?;

                let message = Message::builder()
                    .from(from.clone())
                    .to(to)
                    .subject(subject)
                    .body(body.to_owned())?;

                transport.send(message).await?;
                Ok(())
            }
            Transport::Log => {
                tracing::info!(to = %to, subject, "SMTP not configured; logging email instead");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = Mailer::from_config(None).expect("log mailer");
        let to = Email::parse("user@x.com").expect("valid email");
        assert!(mailer.send_verification_code(&to, "123456").await.is_ok());
    }

    #[test]
    fn bad_from_address_is_rejected() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_owned(),
            username: "mailer".to_owned(),
            password: SecretString::from("p".to_owned()),
            from: "not an address".to_owned(),
        };
        assert!(matches!(
            Mailer::from_config(Some(&config)),
            Err(MailerError::InvalidAddress(_))
        ));
    }
}
