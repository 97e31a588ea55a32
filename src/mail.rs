//! Outbound mail boundary.
//!
//! Actual delivery is a collaborator behind `MailSender`; the service
//! only builds messages and treats a failed send as a distinct error so
//! callers can decide on compensating action.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Failed to send mail: {0}")]
    Send(String),
}

pub struct Message {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    /// New-account notification carrying the generated initial password.
    #[must_use]
    pub fn welcome(recipient: &str, user_name: &str, password: &str, login_url: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: "New user registration".to_string(),
            body: format!(
                "Welcome to followarr, {user_name}!\n\n\
                 Your account has been created, your initial password is \
                 {password}\n\n\
                 Sign in at {login_url} and change it at your convenience.\n"
            ),
        }
    }

    /// Password-recovery notification with the recovery link and a login
    /// link for users who remember their password after all.
    #[must_use]
    pub fn password_recovery(
        recipient: &str,
        user_name: &str,
        recover_url: &str,
        login_url: &str,
    ) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: "Followarr password recovery".to_string(),
            body: format!(
                "Hello {user_name},\n\n\
                 To reset your password, visit {recover_url}\n\n\
                 The key can be used once. If you remember your password \
                 just sign in as usual at {login_url} and the key becomes \
                 invalid.\n"
            ),
        }
    }
}

#[async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

/// Default sender used when no delivery backend is wired up; logs the
/// message instead of sending it.
pub struct LogMailer;

#[async_trait]
impl MailSender for LogMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        info!(
            recipient = %message.recipient,
            subject = %message.subject,
            "Outbound mail (log-only sender)"
        );
        Ok(())
    }
}
