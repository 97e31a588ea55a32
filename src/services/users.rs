//! Account lifecycle: registration, authentication, password recovery
//! and profile settings.

use std::sync::Arc;
use thiserror::Error;
use tokio::task;
use tracing::info;

use crate::config::{SecurityConfig, ServerConfig};
use crate::db::Store;
use crate::entities::users;
use crate::mail::{MailError, MailSender, Message};
use crate::services::credentials::{
    self, PasswordRecord, generate_feed_token, generate_password, generate_recover_key,
};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_NAME_LEN: usize = 30;

const DEFAULT_DAYS_BACK: i32 = 1;
const DEFAULT_LINK_FORMAT: &str = "##SHOW## ##SEASON##x##EPISODE##";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("This name is already taken")]
    NameTaken,

    #[error("This e-mail address is already in use")]
    MailTaken,

    #[error("No such user")]
    NoSuchUser,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Wrong recovery key")]
    WrongRecoveryKey,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Account created but the notification mail failed: {0}")]
    Mail(#[from] MailError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct ProfileUpdate {
    pub mail: Option<String>,
    pub days_back: Option<i32>,
    pub date_offset: Option<i32>,
    pub link_format: Option<String>,
    pub site_news: Option<bool>,
}

pub struct UserService {
    store: Store,
    mailer: Arc<dyn MailSender>,
    security: SecurityConfig,
    server: ServerConfig,
}

impl UserService {
    #[must_use]
    pub fn new(
        store: Store,
        mailer: Arc<dyn MailSender>,
        security: SecurityConfig,
        server: ServerConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            security,
            server,
        }
    }

    /// Create an account with a generated initial password and mail it to
    /// the user. The account exists even when the mail fails; that failure
    /// surfaces as [`UserError::Mail`] so the caller can report it.
    pub async fn register(&self, name: &str, mail: &str) -> Result<users::Model, UserError> {
        validate_name(name)?;
        validate_mail(mail)?;

        if self.store.user_name_taken(name).await? {
            return Err(UserError::NameTaken);
        }
        if self.store.user_mail_taken(mail).await? {
            return Err(UserError::MailTaken);
        }

        let password = generate_password();
        let record = self.hash_blocking(password.clone()).await?;

        let user = self
            .store
            .insert_user(users::ActiveModel {
                name: sea_orm::Set(name.to_string()),
                mail: sea_orm::Set(mail.to_string()),
                passwd: sea_orm::Set(record.as_str().to_string()),
                recover_key: sea_orm::Set(None),
                token: sea_orm::Set(generate_feed_token()),
                days_back: sea_orm::Set(DEFAULT_DAYS_BACK),
                date_offset: sea_orm::Set(0),
                link_format: sea_orm::Set(DEFAULT_LINK_FORMAT.to_string()),
                site_news: sea_orm::Set(true),
                latest_news_read: sea_orm::Set(None),
            })
            .await?;

        info!(user = %user.name, "Account created");

        let message = Message::welcome(&user.mail, &user.name, &password, &self.login_url());
        self.mailer.send(message).await?;

        Ok(user)
    }

    /// Verify credentials. On success a legacy password record is
    /// re-hashed with the current scheme, and any pending recovery key is
    /// invalidated. A failed attempt changes nothing.
    pub async fn authenticate(&self, name: &str, password: &str) -> Result<users::Model, UserError> {
        let user = self
            .store
            .get_user(name)
            .await?
            .ok_or(UserError::NoSuchUser)?;

        let record = PasswordRecord::parse(&user.passwd);
        if !self.verify_blocking(record.clone(), password.to_string()).await? {
            return Err(UserError::WrongPassword);
        }

        if record.is_legacy() {
            let upgraded = self.hash_blocking(password.to_string()).await?;
            self.store.set_user_password(name, upgraded.as_str()).await?;
            info!(user = %name, "Upgraded legacy password record");
        } else if user.recover_key.is_some() {
            self.store.clear_user_recover_key(name).await?;
        }

        self.store
            .get_user(name)
            .await?
            .ok_or(UserError::NoSuchUser)
    }

    /// Generate a single-use recovery key and mail a reset link.
    pub async fn request_recovery(&self, mail: &str) -> Result<(), UserError> {
        let user = self
            .store
            .get_user_by_mail(mail)
            .await?
            .ok_or(UserError::NoSuchUser)?;

        let key = generate_recover_key();
        self.store.set_user_recover_key(&user.name, &key).await?;

        let recover_url = format!("{}/recover/{}", self.server.base_url, key);
        let message =
            Message::password_recovery(&user.mail, &user.name, &recover_url, &self.login_url());
        self.mailer.send(message).await?;

        info!(user = %user.name, "Password recovery requested");
        Ok(())
    }

    /// Redeem a recovery key for a new password. The key is cleared on
    /// success; on any failure nothing changes.
    pub async fn reset_password(
        &self,
        mail: &str,
        key: &str,
        new_password: &str,
        verify: &str,
    ) -> Result<(), UserError> {
        let user = self
            .store
            .get_user_by_mail(mail)
            .await?
            .ok_or(UserError::NoSuchUser)?;

        let valid = user
            .recover_key
            .as_deref()
            .is_some_and(|stored| credentials::token_matches(key, stored));
        if key.is_empty() || !valid {
            return Err(UserError::WrongRecoveryKey);
        }

        if new_password != verify {
            return Err(UserError::PasswordMismatch);
        }
        validate_password(new_password)?;

        let record = self.hash_blocking(new_password.to_string()).await?;
        self.store
            .set_user_password(&user.name, record.as_str())
            .await?;

        info!(user = %user.name, "Password reset via recovery key");
        Ok(())
    }

    /// Change the password of a signed-in user.
    pub async fn change_password(
        &self,
        user: &users::Model,
        current: &str,
        new_password: &str,
        verify: &str,
    ) -> Result<(), UserError> {
        let record = PasswordRecord::parse(&user.passwd);
        if !self.verify_blocking(record, current.to_string()).await? {
            return Err(UserError::WrongPassword);
        }

        if new_password != verify {
            return Err(UserError::PasswordMismatch);
        }
        validate_password(new_password)?;

        let new_record = self.hash_blocking(new_password.to_string()).await?;
        self.store
            .set_user_password(&user.name, new_record.as_str())
            .await?;

        Ok(())
    }

    pub async fn update_profile(
        &self,
        user: &users::Model,
        update: ProfileUpdate,
    ) -> Result<users::Model, UserError> {
        if let Some(days_back) = update.days_back {
            if !(0..=7).contains(&days_back) {
                return Err(UserError::Validation {
                    field: "days_back",
                    message: "Must be between 0 and 7".to_string(),
                });
            }
        }

        if let Some(date_offset) = update.date_offset {
            if !(-1..=1).contains(&date_offset) {
                return Err(UserError::Validation {
                    field: "date_offset",
                    message: "Must be between -1 and 1".to_string(),
                });
            }
        }

        if let Some(ref link_format) = update.link_format {
            if link_format.is_empty() {
                return Err(UserError::Validation {
                    field: "link_format",
                    message: "Required".to_string(),
                });
            }
        }

        if let Some(ref mail) = update.mail {
            validate_mail(mail)?;
            if *mail != user.mail && self.store.user_mail_taken(mail).await? {
                return Err(UserError::MailTaken);
            }
        }

        Ok(self
            .store
            .update_user_profile(
                &user.name,
                update.mail.as_deref(),
                update.days_back,
                update.date_offset,
                update.link_format.as_deref(),
                update.site_news,
                None,
            )
            .await?)
    }

    /// Replace the feed token, invalidating all previously issued feed
    /// URLs for this user.
    pub async fn reset_feed_token(&self, user: &users::Model) -> Result<String, UserError> {
        let token = generate_feed_token();
        self.store.set_user_token(&user.name, &token).await?;

        info!(user = %user.name, "Feed token reset");
        Ok(token)
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.server.base_url)
    }

    async fn hash_blocking(&self, password: String) -> Result<PasswordRecord, UserError> {
        let config = self.security.clone();

        task::spawn_blocking(move || credentials::hash_password(&password, &config))
            .await
            .map_err(|e| UserError::Internal(format!("Password hashing task panicked: {e}")))?
            .map_err(UserError::from)
    }

    async fn verify_blocking(
        &self,
        record: PasswordRecord,
        password: String,
    ) -> Result<bool, UserError> {
        task::spawn_blocking(move || credentials::verify_password(&record, &password))
            .await
            .map_err(|e| UserError::Internal(format!("Password verification task panicked: {e}")))?
            .map_err(UserError::from)
    }
}

fn validate_name(name: &str) -> Result<(), UserError> {
    if name.is_empty() {
        return Err(UserError::Validation {
            field: "name",
            message: "Required".to_string(),
        });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(UserError::Validation {
            field: "name",
            message: format!("Longer than maximum length {MAX_NAME_LEN}"),
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(UserError::Validation {
            field: "name",
            message: "Only letters, digits and underscores are allowed".to_string(),
        });
    }
    Ok(())
}

fn validate_mail(mail: &str) -> Result<(), UserError> {
    if mail.is_empty() {
        return Err(UserError::Validation {
            field: "email",
            message: "Required".to_string(),
        });
    }
    let valid = mail.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
    });
    if !valid {
        return Err(UserError::Validation {
            field: "email",
            message: "Invalid email address".to_string(),
        });
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), UserError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(UserError::Validation {
            field: "password",
            message: format!("Shorter than minimum length {MIN_PASSWORD_LEN}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(validate_name("alice_02").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("with space").is_err());
        assert!(validate_name(&"x".repeat(31)).is_err());
    }

    #[test]
    fn mail_validation() {
        assert!(validate_mail("user@example.org").is_ok());
        assert!(validate_mail("").is_err());
        assert!(validate_mail("not-a-mail").is_err());
        assert!(validate_mail("user@localhost").is_err());
        assert!(validate_mail("@example.org").is_err());
    }

    #[test]
    fn password_length_floor() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }
}
