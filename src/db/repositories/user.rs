use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::users;

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, name: &str) -> Result<Option<users::Model>> {
        users::Entity::find_by_id(name)
            .one(&self.conn)
            .await
            .context("Failed to query user by name")
    }

    pub async fn get_by_mail(&self, mail: &str) -> Result<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Mail.eq(mail))
            .one(&self.conn)
            .await
            .context("Failed to query user by mail address")
    }

    pub async fn name_taken(&self, name: &str) -> Result<bool> {
        Ok(self.get(name).await?.is_some())
    }

    pub async fn mail_taken(&self, mail: &str) -> Result<bool> {
        Ok(self.get_by_mail(mail).await?.is_some())
    }

    pub async fn insert(&self, user: users::ActiveModel) -> Result<users::Model> {
        user.insert(&self.conn)
            .await
            .context("Failed to insert user")
    }

    /// Store a new password record and drop any pending recovery key.
    pub async fn set_password(&self, name: &str, passwd: &str) -> Result<()> {
        let user = self
            .require(name)
            .await?;

        let mut active: users::ActiveModel = user.into();
        active.passwd = Set(passwd.to_string());
        active.recover_key = Set(None);
        active
            .update(&self.conn)
            .await
            .context("Failed to update user password")?;

        Ok(())
    }

    /// Clear the recovery key without touching anything else. Used when a
    /// user signs in normally while a recovery is pending.
    pub async fn clear_recover_key(&self, name: &str) -> Result<()> {
        let user = self.require(name).await?;
        if user.recover_key.is_none() {
            return Ok(());
        }

        let mut active: users::ActiveModel = user.into();
        active.recover_key = Set(None);
        active
            .update(&self.conn)
            .await
            .context("Failed to clear recovery key")?;

        Ok(())
    }

    pub async fn set_recover_key(&self, name: &str, key: &str) -> Result<()> {
        let user = self.require(name).await?;

        let mut active: users::ActiveModel = user.into();
        active.recover_key = Set(Some(key.to_string()));
        active
            .update(&self.conn)
            .await
            .context("Failed to store recovery key")?;

        Ok(())
    }

    pub async fn set_token(&self, name: &str, token: &str) -> Result<()> {
        let user = self.require(name).await?;

        let mut active: users::ActiveModel = user.into();
        active.token = Set(token.to_string());
        active
            .update(&self.conn)
            .await
            .context("Failed to update feed token")?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_profile(
        &self,
        name: &str,
        mail: Option<&str>,
        days_back: Option<i32>,
        date_offset: Option<i32>,
        link_format: Option<&str>,
        site_news: Option<bool>,
        latest_news_read: Option<i32>,
    ) -> Result<users::Model> {
        let user = self.require(name).await?;

        let mut active: users::ActiveModel = user.into();
        if let Some(mail) = mail {
            active.mail = Set(mail.to_string());
        }
        if let Some(days_back) = days_back {
            active.days_back = Set(days_back);
        }
        if let Some(date_offset) = date_offset {
            active.date_offset = Set(date_offset);
        }
        if let Some(link_format) = link_format {
            active.link_format = Set(link_format.to_string());
        }
        if let Some(site_news) = site_news {
            active.site_news = Set(site_news);
        }
        if let Some(latest_news_read) = latest_news_read {
            active.latest_news_read = Set(Some(latest_news_read));
        }

        active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")
    }

    pub async fn delete(&self, name: &str) -> Result<bool> {
        let result = users::Entity::delete_by_id(name)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(result.rows_affected > 0)
    }

    async fn require(&self, name: &str) -> Result<users::Model> {
        self.get(name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found: {name}"))
    }
}
