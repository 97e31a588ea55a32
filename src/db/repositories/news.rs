use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::entities::site_news;

pub struct NewsRepository {
    conn: DatabaseConnection,
}

impl NewsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Publish an item. The date defaults to today when not given.
    pub async fn add(
        &self,
        title: &str,
        text: &str,
        date: Option<NaiveDate>,
    ) -> Result<site_news::Model> {
        let model = site_news::ActiveModel {
            title: Set(title.to_string()),
            text: Set(text.to_string()),
            date: Set(date.unwrap_or_else(|| Utc::now().date_naive())),
            ..Default::default()
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert news item")
    }

    pub async fn list(&self) -> Result<Vec<site_news::Model>> {
        site_news::Entity::find()
            .order_by_desc(site_news::Column::Date)
            .order_by_desc(site_news::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list news")
    }

    pub async fn latest(&self) -> Result<Option<site_news::Model>> {
        site_news::Entity::find()
            .order_by_desc(site_news::Column::Date)
            .order_by_desc(site_news::Column::Id)
            .one(&self.conn)
            .await
            .context("Failed to query latest news item")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = site_news::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete news item")?;

        Ok(result.rows_affected > 0)
    }
}
