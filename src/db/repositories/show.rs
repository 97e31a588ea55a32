use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::shows;

pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<shows::Model>> {
        shows::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query show by id")
    }

    pub async fn get_by_url(&self, url: &str) -> Result<Option<shows::Model>> {
        shows::Entity::find()
            .filter(shows::Column::Url.eq(url))
            .one(&self.conn)
            .await
            .context("Failed to query show by url")
    }

    /// Insert or refresh a show as the catalog currently reports it.
    pub async fn upsert(
        &self,
        id: i32,
        name: &str,
        url: &str,
        banner: Option<&str>,
    ) -> Result<shows::Model> {
        let model = shows::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            url: Set(url.to_string()),
            banner: Set(banner.map(str::to_string)),
        };

        shows::Entity::insert(model)
            .on_conflict(
                OnConflict::column(shows::Column::Id)
                    .update_columns([
                        shows::Column::Name,
                        shows::Column::Url,
                        shows::Column::Banner,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert show")?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Show vanished after upsert: {id}"))
    }

    pub async fn list_all(&self) -> Result<Vec<shows::Model>> {
        shows::Entity::find()
            .all(&self.conn)
            .await
            .context("Failed to list shows")
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = shows::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete show")?;

        Ok(result.rows_affected > 0)
    }
}
