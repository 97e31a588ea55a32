use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{shows, subscriptions, users};

pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Subscribe a user to a show. Subscribing twice is a no-op.
    pub async fn add(&self, user_name: &str, show_id: i32) -> Result<()> {
        let model = subscriptions::ActiveModel {
            user_name: Set(user_name.to_string()),
            show_id: Set(show_id),
        };

        let result = subscriptions::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    subscriptions::Column::UserName,
                    subscriptions::Column::ShowId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(&self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e).context("Failed to add subscription"),
        }
    }

    /// Returns false when no subscription existed.
    pub async fn remove(&self, user_name: &str, show_id: i32) -> Result<bool> {
        let result = subscriptions::Entity::delete_many()
            .filter(subscriptions::Column::UserName.eq(user_name))
            .filter(subscriptions::Column::ShowId.eq(show_id))
            .exec(&self.conn)
            .await
            .context("Failed to remove subscription")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn exists(&self, user_name: &str, show_id: i32) -> Result<bool> {
        let found = subscriptions::Entity::find_by_id((user_name.to_string(), show_id))
            .one(&self.conn)
            .await
            .context("Failed to query subscription")?;

        Ok(found.is_some())
    }

    pub async fn shows_for_user(&self, user: &users::Model) -> Result<Vec<shows::Model>> {
        user.find_related(shows::Entity)
            .order_by_asc(shows::Column::Name)
            .all(&self.conn)
            .await
            .context("Failed to list subscribed shows")
    }

    pub async fn subscriber_count(&self, show_id: i32) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        subscriptions::Entity::find()
            .filter(subscriptions::Column::ShowId.eq(show_id))
            .count(&self.conn)
            .await
            .context("Failed to count subscribers")
    }
}
