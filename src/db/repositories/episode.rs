use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set,
};

use crate::entities::{episodes, shows, subscriptions};
use crate::models::episode::Episode;

/// Episode data as fetched from the catalog, before it hits the database.
#[derive(Debug, Clone)]
pub struct EpisodeInput {
    pub season: i32,
    pub num: i32,
    pub title: Option<String>,
    pub airdate: Option<NaiveDate>,
}

pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert or refresh a batch of episodes for one show. The composite
    /// key (show, season, num) makes a re-import overwrite title and
    /// airdate in place.
    pub async fn upsert_many(&self, show_id: i32, episodes_in: &[EpisodeInput]) -> Result<()> {
        if episodes_in.is_empty() {
            return Ok(());
        }

        let models = episodes_in.iter().map(|ep| episodes::ActiveModel {
            show_id: Set(show_id),
            season: Set(ep.season),
            num: Set(ep.num),
            title: Set(ep.title.clone()),
            airdate: Set(ep.airdate),
        });

        episodes::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    episodes::Column::ShowId,
                    episodes::Column::Season,
                    episodes::Column::Num,
                ])
                .update_columns([episodes::Column::Title, episodes::Column::Airdate])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert episodes")?;

        Ok(())
    }

    pub async fn get_for_show(&self, show_id: i32) -> Result<Vec<episodes::Model>> {
        episodes::Entity::find()
            .filter(episodes::Column::ShowId.eq(show_id))
            .order_by_asc(episodes::Column::Season)
            .order_by_asc(episodes::Column::Num)
            .all(&self.conn)
            .await
            .context("Failed to query episodes for show")
    }

    /// Episodes of all shows a user subscribes to, aired on or after the
    /// cutoff, joined with their show. Ordered by airdate; show, season
    /// and number break ties so the listing is stable.
    pub async fn relevant_for_user(
        &self,
        user_name: &str,
        cutoff: NaiveDate,
    ) -> Result<Vec<Episode>> {
        let rows = episodes::Entity::find()
            .find_also_related(shows::Entity)
            .join(JoinType::InnerJoin, shows::Relation::Subscriptions.def())
            .filter(subscriptions::Column::UserName.eq(user_name))
            .filter(episodes::Column::Airdate.gte(cutoff))
            .order_by_asc(episodes::Column::Airdate)
            .order_by_asc(episodes::Column::ShowId)
            .order_by_asc(episodes::Column::Season)
            .order_by_asc(episodes::Column::Num)
            .all(&self.conn)
            .await
            .context("Failed to query relevant episodes")?;

        Ok(rows
            .into_iter()
            .filter_map(|(episode, show)| show.map(|s| Episode::from_models(episode, &s)))
            .collect())
    }

    /// The earliest episode of a show airing strictly after `after`, if any.
    pub async fn next_for_show(
        &self,
        show_id: i32,
        after: NaiveDate,
    ) -> Result<Option<episodes::Model>> {
        episodes::Entity::find()
            .filter(episodes::Column::ShowId.eq(show_id))
            .filter(episodes::Column::Airdate.gt(after))
            .order_by_asc(episodes::Column::Airdate)
            .order_by_asc(episodes::Column::Season)
            .order_by_asc(episodes::Column::Num)
            .one(&self.conn)
            .await
            .context("Failed to query next episode")
    }

    pub async fn clear_for_show(&self, show_id: i32) -> Result<u64> {
        let result = episodes::Entity::delete_many()
            .filter(episodes::Column::ShowId.eq(show_id))
            .exec(&self.conn)
            .await
            .context("Failed to clear episodes for show")?;

        Ok(result.rows_affected)
    }
}
