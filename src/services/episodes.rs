//! Per-user episode listings.

use chrono::{Days, NaiveDate, Utc};
use thiserror::Error;

use crate::db::Store;
use crate::entities::{episodes, users};
use crate::models::episode::Episode;

#[derive(Debug, Error)]
pub enum EpisodeError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for EpisodeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct EpisodeService {
    store: Store,
}

impl EpisodeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Episodes of the user's subscribed shows that aired on or after
    /// `as_of - days_back`, oldest first. Upcoming episodes are included;
    /// episodes without an airdate never appear.
    pub async fn relevant_episodes(
        &self,
        user: &users::Model,
        as_of: NaiveDate,
    ) -> Result<Vec<Episode>, EpisodeError> {
        let days_back = u64::try_from(user.days_back.max(0)).unwrap_or(0);
        let cutoff = as_of
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(as_of);

        Ok(self.store.relevant_episodes(&user.name, cutoff).await?)
    }

    pub async fn relevant_episodes_today(
        &self,
        user: &users::Model,
    ) -> Result<Vec<Episode>, EpisodeError> {
        self.relevant_episodes(user, Utc::now().date_naive()).await
    }

    /// The next episode of a show airing strictly after `today`, if known.
    pub async fn next_episode(
        &self,
        show_id: i32,
        today: NaiveDate,
    ) -> Result<Option<episodes::Model>, EpisodeError> {
        Ok(self.store.next_episode(show_id, today).await?)
    }
}
