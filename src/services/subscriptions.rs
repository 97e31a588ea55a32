//! Subscribing users to shows, importing show data from the catalog on
//! first contact.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::clients::tvdb::{Catalog, CatalogError};
use crate::db::{EpisodeInput, Store};
use crate::entities::{shows, users};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("No show specified")]
    ShowMissing,

    #[error("Illegal show id")]
    IllegalShowId,

    #[error("Show not found")]
    ShowNotFound,

    #[error("Not subscribed to this show")]
    NotSubscribed,

    #[error("Catalog unreachable: {0}")]
    CatalogUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SubscriptionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub struct SubscriptionService {
    store: Store,
    catalog: Arc<dyn Catalog>,
}

impl SubscriptionService {
    #[must_use]
    pub fn new(store: Store, catalog: Arc<dyn Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Subscribe a user to a show by catalog reference. The show and its
    /// episodes are imported from the catalog if not already known.
    /// Subscribing to an already-subscribed show is a no-op.
    pub async fn subscribe(
        &self,
        user: &users::Model,
        reference: &str,
    ) -> Result<shows::Model, SubscriptionError> {
        if reference.is_empty() {
            return Err(SubscriptionError::ShowMissing);
        }

        let show_id: i32 = reference
            .parse()
            .map_err(|_| SubscriptionError::IllegalShowId)?;

        let show = match self.store.get_show(show_id).await? {
            Some(show) => show,
            None => self.import_show(show_id).await?,
        };

        self.store.add_subscription(&user.name, show.id).await?;
        info!(user = %user.name, show = %show.name, "Subscribed");

        Ok(show)
    }

    /// Remove a subscription. The show and its episodes stay in the
    /// database for other subscribers.
    pub async fn unsubscribe(
        &self,
        user: &users::Model,
        reference: &str,
    ) -> Result<(), SubscriptionError> {
        if reference.is_empty() {
            return Err(SubscriptionError::ShowMissing);
        }

        let show_id: i32 = reference
            .parse()
            .map_err(|_| SubscriptionError::IllegalShowId)?;

        let removed = self.store.remove_subscription(&user.name, show_id).await?;
        if !removed {
            return Err(SubscriptionError::NotSubscribed);
        }

        info!(user = %user.name, show_id, "Unsubscribed");
        Ok(())
    }

    pub async fn subscribed_shows(
        &self,
        user: &users::Model,
    ) -> Result<Vec<shows::Model>, SubscriptionError> {
        Ok(self.store.subscribed_shows(user).await?)
    }

    async fn import_show(&self, show_id: i32) -> Result<shows::Model, SubscriptionError> {
        let catalog_show = match self.catalog.get_by_id(&show_id.to_string()).await {
            Ok(show) => show,
            Err(CatalogError::NotFound) => return Err(SubscriptionError::ShowNotFound),
            Err(e) => return Err(SubscriptionError::CatalogUnavailable(e.to_string())),
        };

        let url = show_id.to_string();
        let show = self
            .store
            .upsert_show(
                catalog_show.id,
                &catalog_show.name,
                &url,
                catalog_show.banner.as_deref(),
            )
            .await?;

        self.refresh_episodes(&show).await?;

        info!(show = %show.name, id = show.id, "Imported show from catalog");
        Ok(show)
    }

    /// Banner image bytes for a show, straight from the catalog.
    pub async fn banner(&self, reference: &str) -> Result<Vec<u8>, SubscriptionError> {
        if reference.is_empty() {
            return Err(SubscriptionError::ShowMissing);
        }

        let show_id: i32 = reference
            .parse()
            .map_err(|_| SubscriptionError::IllegalShowId)?;

        match self.catalog.get_banner(&show_id.to_string()).await {
            Ok(bytes) => Ok(bytes),
            Err(CatalogError::NotFound) => Err(SubscriptionError::ShowNotFound),
            Err(e) => Err(SubscriptionError::CatalogUnavailable(e.to_string())),
        }
    }

    /// Re-fetch episode data for a known show. Catalog trouble here is
    /// logged but not fatal; stale episodes beat no subscription.
    pub async fn refresh_episodes(&self, show: &shows::Model) -> Result<(), SubscriptionError> {
        let episodes = match self.catalog.get_episodes(&show.id.to_string()).await {
            Ok(eps) => eps,
            Err(e) => {
                tracing::warn!(show = %show.name, error = %e, "Episode refresh failed");
                return Ok(());
            }
        };

        let inputs: Vec<EpisodeInput> = episodes
            .into_iter()
            .map(|ep| EpisodeInput {
                season: ep.season,
                num: ep.num,
                title: ep.title,
                airdate: ep.airdate,
            })
            .collect();

        self.store.upsert_episodes(show.id, &inputs).await?;
        Ok(())
    }
}
