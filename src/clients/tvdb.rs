//! External show catalog client.
//!
//! The catalog is a fallible, possibly slow collaborator: "no such show"
//! and "catalog unreachable" stay distinguishable all the way up so the
//! API can report them differently.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Show not found in catalog")]
    NotFound,

    #[error("Catalog unreachable: {0}")]
    Unreachable(String),

    #[error("Unexpected catalog response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }
}

/// A show as the catalog reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogShow {
    pub id: i32,
    pub name: String,
    pub banner: Option<String>,
}

/// An episode as the catalog reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEpisode {
    pub season: i32,
    #[serde(rename = "number")]
    pub num: i32,
    pub title: Option<String>,
    pub airdate: Option<chrono::NaiveDate>,
}

/// Contract against the external show catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Look up a show by catalog reference. A non-numeric reference is
    /// itself a `NotFound` condition, not a distinct error.
    async fn get_by_id(&self, reference: &str) -> Result<CatalogShow, CatalogError>;

    /// Free-text search. `NotFound` when the catalog reports zero results.
    async fn search(&self, text: &str) -> Result<Vec<CatalogShow>, CatalogError>;

    /// The full episode list for a show.
    async fn get_episodes(&self, reference: &str) -> Result<Vec<CatalogEpisode>, CatalogError>;

    /// Fetch the banner image for a show.
    async fn get_banner(&self, reference: &str) -> Result<Vec<u8>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct SeriesResponse {
    data: CatalogShow,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<CatalogShow>,
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    data: Vec<CatalogEpisode>,
}

#[derive(Clone)]
pub struct TvdbClient {
    client: Client,
    base_url: String,
}

impl TvdbClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("Followarr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build catalog HTTP client: {e}"))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn parse_reference(reference: &str) -> Result<i32, CatalogError> {
        reference.parse().map_err(|_| CatalogError::NotFound)
    }
}

#[async_trait]
impl Catalog for TvdbClient {
    async fn get_by_id(&self, reference: &str) -> Result<CatalogShow, CatalogError> {
        let id = Self::parse_reference(reference)?;

        let url = format!("{}/series/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !response.status().is_success() {
            return Err(CatalogError::Unreachable(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        let body: SeriesResponse = response.json().await?;
        Ok(body.data)
    }

    async fn search(&self, text: &str) -> Result<Vec<CatalogShow>, CatalogError> {
        let url = format!(
            "{}/search/series?name={}",
            self.base_url,
            urlencoding::encode(text)
        );
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !response.status().is_success() {
            return Err(CatalogError::Unreachable(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json().await?;

        if body.data.is_empty() {
            return Err(CatalogError::NotFound);
        }

        Ok(body.data)
    }

    async fn get_episodes(&self, reference: &str) -> Result<Vec<CatalogEpisode>, CatalogError> {
        let id = Self::parse_reference(reference)?;

        let url = format!("{}/series/{}/episodes", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !response.status().is_success() {
            return Err(CatalogError::Unreachable(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        let body: EpisodesResponse = response.json().await?;
        Ok(body.data)
    }

    async fn get_banner(&self, reference: &str) -> Result<Vec<u8>, CatalogError> {
        let id = Self::parse_reference(reference)?;

        let url = format!("{}/series/{}/banner", self.base_url, id);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound);
        }

        if !response.status().is_success() {
            return Err(CatalogError::Unreachable(format!(
                "catalog returned {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
