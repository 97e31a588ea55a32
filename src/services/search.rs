//! Show search against the external catalog, with relevance rating.

use std::sync::Arc;
use thiserror::Error;

use crate::clients::tvdb::{Catalog, CatalogError, CatalogShow};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search term missing")]
    TermMissing,

    #[error("Catalog unreachable: {0}")]
    CatalogUnavailable(String),
}

#[derive(Debug, Clone)]
pub struct RatedResult {
    pub show: CatalogShow,
    pub rating: f64,
}

/// Relevance of a result name for a query, in descending bands:
/// exact match, whole word at either end, whole word inside, bare
/// substring, no match. Comparison is case-insensitive.
#[must_use]
pub fn rate_result(query: &str, name: &str) -> f64 {
    let query = query.to_lowercase();
    let name = name.to_lowercase();

    if name == query {
        1.0
    } else if name.starts_with(&format!("{query} ")) || name.ends_with(&format!(" {query}")) {
        0.9
    } else if name.contains(&format!(" {query} ")) {
        0.5
    } else if name.contains(&query) {
        0.4
    } else {
        0.0
    }
}

pub struct SearchService {
    catalog: Arc<dyn Catalog>,
}

impl SearchService {
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Search the catalog and order results by relevance, best first.
    /// A catalog miss is an empty result list, not an error; only an
    /// unreachable catalog surfaces as one.
    pub async fn search(&self, text: &str) -> Result<Vec<RatedResult>, SearchError> {
        if text.trim().is_empty() {
            return Err(SearchError::TermMissing);
        }

        let shows = match self.catalog.search(text).await {
            Ok(shows) => shows,
            Err(CatalogError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(SearchError::CatalogUnavailable(e.to_string())),
        };

        let mut rated: Vec<RatedResult> = shows
            .into_iter()
            .map(|show| RatedResult {
                rating: rate_result(text, &show.name),
                show,
            })
            .collect();

        // Stable sort keeps catalog order within a band.
        rated.sort_by(|a, b| b.rating.total_cmp(&a.rating));

        Ok(rated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_rates_highest() {
        assert_eq!(1.0, rate_result("seinfeld", "Seinfeld"));
        assert_eq!(1.0, rate_result("Seinfeld", "seinfeld"));
    }

    #[test]
    fn whole_word_at_edge() {
        assert_eq!(0.9, rate_result("seinfeld", "Seinfeld Reunion"));
        assert_eq!(0.9, rate_result("seinfeld", "About Seinfeld"));
    }

    #[test]
    fn whole_word_inside() {
        assert_eq!(0.5, rate_result("seinfeld", "The Seinfeld Story"));
    }

    #[test]
    fn bare_substring() {
        assert_eq!(0.4, rate_result("seinfeld", "Seinfelds"));
        assert_eq!(0.4, rate_result("einfel", "Seinfeld"));
    }

    #[test]
    fn no_match() {
        assert_eq!(0.0, rate_result("seinfeld", "Frasier"));
    }
}
