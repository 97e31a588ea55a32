//! Token-authenticated RSS feeds.
//!
//! Feed URLs carry the user name and a per-user token instead of a
//! session: `/api/feeds/{user}/{token}`. A request without a user name
//! is malformed (400); a missing or wrong token is unauthorized (401).

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Days;
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::entities::users;
use crate::models::episode::Episode;
use crate::services::credentials::token_matches;

#[derive(Serialize)]
struct Rss {
    #[serde(rename = "@version")]
    version: &'static str,
    channel: Channel,
}

#[derive(Serialize)]
struct Channel {
    title: String,
    link: String,
    description: String,
    #[serde(rename = "item")]
    items: Vec<Item>,
}

#[derive(Serialize)]
struct Item {
    title: String,
    link: String,
    description: String,
    guid: Guid,
    #[serde(rename = "pubDate")]
    pub_date: String,
}

#[derive(Serialize)]
struct Guid {
    #[serde(rename = "@isPermaLink")]
    is_perma_link: &'static str,
    #[serde(rename = "$text")]
    value: String,
}

/// GET /feeds
pub async fn feed_missing_user() -> ApiError {
    ApiError::validation("Missing user name")
}

/// GET /feeds/{user}
pub async fn feed_missing_token(Path(_user): Path<String>) -> ApiError {
    ApiError::unauthorized("Missing feed token")
}

/// GET /feeds/{user}/{token}
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Path((user_name, token)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    // An unknown user and a wrong token answer identically.
    let user = state
        .store
        .get_user(&user_name)
        .await?
        .filter(|u| token_matches(&token, &u.token))
        .ok_or_else(|| ApiError::unauthorized("Wrong feed token"))?;

    let episodes = state.episode_service.relevant_episodes_today(&user).await?;
    let xml = render_feed(&user, &episodes, &state.config.server.base_url)
        .map_err(|e| ApiError::internal(format!("Failed to render feed: {e}")))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        xml,
    )
        .into_response())
}

fn render_feed(
    user: &users::Model,
    episodes: &[Episode],
    base_url: &str,
) -> Result<String, quick_xml::SeError> {
    let items = episodes
        .iter()
        .filter_map(|ep| feed_item(ep, user))
        .collect();

    let rss = Rss {
        version: "2.0",
        channel: Channel {
            title: format!("Episodes for {}", user.name),
            link: base_url.to_string(),
            description: "Recently aired episodes of your subscribed shows".to_string(),
            items,
        },
    };

    let body = quick_xml::se::to_string_with_root("rss", &rss)?;
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"))
}

fn feed_item(episode: &Episode, user: &users::Model) -> Option<Item> {
    let airdate = episode.airdate?;

    // The pubDate can be nudged by a day in either direction to match
    // the reader's timezone.
    let shifted = match user.date_offset {
        1 => airdate.checked_add_days(Days::new(1))?,
        -1 => airdate.checked_sub_days(Days::new(1))?,
        _ => airdate,
    };

    let link = episode.render(&user.link_format);
    let mut title = episode.render("##SHOW## ##SEASON##x##EPISODE##");
    if let Some(ep_title) = episode.title.as_deref() {
        if !ep_title.is_empty() {
            title.push_str(": ");
            title.push_str(ep_title);
        }
    }

    Some(Item {
        title,
        link: link.clone(),
        description: episode.title.clone().unwrap_or_default(),
        guid: Guid {
            is_perma_link: "false",
            value: format!(
                "{}-{}-{}-{}",
                episode.show_id, episode.season, episode.num, airdate
            ),
        },
        pub_date: shifted.format("%a, %d %b %Y 00:00:00 +0000").to_string(),
    })
}
