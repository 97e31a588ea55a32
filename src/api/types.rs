use serde::Serialize;

use crate::entities::{shows, site_news, users};
use crate::models::episode::Episode;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ShowDto {
    pub id: i32,
    pub name: String,
    pub banner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_episode: Option<EpisodeDto>,
}

impl From<shows::Model> for ShowDto {
    fn from(model: shows::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            banner: model.banner,
            next_episode: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EpisodeDto {
    pub show_id: i32,
    pub show_name: String,
    pub season: i32,
    pub num: i32,
    pub title: Option<String>,
    pub airdate: Option<String>,
    pub link: String,
}

impl EpisodeDto {
    #[must_use]
    pub fn from_episode(episode: &Episode, link_format: &str) -> Self {
        Self {
            show_id: episode.show_id,
            show_name: episode.show_name.clone(),
            season: episode.season,
            num: episode.num,
            title: episode.title.clone(),
            airdate: episode.airdate.map(|d| d.to_string()),
            link: episode.render(link_format),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub id: i32,
    pub name: String,
    pub banner: Option<String>,
    pub rating: f64,
}

/// Profile data exposed to the owner. The password record never leaves
/// the service layer.
#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub name: String,
    pub mail: String,
    pub days_back: i32,
    pub date_offset: i32,
    pub link_format: String,
    pub site_news: bool,
    pub feed_token: String,
}

impl From<users::Model> for ProfileDto {
    fn from(model: users::Model) -> Self {
        Self {
            name: model.name,
            mail: model.mail,
            days_back: model.days_back,
            date_offset: model.date_offset,
            link_format: model.link_format,
            site_news: model.site_news,
            feed_token: model.token,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewsDto {
    pub id: i32,
    pub title: String,
    pub text: String,
    pub date: String,
}

impl From<site_news::Model> for NewsDto {
    fn from(model: site_news::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            text: model.text,
            date: model.date.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
