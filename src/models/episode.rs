//! Episode view model joined with its show, plus link-format rendering.

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::{episodes, shows};

#[derive(Debug, Clone, Serialize)]
pub struct Episode {
    pub show_id: i32,
    pub show_name: String,
    pub season: i32,
    pub num: i32,
    pub title: Option<String>,
    pub airdate: Option<NaiveDate>,
}

impl Episode {
    #[must_use]
    pub fn from_models(episode: episodes::Model, show: &shows::Model) -> Self {
        Self {
            show_id: show.id,
            show_name: show.name.clone(),
            season: episode.season,
            num: episode.num,
            title: episode.title,
            airdate: episode.airdate,
        }
    }

    /// Substitute the fixed placeholders into a user-supplied template.
    ///
    /// `##SEASON##` is unpadded, `##SEASON2##` and `##EPISODE##` are
    /// zero-padded to two digits (wider numbers keep all their digits).
    /// Unknown placeholders are left verbatim; a missing title renders
    /// as the empty string.
    #[must_use]
    pub fn render(&self, format: &str) -> String {
        format
            .replace("##SHOW##", &self.show_name)
            .replace("##SEASON##", &self.season.to_string())
            .replace("##SEASON2##", &format!("{:02}", self.season))
            .replace("##EPISODE##", &format!("{:02}", self.num))
            .replace("##TITLE##", self.title.as_deref().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(season: i32, num: i32, title: Option<&str>) -> Episode {
        Episode {
            show_id: 1,
            show_name: "show1".to_string(),
            season,
            num,
            title: title.map(str::to_string),
            airdate: None,
        }
    }

    #[test]
    fn renders_unpadded_season() {
        let ep = episode(5, 12, Some("test me"));
        assert_eq!("//show1 5x12", ep.render("//##SHOW## ##SEASON##x##EPISODE##"));
    }

    #[test]
    fn renders_padded_season_and_episode() {
        let ep = episode(5, 2, Some("test me"));
        assert_eq!(
            "//show1 S05E02",
            ep.render("//##SHOW## S##SEASON2##E##EPISODE##")
        );
    }

    #[test]
    fn episode_number_widens_past_two_digits() {
        let ep = episode(1, 102, Some("test me"));
        assert_eq!(
            "//show1 S01E102",
            ep.render("//##SHOW## S##SEASON2##E##EPISODE##")
        );
    }

    #[test]
    fn renders_title() {
        let ep = episode(1, 102, Some("test me"));
        assert_eq!("//show1 : test me", ep.render("//##SHOW## : ##TITLE##"));
    }

    #[test]
    fn missing_title_renders_empty() {
        let ep = episode(1, 1, None);
        assert_eq!("show1 - ", ep.render("##SHOW## - ##TITLE##"));
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let ep = episode(1, 1, Some("t"));
        assert_eq!("##BOGUS## show1", ep.render("##BOGUS## ##SHOW##"));
    }
}
