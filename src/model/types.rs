//! Core type definitions for the catalog feed

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::genres;

pub const MISSING_EPISODE_TITLE: &str = "Episode Title Not Available";
pub const MISSING_EPISODE_DESCRIPTION: &str = "No description available for this episode.";

/// A show as listed by the catalog preview endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Podcast {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    pub image: String,
    pub seasons: u32,
    pub genres: Vec<u32>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

impl Podcast {
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    pub fn genre_names(&self) -> String {
        genres::genre_names(&self.genres)
    }
}

/// A genre entry on the detail feed: either a table id or a free-text label
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenreTag {
    Id(u32),
    Label(String),
}

/// Full show detail with seasons and episodes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowDetail {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: String,
    pub genres: Vec<GenreTag>,
    #[serde(deserialize_with = "de_timestamp")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de_unique_seasons")]
    pub seasons: Vec<Season>,
}

impl ShowDetail {
    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }

    pub fn season(&self, number: u32) -> Option<&Season> {
        self.seasons.iter().find(|s| s.season == number)
    }

    pub fn first_season_number(&self) -> Option<u32> {
        self.seasons.first().map(|s| s.season)
    }

    pub fn genre_labels(&self) -> String {
        genres::genre_labels(&self.genres)
    }

    /// Preview-shaped summary, used when favoriting from the detail view
    pub fn to_podcast(&self) -> Podcast {
        Podcast {
            id: self.id.clone(),
            title: self.title.clone(),
            image: self.image.clone(),
            seasons: self.seasons.len() as u32,
            genres: self
                .genres
                .iter()
                .filter_map(|tag| match tag {
                    GenreTag::Id(id) => Some(*id),
                    GenreTag::Label(_) => None,
                })
                .collect(),
            updated: self.updated,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    pub season: u32,
    pub title: String,
    pub episodes: Vec<Episode>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub episode: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub file: Option<String>,
}

impl Episode {
    pub fn display_number(&self) -> String {
        self.episode
            .map(|n| n.to_string())
            .unwrap_or_else(|| "?".to_string())
    }

    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or(MISSING_EPISODE_TITLE)
    }

    pub fn display_description(&self) -> &str {
        non_blank(self.description.as_deref()).unwrap_or(MISSING_EPISODE_DESCRIPTION)
    }

    /// The audio URL, if the episode carries a non-blank one
    pub fn audio_file(&self) -> Option<&str> {
        non_blank(self.file.as_deref())
    }

    pub fn is_playable(&self) -> bool {
        self.audio_file().is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
    Null,
}

/// Ids arrive as strings from the live API but as numbers in older fixtures
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
        RawId::Null => String::new(),
    })
}

fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Keep the first occurrence of each season number, preserving order
fn de_unique_seasons<'de, D>(deserializer: D) -> Result<Vec<Season>, D::Error>
where
    D: Deserializer<'de>,
{
    let seasons: Vec<Season> = Vec::deserialize(deserializer)?;
    Ok(unique_seasons(seasons))
}

pub fn unique_seasons(seasons: Vec<Season>) -> Vec<Season> {
    let mut seen = HashSet::new();
    seasons
        .into_iter()
        .filter(|s| seen.insert(s.season))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn podcast_accepts_numeric_ids_and_bare_dates() {
        let podcast: Podcast = serde_json::from_value(json!({
            "id": 1,
            "title": "Zeta",
            "updated": "2024-01-01",
            "genres": [2]
        }))
        .unwrap();

        assert_eq!(podcast.id, "1");
        assert_eq!(podcast.seasons, 0);
        assert_eq!(
            podcast.updated.map(|d| d.to_rfc3339()),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn podcast_tolerates_bad_timestamp() {
        let podcast: Podcast = serde_json::from_value(json!({
            "id": "10716",
            "title": "Something",
            "updated": "not a date"
        }))
        .unwrap();
        assert!(podcast.updated.is_none());
        assert!(podcast.has_id());
    }

    #[test]
    fn detail_keeps_first_occurrence_of_each_season() {
        let detail: ShowDetail = serde_json::from_value(json!({
            "id": "42",
            "title": "Show",
            "genres": ["All", "Featured", "History"],
            "seasons": [
                {"season": 1, "title": "First", "episodes": [{"episode": 1}]},
                {"season": 2, "title": "Second", "episodes": []},
                {"season": 1, "title": "Duplicate", "episodes": [{"episode": 9}, {"episode": 10}]},
                {"season": 3, "title": "Third", "episodes": [{"episode": 1}, {"episode": 2}]}
            ]
        }))
        .unwrap();

        let numbers: Vec<u32> = detail.seasons.iter().map(|s| s.season).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(detail.season(1).map(|s| s.title.as_str()), Some("First"));
        assert_eq!(detail.season_count(), 3);
        assert_eq!(detail.episode_count(), 3);
        assert_eq!(detail.genre_labels(), "History");
    }

    #[test]
    fn episode_placeholders() {
        let episode = Episode {
            episode: None,
            title: Some("   ".into()),
            description: None,
            file: Some("".into()),
        };
        assert_eq!(episode.display_number(), "?");
        assert_eq!(episode.display_title(), MISSING_EPISODE_TITLE);
        assert_eq!(episode.display_description(), MISSING_EPISODE_DESCRIPTION);
        assert!(!episode.is_playable());

        let episode = Episode {
            episode: Some(3),
            title: Some("Pilot".into()),
            description: Some("Where it starts".into()),
            file: Some("https://cdn.example.com/ep3.mp3".into()),
        };
        assert_eq!(episode.display_number(), "3");
        assert_eq!(episode.display_title(), "Pilot");
        assert_eq!(episode.audio_file(), Some("https://cdn.example.com/ep3.mp3"));
    }
}
