//! Static genre lookup table

use super::types::GenreTag;

pub const GENRES: &[(u32, &str)] = &[
    (1, "Personal Growth"),
    (2, "True Crime"),
    (3, "History"),
    (4, "Comedy"),
    (5, "Entertainment"),
    (6, "Business"),
    (7, "Fiction"),
    (8, "News"),
    (9, "Kids & Family"),
];

const UNKNOWN_GENRE: &str = "Unknown";
const PSEUDO_GENRES: &[&str] = &["all", "featured"];

pub fn genre_title(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, title)| *title)
}

/// Comma-separated display names for a list of genre ids
pub fn genre_names(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| genre_title(*id).unwrap_or(UNKNOWN_GENRE))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Display labels for a detail feed's genres, without the "All"/"Featured" pseudo-genres
pub fn genre_labels(tags: &[GenreTag]) -> String {
    let labels: Vec<&str> = tags
        .iter()
        .filter_map(|tag| match tag {
            GenreTag::Id(id) => Some(genre_title(*id).unwrap_or(UNKNOWN_GENRE)),
            GenreTag::Label(label) => {
                let trimmed = label.trim();
                let pseudo = PSEUDO_GENRES
                    .iter()
                    .any(|p| trimmed.eq_ignore_ascii_case(p));
                (!trimmed.is_empty() && !pseudo).then_some(trimmed)
            }
        })
        .collect();

    if labels.is_empty() {
        "No specific genres".to_string()
    } else {
        labels.join(", ")
    }
}
