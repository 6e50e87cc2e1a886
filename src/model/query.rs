//! Filtering, sorting and pagination over the in-memory catalog
//!
//! Everything here is pure: the functions borrow the collection and return
//! references into it, in the order the view should render them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use super::types::Podcast;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GenreFilter {
    #[default]
    All,
    Genre(u32),
}

impl GenreFilter {
    pub fn matches(&self, podcast: &Podcast) -> bool {
        match self {
            GenreFilter::All => true,
            GenreFilter::Genre(id) => podcast.genres.contains(id),
        }
    }
}

impl FromStr for GenreFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(GenreFilter::All);
        }
        s.parse::<u32>()
            .map(GenreFilter::Genre)
            .map_err(|_| Error::validation(format!("unknown genre filter '{}'", s)))
    }
}

impl fmt::Display for GenreFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreFilter::All => write!(f, "all"),
            GenreFilter::Genre(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Newest,
    TitleAsc,
    TitleDesc,
    NoSort,
}

impl SortMode {
    /// Unrecognised modes fall back to input order
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "newest" => SortMode::Newest,
            "a-z" => SortMode::TitleAsc,
            "z-a" => SortMode::TitleDesc,
            _ => SortMode::NoSort,
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortMode::Newest => "newest",
            SortMode::TitleAsc => "a-z",
            SortMode::TitleDesc => "z-a",
            SortMode::NoSort => "no-sort",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub search_term: String,
    pub genre: GenreFilter,
    pub sort: SortMode,
}

impl QueryParams {
    /// Matches everything and keeps input order
    pub fn unfiltered() -> Self {
        Self {
            search_term: String::new(),
            genre: GenreFilter::All,
            sort: SortMode::NoSort,
        }
    }
}

/// Trim and case-fold; interior whitespace is kept as typed
pub fn normalize_search(term: &str) -> String {
    term.trim().to_lowercase()
}

fn matches_search(podcast: &Podcast, needle: &str) -> bool {
    needle.is_empty() || podcast.title.to_lowercase().contains(needle)
}

/// Case-insensitive title ordering with accented Latin letters sorted beside
/// their base letter. Accents only break ties between otherwise equal titles;
/// fully equal keys keep input order through the stable sort.
fn collate(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    let folded = |s: &str| s.chars().map(fold_accent).collect::<String>();
    folded(&a).cmp(&folded(&b)).then_with(|| a.cmp(&b))
}

fn fold_accent(c: char) -> char {
    match c {
        'à'..='å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' => 'd',
        'è'..='ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ì'..='ï' | 'ī' | 'į' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ò'..='ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' => 's',
        'ť' => 't',
        'ù'..='ü' | 'ū' | 'ů' | 'ű' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

fn newest_first(a: &Podcast, b: &Podcast) -> Ordering {
    match (a.updated, b.updated) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn query<'a, I>(collection: I, params: &QueryParams) -> Vec<&'a Podcast>
where
    I: IntoIterator<Item = &'a Podcast>,
{
    let needle = normalize_search(&params.search_term);

    let mut results: Vec<&Podcast> = collection
        .into_iter()
        .filter(|p| matches_search(p, &needle) && params.genre.matches(p))
        .collect();

    match params.sort {
        SortMode::Newest => results.sort_by(|a, b| newest_first(a, b)),
        SortMode::TitleAsc => results.sort_by(|a, b| collate(&a.title, &b.title)),
        SortMode::TitleDesc => results.sort_by(|a, b| collate(&b.title, &a.title)),
        SortMode::NoSort => {}
    }

    results
}

/// First `page_size * page_count` elements
pub fn paginate<T>(sequence: &[T], page_size: usize, page_count: usize) -> &[T] {
    let visible = page_size.saturating_mul(page_count).min(sequence.len());
    &sequence[..visible]
}

pub fn has_more<T>(sequence: &[T], visible_count: usize) -> bool {
    visible_count < sequence.len()
}

/// "Load more" page counter; starts at one page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    page_count: usize,
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page_count: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn visible_count(&self) -> usize {
        self.page_size.saturating_mul(self.page_count)
    }

    pub fn load_more(&mut self) {
        self.page_count += 1;
    }

    pub fn reset(&mut self) {
        self.page_count = 1;
    }

    pub fn page<'s, T>(&self, sequence: &'s [T]) -> &'s [T] {
        paginate(sequence, self.page_size, self.page_count)
    }

    pub fn has_more<T>(&self, sequence: &[T]) -> bool {
        has_more(sequence, self.page(sequence).len())
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::parse_timestamp;

    fn podcast(id: &str, title: &str, updated: &str, genres: &[u32]) -> Podcast {
        Podcast {
            id: id.to_string(),
            title: title.to_string(),
            genres: genres.to_vec(),
            updated: parse_timestamp(updated),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Podcast> {
        vec![
            podcast("1", "Zeta", "2024-01-01", &[2]),
            podcast("2", "Alpha", "2024-06-01", &[1]),
            podcast("3", "history hour", "2023-03-15T10:00:00Z", &[3, 1]),
            podcast("4", "The Daily Laugh", "2024-02-10", &[4, 5]),
            podcast("5", "Mystery Files", "", &[2, 7]),
        ]
    }

    fn ids(results: &[&Podcast]) -> Vec<String> {
        results.iter().map(|p| p.id.clone()).collect()
    }

    fn params(search: &str, genre: GenreFilter, sort: SortMode) -> QueryParams {
        QueryParams {
            search_term: search.to_string(),
            genre,
            sort,
        }
    }

    #[test]
    fn unfiltered_query_is_identity() {
        let catalog = sample();
        let results = query(&catalog, &QueryParams::unfiltered());
        assert_eq!(ids(&results), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn newest_and_alphabetical_scenario() {
        let catalog = vec![
            podcast("1", "Zeta", "2024-01-01", &[2]),
            podcast("2", "Alpha", "2024-06-01", &[1]),
        ];

        let newest = query(&catalog, &params("", GenreFilter::All, SortMode::Newest));
        assert_eq!(ids(&newest), vec!["2", "1"]);

        let az = query(&catalog, &params("", GenreFilter::All, SortMode::TitleAsc));
        assert_eq!(ids(&az), vec!["2", "1"]);
    }

    #[test]
    fn newest_puts_undated_last() {
        let catalog = sample();
        let results = query(&catalog, &params("", GenreFilter::All, SortMode::Newest));
        assert_eq!(ids(&results), vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn genre_filter_partitions_collection() {
        let catalog = sample();
        for genre in 1..=9 {
            let included = query(&catalog, &params("", GenreFilter::Genre(genre), SortMode::NoSort));
            for p in &included {
                assert!(p.genres.contains(&genre));
            }
            for p in catalog.iter().filter(|p| !included.iter().any(|i| i.id == p.id)) {
                assert!(!p.genres.contains(&genre));
            }
        }
    }

    #[test]
    fn search_is_trimmed_and_case_insensitive() {
        let catalog = sample();
        let results = query(&catalog, &params("  HISTORY ", GenreFilter::All, SortMode::NoSort));
        assert_eq!(ids(&results), vec!["3"]);

        // Interior whitespace is significant
        let results = query(&catalog, &params("daily laugh", GenreFilter::All, SortMode::NoSort));
        assert_eq!(ids(&results), vec!["4"]);
        let results = query(&catalog, &params("dailylaugh", GenreFilter::All, SortMode::NoSort));
        assert!(results.is_empty());
    }

    #[test]
    fn search_and_genre_combine_with_and() {
        let catalog = sample();
        let results = query(&catalog, &params("y", GenreFilter::Genre(2), SortMode::NoSort));
        assert_eq!(ids(&results), vec!["5"]);
    }

    #[test]
    fn z_to_a_reverses_a_to_z_without_ties() {
        let catalog = sample();
        let az = ids(&query(&catalog, &params("", GenreFilter::All, SortMode::TitleAsc)));
        let mut za = ids(&query(&catalog, &params("", GenreFilter::All, SortMode::TitleDesc)));
        za.reverse();
        assert_eq!(az, za);
        assert_eq!(az, vec!["2", "3", "5", "4", "1"]);
    }

    #[test]
    fn title_ties_keep_input_order() {
        let catalog = vec![
            podcast("a", "Same", "2024-01-01", &[]),
            podcast("b", "same", "2024-01-01", &[]),
        ];
        let az = query(&catalog, &params("", GenreFilter::All, SortMode::TitleAsc));
        let za = query(&catalog, &params("", GenreFilter::All, SortMode::TitleDesc));
        assert_eq!(ids(&az), vec!["a", "b"]);
        assert_eq!(ids(&za), vec!["a", "b"]);
    }

    #[test]
    fn accented_titles_sort_beside_their_base_letter() {
        let catalog = vec![
            podcast("z", "Zoology", "2024-01-01", &[]),
            podcast("e2", "Étoile", "2024-01-01", &[]),
            podcast("a", "apple", "2024-01-01", &[]),
            podcast("e1", "Etoile", "2024-01-01", &[]),
            podcast("f", "Fable", "2024-01-01", &[]),
        ];
        let az = query(&catalog, &params("", GenreFilter::All, SortMode::TitleAsc));
        assert_eq!(ids(&az), vec!["a", "e1", "e2", "f", "z"]);
    }

    #[test]
    fn query_is_idempotent() {
        let catalog = sample();
        let all_params = [
            params("", GenreFilter::All, SortMode::Newest),
            params("e", GenreFilter::Genre(2), SortMode::TitleAsc),
            params("the", GenreFilter::All, SortMode::TitleDesc),
            params("", GenreFilter::Genre(1), SortMode::NoSort),
        ];
        for p in &all_params {
            let once = query(&catalog, p);
            let twice = query(once.iter().copied(), p);
            assert_eq!(ids(&once), ids(&twice), "params {:?}", p);
        }
    }

    #[test]
    fn unknown_sort_mode_keeps_input_order() {
        assert_eq!(SortMode::parse("popular"), SortMode::NoSort);
        assert_eq!(SortMode::parse("no sort"), SortMode::NoSort);
        assert_eq!(SortMode::parse("Z-A"), SortMode::TitleDesc);
    }

    #[test]
    fn genre_filter_parsing() {
        assert_eq!("all".parse::<GenreFilter>().unwrap(), GenreFilter::All);
        assert_eq!(" 4 ".parse::<GenreFilter>().unwrap(), GenreFilter::Genre(4));
        assert!("comedy".parse::<GenreFilter>().is_err());
    }

    #[test]
    fn pagination_windows() {
        let items: Vec<u32> = (0..45).collect();
        assert_eq!(paginate(&items, 20, 1).len(), 20);
        assert_eq!(paginate(&items, 20, 2).len(), 40);
        assert_eq!(paginate(&items, 20, 3).len(), 45);
        assert!(has_more(&items, 40));
        assert!(!has_more(&items, 45));
        assert!(paginate::<u32>(&[], 20, 1).is_empty());
    }

    #[test]
    fn pager_counts_pages() {
        let items: Vec<u32> = (0..25).collect();
        let mut pager = Pager::new(10);
        assert_eq!(pager.page(&items).len(), 10);
        assert!(pager.has_more(&items));

        pager.load_more();
        pager.load_more();
        assert_eq!(pager.page_count(), 3);
        assert_eq!(pager.page(&items).len(), 25);
        assert!(!pager.has_more(&items));

        pager.reset();
        assert_eq!(pager.page_count(), 1);
        assert_eq!(pager.visible_count(), 10);
    }
}
