//! Text command parsing and dispatch

use std::str::FromStr;

use crate::error::Error;
use crate::model::{GenreFilter, SortMode};
use super::AppController;

/// One line typed at the prompt
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Search(String),
    Genre(GenreFilter),
    Sort(SortMode),
    More,
    List,
    Show(String),
    Season(u32),
    Favorite(String),
    Favorites,
    ClearFavorites,
    Play(usize),
    Pause,
    Resume,
    Toggle,
    Seek(f64),
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map(|(verb, rest)| (verb, rest.trim()))
            .unwrap_or((line, ""));

        let command = match verb.to_lowercase().as_str() {
            "search" | "/" => Command::Search(rest.to_string()),
            "genre" => Command::Genre(rest.parse()?),
            "sort" => Command::Sort(SortMode::parse(rest)),
            "more" | "m" => Command::More,
            "list" | "ls" => Command::List,
            "show" | "open" => Command::Show(required(rest, "show <podcast-id>")?.to_string()),
            "season" => Command::Season(number(rest, "season <number>")?),
            "fav" => Command::Favorite(required(rest, "fav <podcast-id>")?.to_string()),
            "favs" | "favorites" => Command::Favorites,
            "clear-favs" => Command::ClearFavorites,
            "play" => Command::Play(number(rest, "play <episode-number>")?),
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "toggle" | "p" => Command::Toggle,
            "seek" => Command::Seek(parse_position(rest)?),
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err(Error::validation("empty command")),
            other => return Err(Error::validation(format!("unknown command '{}'", other))),
        };
        Ok(command)
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, Error> {
    if arg.is_empty() {
        Err(Error::validation(format!("usage: {}", usage)))
    } else {
        Ok(arg)
    }
}

fn number<T: FromStr>(arg: &str, usage: &str) -> Result<T, Error> {
    required(arg, usage)?
        .parse()
        .map_err(|_| Error::validation(format!("usage: {}", usage)))
}

/// Seconds, either plain (`95`, `12.5`) or as `m:ss`
fn parse_position(arg: &str) -> Result<f64, Error> {
    let usage = || Error::validation("usage: seek <seconds | m:ss>");
    let arg = required(arg, "seek <seconds | m:ss>")?;

    match arg.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u64 = minutes.parse().map_err(|_| usage())?;
            let seconds: u64 = seconds.parse().map_err(|_| usage())?;
            if seconds >= 60 {
                return Err(usage());
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .map(|total| total as f64)
                .ok_or_else(usage)
        }
        None => arg.parse().map_err(|_| usage()),
    }
}

impl AppController {
    pub async fn handle_command(&self, command: Command) {
        tracing::debug!(command = ?command, "Handling command");
        self.model.auto_clear_old_errors().await;

        match command {
            Command::Search(term) => self.set_search_term(&term).await,
            Command::Genre(genre) => self.set_genre_filter(genre).await,
            Command::Sort(sort) => self.set_sort_mode(sort).await,
            Command::More => self.load_more().await,
            Command::Show(id) => {
                self.open_show(&id).await;
            }
            Command::Season(number) => {
                self.select_season(number).await;
            }
            Command::Favorite(id) => {
                self.toggle_favorite(&id).await;
            }
            Command::ClearFavorites => self.clear_favorites().await,
            Command::Play(position) => {
                self.play_episode(position).await;
            }
            Command::Pause => self.pause_playback().await,
            Command::Resume => self.resume_playback().await,
            Command::Toggle => self.toggle_playback().await,
            Command::Seek(seconds) => self.seek(seconds).await,
            Command::Quit => {
                tracing::info!("Quit requested");
                self.model.set_should_quit(true).await;
            }
            Command::List | Command::Favorites | Command::Status | Command::Help => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        line.parse().unwrap()
    }

    #[test]
    fn parses_browse_commands() {
        assert_eq!(parse("search  true crime "), Command::Search("true crime".into()));
        assert_eq!(parse("search"), Command::Search(String::new()));
        assert_eq!(parse("genre 3"), Command::Genre(GenreFilter::Genre(3)));
        assert_eq!(parse("GENRE all"), Command::Genre(GenreFilter::All));
        assert_eq!(parse("sort z-a"), Command::Sort(SortMode::TitleDesc));
        assert_eq!(parse("sort no sort"), Command::Sort(SortMode::NoSort));
        assert_eq!(parse("more"), Command::More);
        assert_eq!(parse("show 10716"), Command::Show("10716".into()));
        assert_eq!(parse("season 2"), Command::Season(2));
        assert_eq!(parse("fav 42"), Command::Favorite("42".into()));
        assert_eq!(parse("q"), Command::Quit);
    }

    #[test]
    fn parses_playback_commands() {
        assert_eq!(parse("play 3"), Command::Play(3));
        assert_eq!(parse("p"), Command::Toggle);
        assert_eq!(parse("seek 90"), Command::Seek(90.0));
        assert_eq!(parse("seek 1:05"), Command::Seek(65.0));
        assert_eq!(parse("seek -5"), Command::Seek(-5.0));
    }

    #[test]
    fn rejects_malformed_commands() {
        let lines = [
            "",
            "dance",
            "genre rock",
            "show",
            "season two",
            "play",
            "seek 1:75",
            "seek",
            "seek 307445734561825861:00",
        ];
        for line in lines {
            let err = line.parse::<Command>().unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{line:?} gave {err:?}");
        }
    }

    #[tokio::test]
    async fn quit_sets_flag() {
        use super::super::testing::{harness, FakeCatalog};

        let h = harness(FakeCatalog {
            podcasts: vec![],
            shows: vec![],
            unavailable: false,
        })
        .await;
        assert!(!h.controller.model().should_quit().await);
        h.controller.handle_command(Command::Quit).await;
        assert!(h.controller.model().should_quit().await);
    }
}
