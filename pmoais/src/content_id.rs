//! Classification of media content identifiers
//!
//! Identifiers are `/`-separated strings whose first segment names the
//! provider:
//!
//! | Identifier | Variant |
//! |---|---|
//! | `ais_radio[/type]` | [`MediaContentId::Radio`] |
//! | `ais_podcast[/type]` | [`MediaContentId::Podcast`] |
//! | `ais_audio_books[/a/b/url]` | [`MediaContentId::AudioBook`] |
//! | `ais_tunein[/a/b/url]` | [`MediaContentId::TuneIn`] |
//! | `ais_spotify/id` | [`MediaContentId::Spotify`] |
//! | anything else | [`MediaContentId::Other`] |
//!
//! For audiobooks and tune-in the URL is whatever follows the third `/`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const RADIO_PREFIX: &str = "ais_radio";
pub const PODCAST_PREFIX: &str = "ais_podcast";
pub const AUDIO_BOOKS_PREFIX: &str = "ais_audio_books";
pub const TUNE_IN_PREFIX: &str = "ais_tunein";
pub const SPOTIFY_PREFIX: &str = "ais_spotify";

/// A classified media content identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaContentId {
    /// Radio, with the sub-type following `ais_radio/`
    Radio(Option<String>),
    /// Podcast, with the sub-type following `ais_podcast/`
    Podcast(Option<String>),
    /// Audiobook, with the embedded URL
    AudioBook(Option<String>),
    /// Tune-in, with the embedded playlist reference URL
    TuneIn(Option<String>),
    /// Spotify identifier, prefix stripped
    Spotify(String),
    /// Unrecognized or already resolved identifier
    Other(String),
}

impl MediaContentId {
    /// Classify a raw identifier
    pub fn parse(raw: &str) -> Self {
        let (head, rest) = match raw.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (raw, None),
        };

        match head {
            RADIO_PREFIX => Self::Radio(non_empty(rest)),
            PODCAST_PREFIX => Self::Podcast(non_empty(rest)),
            AUDIO_BOOKS_PREFIX => Self::AudioBook(embedded_url(raw)),
            TUNE_IN_PREFIX => Self::TuneIn(embedded_url(raw)),
            SPOTIFY_PREFIX => match non_empty(rest) {
                Some(id) => Self::Spotify(id),
                None => Self::Other(raw.to_string()),
            },
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Provider this identifier belongs to, if any
    pub fn category(&self) -> Option<AudioCategory> {
        match self {
            Self::Radio(_) => Some(AudioCategory::Radio),
            Self::Podcast(_) => Some(AudioCategory::Podcast),
            Self::AudioBook(_) => Some(AudioCategory::AudioBooks),
            Self::TuneIn(_) => Some(AudioCategory::TuneIn),
            Self::Spotify(_) | Self::Other(_) => None,
        }
    }
}

/// Remainder after the third `/`, e.g. `ais_tunein/a/b/<url>`
pub fn embedded_url(raw: &str) -> Option<String> {
    non_empty(raw.splitn(4, '/').nth(3))
}

fn non_empty(part: Option<&str>) -> Option<String> {
    part.filter(|s| !s.is_empty()).map(str::to_string)
}

/// The four browsable providers, named by their bare sentinel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCategory {
    Radio,
    Podcast,
    AudioBooks,
    TuneIn,
}

impl AudioCategory {
    pub const ALL: [AudioCategory; 4] = [
        AudioCategory::Radio,
        AudioCategory::Podcast,
        AudioCategory::AudioBooks,
        AudioCategory::TuneIn,
    ];

    /// Sentinel identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Radio => RADIO_PREFIX,
            Self::Podcast => PODCAST_PREFIX,
            Self::AudioBooks => AUDIO_BOOKS_PREFIX,
            Self::TuneIn => TUNE_IN_PREFIX,
        }
    }

    /// Tune-in answers with OPML text, the others with JSON
    pub fn is_text(&self) -> bool {
        matches!(self, Self::TuneIn)
    }
}

impl FromStr for AudioCategory {
    type Err = Error;

    /// Exact match on the sentinel; `ais_radio/x` is not a sentinel
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::UnknownProvider(s.to_string()))
    }
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
