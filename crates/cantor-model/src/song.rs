use serde::{Deserialize, Serialize};
use std::fmt;

/// A single song as discovered on a lyrics source.
///
/// `lyrics` is `None` when the song is known but its lyrics were not
/// available; that is not an error on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub album: String,
    pub artist: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    /// Writer credits as printed by the source (e.g., "Writer(s): Luther Allison").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writers: Option<String>,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        album: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            album: album.into(),
            artist: artist.into(),
            lyrics: None,
            writers: None,
        }
    }

    pub fn with_lyrics(mut self, lyrics: impl Into<String>) -> Self {
        self.lyrics = Some(lyrics.into());
        self
    }

    pub fn with_writers(mut self, writers: Option<String>) -> Self {
        self.writers = writers;
        self
    }

    pub fn has_lyrics(&self) -> bool {
        self.lyrics.as_deref().is_some_and(|l| !l.trim().is_empty())
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Song({}, {}, {})", self.title, self.album, self.artist)
    }
}
