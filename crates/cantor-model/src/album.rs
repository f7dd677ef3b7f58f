use crate::song::Song;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::slice;

/// Release date used when the source does not print one.
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

fn unknown_release_date() -> String {
    UNKNOWN_RELEASE_DATE.to_string()
}

/// An album and its songs, in the order the source lists them.
///
/// A `None` entry is a song link that could not be resolved (dead link,
/// missing page, failed fetch). It keeps its position so that counts and
/// ordering still match the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub title: String,
    pub artist: String,
    #[serde(default = "unknown_release_date")]
    pub release_date: String,
    songs: Vec<Option<Song>>,
}

impl Album {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        release_date: Option<String>,
        songs: Vec<Option<Song>>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            release_date: release_date.unwrap_or_else(unknown_release_date),
            songs,
        }
    }

    pub fn songs(&self) -> &[Option<Song>] {
        &self.songs
    }

    /// A fresh iterator over every position, including unresolved ones.
    ///
    /// Double-ended, so `album.iter().rev()` walks the songs backwards.
    pub fn iter(&self) -> slice::Iter<'_, Option<Song>> {
        self.songs.iter()
    }

    /// Only the songs that were resolved.
    pub fn found(&self) -> impl DoubleEndedIterator<Item = &Song> + '_ {
        self.songs.iter().flatten()
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

impl Index<usize> for Album {
    type Output = Option<Song>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.songs[index]
    }
}

impl<'a> IntoIterator for &'a Album {
    type Item = &'a Option<Song>;
    type IntoIter = slice::Iter<'a, Option<Song>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Album {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Album({}, {})", self.title, self.artist)
    }
}
