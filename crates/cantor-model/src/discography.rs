use crate::album::Album;
use crate::song::Song;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use std::slice;

/// Every album downloaded for one artist, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discography {
    pub artist: String,
    albums: Vec<Album>,
}

impl Discography {
    pub fn new(artist: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            artist: artist.into(),
            albums,
        }
    }

    pub fn iter(&self) -> slice::Iter<'_, Album> {
        self.albums.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Album> {
        self.albums.get(index)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Every resolved song across all albums.
    pub fn songs(&self) -> impl Iterator<Item = &Song> + '_ {
        self.albums.iter().flat_map(|album| album.found())
    }
}

impl Index<usize> for Discography {
    type Output = Album;

    fn index(&self, index: usize) -> &Self::Output {
        &self.albums[index]
    }
}

impl<'a> IntoIterator for &'a Discography {
    type Item = &'a Album;
    type IntoIter = slice::Iter<'a, Album>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Discography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Discography({})", self.artist)
    }
}
