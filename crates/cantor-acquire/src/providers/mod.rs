//! One adapter per lyrics catalog, all implementing [`LyricsProvider`](crate::LyricsProvider).
//!
//! | Site | Adapter | Artist lookup | Albums |
//! |------|---------|---------------|--------|
//! | lyrics.wikia.com | [`LyricWiki`] | direct URL | artist page |
//! | azlyrics.com | [`AzLyrics`] | search page | artist page |
//! | genius.com | [`Genius`] | direct URL | separate albums page + one page per album |
//! | lyrics007.com | [`Lyrics007`] | search page | artist page |
//! | musixmatch.com | [`MusixMatch`] | direct URL | separate albums page + one page per album |

pub mod az_lyrics;
pub mod genius;
pub mod lyric_wiki;
pub mod lyrics007;
pub mod musix_match;

pub use az_lyrics::AzLyrics;
pub use genius::Genius;
pub use lyric_wiki::LyricWiki;
pub use lyrics007::Lyrics007;
pub use musix_match::MusixMatch;

use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::provider::Marker;
use tokio::sync::OnceCell;

/// A plain `<a>` song link: visible text plus `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongLink {
    pub text: String,
    pub href: String,
}

impl Marker for SongLink {
    fn label(&self) -> &str {
        &self.text
    }
}

/// A page fetched at most once, on first use.
///
/// Sites that split album info and track lists across a separate album page
/// keep one of these in their album marker so the page is downloaded once
/// for both.
#[derive(Debug)]
pub struct LazyPage {
    url: String,
    body: OnceCell<String>,
}

impl LazyPage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: OnceCell::new(),
        }
    }

    pub(crate) async fn body(&self, http: &HttpClient) -> Result<&str> {
        let body = self
            .body
            .get_or_try_init(|| async {
                http.get(&self.url)
                    .await
                    .map(|page| page.body)
                    .ok_or_else(|| FetchError::Unavailable(self.url.clone()))
            })
            .await?;
        Ok(body.as_str())
    }
}
