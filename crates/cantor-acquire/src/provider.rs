use crate::error::Result;
use crate::http::HttpClient;
use async_trait::async_trait;
use cantor_model::Song;
use scraper::Html;

/// Title and release date extracted for one album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumInfo {
    pub title: String,
    /// `"Unknown"` when the source does not print a date.
    pub release_date: String,
}

impl AlbumInfo {
    pub fn new(title: impl Into<String>, release_date: Option<String>) -> Self {
        Self {
            title: title.into(),
            release_date: release_date
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| cantor_model::UNKNOWN_RELEASE_DATE.to_string()),
        }
    }
}

/// An unresolved reference to a song, as found on an album listing.
pub trait Marker: Clone + Send + Sync + 'static {
    /// The link's visible text, matched against song filters.
    fn label(&self) -> &str;
}

/// Where a song link points once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongTarget {
    pub title: String,
    pub url: String,
}

/// A lyrics catalog: how to find an artist, walk their albums and songs, and
/// pull lyrics out of a song page.
///
/// Methods that may need the network take the session's `HttpClient`.
/// Expected absence is `None` or an empty list; `Err` is reserved for pages
/// that exist but are missing markup the adapter relies on.
///
/// Parsed documents (`Html`) are never held across an `.await`: async
/// methods take raw HTML and parse it in synchronous helpers.
#[async_trait]
pub trait LyricsProvider: Send + Sync + 'static {
    type AlbumMarker: Send + Sync + 'static;
    type SongMarker: Marker;

    fn name(&self) -> &'static str;

    /// Turn a human name into the form the site uses in URLs.
    fn clean_identifier(&self, text: &str) -> String;

    /// URL of the artist page, possibly found through a search page.
    /// `None` means the artist cannot be located.
    async fn artist_url(&self, http: &HttpClient, identifier: &str) -> Option<String>;

    fn page_has_artist(&self, page: &Html) -> bool;

    fn page_has_lyrics(&self, page: &Html) -> bool;

    /// Albums in page order. Some sites need a second fetch to list them.
    async fn list_albums(&self, http: &HttpClient, artist_page: &str) -> Result<Vec<Self::AlbumMarker>>;

    async fn album_info(&self, http: &HttpClient, album: &Self::AlbumMarker) -> Result<AlbumInfo>;

    /// Song links in page order.
    async fn list_songs(&self, http: &HttpClient, album: &Self::AlbumMarker) -> Result<Vec<Self::SongMarker>>;

    /// Title and absolute URL of a song link, or `None` for links the site
    /// itself marks as dead.
    fn song_target(&self, link: &Self::SongMarker) -> Option<SongTarget>;

    fn extract_lyrics(&self, page: &Html) -> Result<String>;

    fn extract_writers(&self, page: &Html) -> Option<String>;

    /// Fetch the song's page and build a `Song` from it.
    ///
    /// `Ok(None)` covers dead links, failed fetches and pages that fail the
    /// lyrics presence check.
    async fn fetch_song(
        &self,
        http: &HttpClient,
        link: &Self::SongMarker,
        artist: &str,
        album_title: &str,
    ) -> Result<Option<Song>> {
        let Some(target) = self.song_target(link) else {
            tracing::info!(song = %link.label(), "Song page does not exist");
            return Ok(None);
        };
        let Some(page) = http.get(&target.url).await else {
            return Ok(None);
        };
        self.song_from_page(&page.body, target.title, artist, album_title)
    }

    /// Presence-check and extract an already fetched song page.
    fn song_from_page(
        &self,
        html: &str,
        title: String,
        artist: &str,
        album_title: &str,
    ) -> Result<Option<Song>> {
        let document = Html::parse_document(html);
        if !self.page_has_lyrics(&document) {
            tracing::info!(song = %title, provider = self.name(), "No lyrics for song");
            return Ok(None);
        }
        let lyrics = self.extract_lyrics(&document)?;
        let writers = self.extract_writers(&document);
        Ok(Some(
            Song::new(title, album_title, artist)
                .with_lyrics(lyrics)
                .with_writers(writers),
        ))
    }

    /// Whether an artist page body is a real artist page.
    fn artist_page_present(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        self.page_has_artist(&document)
    }
}
