use crate::anonymity::AnonymityController;
use crate::error::Result;
use crate::http::{HttpClient, HttpConfig};
use crate::provider::{LyricsProvider, Marker};
use cantor_model::{Album, Discography, Song};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrent song fetches per album.
pub const DEFAULT_POOL_WIDTH: usize = 25;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub pool_width: usize,
    pub http: HttpConfig,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            pool_width: DEFAULT_POOL_WIDTH,
            http: HttpConfig::default(),
        }
    }
}

/// Walks artist → albums → songs on one provider and builds a `Discography`.
///
/// Songs of an album are fetched through a bounded pool and put back in link
/// order before the album is built; one album drains completely before the
/// next starts. When the anonymity controller can rotate circuits, each album
/// gets a fresh circuit and a freshly built client, and its songs are fetched
/// one at a time so no request straddles a rotation.
pub struct Fetcher<P: LyricsProvider> {
    provider: Arc<P>,
    http: HttpClient,
    anonymity: Option<Arc<dyn AnonymityController>>,
    options: FetchOptions,
}

impl<P: LyricsProvider> Fetcher<P> {
    /// A fetcher talking to the source directly.
    pub fn new(provider: P, options: FetchOptions) -> Result<Self> {
        let http = HttpClient::new(&options.http)?;
        let fetcher = Self {
            provider: Arc::new(provider),
            http,
            anonymity: None,
            options,
        };
        fetcher.report_mode();
        Ok(fetcher)
    }

    /// A fetcher whose traffic goes through the controller's proxy.
    pub fn with_anonymity(
        provider: P,
        controller: Arc<dyn AnonymityController>,
        options: FetchOptions,
    ) -> Result<Self> {
        let http = controller.proxied_client(&options.http)?;
        let fetcher = Self {
            provider: Arc::new(provider),
            http,
            anonymity: Some(controller),
            options,
        };
        fetcher.report_mode();
        Ok(fetcher)
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn report_mode(&self) {
        match &self.anonymity {
            None => tracing::info!(
                provider = self.provider.name(),
                "Anonymous requests disabled; the connection is not anonymous"
            ),
            Some(c) if !c.rotates_circuits() => tracing::info!(
                provider = self.provider.name(),
                "Anonymous requests enabled; circuits change on the network's schedule"
            ),
            Some(_) => tracing::info!(
                provider = self.provider.name(),
                "Anonymous requests enabled; a new circuit per album, songs fetched sequentially"
            ),
        }
    }

    fn rotating_controller(&self) -> Option<&Arc<dyn AnonymityController>> {
        self.anonymity.as_ref().filter(|c| c.rotates_circuits())
    }

    /// Download lyrics for `artist`, optionally narrowed to albums and songs
    /// whose titles contain `album` / `song` (case-insensitive).
    ///
    /// Returns `None` only when the artist is not found on the source. Every
    /// other failure is logged and leaves a gap: a skipped album or a `None`
    /// song in place.
    pub async fn get_lyrics(
        &self,
        artist: &str,
        album: Option<&str>,
        song: Option<&str>,
    ) -> Option<Discography> {
        let provider = self.provider.as_ref();
        let Some(artist_page) = self.artist_page(artist).await else {
            tracing::info!(artist = %artist, provider = provider.name(), "Artist not found");
            return None;
        };

        let markers = match provider.list_albums(&self.http, &artist_page).await {
            Ok(markers) => markers,
            Err(e) => {
                tracing::error!(artist = %artist, error = %e, "Could not list albums");
                Vec::new()
            }
        };
        tracing::debug!(artist = %artist, albums = markers.len(), "Found albums");

        let album_filter = album.map(str::to_lowercase);
        let song_filter = song.map(str::to_lowercase);
        let mut http = self.http.clone();
        let mut albums = Vec::new();

        for marker in &markers {
            let info = match provider.album_info(&http, marker).await {
                Ok(info) => info,
                Err(e) => {
                    tracing::error!(artist = %artist, error = %e, "Skipping album");
                    continue;
                }
            };
            if let Some(filter) = &album_filter {
                if !info.title.to_lowercase().contains(filter) {
                    tracing::debug!(album = %info.title, "Album filtered out");
                    continue;
                }
            }

            let mut links = match provider.list_songs(&http, marker).await {
                Ok(links) => links,
                Err(e) => {
                    tracing::error!(album = %info.title, error = %e, "Skipping album");
                    continue;
                }
            };
            if let Some(filter) = &song_filter {
                links.retain(|link| link.label().to_lowercase().contains(filter));
            }

            tracing::info!(album = %info.title, songs = links.len(), "Downloading album");
            let songs = match self.rotating_controller() {
                Some(controller) => {
                    http = self.renew_circuit(controller.as_ref(), http).await;
                    self.fetch_sequential(&http, &links, artist, &info.title).await
                }
                None => self.fetch_pooled(&http, links, artist, &info.title).await,
            };
            let found = songs.iter().flatten().count();
            tracing::info!(album = %info.title, songs = songs.len(), found, "Downloaded album");

            albums.push(Album::new(info.title, artist, Some(info.release_date), songs));
        }

        Some(Discography::new(artist, albums))
    }

    /// Raw HTML of the artist page, if the artist exists on the source.
    async fn artist_page(&self, artist: &str) -> Option<String> {
        let provider = self.provider.as_ref();
        let identifier = provider.clean_identifier(artist);
        let url = provider.artist_url(&self.http, &identifier).await?;
        tracing::info!(url = %url, provider = provider.name(), "Fetching artist page");

        let page = self.http.get(&url).await?;
        provider.artist_page_present(&page.body).then_some(page.body)
    }

    /// Rotate the circuit and build the client for the next album. Keeps
    /// `previous` when the network declines or the new client cannot be built.
    async fn renew_circuit(
        &self,
        controller: &dyn AnonymityController,
        previous: HttpClient,
    ) -> HttpClient {
        if !controller.rotate_circuit().await {
            return previous;
        }
        match controller.proxied_client(&self.options.http) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(error = %e, "Could not rebuild proxied client; keeping the previous one");
                previous
            }
        }
    }

    async fn fetch_sequential(
        &self,
        http: &HttpClient,
        links: &[P::SongMarker],
        artist: &str,
        album: &str,
    ) -> Vec<Option<Song>> {
        let mut songs = Vec::with_capacity(links.len());
        for link in links {
            songs.push(resolve_song(self.provider.as_ref(), http, link, artist, album).await);
        }
        songs
    }

    async fn fetch_pooled(
        &self,
        http: &HttpClient,
        links: Vec<P::SongMarker>,
        artist: &str,
        album: &str,
    ) -> Vec<Option<Song>> {
        let permits = Arc::new(Semaphore::new(self.options.pool_width.max(1)));

        let handles: Vec<_> = links
            .into_iter()
            .map(|link| {
                let provider = Arc::clone(&self.provider);
                let permits = Arc::clone(&permits);
                let http = http.clone();
                let artist = artist.to_string();
                let album = album.to_string();
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await.ok()?;
                    resolve_song(provider.as_ref(), &http, &link, &artist, &album).await
                })
            })
            .collect();

        // Awaiting in spawn order restores link order whatever the completion order.
        let mut songs = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(song) => songs.push(song),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    tracing::warn!(album = %album, error = %e, "Song worker cancelled");
                    songs.push(None);
                }
            }
        }
        songs
    }
}

async fn resolve_song<P: LyricsProvider>(
    provider: &P,
    http: &HttpClient,
    link: &P::SongMarker,
    artist: &str,
    album: &str,
) -> Option<Song> {
    match provider.fetch_song(http, link, artist, album).await {
        Ok(song) => song,
        Err(e) => {
            tracing::error!(song = %link.label(), album = %album, error = %e, "Skipping song");
            None
        }
    }
}
