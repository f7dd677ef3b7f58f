use super::{LazyPage, SongLink};
use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::markup::{absolute_url, block_text, selector, text_of};
use crate::provider::{AlbumInfo, LyricsProvider, SongTarget};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://www.musixmatch.com";

/// MusixMatch. Album cards sit on a separate albums page; tracks are on each
/// album's page. Lyrics are split over several content paragraphs.
#[derive(Debug, Clone)]
pub struct MusixMatch {
    base_url: String,
}

impl Default for MusixMatch {
    fn default() -> Self {
        Self::with_base_url(BASE_URL)
    }
}

impl MusixMatch {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// One album card from the albums page.
#[derive(Debug)]
pub struct MusixAlbum {
    pub title: Option<String>,
    pub release_date: Option<String>,
    page: Option<LazyPage>,
}

#[async_trait]
impl LyricsProvider for MusixMatch {
    type AlbumMarker = MusixAlbum;
    type SongMarker = SongLink;

    fn name(&self) -> &'static str {
        "MusixMatch"
    }

    /// "Dr. Dre" → "Dr-Dre".
    fn clean_identifier(&self, text: &str) -> String {
        let dashed = text.trim().replace([' ', '.'], "-");
        let mut cleaned = String::with_capacity(dashed.len());
        for c in dashed.chars() {
            if c == '-' && cleaned.ends_with('-') {
                continue;
            }
            cleaned.push(c);
        }
        cleaned.trim_end_matches('-').to_string()
    }

    async fn artist_url(&self, _http: &HttpClient, identifier: &str) -> Option<String> {
        Some(format!("{}/artist/{identifier}", self.base_url))
    }

    fn page_has_artist(&self, page: &Html) -> bool {
        page.select(&selector("div.artist-page.main-wrapper")).next().is_some()
    }

    fn page_has_lyrics(&self, page: &Html) -> bool {
        page.select(&selector(r#"p[class^="mxm-lyrics__content"]"#)).next().is_some()
    }

    async fn list_albums(&self, http: &HttpClient, artist_page: &str) -> Result<Vec<MusixAlbum>> {
        let href = albums_link(artist_page)?;
        let url = absolute_url(&self.base_url, &href);
        let page = http.get(&url).await.ok_or(FetchError::Unavailable(url))?;
        Ok(parse_album_cards(&page.body)
            .into_iter()
            .map(|card| MusixAlbum {
                title: card.title,
                release_date: card.release_date,
                page: card.href.map(|href| LazyPage::new(absolute_url(&self.base_url, &href))),
            })
            .collect())
    }

    async fn album_info(&self, _http: &HttpClient, album: &MusixAlbum) -> Result<AlbumInfo> {
        let title = album
            .title
            .as_deref()
            .ok_or_else(|| FetchError::extraction("album info", "album card without h2 title"))?;
        Ok(AlbumInfo::new(title, album.release_date.clone()))
    }

    async fn list_songs(&self, http: &HttpClient, album: &MusixAlbum) -> Result<Vec<SongLink>> {
        let page = album
            .page
            .as_ref()
            .ok_or_else(|| FetchError::extraction("songs", "album card without a link"))?;
        Ok(parse_tracks(page.body(http).await?))
    }

    fn song_target(&self, link: &SongLink) -> Option<SongTarget> {
        (!link.href.is_empty()).then(|| SongTarget {
            title: link.text.clone(),
            url: absolute_url(&self.base_url, &link.href),
        })
    }

    fn extract_lyrics(&self, page: &Html) -> Result<String> {
        let parts: Vec<String> = page
            .select(&selector(r#"p[class^="mxm-lyrics__content"]"#))
            .map(block_text)
            .collect();
        if parts.is_empty() {
            return Err(FetchError::extraction("lyrics", "no lyrics content paragraphs"));
        }
        Ok(parts.join("\n"))
    }

    fn extract_writers(&self, page: &Html) -> Option<String> {
        page.select(&selector(r#"p[class^="mxm-lyrics__copyright"]"#))
            .next()
            .map(text_of)
            .filter(|text| !text.is_empty())
    }
}

struct AlbumCard {
    title: Option<String>,
    release_date: Option<String>,
    href: Option<String>,
}

fn albums_link(artist_page: &str) -> Result<String> {
    let document = Html::parse_document(artist_page);
    document
        .select(&selector("li#albums a"))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
        .ok_or_else(|| FetchError::extraction("albums", "no li#albums link"))
}

fn parse_album_cards(html: &str) -> Vec<AlbumCard> {
    fn first_text(card: ElementRef, css: &str) -> Option<String> {
        card.select(&selector(css)).next().map(text_of)
    }

    let document = Html::parse_document(html);
    document
        .select(&selector("div.media-card-text"))
        .map(|card| AlbumCard {
            title: first_text(card, "h2"),
            release_date: first_text(card, "h3"),
            href: card
                .select(&selector("a"))
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::to_string),
        })
        .collect()
}

/// One entry per track item, linked or not.
fn parse_tracks(album_page: &str) -> Vec<SongLink> {
    let document = Html::parse_document(album_page);
    let link = selector("a");
    document
        .select(&selector(r#"div.mxm-album__tracks li[class^="mui-collection__item"]"#))
        .map(|item| match item.select(&link).next() {
            Some(a) => SongLink {
                text: text_of(a),
                href: a.value().attr("href").unwrap_or_default().to_string(),
            },
            None => SongLink {
                text: text_of(item),
                href: String::new(),
            },
        })
        .collect()
}
