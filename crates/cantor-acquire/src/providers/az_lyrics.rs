use super::SongLink;
use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::markup::{absolute_url, block_text, next_sibling_named, parenthesized, selector, text_of};
use crate::provider::{AlbumInfo, LyricsProvider, SongTarget};
use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://www.azlyrics.com";
const SEARCH_URL: &str = "https://search.azlyrics.com/search.php?q=";

/// AZLyrics. Artists are found through the search page; the artist page
/// lists every album header followed by its song links in one block.
#[derive(Debug, Clone)]
pub struct AzLyrics {
    base_url: String,
    search_url: String,
}

impl Default for AzLyrics {
    fn default() -> Self {
        Self::with_urls(BASE_URL, SEARCH_URL)
    }
}

impl AzLyrics {
    /// `search_url` is the search endpoint up to and including `q=`.
    pub fn with_urls(base_url: impl Into<String>, search_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            search_url: search_url.into(),
        }
    }
}

/// An album header (`album: "Title" (1972)`) and the links that follow it.
#[derive(Debug, Clone)]
pub struct AzAlbum {
    pub header: String,
    pub songs: Vec<SongLink>,
}

#[async_trait]
impl LyricsProvider for AzLyrics {
    type AlbumMarker = AzAlbum;
    type SongMarker = SongLink;

    fn name(&self) -> &'static str {
        "AzLyrics"
    }

    fn clean_identifier(&self, text: &str) -> String {
        text.trim().to_string()
    }

    async fn artist_url(&self, http: &HttpClient, identifier: &str) -> Option<String> {
        let query = search_query(identifier);
        if query.is_empty() {
            return None;
        }
        let page = http.get(&format!("{}{query}", self.search_url)).await?;
        let href = parse_artist_result(&page.body)?;
        Some(absolute_url(&self.base_url, &href))
    }

    fn page_has_artist(&self, page: &Html) -> bool {
        page.select(&selector("div#listAlbum")).next().is_some()
    }

    fn page_has_lyrics(&self, page: &Html) -> bool {
        page.select(&selector("div.lyricsh")).next().is_some()
    }

    async fn list_albums(&self, _http: &HttpClient, artist_page: &str) -> Result<Vec<AzAlbum>> {
        parse_albums(artist_page)
    }

    async fn album_info(&self, _http: &HttpClient, album: &AzAlbum) -> Result<AlbumInfo> {
        album_info(&album.header)
    }

    async fn list_songs(&self, _http: &HttpClient, album: &AzAlbum) -> Result<Vec<SongLink>> {
        Ok(album.songs.clone())
    }

    fn song_target(&self, link: &SongLink) -> Option<SongTarget> {
        (!link.href.is_empty()).then(|| SongTarget {
            title: link.text.clone(),
            url: absolute_url(&self.base_url, &link.href),
        })
    }

    fn extract_lyrics(&self, page: &Html) -> Result<String> {
        // The lyrics div is the only one carrying neither class nor id.
        page.select(&selector("div:not([class]):not([id])"))
            .next()
            .map(block_text)
            .ok_or_else(|| FetchError::extraction("lyrics", "no unmarked lyrics div"))
    }

    fn extract_writers(&self, page: &Html) -> Option<String> {
        page.select(&selector("div.smt"))
            .map(text_of)
            .find(|text| text.starts_with("Writer"))
    }
}

/// Search terms as the site expects them: a leading "The" dropped, spaces as `+`.
fn search_query(artist: &str) -> String {
    let artist = artist.trim();
    let artist = match artist.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("the ") => &artist[4..],
        _ => artist,
    };
    artist.split_whitespace().collect::<Vec<_>>().join("+")
}

/// First link of the "Artist results" table on a search page.
fn parse_artist_result(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let heading = document
        .select(&selector("div.panel-heading"))
        .find(|h| h.select(&selector("b")).any(|b| text_of(b) == "Artist results:"))?;
    let table = next_sibling_named(heading, "table")?;
    let link = table.select(&selector("a")).next()?;
    link.value().attr("href").map(str::to_string)
}

fn parse_albums(html: &str) -> Result<Vec<AzAlbum>> {
    let document = Html::parse_document(html);
    let list = document
        .select(&selector("div#listAlbum"))
        .next()
        .ok_or_else(|| FetchError::extraction("albums", "no div#listAlbum"))?;

    let mut albums: Vec<AzAlbum> = Vec::new();
    for element in list.children().filter_map(ElementRef::wrap) {
        let tag = element.value().name();
        if tag == "div" && element.value().classes().any(|c| c == "album") {
            albums.push(AzAlbum {
                header: text_of(element),
                songs: Vec::new(),
            });
        } else if tag == "a" {
            let (Some(album), Some(href)) = (albums.last_mut(), element.value().attr("href")) else {
                continue;
            };
            album.songs.push(SongLink {
                text: text_of(element),
                href: href.to_string(),
            });
        }
    }
    Ok(albums)
}

fn album_info(header: &str) -> Result<AlbumInfo> {
    let quoted = Regex::new(r#""([^"]*)""#).expect("valid regex");
    match quoted.captures(header) {
        Some(c) => Ok(AlbumInfo::new(&c[1], parenthesized(header))),
        // "other songs:" closes the list without a quoted title
        None if !header.trim().is_empty() => Ok(AlbumInfo::new(
            header.trim().trim_end_matches(':'),
            None,
        )),
        None => Err(FetchError::extraction("album info", "empty album header")),
    }
}
