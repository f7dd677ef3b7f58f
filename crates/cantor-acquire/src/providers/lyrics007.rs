use super::SongLink;
use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::markup::{absolute_url, block_text, next_sibling_named, selector, text_of};
use crate::provider::{AlbumInfo, LyricsProvider, SongTarget};
use async_trait::async_trait;
use scraper::Html;

const BASE_URL: &str = "https://www.lyrics007.com";
const SEARCH_PATH: &str = "/search.php?category=artist&q=";

/// Lyrics007. Artists are found by search; the artist page lists albums as
/// `date: title` items, each followed by a list of song links.
#[derive(Debug, Clone)]
pub struct Lyrics007 {
    base_url: String,
}

impl Default for Lyrics007 {
    fn default() -> Self {
        Self::with_base_url(BASE_URL)
    }
}

impl Lyrics007 {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lyrics007Album {
    pub header: String,
    pub songs: Vec<SongLink>,
}

#[async_trait]
impl LyricsProvider for Lyrics007 {
    type AlbumMarker = Lyrics007Album;
    type SongMarker = SongLink;

    fn name(&self) -> &'static str {
        "Lyrics007"
    }

    fn clean_identifier(&self, text: &str) -> String {
        text.trim().to_string()
    }

    async fn artist_url(&self, http: &HttpClient, identifier: &str) -> Option<String> {
        let url = format!("{}{SEARCH_PATH}{}", self.base_url, search_query(identifier));
        let page = http.get(&url).await?;
        let href = parse_search_result(&page.body)?;
        Some(absolute_url(&self.base_url, &href))
    }

    fn page_has_artist(&self, page: &Html) -> bool {
        page.select(&selector("ul.song_title")).next().is_some()
    }

    fn page_has_lyrics(&self, page: &Html) -> bool {
        page.select(&selector("div.lyrics")).next().is_some()
    }

    async fn list_albums(&self, _http: &HttpClient, artist_page: &str) -> Result<Vec<Lyrics007Album>> {
        Ok(parse_albums(artist_page))
    }

    async fn album_info(&self, _http: &HttpClient, album: &Lyrics007Album) -> Result<AlbumInfo> {
        let (date, title) = album
            .header
            .split_once(": ")
            .ok_or_else(|| FetchError::extraction("album info", format!("no date in {:?}", album.header)))?;
        Ok(AlbumInfo::new(title.trim(), Some(date.trim().to_string())))
    }

    async fn list_songs(&self, _http: &HttpClient, album: &Lyrics007Album) -> Result<Vec<SongLink>> {
        Ok(album.songs.clone())
    }

    fn song_target(&self, link: &SongLink) -> Option<SongTarget> {
        (!link.href.is_empty()).then(|| SongTarget {
            title: link.text.clone(),
            url: absolute_url(&self.base_url, &link.href),
        })
    }

    fn extract_lyrics(&self, page: &Html) -> Result<String> {
        page.select(&selector("div.lyrics"))
            .next()
            .map(block_text)
            .ok_or_else(|| FetchError::extraction("lyrics", "no div.lyrics"))
    }

    fn extract_writers(&self, page: &Html) -> Option<String> {
        page.root_element()
            .text()
            .map(str::trim)
            .find(|text| {
                let lower = text.to_lowercase();
                lower.starts_with("writer:") || lower.starts_with("writers:")
            })
            .map(str::to_string)
    }
}

/// Anything but alphanumerics and `.` becomes `+`.
fn search_query(artist: &str) -> String {
    artist
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' { c } else { '+' })
        .collect()
}

fn parse_search_result(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let results = document.select(&selector("div#search_result")).next()?;
    let link = results.select(&selector("a")).next()?;
    link.value()
        .attr("href")
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}

/// Album items are the `li`s holding a `<b>` header; their tracks are the
/// next `ul`.
fn parse_albums(html: &str) -> Vec<Lyrics007Album> {
    let document = Html::parse_document(html);
    let bold = selector("b");
    let items = selector("li");
    let link = selector("a");

    document
        .select(&items)
        .filter(|li| li.select(&bold).next().is_some())
        .map(|li| {
            let songs = next_sibling_named(li, "ul")
                .map(|ul| {
                    ul.select(&items)
                        .filter_map(|item| item.select(&link).next())
                        .filter_map(|a| {
                            Some(SongLink {
                                text: text_of(a),
                                href: a.value().attr("href")?.to_string(),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Lyrics007Album {
                header: text_of(li),
                songs,
            }
        })
        .collect()
}
