use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::markup::{absolute_url, block_text, parenthesized, selector, text_of};
use crate::provider::{AlbumInfo, LyricsProvider, Marker, SongTarget};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "http://lyrics.wikia.com";

/// Section headings on artist pages that are not albums.
const NON_ALBUM_SECTIONS: [&str; 2] = ["Additional_information", "External_links"];

/// LyricWiki, a MediaWiki site: one section per album on the artist page,
/// each followed by an ordered list of song links.
#[derive(Debug, Clone)]
pub struct LyricWiki {
    base_url: String,
}

impl Default for LyricWiki {
    fn default() -> Self {
        Self::with_base_url(BASE_URL)
    }
}

impl LyricWiki {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// An album section heading and the song links listed under it.
#[derive(Debug, Clone)]
pub struct WikiAlbum {
    pub heading: String,
    pub songs: Vec<WikiSong>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiSong {
    pub text: String,
    /// `title` attribute, "Artist:Song" or "Artist:Song (page does not exist)".
    pub title: String,
    pub href: String,
}

impl Marker for WikiSong {
    fn label(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl LyricsProvider for LyricWiki {
    type AlbumMarker = WikiAlbum;
    type SongMarker = WikiSong;

    fn name(&self) -> &'static str {
        "LyricWiki"
    }

    fn clean_identifier(&self, text: &str) -> String {
        let mut text = text.trim().to_string();
        for (from, to) in [("#", "Number_"), ("[", "("), ("]", ")"), ("{", "("), ("}", ")"), (" ", "_")] {
            text = text.replace(from, to);
        }
        text
    }

    async fn artist_url(&self, _http: &HttpClient, identifier: &str) -> Option<String> {
        if identifier.is_empty() {
            return None;
        }
        Some(format!("{}/wiki/{identifier}", self.base_url))
    }

    fn page_has_artist(&self, page: &Html) -> bool {
        page.select(&selector("div.noarticletext")).next().is_none()
    }

    fn page_has_lyrics(&self, page: &Html) -> bool {
        self.page_has_artist(page)
    }

    async fn list_albums(&self, _http: &HttpClient, artist_page: &str) -> Result<Vec<WikiAlbum>> {
        Ok(parse_albums(artist_page))
    }

    async fn album_info(&self, _http: &HttpClient, album: &WikiAlbum) -> Result<AlbumInfo> {
        Ok(album_info(&album.heading))
    }

    async fn list_songs(&self, _http: &HttpClient, album: &WikiAlbum) -> Result<Vec<WikiSong>> {
        Ok(album.songs.clone())
    }

    fn song_target(&self, link: &WikiSong) -> Option<SongTarget> {
        if link.title.contains("(page does not exist") || link.href.is_empty() {
            return None;
        }
        let title = match link.title.split_once(':') {
            Some((_, song)) => song.to_string(),
            None => link.text.clone(),
        };
        Some(SongTarget {
            title,
            url: absolute_url(&self.base_url, &link.href),
        })
    }

    fn extract_lyrics(&self, page: &Html) -> Result<String> {
        page.select(&selector("div.lyricbox"))
            .next()
            .map(block_text)
            .ok_or_else(|| FetchError::extraction("lyrics", "no div.lyricbox"))
    }

    fn extract_writers(&self, page: &Html) -> Option<String> {
        let credits = page.select(&selector("table.song-credit-box")).next()?;
        credits
            .select(&selector("p"))
            .last()
            .map(text_of)
            .filter(|w| !w.is_empty())
    }
}

fn parse_albums(html: &str) -> Vec<WikiAlbum> {
    let document = Html::parse_document(html);
    let a_sel = selector("a");

    document
        .select(&selector("span.mw-headline"))
        .filter(|span| {
            span.value()
                .id()
                .map_or(true, |id| !NON_ALBUM_SECTIONS.contains(&id))
        })
        .map(|span| {
            let songs = span
                .parent()
                .and_then(ElementRef::wrap)
                .and_then(song_list_after)
                .map(|list| {
                    // One slot per item; an unlinked item becomes a dead link.
                    list.select(&selector("li"))
                        .map(|li| match li.select(&a_sel).next() {
                            Some(a) => WikiSong {
                                text: text_of(a),
                                title: a.value().attr("title").unwrap_or_default().to_string(),
                                href: a.value().attr("href").unwrap_or_default().to_string(),
                            },
                            None => WikiSong {
                                text: text_of(li),
                                title: String::new(),
                                href: String::new(),
                            },
                        })
                        .collect()
                })
                .unwrap_or_default();
            WikiAlbum {
                heading: text_of(span),
                songs,
            }
        })
        .collect()
}

/// The `<ol>` following a section heading, unless another heading comes first.
fn song_list_after(heading: ElementRef) -> Option<ElementRef> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .take_while(|e| e.value().name() != heading.value().name())
        .find(|e| e.value().name() == "ol")
}

/// "Simplified (2004)" → title "Simplified", date "2004".
fn album_info(heading: &str) -> AlbumInfo {
    match heading.find(" (") {
        Some(i) => AlbumInfo::new(heading[..i].trim(), parenthesized(&heading[i..])),
        None => AlbumInfo::new(heading.trim(), None),
    }
}
