use super::{LazyPage, SongLink};
use crate::error::{FetchError, Result};
use crate::http::HttpClient;
use crate::markup::{absolute_url, block_text, selector, text_of};
use crate::normalize::normalize_name;
use crate::provider::{AlbumInfo, LyricsProvider, SongTarget};
use async_trait::async_trait;
use scraper::{ElementRef, Html};

const BASE_URL: &str = "https://genius.com";

/// Genius. The artist page only links to a paginated albums page, and each
/// album's date and tracks live on the album's own page.
#[derive(Debug, Clone)]
pub struct Genius {
    base_url: String,
}

impl Default for Genius {
    fn default() -> Self {
        Self::with_base_url(BASE_URL)
    }
}

impl Genius {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug)]
pub struct GeniusAlbum {
    pub title: String,
    page: LazyPage,
}

#[async_trait]
impl LyricsProvider for Genius {
    type AlbumMarker = GeniusAlbum;
    type SongMarker = SongLink;

    fn name(&self) -> &'static str {
        "Genius"
    }

    /// "luther allison" → "Luther-allison".
    fn clean_identifier(&self, text: &str) -> String {
        let lowered = normalize_name(text).to_lowercase();
        let mut chars = lowered.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    async fn artist_url(&self, _http: &HttpClient, identifier: &str) -> Option<String> {
        Some(format!("{}/artists/{identifier}", self.base_url))
    }

    fn page_has_artist(&self, page: &Html) -> bool {
        page.select(&selector("div.render_404")).next().is_none()
    }

    fn page_has_lyrics(&self, page: &Html) -> bool {
        page.select(&selector("div.song_body-lyrics")).next().is_some()
    }

    async fn list_albums(&self, http: &HttpClient, artist_page: &str) -> Result<Vec<GeniusAlbum>> {
        let albums_url = albums_page_url(artist_page)?;
        let url = absolute_url(&self.base_url, &albums_url);
        let page = http.get(&url).await.ok_or(FetchError::Unavailable(url))?;
        Ok(parse_album_links(&page.body)
            .into_iter()
            .map(|link| GeniusAlbum {
                title: link.text,
                page: LazyPage::new(absolute_url(&self.base_url, &link.href)),
            })
            .collect())
    }

    async fn album_info(&self, http: &HttpClient, album: &GeniusAlbum) -> Result<AlbumInfo> {
        let page = album.page.body(http).await?;
        Ok(AlbumInfo::new(&album.title, release_date(page)))
    }

    async fn list_songs(&self, http: &HttpClient, album: &GeniusAlbum) -> Result<Vec<SongLink>> {
        let page = album.page.body(http).await?;
        Ok(parse_tracks(page))
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
        let label = page
            .select(&selector("span.metadata_unit-label"))
            .find(|span| text_of(*span) == "Written By")?;
        label
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "span" && e.value().classes().any(|c| c == "metadata_unit-info"))
            .map(text_of)
    }
}

/// The artist page's "show all songs" button, pointed at albums instead.
fn albums_page_url(artist_page: &str) -> Result<String> {
    let document = Html::parse_document(artist_page);
    document
        .select(&selector("a.full_width_button"))
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.replace("songs?", "albums?"))
        .ok_or_else(|| FetchError::extraction("albums", "no a.full_width_button link"))
}

fn parse_album_links(html: &str) -> Vec<SongLink> {
    let document = Html::parse_document(html);
    document
        .select(&selector("a.album_link"))
        .filter_map(|a| {
            Some(SongLink {
                text: text_of(a),
                href: a.value().attr("href")?.to_string(),
            })
        })
        .collect()
}

fn release_date(album_page: &str) -> Option<String> {
    let document = Html::parse_document(album_page);
    let info = document.select(&selector("div.header_with_cover_art-primary_info")).next()?;
    info.select(&selector("div.metadata_unit"))
        .map(text_of)
        .find(|text| text.starts_with("Released"))
        .map(|text| {
            let date = text.trim_start_matches("Released").trim_start();
            date.strip_prefix("on ").unwrap_or(date).trim().to_string()
        })
}

/// Track rows; the first link of a row starts with the title, followed by
/// badges. A row without a link keeps its slot as a dead link.
fn parse_tracks(album_page: &str) -> Vec<SongLink> {
    let document = Html::parse_document(album_page);
    let link = selector("a");
    document
        .select(&selector("div.chart_row"))
        .map(|row| match row.select(&link).next() {
            Some(a) => {
                let text = a.text().collect::<String>();
                SongLink {
                    text: text.trim().lines().next().unwrap_or_default().trim().to_string(),
                    href: a.value().attr("href").unwrap_or_default().to_string(),
                }
            }
            None => SongLink {
                text: text_of(row),
                href: String::new(),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchOptions, Fetcher};
    use crate::test_support::FakeSite;

    const ARTIST_PAGE: &str = r#"
        <html><body>
        <div class="profile_header"><h1>Luther Allison</h1></div>
        <a class="full_width_button" href="/artists/songs?for_artist_page=71&amp;id=Luther-allison">Show all songs by Luther Allison</a>
        </body></html>
    "#;

    const ALBUMS_PAGE: &str = r#"
        <html><body>
        <ul class="album_list">
          <li><a class="album_link" href="/albums/Luther-allison/Bad-news-is-coming">Bad News Is Coming</a></li>
          <li><a class="album_link" href="/albums/Luther-allison/Love-me-mama">Love Me Mama</a></li>
        </ul>
        </body></html>
    "#;

    const BAD_NEWS_PAGE: &str = r#"
        <html><body>
        <div class="header_with_cover_art-primary_info">
          <h1>Bad News Is Coming</h1>
          <div class="metadata_unit">Released January 1, 1973</div>
        </div>
        <div class="chart_row chart_row--light_border">
          <a href="https://genius.com/Luther-allison-bad-love-lyrics">
            Bad Love
            Lyrics
          </a>
        </div>
        <div class="chart_row chart_row--light_border">
          <a href="/Luther-allison-raggedy-and-dirty-lyrics">Raggedy And Dirty
          Lyrics</a>
        </div>
        </body></html>
    "#;

    const LOVE_ME_MAMA_PAGE: &str = r#"
        <html><body>
        <div class="header_with_cover_art-primary_info"><h1>Love Me Mama</h1></div>
        <div class="chart_row"><a href="/Luther-allison-dust-my-broom-lyrics">Dust My Broom</a></div>
        </body></html>
    "#;

    const LYRICS_PAGE: &str = r#"
        <html><body>
        <div class="song_body-lyrics">
          <div class="lyrics"><p>Raggedy and dirty<br>That's how you want me to be</p></div>
        </div>
        <div class="metadata_unit">
          <span class="metadata_unit-label">Produced By</span>
          <span class="metadata_unit-info">Someone Else</span>
        </div>
        <div class="metadata_unit">
          <span class="metadata_unit-label">Written By</span>
          <span class="metadata_unit-info">Luther Allison</span>
        </div>
        </body></html>
    "#;

    const NOT_FOUND_PAGE: &str = r#"<html><body><div class="render_404">Page not found</div></body></html>"#;

    #[test]
    fn test_clean_identifier() {
        let genius = Genius::default();
        assert_eq!(genius.clean_identifier("Luther Allison"), "Luther-allison");
        assert_eq!(genius.clean_identifier("guns n' roses"), "Guns-n-roses");
        assert_eq!(genius.clean_identifier(""), "");
    }

    #[test]
    fn test_albums_page_url() {
        assert_eq!(
            albums_page_url(ARTIST_PAGE).unwrap(),
            "/artists/albums?for_artist_page=71&id=Luther-allison"
        );
        assert!(albums_page_url(NOT_FOUND_PAGE).is_err());
    }

    #[test]
    fn test_release_date() {
        assert_eq!(release_date(BAD_NEWS_PAGE).as_deref(), Some("January 1, 1973"));
        assert_eq!(release_date(LOVE_ME_MAMA_PAGE), None);
    }

    #[test]
    fn test_parse_tracks() {
        let tracks = parse_tracks(BAD_NEWS_PAGE);
        let titles: Vec<_> = tracks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(titles, ["Bad Love", "Raggedy And Dirty"]);
    }

    #[test]
    fn test_one_track_per_row() {
        let page = r#"
            <html><body>
            <div class="chart_row">
              <a href="/a-lyrics">A Lyrics</a>
              <a href="/a-lyrics#annotations">3 annotations</a>
            </div>
            <div class="chart_row"><span>Hidden track</span></div>
            <div class="chart_row"><a href="/b-lyrics">B Lyrics</a></div>
            </body></html>
        "#;
        let tracks = parse_tracks(page);
        let titles: Vec<_> = tracks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(titles, ["A Lyrics", "Hidden track", "B Lyrics"]);
        assert!(Genius::default().song_target(&tracks[1]).is_none());
    }

    #[test]
    fn test_extract() {
        let genius = Genius::default();
        let page = Html::parse_document(LYRICS_PAGE);
        assert!(genius.page_has_lyrics(&page));
        assert_eq!(
            genius.extract_lyrics(&page).unwrap(),
            "Raggedy and dirty\nThat's how you want me to be"
        );
        assert_eq!(genius.extract_writers(&page).as_deref(), Some("Luther Allison"));
    }

    #[tokio::test]
    async fn test_album_page_fetched_once() {
        let site = FakeSite::new()
            .page("/artists/Luther-allison", ARTIST_PAGE)
            .page("/artists/albums?for_artist_page=71&id=Luther-allison", ALBUMS_PAGE)
            .page("/albums/Luther-allison/Bad-news-is-coming", BAD_NEWS_PAGE)
            .page("/albums/Luther-allison/Love-me-mama", LOVE_ME_MAMA_PAGE)
            .page("/Luther-allison-raggedy-and-dirty-lyrics", LYRICS_PAGE)
            .serve()
            .await;
        let fetcher = Fetcher::new(Genius::with_base_url(site.base_url()), FetchOptions::default()).unwrap();

        let disco = fetcher.get_lyrics("Luther Allison", Some("bad news"), Some("raggedy")).await.unwrap();
        assert_eq!(disco.len(), 1);
        let album = &disco[0];
        assert_eq!(album.release_date, "January 1, 1973");
        assert_eq!(album.len(), 1);
        let song = album[0].as_ref().unwrap();
        assert_eq!(song.title, "Raggedy And Dirty");
        assert_eq!(song.writers.as_deref(), Some("Luther Allison"));

        // Artist page, albums page, both album pages (info) and one song;
        // the Bad News page is reused for its track list.
        assert_eq!(site.hits(), 5);
    }

    #[tokio::test]
    async fn test_unknown_artist() {
        let site = FakeSite::new()
            .page("/artists/Fake-artist", NOT_FOUND_PAGE)
            .serve()
            .await;
        let fetcher = Fetcher::new(Genius::with_base_url(site.base_url()), FetchOptions::default()).unwrap();
        assert!(fetcher.get_lyrics("Fake Artist", None, None).await.is_none());
    }
}
