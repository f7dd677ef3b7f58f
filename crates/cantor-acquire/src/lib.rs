pub mod anonymity;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod markup;
pub mod normalize;
pub mod output;
pub mod provider;
pub mod providers;

#[cfg(test)]
pub(crate) mod test_support;

pub use anonymity::{AnonymityController, ControlChannel, TorController};
pub use error::{FetchError, Result};
pub use fetcher::{FetchOptions, Fetcher, DEFAULT_POOL_WIDTH};
pub use http::{HttpClient, HttpConfig, Page};
pub use provider::{AlbumInfo, LyricsProvider, Marker, SongTarget};
