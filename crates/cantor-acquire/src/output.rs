use crate::normalize;
use anyhow::{Context, Result};
use cantor_model::{Album, Discography, Song};
use std::fs;
use std::path::{Path, PathBuf};

const SAVE_DIR: &str = "Cantor";

/// Root folder lyrics are saved under.
///
/// `<folder>/Cantor` when a folder is given, otherwise `~/Documents/Cantor`
/// (or `./Cantor` when no home directory can be determined).
pub fn save_root(folder: Option<&Path>) -> PathBuf {
    match folder {
        Some(folder) => folder.join(SAVE_DIR),
        None => dirs::home_dir()
            .map(|home| home.join("Documents"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SAVE_DIR),
    }
}

/// Path a song's lyrics are saved to: `<root>/<artist>/<album>/<title>.txt`.
pub fn song_path(song: &Song, root: &Path) -> PathBuf {
    root.join(normalize::normalize_name(&song.artist))
        .join(normalize::normalize_name(&song.album))
        .join(format!("{}.txt", normalize::normalize_name(&song.title)))
}

/// Write a song's lyrics as UTF-8 text. Songs without lyrics write nothing
/// and return `None`.
pub fn save_song(song: &Song, root: &Path) -> Result<Option<PathBuf>> {
    let Some(lyrics) = song.lyrics.as_deref().filter(|_| song.has_lyrics()) else {
        tracing::debug!(song = %song.title, "No lyrics to save");
        return Ok(None);
    };

    let path = song_path(song, root);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let text = normalize::collapse_blank_lines(&normalize::normalize_text(lyrics));
    fs::write(&path, &text).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), lines = text.lines().count(), "Wrote lyrics");

    Ok(Some(path))
}

/// Save every resolved song of the album. Returns the number of files written.
pub fn save_album(album: &Album, root: &Path) -> Result<usize> {
    let mut written = 0;
    for song in album.found() {
        if save_song(song, root)?.is_some() {
            written += 1;
        }
    }
    tracing::info!(album = %album.title, files = written, "Saved album");
    Ok(written)
}

pub fn save_discography(discography: &Discography, root: &Path) -> Result<usize> {
    let mut written = 0;
    for album in discography {
        written += save_album(album, root)?;
    }
    tracing::info!(
        artist = %discography.artist,
        root = %root.display(),
        files = written,
        "Saved discography"
    );
    Ok(written)
}
