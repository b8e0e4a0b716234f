//! Cover art lookup and the `cover://` reference format
//!
//! A disc's cover is a sibling image sharing its base name, e.g. `Game.cue`
//! next to `Game.jpg`. Covers travel through the catalog as a [`CoverRef`]
//! and are only turned into a URI at the UI boundary.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use thiserror::Error;

use super::formats::CoverFormat;

/// URI scheme used for cover references
pub const COVER_SCHEME: &str = "cover://";

/// Errors that can occur when serving a cover reference
#[derive(Error, Debug)]
pub enum CoverError {
    #[error("Not a cover URI: {0}")]
    InvalidUri(String),

    #[error("Cover path is not valid UTF-8: {0}")]
    Decode(#[from] std::string::FromUtf8Error),

    #[error("Unsupported cover format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A resolved cover image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverRef {
    /// Path of the cover file
    pub path: PathBuf,
    /// Cache token, changes when the file is replaced
    pub token: u64,
}

impl CoverRef {
    pub fn new(path: PathBuf, token: u64) -> Self {
        Self { path, token }
    }

    /// Serialize as `cover://<percent-encoded path>?t=<token>`
    pub fn to_uri(&self) -> String {
        let path = self.path.to_string_lossy();
        format!("{}{}?t={}", COVER_SCHEME, urlencoding::encode(&path), self.token)
    }

    /// Parse a URI produced by [`CoverRef::to_uri`]
    ///
    /// A missing or malformed token parses as 0.
    pub fn parse_uri(uri: &str) -> Result<Self, CoverError> {
        let raw = uri
            .strip_prefix(COVER_SCHEME)
            .ok_or_else(|| CoverError::InvalidUri(uri.to_string()))?;

        let (encoded, query) = match raw.split_once('?') {
            Some((encoded, query)) => (encoded, Some(query)),
            None => (raw, None),
        };
        if encoded.is_empty() {
            return Err(CoverError::InvalidUri(uri.to_string()));
        }

        let path = urlencoding::decode(encoded)?.into_owned();
        let token = query
            .into_iter()
            .flat_map(|q| q.split('&'))
            .find_map(|pair| pair.strip_prefix("t="))
            .and_then(|t| t.parse().ok())
            .unwrap_or(0);

        Ok(Self::new(PathBuf::from(path), token))
    }

    /// Image format of the cover, from its extension
    pub fn format(&self) -> Option<CoverFormat> {
        CoverFormat::from_path(&self.path)
    }
}

/// Find the cover for a disc file
///
/// Probes `dir/<base_name>` and then `dir/<normalized_base_name>`, each with
/// every cover extension in [`CoverFormat::PROBE_ORDER`]. The first regular
/// file wins. Anything that cannot be stat'ed counts as absent.
pub fn resolve_cover(
    dir: &Path,
    base_name: impl AsRef<OsStr>,
    normalized_base_name: impl AsRef<OsStr>,
) -> Option<CoverRef> {
    for base in [base_name.as_ref(), normalized_base_name.as_ref()] {
        for format in CoverFormat::PROBE_ORDER {
            let mut file_name = base.to_os_string();
            file_name.push(".");
            file_name.push(format.extension());
            let candidate = dir.join(file_name);
            match fs::metadata(&candidate) {
                Ok(meta) if meta.is_file() => {
                    log::debug!("Cover found: {}", candidate.display());
                    return Some(CoverRef::new(candidate, cache_token(&meta)));
                }
                _ => {}
            }
        }
    }
    None
}

/// Modification time in milliseconds since the Unix epoch, or 0
fn cache_token(meta: &fs::Metadata) -> u64 {
    meta.modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Resolve a cover URI to the file bytes and their MIME type
pub fn read_cover(uri: &str) -> Result<(Vec<u8>, &'static str), CoverError> {
    let cover = CoverRef::parse_uri(uri)?;
    let format = cover
        .format()
        .ok_or_else(|| CoverError::UnsupportedFormat(cover.path.clone()))?;
    let data = fs::read(&cover.path)?;
    Ok((data, format.mime_type()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_uri_round_trip_with_special_characters() {
        let cover = CoverRef::new(PathBuf::from("/games/Tony's Game (USA) 100%.jpg"), 1700000000123);
        let uri = cover.to_uri();
        assert!(uri.starts_with("cover://"));
        assert!(!uri.contains(' '));
        assert!(uri.ends_with("?t=1700000000123"));
        assert_eq!(CoverRef::parse_uri(&uri).unwrap(), cover);
    }

    #[test]
    fn test_parse_uri_without_token() {
        let cover = CoverRef::parse_uri("cover://%2Ftmp%2Fa.png").unwrap();
        assert_eq!(cover.path, PathBuf::from("/tmp/a.png"));
        assert_eq!(cover.token, 0);
    }

    #[test]
    fn test_parse_uri_rejects_other_schemes() {
        assert!(matches!(
            CoverRef::parse_uri("file:///tmp/a.png"),
            Err(CoverError::InvalidUri(_))
        ));
        assert!(matches!(
            CoverRef::parse_uri("cover://?t=1"),
            Err(CoverError::InvalidUri(_))
        ));
    }

    #[test]
    fn test_resolve_prefers_exact_base_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game (Track 01).png"), b"exact").unwrap();
        fs::write(dir.path().join("Game.jpg"), b"normalized").unwrap();

        let cover = resolve_cover(dir.path(), "Game (Track 01)", "Game").unwrap();
        assert_eq!(cover.path, dir.path().join("Game (Track 01).png"));
    }

    #[test]
    fn test_resolve_falls_back_to_normalized_name() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game.webp"), b"cover").unwrap();

        let cover = resolve_cover(dir.path(), "Game (Track 01)", "Game").unwrap();
        assert_eq!(cover.path, dir.path().join("Game.webp"));
    }

    #[test]
    fn test_resolve_follows_extension_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Game.png"), b"png").unwrap();
        fs::write(dir.path().join("Game.jpeg"), b"jpeg").unwrap();

        let cover = resolve_cover(dir.path(), "Game", "Game").unwrap();
        assert_eq!(cover.path, dir.path().join("Game.jpeg"));
    }

    #[test]
    fn test_resolve_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("Game.jpg")).unwrap();

        assert_eq!(resolve_cover(dir.path(), "Game", "Game"), None);
    }

    #[test]
    fn test_read_cover_returns_bytes_and_mime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Demo.png");
        fs::write(&path, b"\x89PNG").unwrap();

        let uri = CoverRef::new(path, 42).to_uri();
        let (data, mime) = read_cover(&uri).unwrap();
        assert_eq!(data, b"\x89PNG");
        assert_eq!(mime, "image/png");
    }

    #[test]
    fn test_read_cover_missing_file() {
        let dir = TempDir::new().unwrap();
        let uri = CoverRef::new(dir.path().join("gone.jpg"), 0).to_uri();
        assert!(matches!(read_cover(&uri), Err(CoverError::IoError(_))));
    }
}
