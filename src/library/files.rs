//! Renaming disc images and replacing their covers

use std::fs;
use std::path::{Path, PathBuf};

use super::LibraryError;
use crate::catalog::CoverFormat;

/// Reject names that would leave the disc's directory
fn validate_name(name: &str) -> Result<(), LibraryError> {
    let invalid = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\']);
    if invalid {
        return Err(LibraryError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Rename a disc image, keeping its extension, and carry its cover along
///
/// The first existing `<old name>.<jpg|jpeg|png|webp>` sibling is renamed to
/// match. A cover that cannot be renamed is left where it is.
pub fn rename_rom(old_path: &Path, new_name: &str) -> Result<PathBuf, LibraryError> {
    validate_name(new_name)?;

    let dir = old_path.parent().unwrap_or(Path::new("."));
    let old_stem = old_path
        .file_stem()
        .ok_or_else(|| LibraryError::InvalidName(old_path.display().to_string()))?;

    let new_file_name = match old_path.extension() {
        Some(ext) => format!("{}.{}", new_name, ext.to_string_lossy()),
        None => new_name.to_string(),
    };
    let new_path = dir.join(new_file_name);

    fs::rename(old_path, &new_path)?;
    log::info!("Renamed {} -> {}", old_path.display(), new_path.display());

    for format in CoverFormat::PROBE_ORDER {
        let mut old_cover_name = old_stem.to_os_string();
        old_cover_name.push(format!(".{}", format.extension()));
        let old_cover = dir.join(old_cover_name);
        let new_cover = dir.join(format!("{}.{}", new_name, format.extension()));

        if fs::rename(&old_cover, &new_cover).is_ok() {
            log::info!("Renamed cover {} -> {}", old_cover.display(), new_cover.display());
            break;
        }
    }

    Ok(new_path)
}

/// Copy an image next to a disc image as its cover
///
/// The copy is named `<disc base name>.<image extension in lower case>`.
pub fn set_cover(rom: &Path, image: &Path) -> Result<PathBuf, LibraryError> {
    let format =
        CoverFormat::from_path(image).ok_or_else(|| LibraryError::UnsupportedCover(image.to_path_buf()))?;

    let dir = rom.parent().unwrap_or(Path::new("."));
    let stem = rom
        .file_stem()
        .ok_or_else(|| LibraryError::InvalidName(rom.display().to_string()))?;

    let mut cover_name = stem.to_os_string();
    cover_name.push(format!(".{}", format.extension()));
    let destination = dir.join(cover_name);

    if destination == image {
        return Ok(destination);
    }

    fs::copy(image, &destination)?;
    log::info!("Cover set: {} -> {}", image.display(), destination.display());
    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rename_keeps_extension_and_moves_cover() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Old Name.CUE");
        fs::write(&rom, b"cue").unwrap();
        fs::write(dir.path().join("Old Name.png"), b"png").unwrap();

        let new_path = rename_rom(&rom, "New Name").unwrap();

        assert_eq!(new_path, dir.path().join("New Name.CUE"));
        assert!(new_path.exists());
        assert!(!rom.exists());
        assert!(dir.path().join("New Name.png").exists());
        assert!(!dir.path().join("Old Name.png").exists());
    }

    #[test]
    fn test_rename_moves_only_first_cover() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.iso");
        fs::write(&rom, b"iso").unwrap();
        fs::write(dir.path().join("Game.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("Game.webp"), b"webp").unwrap();

        rename_rom(&rom, "Renamed").unwrap();

        assert!(dir.path().join("Renamed.jpg").exists());
        assert!(dir.path().join("Game.webp").exists());
        assert!(!dir.path().join("Renamed.webp").exists());
    }

    #[test]
    fn test_rename_without_cover() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.chd");
        fs::write(&rom, b"chd").unwrap();

        let new_path = rename_rom(&rom, "Other").unwrap();
        assert_eq!(new_path, dir.path().join("Other.chd"));
    }

    #[test]
    fn test_rename_rejects_bad_names() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.iso");
        fs::write(&rom, b"iso").unwrap();

        for name in ["", "   ", "..", "a/b", "a\\b"] {
            assert!(matches!(rename_rom(&rom, name), Err(LibraryError::InvalidName(_))));
        }
        assert!(rom.exists());
    }

    #[test]
    fn test_rename_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let result = rename_rom(&dir.path().join("Missing.iso"), "Other");
        assert!(matches!(result, Err(LibraryError::IoError(_))));
    }

    #[test]
    fn test_set_cover_copies_with_lowercase_extension() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.cue");
        fs::write(&rom, b"cue").unwrap();
        let picked = dir.path().join("download.PNG");
        fs::write(&picked, b"image").unwrap();

        let cover = set_cover(&rom, &picked).unwrap();

        assert_eq!(cover, dir.path().join("Game.png"));
        assert_eq!(fs::read(&cover).unwrap(), b"image");
        assert!(picked.exists());
    }

    #[test]
    fn test_set_cover_onto_itself_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.cue");
        let cover = dir.path().join("Game.jpg");
        fs::write(&cover, b"keep").unwrap();

        assert_eq!(set_cover(&rom, &cover).unwrap(), cover);
        assert_eq!(fs::read(&cover).unwrap(), b"keep");
    }

    #[test]
    fn test_set_cover_rejects_other_images() {
        let dir = TempDir::new().unwrap();
        let rom = dir.path().join("Game.cue");
        let gif = dir.path().join("anim.gif");
        fs::write(&gif, b"gif").unwrap();

        assert!(matches!(set_cover(&rom, &gif), Err(LibraryError::UnsupportedCover(_))));
    }
}
