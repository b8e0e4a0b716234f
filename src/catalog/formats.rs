//! Disc image and cover image format definitions

use std::path::Path;

/// Disc image formats recognized by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscFormat {
    /// Cue sheet describing one or more track files (.cue)
    Cue,
    /// Raw binary dump, either a whole disc or a single track (.bin)
    Bin,
    /// ISO 9660 disc image (.iso)
    Iso,
    /// Raw image (.img)
    Img,
    /// Media Data File (.mdf)
    Mdf,
    /// PlayStation Portable eboot package (.pbp)
    Pbp,
    /// MAME Compressed Hunks of Data (.chd)
    Chd,
}

impl DiscFormat {
    /// Fallback order used when a group has neither a cue sheet nor a standalone bin
    pub const FALLBACK_ORDER: [DiscFormat; 5] = [
        DiscFormat::Iso,
        DiscFormat::Img,
        DiscFormat::Mdf,
        DiscFormat::Pbp,
        DiscFormat::Chd,
    ];

    /// Detect disc format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::from_extension(ext)
    }

    /// Detect disc format from an extension without the leading dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "cue" => Some(Self::Cue),
            "bin" => Some(Self::Bin),
            "iso" => Some(Self::Iso),
            "img" => Some(Self::Img),
            "mdf" => Some(Self::Mdf),
            "pbp" => Some(Self::Pbp),
            "chd" => Some(Self::Chd),
            _ => None,
        }
    }

    /// Lower-case extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Cue => "cue",
            Self::Bin => "bin",
            Self::Iso => "iso",
            Self::Img => "img",
            Self::Mdf => "mdf",
            Self::Pbp => "pbp",
            Self::Chd => "chd",
        }
    }

    /// Get the display name for this format
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Cue => "CUE sheet",
            Self::Bin => "BIN",
            Self::Iso => "ISO 9660",
            Self::Img => "IMG",
            Self::Mdf => "MDF",
            Self::Pbp => "PBP (EBOOT)",
            Self::Chd => "CHD (Compressed Hunks of Data)",
        }
    }
}

/// Cover art image formats, in probe order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Jpg,
    Jpeg,
    Png,
    Webp,
}

impl CoverFormat {
    /// Order in which sibling cover files are probed
    pub const PROBE_ORDER: [CoverFormat; 4] = [
        CoverFormat::Jpg,
        CoverFormat::Jpeg,
        CoverFormat::Png,
        CoverFormat::Webp,
    ];

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// MIME type served for this cover
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpg | Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// Get all supported disc image extensions for file dialogs
pub fn supported_extensions() -> Vec<&'static str> {
    vec!["cue", "bin", "iso", "img", "mdf", "pbp", "chd"]
}

/// Get all supported cover image extensions for file dialogs
pub fn cover_extensions() -> Vec<&'static str> {
    CoverFormat::PROBE_ORDER.iter().map(|f| f.extension()).collect()
}
