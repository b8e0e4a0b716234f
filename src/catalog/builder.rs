//! Catalog builder
//!
//! Walks a directory tree, collapses the files of each disc into one group,
//! picks the file that stands for the disc and attaches its cover.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::cover::{resolve_cover, CoverRef};
use super::formats::DiscFormat;
use super::naming::{is_first_track, is_track_bin, normalize_base_name};
use super::sort::natural_cmp;

/// Errors that can occur while building a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Cannot read {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Skipped unreadable directory {path}: {message}")]
    SubtreeUnreadable { path: PathBuf, message: String },
}

/// A disc image file found during the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscFile {
    /// Full path, exactly as found on disk
    pub path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// Format derived from the lower-cased extension
    pub format: DiscFormat,
    /// File name without extension
    pub base_name: String,
    /// Base name with any trailing `(Track N)` marker removed
    pub normalized_base_name: String,
}

impl DiscFile {
    /// Build a record for a path, or `None` if it is not a disc image
    pub fn from_path(path: &Path) -> Option<Self> {
        let format = DiscFormat::from_path(path)?;
        let file_name = path.file_name()?.to_string_lossy().into_owned();
        let base_name = path.file_stem()?.to_string_lossy().into_owned();
        let normalized_base_name = normalize_base_name(&base_name).to_string();

        Some(Self {
            path: path.to_path_buf(),
            file_name,
            format,
            base_name,
            normalized_base_name,
        })
    }

    /// Whether this file is one track of a multi-track bin dump
    pub fn is_track_bin(&self) -> bool {
        is_track_bin(&self.base_name, self.format)
    }

    /// Directory containing the file
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

/// Files sharing one normalized base name
///
/// Groups are never empty.
#[derive(Debug, Clone)]
pub struct DiscGroup {
    key: String,
    files: Vec<DiscFile>,
}

impl DiscGroup {
    /// The shared normalized base name
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Members in the order they were collected
    pub fn files(&self) -> &[DiscFile] {
        &self.files
    }

    /// Choose the file that stands for the whole disc
    ///
    /// Priority:
    /// 1. a cue sheet
    /// 2. a standalone bin (not a track)
    /// 3. the first of iso, img, mdf, pbp, chd
    /// 4. the first track bin, preferring `(Track 1)`
    /// 5. whatever was collected first
    pub fn pick_best(&self) -> &DiscFile {
        let files = &self.files;

        if let Some(cue) = files.iter().find(|f| f.format == DiscFormat::Cue) {
            return cue;
        }

        if let Some(bin) = files.iter().find(|f| f.format == DiscFormat::Bin && !f.is_track_bin()) {
            return bin;
        }

        for format in DiscFormat::FALLBACK_ORDER {
            if let Some(hit) = files.iter().find(|f| f.format == format) {
                return hit;
            }
        }

        let mut tracks = files.iter().filter(|f| f.is_track_bin()).peekable();
        if let Some(&first) = tracks.peek() {
            return tracks.find(|f| is_first_track(&f.base_name)).unwrap_or(first);
        }

        &files[0]
    }
}

/// Partition files by normalized base name
///
/// Grouping ignores the directory: same-named discs anywhere under the root
/// end up in one group. Groups come out in order of first appearance.
pub fn group_by_name(files: Vec<DiscFile>) -> Vec<DiscGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DiscGroup> = Vec::new();

    for file in files {
        match index.get(&file.normalized_base_name) {
            Some(&i) => groups[i].files.push(file),
            None => {
                index.insert(file.normalized_base_name.clone(), groups.len());
                groups.push(DiscGroup {
                    key: file.normalized_base_name.clone(),
                    files: vec![file],
                });
            }
        }
    }

    groups
}

/// One game in the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Path of the representative file; later operations act on this path
    pub path: PathBuf,
    pub file_name: String,
    pub format: DiscFormat,
    pub base_name: String,
    pub cover: Option<CoverRef>,
}

impl CatalogEntry {
    /// Create an entry for a representative file, looking up its cover
    pub fn from_representative(file: &DiscFile) -> Self {
        // The exact stem finds covers whose names are not valid UTF-8
        let stem = file.path.file_stem().unwrap_or(OsStr::new(&file.base_name));
        let cover = resolve_cover(file.directory(), stem, &file.normalized_base_name);

        Self {
            path: file.path.clone(),
            file_name: file.file_name.clone(),
            format: file.format,
            base_name: file.base_name.clone(),
            cover,
        }
    }

    /// Lower-case extension of the representative file
    pub fn extension(&self) -> &'static str {
        self.format.extension()
    }

    /// Cover URI for display, if a cover was found
    pub fn cover_uri(&self) -> Option<String> {
        self.cover.as_ref().map(CoverRef::to_uri)
    }
}

/// Result of scanning a directory
#[derive(Debug)]
pub struct ScanReport {
    /// Directory that was scanned
    pub root: PathBuf,
    /// Catalog entries sorted by file name
    pub entries: Vec<CatalogEntry>,
    /// Subtrees that could not be read
    pub warnings: Vec<CatalogError>,
}

impl ScanReport {
    /// Look up an entry by its path
    pub fn find(&self, path: &Path) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.path == path)
    }
}

/// Build the catalog for a directory tree
///
/// Fails only when `root` is missing, is not a directory, or cannot be read
/// at all. Unreadable subdirectories are skipped and reported in
/// [`ScanReport::warnings`].
pub fn build_catalog(root: &Path) -> Result<ScanReport, CatalogError> {
    log::info!("Scanning {}", root.display());

    let (files, warnings) = collect_disc_files(root)?;
    log::debug!("Found {} disc image files", files.len());

    let groups = group_by_name(files);
    let mut entries: Vec<CatalogEntry> = groups
        .iter()
        .map(|group| {
            let best = group.pick_best();
            if group.files().len() > 1 {
                log::debug!(
                    "Group '{}' ({} files) -> {}",
                    group.key(),
                    group.files().len(),
                    best.file_name
                );
            }
            CatalogEntry::from_representative(best)
        })
        .collect();

    sort_entries(&mut entries);

    if !warnings.is_empty() {
        log::warn!("Scan of {} skipped {} unreadable directories", root.display(), warnings.len());
    }
    log::info!("Catalog of {} has {} entries", root.display(), entries.len());

    Ok(ScanReport {
        root: root.to_path_buf(),
        entries,
        warnings,
    })
}

/// Sort entries by file name in natural order
pub fn sort_entries(entries: &mut [CatalogEntry]) {
    entries.sort_by(|a, b| natural_cmp(&a.file_name, &b.file_name).then_with(|| a.path.cmp(&b.path)));
}

/// Walk `root` and collect every disc image file
fn collect_disc_files(root: &Path) -> Result<(Vec<DiscFile>, Vec<CatalogError>), CatalogError> {
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        _ => return Err(CatalogError::NotFound(root.to_path_buf())),
    }

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for item in WalkDir::new(root).follow_links(false) {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(CatalogError::RootUnreadable {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                log::warn!("Skipping {}: {}", path.display(), e);
                warnings.push(CatalogError::SubtreeUnreadable {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        if let Some(file) = DiscFile::from_path(entry.path()) {
            files.push(file);
        }
    }

    Ok((files, warnings))
}
