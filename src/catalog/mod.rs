//! Disc catalog module
//!
//! Turns a directory of disc dumps into a sorted list of games, one entry per
//! disc, each with an optional cover image.

mod builder;
mod cover;
mod formats;
mod naming;
mod sort;

pub use builder::{
    build_catalog, group_by_name, sort_entries, CatalogEntry, CatalogError, DiscFile, DiscGroup,
    ScanReport,
};
pub use cover::{read_cover, resolve_cover, CoverError, CoverRef, COVER_SCHEME};
pub use formats::{cover_extensions, supported_extensions, CoverFormat, DiscFormat};
pub use naming::{has_track_suffix, is_first_track, is_track_bin, normalize_base_name};
pub use sort::natural_cmp;
