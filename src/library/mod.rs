//! Operations on catalog entries
//!
//! Everything here acts on the literal path of a catalog entry: launching it
//! in the emulator, renaming it together with its cover, replacing the cover
//! and revealing its folder.

mod files;
mod launch;
mod shell;

use std::path::PathBuf;
use thiserror::Error;

pub use files::{rename_rom, set_cover};
pub use launch::{directx_missing, launch, launch_args, DIRECTX_DOWNLOAD_URL};
pub use shell::open_folder;

/// Errors that can occur in library operations
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("No emulator configured")]
    EmulatorNotConfigured,

    #[error("d3dx9_26.dll (DirectX 9) is missing; install the DirectX End-User Runtime from {0}")]
    MissingDirectX(&'static str),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error("Unsupported cover image: {0}")]
    UnsupportedCover(PathBuf),

    #[error("Failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
