//! Disc Shelf Library
//!
//! Disc image cataloging, cover lookup and emulator launching.

pub mod catalog;
pub mod config;
pub mod gui;
pub mod library;
pub mod logging;
