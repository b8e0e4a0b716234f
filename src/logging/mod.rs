//! Logging setup
//!
//! Log records are forwarded to the GUI log window through a channel.

mod ui_logger;

pub use ui_logger::UiLogger;
