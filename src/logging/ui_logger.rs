use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::str::FromStr;
use std::sync::mpsc::{self, Receiver, Sender};

/// Simple logger that forwards formatted log lines into an mpsc channel.
pub struct UiLogger {
    sender: Sender<String>,
    max_level: LevelFilter,
}

impl UiLogger {
    /// Create a logger and the receiver its lines arrive on.
    pub fn new(max_level: LevelFilter) -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { sender: tx, max_level }, rx)
    }

    /// Install the UI logger and return the receiver to read log lines from.
    /// The level comes from `RUST_LOG` and defaults to `debug` so the log window is verbose.
    pub fn init() -> Result<Receiver<String>, SetLoggerError> {
        let max_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| LevelFilter::from_str(&s).ok())
            .unwrap_or(LevelFilter::Debug);

        let (logger, rx) = Self::new(max_level);
        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(rx)
    }
}

impl Log for UiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut msg = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            if let (Some(file), Some(line)) = (record.file(), record.line()) {
                msg.push_str(&format!(" ({}:{})", file, line));
            }
            let _ = self.sender.send(msg);
        }
    }

    fn flush(&self) {}
}
