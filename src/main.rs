//! Disc Shelf
//!
//! A desktop launcher that catalogs a folder of disc images, shows their
//! covers and starts them in an external emulator.

use disc_shelf::{gui, logging::UiLogger};
use eframe::egui;

fn main() -> eframe::Result<()> {
    match UiLogger::init() {
        Ok(receiver) => gui::set_log_receiver(receiver),
        Err(_) => {
            let _ = env_logger::try_init();
        }
    }

    log::info!("Disc Shelf v{}", env!("APP_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([900.0, 600.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Disc Shelf",
        options,
        Box::new(|cc| Ok(Box::new(gui::App::new(cc)))),
    )
}
