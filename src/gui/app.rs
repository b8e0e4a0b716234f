//! Main application state and UI implementation

use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::catalog::{
    build_catalog, cover_extensions, read_cover, supported_extensions, CatalogEntry, CoverFormat,
    ScanReport,
};
use crate::config::{Settings, SettingsPatch, SettingsStore};
use crate::library::{self, LibraryError};

/// Main application state
pub struct App {
    /// Settings file
    store: SettingsStore,
    /// Current settings
    settings: Settings,
    /// Editable copy of the extra emulator arguments
    extra_args_text: String,
    /// Directory currently shown
    current_dir: Option<PathBuf>,
    /// Catalog of the current directory
    entries: Vec<CatalogEntry>,
    /// Filter text for the game list
    filter: String,
    /// Path of the selected entry
    selected: Option<PathBuf>,
    /// Receiver for background scan results
    scan_receiver: Option<Receiver<Result<ScanReport, String>>>,
    /// Is a scan in progress?
    scan_in_progress: bool,
    /// Texture of the selected entry's cover
    cover_texture: Option<egui::TextureHandle>,
    /// URI of the cover being shown or loaded
    cover_uri: Option<String>,
    /// Receiver for cover bytes, tagged with the URI they belong to
    cover_receiver: Option<Receiver<(String, Result<Vec<u8>, String>)>>,
    /// Is a cover loading?
    cover_loading: bool,
    /// Last cover error message
    cover_error: Option<String>,
    /// Open rename dialog, if any
    rename_dialog: Option<RenameDialog>,
    /// First-run setup, open until it is finished or cancelled
    setup: Option<SetupStep>,
    /// Status/log messages
    log_messages: Vec<LogMessage>,
    /// Lines forwarded from the `log` facade
    log_receiver: Option<Receiver<String>>,
    /// Whether to show the log window
    show_log_window: bool,
    /// Dropped files (for drag-and-drop)
    dropped_files: Vec<egui::DroppedFile>,
}

/// A log message with severity level
#[derive(Clone)]
struct LogMessage {
    text: String,
    level: LogLevel,
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// State of the rename dialog
struct RenameDialog {
    path: PathBuf,
    name: String,
}

/// Pages of the first-run setup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SetupStep {
    Folder,
    Emulator,
    Options,
}

impl SetupStep {
    fn number(self) -> usize {
        match self {
            SetupStep::Folder => 1,
            SetupStep::Emulator => 2,
            SetupStep::Options => 3,
        }
    }

    fn next(self) -> Self {
        match self {
            SetupStep::Folder => SetupStep::Emulator,
            SetupStep::Emulator | SetupStep::Options => SetupStep::Options,
        }
    }

    fn previous(self) -> Self {
        match self {
            SetupStep::Folder | SetupStep::Emulator => SetupStep::Folder,
            SetupStep::Options => SetupStep::Emulator,
        }
    }
}

/// Things the user asked for during a frame, applied after drawing
enum Action {
    ChooseFolder,
    Refresh,
    ChooseEmulator,
    SetFullscreen(bool),
    SaveExtraArgs,
    Select(PathBuf),
    Launch(PathBuf),
    BeginRename(PathBuf),
    ConfirmRename,
    CancelRename,
    SetupNext,
    SetupBack,
    SetupFinish,
    SetupCancel,
    ChangeCover(PathBuf),
    OpenFolder(PathBuf),
}

impl App {
    /// Create a new App instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::with_store(SettingsStore::default_location());
        app.log_receiver = super::take_log_receiver();

        if let Some(dir) = app.settings.last_directory().map(Path::to_path_buf) {
            app.start_scan(dir);
        }

        app
    }

    fn with_store(store: SettingsStore) -> Self {
        let settings = store.load();
        let setup = (!settings.is_configured).then_some(SetupStep::Folder);
        Self {
            extra_args_text: settings.extra_args.clone(),
            store,
            settings,
            current_dir: None,
            entries: Vec::new(),
            filter: String::new(),
            selected: None,
            scan_receiver: None,
            scan_in_progress: false,
            cover_texture: None,
            cover_uri: None,
            cover_receiver: None,
            cover_loading: false,
            cover_error: None,
            rename_dialog: None,
            setup,
            log_messages: Vec::new(),
            log_receiver: None,
            show_log_window: false,
            dropped_files: Vec::new(),
        }
    }

    /// Add a log message
    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogMessage {
            text: message.into(),
            level,
        });
        // Keep only last 200 messages
        if self.log_messages.len() > 200 {
            self.log_messages.remove(0);
        }
    }

    /// Move forwarded `log` records into the log window
    fn drain_log_receiver(&mut self) {
        let lines: Vec<String> = match self.log_receiver {
            Some(ref receiver) => receiver.try_iter().collect(),
            None => return,
        };
        for line in lines {
            let level = if line.starts_with("[ERROR]") {
                LogLevel::Error
            } else if line.starts_with("[WARN]") {
                LogLevel::Warning
            } else {
                LogLevel::Info
            };
            self.log(level, line);
        }
    }

    /// Persist a settings change
    fn update_settings(&mut self, patch: SettingsPatch) {
        match self.store.update(patch) {
            Ok(settings) => self.settings = settings,
            Err(e) => self.log(LogLevel::Error, format!("Failed to save settings: {}", e)),
        }
    }

    /// The selected catalog entry, if it is still in the catalog
    fn selected_entry(&self) -> Option<&CatalogEntry> {
        let selected = self.selected.as_ref()?;
        self.entries.iter().find(|e| &e.path == selected)
    }

    /// Start a background scan of a directory
    fn start_scan(&mut self, dir: PathBuf) {
        self.log(LogLevel::Info, format!("Scanning: {}", dir.display()));
        self.current_dir = Some(dir.clone());

        let (tx, rx) = mpsc::channel();
        self.scan_in_progress = true;
        // A newer scan replaces any pending one
        self.scan_receiver = Some(rx);

        thread::spawn(move || {
            let result = build_catalog(&dir).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    /// Rescan the current directory
    fn refresh(&mut self) {
        if let Some(dir) = self.current_dir.clone() {
            self.start_scan(dir);
        }
    }

    /// Poll for scan results
    fn poll_scan(&mut self) {
        if let Some(ref receiver) = self.scan_receiver {
            match receiver.try_recv() {
                Ok(Ok(report)) => {
                    self.scan_in_progress = false;
                    self.scan_receiver = None;

                    for warning in &report.warnings {
                        let msg = warning.to_string();
                        self.log(LogLevel::Warning, msg);
                    }

                    self.selected = reselect(&report.entries, self.selected.take());
                    let count = report.entries.len();
                    self.entries = report.entries;
                    self.log(LogLevel::Success, format!("Found {} games", count));
                }
                Ok(Err(e)) => {
                    self.scan_in_progress = false;
                    self.scan_receiver = None;
                    self.entries.clear();
                    self.selected = None;
                    self.log(LogLevel::Error, format!("Scan failed: {}", e));
                    show_error_dialog("Scan failed", &e);
                }
                Err(TryRecvError::Empty) => {
                    // Still scanning
                }
                Err(TryRecvError::Disconnected) => {
                    self.scan_in_progress = false;
                    self.scan_receiver = None;
                    self.log(LogLevel::Error, "Scan thread terminated unexpectedly");
                }
            }
        }
    }

    /// Make the cover being shown match the selection
    fn sync_cover(&mut self) {
        let wanted = self.selected_entry().and_then(CatalogEntry::cover_uri);
        if wanted == self.cover_uri {
            return;
        }

        self.cover_texture = None;
        self.cover_error = None;
        self.cover_receiver = None;
        self.cover_loading = false;
        self.cover_uri = wanted.clone();

        if let Some(uri) = wanted {
            let (tx, rx) = mpsc::channel();
            self.cover_loading = true;
            self.cover_receiver = Some(rx);

            thread::spawn(move || {
                let result = read_cover(&uri)
                    .map(|(bytes, _mime)| bytes)
                    .map_err(|e| e.to_string());
                let _ = tx.send((uri, result));
            });
        }
    }

    /// Poll for cover image data
    fn poll_cover(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.cover_receiver {
            match receiver.try_recv() {
                Ok((uri, result)) => {
                    self.cover_loading = false;
                    self.cover_receiver = None;
                    if self.cover_uri.as_deref() != Some(uri.as_str()) {
                        return;
                    }

                    match result.and_then(|bytes| load_image_from_bytes(&bytes)) {
                        Ok(color_image) => {
                            let texture =
                                ctx.load_texture("cover", color_image, egui::TextureOptions::LINEAR);
                            self.cover_texture = Some(texture);
                        }
                        Err(e) => {
                            let msg = format!("Failed to load cover: {}", e);
                            self.cover_error = Some(msg.clone());
                            self.log(LogLevel::Error, msg);
                        }
                    }
                }
                Err(TryRecvError::Empty) => {
                    // Still loading
                }
                Err(TryRecvError::Disconnected) => {
                    self.cover_loading = false;
                    self.cover_receiver = None;
                }
            }
        }
    }

    /// Open folder picker dialog
    fn choose_folder(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if let Some(ref dir) = self.current_dir {
            dialog = dialog.set_directory(dir);
        }

        if let Some(dir) = dialog.pick_folder() {
            self.open_directory(dir);
        }
    }

    /// Remember a directory and scan it
    fn open_directory(&mut self, dir: PathBuf) {
        self.update_settings(SettingsPatch {
            last_dir: Some(dir.display().to_string()),
            ..Default::default()
        });
        self.selected = None;
        self.start_scan(dir);
    }

    /// Open emulator picker dialog
    fn choose_emulator(&mut self) {
        let mut dialog = rfd::FileDialog::new();
        if cfg!(windows) {
            dialog = dialog.add_filter("Emulator", &["exe"]);
        }
        dialog = dialog.add_filter("All Files", &["*"]);

        if let Some(path) = dialog.pick_file() {
            self.log(LogLevel::Info, format!("Emulator: {}", path.display()));
            self.update_settings(SettingsPatch {
                emulator_path: Some(path.display().to_string()),
                ..Default::default()
            });
        }
    }

    /// Launch a disc image in the emulator
    fn launch(&mut self, path: &Path) {
        match library::launch(&self.settings, path) {
            Ok(()) => self.log(LogLevel::Success, format!("Launched {}", path.display())),
            Err(LibraryError::EmulatorNotConfigured) => {
                self.log(LogLevel::Warning, "Choose the emulator executable first");
                show_warning_dialog("No emulator", "Choose the emulator executable first.");
            }
            Err(e) => {
                let msg = e.to_string();
                self.log(LogLevel::Error, format!("Launch failed: {}", msg));
                show_error_dialog("Launch failed", &msg);
            }
        }
    }

    /// Apply the rename dialog
    fn confirm_rename(&mut self) {
        let Some(dialog) = self.rename_dialog.take() else {
            return;
        };

        match library::rename_rom(&dialog.path, &dialog.name) {
            Ok(new_path) => {
                self.log(LogLevel::Success, format!("Renamed to {}", new_path.display()));
                self.selected = Some(new_path);
                self.refresh();
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("Rename failed: {}", e));
                show_error_dialog("Rename failed", &e.to_string());
            }
        }
    }

    /// Pick an image and make it the cover of a disc image
    fn change_cover(&mut self, rom: &Path) {
        let extensions = cover_extensions();
        if let Some(image) = rfd::FileDialog::new()
            .add_filter("Images", &extensions)
            .pick_file()
        {
            self.apply_cover(rom, &image);
        }
    }

    fn apply_cover(&mut self, rom: &Path, image: &Path) {
        match library::set_cover(rom, image) {
            Ok(cover) => {
                self.log(LogLevel::Success, format!("Cover saved to {}", cover.display()));
                self.refresh();
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("Failed to set cover: {}", e));
            }
        }
    }

    /// Reveal a disc image's folder
    fn open_folder(&mut self, rom: &Path) {
        let dir = rom.parent().unwrap_or(Path::new("."));
        if let Err(e) = library::open_folder(dir) {
            self.log(LogLevel::Error, e.to_string());
        }
    }

    /// Handle files dropped on the window
    fn handle_dropped(&mut self, path: PathBuf) {
        if path.is_dir() {
            self.open_directory(path);
        } else if CoverFormat::from_path(&path).is_some() {
            match self.selected.clone() {
                Some(rom) => self.apply_cover(&rom, &path),
                None => self.log(LogLevel::Warning, "Select a game first, then drop its cover"),
            }
        } else {
            self.log(
                LogLevel::Warning,
                format!(
                    "Drop a folder of disc images ({}) or a cover image",
                    supported_extensions().join(", ")
                ),
            );
        }
    }

    /// Close the setup once a folder and an emulator are chosen
    ///
    /// Marks the settings as configured and scans the chosen folder.
    fn finish_setup(&mut self) -> Result<(), &'static str> {
        self.apply(Action::SaveExtraArgs);

        let Some(dir) = self.settings.last_directory().map(Path::to_path_buf) else {
            return Err("Choose the games folder first.");
        };
        if self.settings.emulator().is_none() {
            return Err("Choose the emulator executable first.");
        }

        self.update_settings(SettingsPatch {
            is_configured: Some(true),
            ..Default::default()
        });
        self.setup = None;
        self.log(LogLevel::Success, "Setup complete");
        self.start_scan(dir);
        Ok(())
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::ChooseFolder => self.choose_folder(),
            Action::Refresh => self.refresh(),
            Action::ChooseEmulator => self.choose_emulator(),
            Action::SetFullscreen(fullscreen) => self.update_settings(SettingsPatch {
                fullscreen: Some(fullscreen),
                ..Default::default()
            }),
            Action::SaveExtraArgs => {
                if self.extra_args_text != self.settings.extra_args {
                    let extra_args = self.extra_args_text.clone();
                    self.update_settings(SettingsPatch {
                        extra_args: Some(extra_args),
                        ..Default::default()
                    });
                }
            }
            Action::Select(path) => self.selected = Some(path),
            Action::Launch(path) => self.launch(&path),
            Action::BeginRename(path) => {
                let name = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.rename_dialog = Some(RenameDialog { path, name });
            }
            Action::ConfirmRename => self.confirm_rename(),
            Action::CancelRename => self.rename_dialog = None,
            Action::SetupNext => self.setup = self.setup.map(SetupStep::next),
            Action::SetupBack => self.setup = self.setup.map(SetupStep::previous),
            Action::SetupFinish => {
                if let Err(msg) = self.finish_setup() {
                    self.log(LogLevel::Warning, msg);
                    show_warning_dialog("Setup", msg);
                }
            }
            Action::SetupCancel => self.setup = None,
            Action::ChangeCover(path) => self.change_cover(&path),
            Action::OpenFolder(path) => self.open_folder(&path),
        }
    }

    fn top_bar(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.heading("Disc Shelf");
            ui.separator();

            if ui.button("Choose folder...").clicked() {
                actions.push(Action::ChooseFolder);
            }
            if ui
                .add_enabled(self.current_dir.is_some() && !self.scan_in_progress, egui::Button::new("Refresh"))
                .clicked()
            {
                actions.push(Action::Refresh);
            }

            ui.separator();

            let emulator_text = match self.settings.emulator() {
                Some(path) => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
                None => "Choose emulator...".to_string(),
            };
            let emulator_btn = ui.button(emulator_text);
            let emulator_btn = match self.settings.emulator() {
                Some(path) => emulator_btn.on_hover_text(path.display().to_string()),
                None => emulator_btn,
            };
            if emulator_btn.clicked() {
                actions.push(Action::ChooseEmulator);
            }

            let mut fullscreen = self.settings.fullscreen;
            if ui.checkbox(&mut fullscreen, "Fullscreen (-f)").changed() {
                actions.push(Action::SetFullscreen(fullscreen));
            }

            ui.label("Extra args:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.extra_args_text)
                    .hint_text("e.g. -r")
                    .desired_width(140.0),
            );
            if response.lost_focus() {
                actions.push(Action::SaveExtraArgs);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("v{}", env!("APP_VERSION")));
                ui.separator();
                let log_count = self.log_messages.len();
                let log_btn_text = if log_count > 0 {
                    format!("Log ({})", log_count)
                } else {
                    "Log".to_string()
                };
                if ui.button(log_btn_text).clicked() {
                    self.show_log_window = !self.show_log_window;
                }
            });
        });
        ui.add_space(4.0);
    }

    fn game_list(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.add_space(4.0);
        ui.add(
            egui::TextEdit::singleline(&mut self.filter)
                .hint_text("Filter...")
                .desired_width(f32::INFINITY),
        );

        let dir_text = match self.current_dir {
            Some(ref dir) => dir.display().to_string(),
            None => "No folder selected".to_string(),
        };
        ui.label(egui::RichText::new(dir_text).small().weak());

        if self.scan_in_progress {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Scanning...");
            });
        }
        ui.separator();

        let visible = filter_entries(&self.entries, &self.filter);
        egui::ScrollArea::vertical()
            .id_salt("game_list")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for entry in &visible {
                    let is_selected = self.selected.as_deref() == Some(entry.path.as_path());
                    let response = ui
                        .selectable_label(is_selected, &entry.file_name)
                        .on_hover_text(entry.path.display().to_string());

                    if response.double_clicked() {
                        actions.push(Action::Launch(entry.path.clone()));
                    } else if response.clicked() {
                        actions.push(Action::Select(entry.path.clone()));
                    }
                }

                if visible.is_empty() && !self.scan_in_progress {
                    ui.add_space(8.0);
                    ui.colored_label(egui::Color32::GRAY, "No disc images found in this folder.");
                }
            });
    }

    fn details(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let Some(entry) = self.selected_entry().cloned() else {
            ui.add_space(16.0);
            ui.colored_label(egui::Color32::GRAY, "Pick a game on the left (double-click to play)");
            return;
        };

        ui.group(|ui| {
            ui.heading("Details");
            ui.add_space(8.0);

            egui::Grid::new("details_grid")
                .num_columns(2)
                .spacing([40.0, 4.0])
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Name:");
                    ui.strong(&entry.file_name);
                    ui.end_row();

                    ui.label("Path:");
                    ui.add(egui::Label::new(entry.path.display().to_string()).wrap());
                    ui.end_row();

                    ui.label("Format:");
                    ui.label(entry.format.display_name());
                    ui.end_row();

                    ui.label("Cover:");
                    match entry.cover {
                        Some(ref cover) => {
                            ui.colored_label(egui::Color32::GREEN, cover.path.display().to_string())
                        }
                        None => ui.colored_label(egui::Color32::LIGHT_RED, "Not found"),
                    };
                    ui.end_row();
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Play").clicked() {
                    actions.push(Action::Launch(entry.path.clone()));
                }
                if ui.button("Rename...").clicked() {
                    actions.push(Action::BeginRename(entry.path.clone()));
                }
                if ui.button("Change cover...").clicked() {
                    actions.push(Action::ChangeCover(entry.path.clone()));
                }
                if ui.button("Open folder").clicked() {
                    actions.push(Action::OpenFolder(entry.path.clone()));
                }
            });
        });

        ui.add_space(16.0);

        ui.group(|ui| {
            ui.heading("Cover");
            ui.add_space(8.0);

            if self.cover_loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            } else if let Some(ref texture) = self.cover_texture {
                let size = texture.size_vec2();
                let max_w = ui.available_width().max(64.0);
                let max_h = ui.available_height().max(64.0);
                let scale = (max_w / size.x).min(max_h / size.y).min(1.0);
                ui.image((texture.id(), egui::vec2(size.x * scale, size.y * scale)));
            } else if let Some(ref err) = self.cover_error {
                ui.colored_label(egui::Color32::LIGHT_RED, err);
            } else {
                ui.colored_label(egui::Color32::GRAY, "No matching cover");
            }
        });
    }

    fn rename_window(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let Some(ref mut dialog) = self.rename_dialog else {
            return;
        };

        egui::Window::new("Rename")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("New name:");
                let response = ui.add(egui::TextEdit::singleline(&mut dialog.name).desired_width(320.0));
                let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Rename").clicked() || submitted {
                        actions.push(Action::ConfirmRename);
                    }
                    if ui.button("Cancel").clicked() {
                        actions.push(Action::CancelRename);
                    }
                });
            });
    }

    fn setup_window(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let Some(step) = self.setup else {
            return;
        };

        egui::Window::new("Setup")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .default_width(480.0)
            .show(ctx, |ui| {
                ui.label(egui::RichText::new(format!("Step {} of 3", step.number())).weak());
                ui.add_space(8.0);

                match step {
                    SetupStep::Folder => {
                        ui.strong("Choose the games folder");
                        ui.label("Disc images in this folder and below are listed.");
                        ui.horizontal(|ui| {
                            if ui.button("Choose folder...").clicked() {
                                actions.push(Action::ChooseFolder);
                            }
                            match self.settings.last_directory() {
                                Some(dir) => ui.label(dir.display().to_string()),
                                None => ui.colored_label(egui::Color32::GRAY, "Not selected"),
                            };
                        });
                    }
                    SetupStep::Emulator => {
                        ui.strong("Choose the emulator");
                        ui.label("Games are started with this executable.");
                        ui.horizontal(|ui| {
                            if ui.button("Choose emulator...").clicked() {
                                actions.push(Action::ChooseEmulator);
                            }
                            match self.settings.emulator() {
                                Some(path) => ui.label(path.display().to_string()),
                                None => ui.colored_label(egui::Color32::GRAY, "Not selected"),
                            };
                        });
                    }
                    SetupStep::Options => {
                        ui.strong("Options");
                        let mut fullscreen = self.settings.fullscreen;
                        if ui.checkbox(&mut fullscreen, "Fullscreen (-f)").changed() {
                            actions.push(Action::SetFullscreen(fullscreen));
                        }
                        ui.horizontal(|ui| {
                            ui.label("Extra args:");
                            let response = ui.add(
                                egui::TextEdit::singleline(&mut self.extra_args_text)
                                    .hint_text("e.g. -r")
                                    .desired_width(240.0),
                            );
                            if response.lost_focus() {
                                actions.push(Action::SaveExtraArgs);
                            }
                        });
                    }
                }

                ui.add_space(12.0);
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        actions.push(Action::SetupCancel);
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if step == SetupStep::Options {
                            if ui.button("Finish").clicked() {
                                actions.push(Action::SetupFinish);
                            }
                        } else if ui.button("Next").clicked() {
                            actions.push(Action::SetupNext);
                        }
                        if ui
                            .add_enabled(step != SetupStep::Folder, egui::Button::new("Back"))
                            .clicked()
                        {
                            actions.push(Action::SetupBack);
                        }
                    });
                });
            });
    }

    fn log_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Log")
            .open(&mut self.show_log_window)
            .default_size([500.0, 300.0])
            .resizable(true)
            .show(ctx, |ui| {
                if ui.button("Clear").clicked() {
                    self.log_messages.clear();
                }
                ui.separator();

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for msg in &self.log_messages {
                            let color = match msg.level {
                                LogLevel::Info => egui::Color32::GRAY,
                                LogLevel::Success => egui::Color32::GREEN,
                                LogLevel::Warning => egui::Color32::YELLOW,
                                LogLevel::Error => egui::Color32::RED,
                            };
                            ui.colored_label(color, &msg.text);
                        }
                    });
            });
    }
}

/// Entries whose file name contains the filter text, ignoring case
fn filter_entries<'a>(entries: &'a [CatalogEntry], filter: &str) -> Vec<&'a CatalogEntry> {
    let query = filter.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| query.is_empty() || e.file_name.to_lowercase().contains(&query))
        .collect()
}

/// Keep a selection across rescans if its path is still in the catalog
fn reselect(entries: &[CatalogEntry], selected: Option<PathBuf>) -> Option<PathBuf> {
    selected.filter(|path| entries.iter().any(|e| &e.path == path))
}

/// Load image from bytes into egui ColorImage
fn load_image_from_bytes(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let image = image::load_from_memory(bytes).map_err(|e| format!("Failed to decode image: {}", e))?;

    let size = [image.width() as usize, image.height() as usize];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

fn show_error_dialog(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

fn show_warning_dialog(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_log_receiver();

        // Poll for scan results
        self.poll_scan();

        // Keep the cover in step with the selection
        self.sync_cover();
        self.poll_cover(ctx);

        // Request repaint while loading
        if self.scan_in_progress || self.cover_loading {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        } else if self.log_receiver.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(500));
        }

        // Handle dropped files
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });
        if let Some(file) = self.dropped_files.pop() {
            if let Some(path) = file.path {
                self.handle_dropped(path);
            }
        }

        let mut actions = Vec::new();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            self.top_bar(ui, &mut actions);
        });

        egui::SidePanel::left("game_list_panel")
            .resizable(true)
            .default_width(340.0)
            .min_width(220.0)
            .show(ctx, |ui| {
                self.game_list(ui, &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.details(ui, &mut actions);
        });

        self.rename_window(ctx, &mut actions);
        self.setup_window(ctx, &mut actions);

        if self.show_log_window {
            self.log_window(ctx);
        }

        preview_files_being_dropped(ctx);

        for action in actions {
            self.apply(action);
        }
    }
}

/// Preview files being dragged over the window
fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if !ctx.input(|i| i.raw.hovered_files.is_empty()) {
        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));

        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop a folder to scan or an image to use as cover",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DiscFormat;
    use tempfile::TempDir;

    fn entry(path: &str) -> CatalogEntry {
        let path = PathBuf::from(path);
        CatalogEntry {
            file_name: path.file_name().unwrap().to_string_lossy().into_owned(),
            base_name: path.file_stem().unwrap().to_string_lossy().into_owned(),
            format: DiscFormat::from_path(&path).unwrap(),
            path,
            cover: None,
        }
    }

    #[test]
    fn test_filter_entries_is_case_insensitive() {
        let entries = vec![entry("/g/Crash Bandicoot.cue"), entry("/g/Spyro.iso")];

        let names: Vec<&str> = filter_entries(&entries, "  CRASH ")
            .iter()
            .map(|e| e.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["Crash Bandicoot.cue"]);
        assert_eq!(filter_entries(&entries, "").len(), 2);
        assert!(filter_entries(&entries, "tekken").is_empty());
    }

    #[test]
    fn test_reselect_by_path() {
        let entries = vec![entry("/g/A.cue"), entry("/g/B.iso")];

        assert_eq!(
            reselect(&entries, Some(PathBuf::from("/g/B.iso"))),
            Some(PathBuf::from("/g/B.iso"))
        );
        assert_eq!(reselect(&entries, Some(PathBuf::from("/g/Gone.iso"))), None);
        assert_eq!(reselect(&entries, None), None);
    }

    #[test]
    fn test_settings_changes_are_persisted() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("config.json"));
        let mut app = App::with_store(store.clone());

        app.apply(Action::SetFullscreen(false));
        app.extra_args_text = "-r".to_string();
        app.apply(Action::SaveExtraArgs);

        let saved = store.load();
        assert!(!saved.fullscreen);
        assert_eq!(saved.extra_args, "-r");
    }

    #[test]
    fn test_rename_action_opens_dialog_with_base_name() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with_store(SettingsStore::new(dir.path().join("config.json")));

        app.apply(Action::BeginRename(PathBuf::from("/g/Final Fantasy VII.cue")));
        let dialog = app.rename_dialog.as_ref().unwrap();
        assert_eq!(dialog.name, "Final Fantasy VII");

        app.apply(Action::CancelRename);
        assert!(app.rename_dialog.is_none());
    }

    #[test]
    fn test_fresh_settings_open_setup() {
        let dir = TempDir::new().unwrap();
        let app = App::with_store(SettingsStore::new(dir.path().join("config.json")));
        assert_eq!(app.setup, Some(SetupStep::Folder));
    }

    #[test]
    fn test_setup_steps_stay_in_range() {
        let dir = TempDir::new().unwrap();
        let mut app = App::with_store(SettingsStore::new(dir.path().join("config.json")));

        app.apply(Action::SetupBack);
        assert_eq!(app.setup, Some(SetupStep::Folder));
        app.apply(Action::SetupNext);
        app.apply(Action::SetupNext);
        app.apply(Action::SetupNext);
        assert_eq!(app.setup, Some(SetupStep::Options));
        app.apply(Action::SetupBack);
        assert_eq!(app.setup, Some(SetupStep::Emulator));

        app.apply(Action::SetupCancel);
        assert!(app.setup.is_none());
        assert!(!SettingsStore::new(dir.path().join("config.json")).load().is_configured);
    }

    #[test]
    fn test_finish_setup_requires_folder_and_emulator() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("config.json"));
        let mut app = App::with_store(store.clone());

        assert!(app.finish_setup().is_err());
        app.update_settings(SettingsPatch {
            last_dir: Some(dir.path().display().to_string()),
            ..Default::default()
        });
        assert!(app.finish_setup().is_err());
        assert!(app.setup.is_some());
        assert!(!store.load().is_configured);
    }

    #[test]
    fn test_finish_setup_saves_configured_and_scans() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join("config.json"));
        let mut app = App::with_store(store.clone());

        app.update_settings(SettingsPatch {
            last_dir: Some(dir.path().display().to_string()),
            emulator_path: Some("/opt/psx/psxfin".to_string()),
            ..Default::default()
        });
        app.extra_args_text = "-r".to_string();
        app.finish_setup().unwrap();

        assert!(app.setup.is_none());
        assert!(app.scan_in_progress);
        assert_eq!(app.current_dir.as_deref(), Some(dir.path()));

        let saved = store.load();
        assert!(saved.is_configured);
        assert_eq!(saved.extra_args, "-r");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"isConfigured\": true"));
        assert!(App::with_store(store).setup.is_none());
    }

    #[test]
    fn test_load_image_from_bytes_rejects_garbage() {
        assert!(load_image_from_bytes(b"not an image").is_err());
    }
}
