//! Emulator launching

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use super::shell::spawn_reaped;
use super::LibraryError;
use crate::config::Settings;

/// Where to get the DirectX 9 runtime the emulator needs on Windows
pub const DIRECTX_DOWNLOAD_URL: &str = "https://www.microsoft.com/en-us/download/details.aspx?id=35";

const DIRECTX_DLL: &str = "d3dx9_26.dll";

/// Build the emulator command line for a disc image
///
/// `-f` when fullscreen is on, then the extra arguments, then the image.
pub fn launch_args(settings: &Settings, rom: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if settings.fullscreen {
        args.push("-f".into());
    }
    args.extend(settings.extra_args.split_whitespace().map(OsString::from));
    args.push(rom.as_os_str().to_os_string());
    args
}

/// Whether a Windows install lacks the DirectX 9 helper library
///
/// Without a Windows directory there is nothing to check.
pub fn directx_missing(windir: Option<&Path>) -> bool {
    match windir {
        Some(windir) => !windir.join("System32").join(DIRECTX_DLL).exists(),
        None => false,
    }
}

/// Start the configured emulator on a disc image
///
/// The emulator runs from its own directory and is not waited on.
pub fn launch(settings: &Settings, rom: &Path) -> Result<(), LibraryError> {
    let emulator = settings.emulator().ok_or(LibraryError::EmulatorNotConfigured)?;

    let windir = std::env::var_os("WINDIR");
    if directx_missing(windir.as_deref().map(Path::new)) {
        return Err(LibraryError::MissingDirectX(DIRECTX_DOWNLOAD_URL));
    }

    let args = launch_args(settings, rom);
    log::info!("Launching {} {:?}", emulator.display(), args);

    let mut command = Command::new(emulator);
    command
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    if let Some(dir) = emulator.parent().filter(|d| !d.as_os_str().is_empty()) {
        command.current_dir(dir);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const DETACHED_PROCESS: u32 = 0x0000_0008;
        const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
        command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    spawn_reaped(&mut command).map_err(|source| LibraryError::Spawn {
        program: emulator.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn settings(fullscreen: bool, extra_args: &str) -> Settings {
        Settings {
            emulator_path: "/opt/psx/psxfin".to_string(),
            fullscreen,
            extra_args: extra_args.to_string(),
            ..Default::default()
        }
    }

    fn os(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_launch_args_fullscreen_and_extras() {
        let args = launch_args(&settings(true, "  -r   -x 2 "), Path::new("/games/Game.cue"));
        assert_eq!(args, os(&["-f", "-r", "-x", "2", "/games/Game.cue"]));
    }

    #[test]
    fn test_launch_args_windowed_without_extras() {
        let args = launch_args(&settings(false, ""), Path::new("/games/My Game.iso"));
        assert_eq!(args, os(&["/games/My Game.iso"]));
    }

    #[test]
    fn test_launch_requires_emulator() {
        let settings = Settings::default();
        let result = launch(&settings, Path::new("/games/Game.cue"));
        assert!(matches!(result, Err(LibraryError::EmulatorNotConfigured)));
    }

    #[test]
    fn test_directx_check() {
        let dir = TempDir::new().unwrap();
        assert!(!directx_missing(None));
        assert!(directx_missing(Some(dir.path())));

        let system32 = dir.path().join("System32");
        std::fs::create_dir(&system32).unwrap();
        std::fs::write(system32.join("d3dx9_26.dll"), b"").unwrap();
        assert!(!directx_missing(Some(dir.path())));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_reports_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let settings = Settings {
            emulator_path: dir.path().join("no-such-emulator").display().to_string(),
            ..Default::default()
        };
        match launch(&settings, Path::new("/games/Game.cue")) {
            Err(LibraryError::Spawn { program, .. }) => {
                assert_eq!(program, PathBuf::from(&settings.emulator_path));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
