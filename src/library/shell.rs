//! Platform file manager integration

use std::path::Path;
use std::io;
use std::process::{Command, ExitStatus};
use std::thread::{self, JoinHandle};

use super::LibraryError;

/// Reveal a directory in the platform file manager
pub fn open_folder(path: &Path) -> Result<(), LibraryError> {
    if !path.is_dir() {
        return Err(LibraryError::Open {
            path: path.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let program = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };

    let mut command = Command::new(program);
    command.arg(path);
    spawn_reaped(&mut command).map_err(|e| LibraryError::Open {
        path: path.to_path_buf(),
        message: format!("{}: {}", program, e),
    })?;

    log::debug!("Opened {} with {}", path.display(), program);
    Ok(())
}

/// Start a process without waiting for it
///
/// A thread waits on the child so it never lingers as a zombie. The handle
/// yields the exit status.
pub(crate) fn spawn_reaped(command: &mut Command) -> io::Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = command.spawn()?;
    Ok(thread::spawn(move || match child.wait() {
        Ok(status) => {
            log::debug!("Process {} exited with {}", child.id(), status);
            Some(status)
        }
        Err(e) => {
            log::warn!("Failed to wait for process {}: {}", child.id(), e);
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_spawned_process_is_waited_on() {
        let handle = spawn_reaped(&mut Command::new("true")).unwrap();
        let status = handle.join().unwrap();
        assert!(status.map(|s| s.success()).unwrap_or(false));
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        assert!(spawn_reaped(&mut Command::new(dir.path().join("missing-program"))).is_err());
    }

    #[test]
    fn test_open_folder_rejects_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Game.iso");
        std::fs::write(&file, b"").unwrap();

        assert!(matches!(open_folder(&file), Err(LibraryError::Open { .. })));
        assert!(matches!(
            open_folder(&dir.path().join("missing")),
            Err(LibraryError::Open { .. })
        ));
    }
}
