//! Platform directories for birokt.
//!
//! Single place that decides where config, aliases, saved inspections and
//! sockets live.
//!
//! # Platform Behavior
//!
//! | Platform | Config | Data | Sockets |
//! |----------|--------|------|---------|
//! | Linux    | `~/.config/birokt` | `~/.local/share/birokt` | `$XDG_RUNTIME_DIR` or data dir |
//! | macOS    | `~/Library/Application Support/birokt` | same | same |
//! | Windows  | `%APPDATA%/birokt` | same | unsupported |

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not determine data directory")]
    NoDataDirectory,

    #[error("Could not determine config directory")]
    NoConfigDirectory,
}

const APP_NAME: &str = "birokt";

/// Transcript/control socket
const IPC_SOCKET_NAME: &str = "birokt.sock";

/// UI event socket
const UI_SOCKET_NAME: &str = "birokt_ui.sock";

const CONFIG_FILE_NAME: &str = "config.toml";
const ALIAS_FILE_NAME: &str = "aliases.toml";

/// Create `dir` (and parents) if missing. New directories get mode 0o700.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to set permissions on {}", dir.display()))?;
    }

    Ok(())
}

/// Application data directory, created on first use.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or(PathError::NoDataDirectory)?
        .join(APP_NAME);
    ensure_dir(&data_dir)?;
    Ok(data_dir)
}

/// Configuration directory.
///
/// Linux follows XDG (`~/.config/birokt`); elsewhere config lives with data.
pub fn get_config_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let config_dir = dirs::config_dir()
            .ok_or(PathError::NoConfigDirectory)?
            .join(APP_NAME);
        ensure_dir(&config_dir)?;
        Ok(config_dir)
    }

    #[cfg(not(target_os = "linux"))]
    {
        get_data_dir()
    }
}

/// Directory for Unix sockets.
///
/// Prefers `$XDG_RUNTIME_DIR` on Linux.
pub fn get_socket_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Some(runtime_dir) = dirs::runtime_dir() {
            if runtime_dir.exists() {
                return Ok(runtime_dir);
            }
        }
    }

    get_data_dir()
}

pub fn get_ipc_socket_path() -> Result<PathBuf> {
    Ok(get_socket_dir()?.join(IPC_SOCKET_NAME))
}

pub fn get_ui_socket_path() -> Result<PathBuf> {
    Ok(get_socket_dir()?.join(UI_SOCKET_NAME))
}

pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Per-user phrase aliases, next to the config file
pub fn get_alias_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(ALIAS_FILE_NAME))
}

/// Saved inspections: `<data_dir>/inspections`
pub fn get_inspections_dir() -> Result<PathBuf> {
    let dir = get_data_dir()?.join("inspections");
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Restrict a socket to its owner (0o600). No-op off Unix.
#[cfg(unix)]
pub fn secure_socket_permissions(socket_path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if socket_path.exists() {
        fs::set_permissions(socket_path, fs::Permissions::from_mode(0o600)).with_context(
            || format!("Failed to set socket permissions: {}", socket_path.display()),
        )?;
    }

    Ok(())
}

#[cfg(not(unix))]
pub fn secure_socket_permissions(_socket_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());

        // Second call is a no-op
        ensure_dir(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_ensure_dir_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("private");
        ensure_dir(&dir).unwrap();

        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_socket_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("test.sock");
        fs::write(&path, b"").unwrap();

        secure_socket_permissions(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        // Missing file is fine
        secure_socket_permissions(&tmp.path().join("missing.sock")).unwrap();
    }

    #[test]
    fn test_socket_file_names() {
        let ipc = get_ipc_socket_path().expect("Should get IPC socket path");
        let ui = get_ui_socket_path().expect("Should get UI socket path");
        assert!(ipc.ends_with("birokt.sock"));
        assert!(ui.ends_with("birokt_ui.sock"));
        assert_eq!(ipc.parent(), ui.parent());
    }

    #[test]
    fn test_alias_file_next_to_config() {
        let config = get_config_file_path().expect("Should get config path");
        let aliases = get_alias_file_path().expect("Should get alias path");
        assert_eq!(config.parent(), aliases.parent());
        assert!(aliases.ends_with("aliases.toml"));
    }

    #[test]
    fn test_inspections_dir() {
        let dir = get_inspections_dir().expect("Should get inspections directory");
        assert!(dir.exists());
        assert!(dir.ends_with("inspections"));
    }
}
