//! Configuration loading and root folder resolution
//!
//! The root folder holds everything the service writes, most importantly the
//! SQLite database. Resolution priority:
//! 1. Command-line argument (highest)
//! 2. `BALLOT_ROOT_FOLDER` environment variable
//! 3. `root_folder` key in the platform config file
//! 4. OS-dependent compiled default

use crate::Result;
use std::path::{Path, PathBuf};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "BALLOT_ROOT_FOLDER";

/// Database filename inside the root folder
pub const DATABASE_FILENAME: &str = "ballot.db";

/// Resolve the root folder following the priority order
///
/// Never fails: with nothing configured the platform default is used. The
/// returned path is not created here; see [`ensure_root_folder`].
pub fn resolve_root_folder(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = root_folder_from_config_file() {
        return path;
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Find the platform config file, if one exists
fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("ballot").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }
    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/ballot/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// Read `root_folder` from the config file, tolerating any parse failure
fn root_folder_from_config_file() -> Option<PathBuf> {
    let config_path = config_file_path()?;
    let toml_content = std::fs::read_to_string(&config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&toml_content).ok()?;
    config
        .get("root_folder")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/ballot (or /var/lib/ballot for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("ballot"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/ballot"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/ballot
        dirs::data_dir()
            .map(|d| d.join("ballot"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/ballot"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\ballot
        dirs::data_local_dir()
            .map(|d| d.join("ballot"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\ballot"))
    } else {
        PathBuf::from("./ballot_data")
    }
}

/// Database file path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILENAME)
}

/// Create the root folder if missing (idempotent)
pub fn ensure_root_folder(root_folder: &Path) -> Result<()> {
    std::fs::create_dir_all(root_folder)?;
    Ok(())
}
