//! File naming conventions and project config lookup.
//!
//! # Conventions
//!
//! - Definition file for module `M`: `M_ParamDef.json`
//! - Struct header for module `M`: `M_ParamStruct.h`
//! - Project config: `fwparam.toml` in the working directory, or
//!   `~/.config/fwparam/fwparam.toml` (Linux),
//!   `~/Library/Application Support/fwparam/fwparam.toml` (macOS),
//!   `%APPDATA%\fwparam\fwparam.toml` (Windows)

use std::path::{Path, PathBuf};

use crate::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "fwparam";

/// Suffix of parameter definition files.
pub const DEF_FILE_SUFFIX: &str = "_ParamDef.json";

/// Suffix of generated struct headers.
pub const STRUCT_HEADER_SUFFIX: &str = "_ParamStruct.h";

/// File name of the project configuration.
pub const PROJECT_CONFIG_FILE: &str = "fwparam.toml";

/// Definition file name for `module`.
///
/// ```rust
/// assert_eq!(fwparam_config::paths::def_file_name("WDRC"), "WDRC_ParamDef.json");
/// ```
pub fn def_file_name(module: &str) -> String {
    format!("{module}{DEF_FILE_SUFFIX}")
}

/// Struct header file name for `module`.
pub fn struct_header_name(module: &str) -> String {
    format!("{module}{STRUCT_HEADER_SUFFIX}")
}

/// Module name encoded in a definition file name, if it follows the convention.
pub fn module_name_from_def_file(path: &Path) -> Option<&str> {
    path.file_name()?
        .to_str()?
        .strip_suffix(DEF_FILE_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// List every definition file in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_def_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::read_dir(dir, e))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && module_name_from_def_file(path).is_some())
        .collect();

    files.sort();
    Ok(files)
}

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Find the project configuration file.
///
/// Searches in the following order:
/// 1. `explicit`, returned as given even if it does not exist, so that
///    loading it reports the missing file
/// 2. `fwparam.toml` in the current directory
/// 3. `fwparam.toml` in the user config directory
pub fn find_project_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(PROJECT_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let user = user_config_dir().join(PROJECT_CONFIG_FILE);
    if user.is_file() {
        return Some(user);
    }

    None
}

/// Ensure `dir` exists.
///
/// Creates the directory and any parent directories if they don't exist.
pub fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }
    Ok(())
}
