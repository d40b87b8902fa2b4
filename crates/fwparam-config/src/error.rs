//! Error types for definition, value and project files.

use std::path::PathBuf;

use fwparam_core::ConvertError;
use thiserror::Error;

/// Errors that can occur while loading fwparam input files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to list a directory
    #[error("failed to read directory '{path}': {source}")]
    ReadDir {
        /// Path of the directory that could not be listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("failed to parse JSON in '{path}': {source}")]
    Json {
        /// File (or origin label) the JSON came from.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML in '{path}': {source}")]
    Toml {
        /// File (or origin label) the TOML came from.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A required descriptor key is absent
    #[error("{module}.{param}: missing key '{key}'")]
    MissingKey {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter name.
        param: String,
        /// Key that was expected.
        key: &'static str,
    },

    /// A descriptor key holds a value of the wrong shape
    #[error("{module}.{param}: invalid {key}: {reason}")]
    InvalidField {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter name.
        param: String,
        /// Offending key.
        key: &'static str,
        /// Description of what is wrong.
        reason: String,
    },

    /// Only one of `UserMin`/`UserMax` was given
    #[error("{module}.{param}: UserMin and UserMax must both be given or both be empty")]
    HalfSpecifiedRange {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter name.
        param: String,
    },

    /// A descriptor the converter cannot work with
    #[error("{module}.{param}: {source}")]
    Descriptor {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter name.
        param: String,
        /// What the converter rejected.
        #[source]
        source: ConvertError,
    },

    /// A parameter space other than `Persist` or `Profile`
    #[error("module '{module}': unknown parameter space '{space}'")]
    UnknownSpace {
        /// Module containing the space.
        module: String,
        /// Name of the space.
        space: String,
    },

    /// A definition file does not define the module it is named after
    #[error("module '{module}' not defined in '{path}'")]
    ModuleNotFound {
        /// Module that was looked up.
        module: String,
        /// Definition file that was searched.
        path: PathBuf,
    },

    /// A value file memory key other than `0`..`4`
    #[error("module '{module}': invalid memory '{memory}' (expected 0 for persist or 1-4 for a profile)")]
    InvalidMemory {
        /// Module containing the memory.
        module: String,
        /// The memory key as written.
        memory: String,
    },

    /// A value file entry that is not a number or has a malformed name
    #[error("{module}.{param}: {reason}")]
    InvalidValue {
        /// Module the entry belongs to.
        module: String,
        /// Entry name as written.
        param: String,
        /// Description of what is wrong.
        reason: String,
    },

    /// Invalid project configuration
    #[error("invalid project configuration: {0}")]
    InvalidConfig(String),
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create a read directory error.
    pub fn read_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        ConfigError::Json {
            path: path.into(),
            source,
        }
    }

    /// Create a TOML parse error.
    pub fn toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        ConfigError::Toml {
            path: path.into(),
            source,
        }
    }

    /// Create a missing key error.
    pub fn missing_key(module: &str, param: &str, key: &'static str) -> Self {
        ConfigError::MissingKey {
            module: module.to_string(),
            param: param.to_string(),
            key,
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(
        module: &str,
        param: &str,
        key: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidField {
            module: module.to_string(),
            param: param.to_string(),
            key,
            reason: reason.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(module: &str, param: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            module: module.to_string(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }
}
