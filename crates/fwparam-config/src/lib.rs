//! Input files for fwparam code generation.
//!
//! This crate reads everything the generators consume and resolves it into
//! `fwparam-core` types:
//!
//! # Features
//!
//! - **Definitions**: `<Module>_ParamDef.json` files, resolved into
//!   [`ParamDescriptor`](fwparam_core::ParamDescriptor)s at load time
//! - **Values**: per-module, per-memory user values to initialize
//! - **Project config**: `fwparam.toml` with paths, profile, rounding and
//!   system constant overrides
//! - **Paths**: file naming conventions and config lookup
//!
//! Key order of every JSON object is preserved. A key written twice keeps
//! its first position and its last value.
//!
//! # Example
//!
//! ```rust
//! use fwparam_config::{DefFile, MemorySpace};
//! use fwparam_core::SystemConstants;
//!
//! let json = r#"{"WDRC": {"Persist": {"AtkTC": {
//!     "FractBits": 23, "UserMax": 1000, "UserMin": 0,
//!     "List": "", "DSPConvert": "WdrcTC", "Elements": 1}}}}"#;
//!
//! let file = DefFile::from_json(json, "WDRC_ParamDef.json", &SystemConstants::DEFAULT).unwrap();
//! let atk = file.module("WDRC").unwrap().param(MemorySpace::Persist, "AtkTC").unwrap();
//! assert_eq!(atk.descriptor.format.fract_bits(), 23);
//! ```

mod error;

/// File naming conventions and config lookup.
pub mod paths;

/// Parameter definition files.
pub mod definition;

/// Parameter value files.
pub mod values;

/// Project configuration.
pub mod project;

pub use definition::{DefFile, Elements, MemorySpace, ModuleDefs, ParamDef, ParamSpace};
pub use error::ConfigError;
pub use project::{ConstantOverrides, ProjectConfig, RoundingMode, check_profile};
pub use values::{MAX_PROFILES, Memory, MemoryBlock, ModuleValues, ValueEntry, ValueFile};

use std::path::Path;

use serde_json::{Map, Value};

/// Parse `json` as an object of objects, in file order.
fn json_objects(json: &str, origin: &Path) -> Result<Map<String, Value>, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::json(origin, e))
}

/// Reinterpret a nested value as an object.
fn json_object(value: Value, origin: &Path) -> Result<Map<String, Value>, ConfigError> {
    serde_json::from_value(value).map_err(|e| ConfigError::json(origin, e))
}
