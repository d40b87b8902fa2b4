//! Error types for code generation.

use fwparam_config::{ConfigError, MemorySpace};
use fwparam_core::ConvertError;
use thiserror::Error;

/// Errors that abort a generation batch.
///
/// Generation is all-or-nothing: any of these means no output is written.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Loading or writing files failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The converter rejected a descriptor
    #[error("{module}.{param}: {source}")]
    Convert {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter as written in the value file.
        param: String,
        /// Converter error.
        #[source]
        source: ConvertError,
    },

    /// A value converted to an undefined firmware value
    #[error("{module}.{param}: value {value} is not a legal value, refusing to emit")]
    InvalidValue {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter as written in the value file.
        param: String,
        /// The user value that was rejected.
        value: f64,
    },

    /// A value file entry with no matching definition
    #[error("{module}: no parameter '{param}' in {space} definitions")]
    UnknownParam {
        /// Module the entry belongs to.
        module: String,
        /// Space the entry was looked up in.
        space: MemorySpace,
        /// Parameter name without index.
        param: String,
    },

    /// An index suffix on a single-element parameter
    #[error("{module}.{param}: parameter is not an array")]
    IndexOnScalar {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter as written in the value file.
        param: String,
    },

    /// An array parameter assigned without an index
    #[error("{module}.{param}: array parameter needs an index")]
    MissingIndex {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter name.
        param: String,
    },

    /// A literal index past the declared element count
    #[error("{module}.{param}: index {index} out of range for {count} elements")]
    IndexOutOfRange {
        /// Module the parameter belongs to.
        module: String,
        /// Parameter as written in the value file.
        param: String,
        /// Index given.
        index: u32,
        /// Declared element count.
        count: u32,
    },
}
