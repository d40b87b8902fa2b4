//! C code generation for fwparam.
//!
//! Two generators share the definitions loaded by `fwparam-config`:
//!
//! - [`struct_header`] / [`struct_headers`] - one `<Module>_ParamStruct.h`
//!   per module declaring its `Persist_<Module>`/`Profile_<Module>` structs
//! - [`InitGenerator`] - the `FW_Param_Init()` function assigning converted
//!   values from a value file
//!
//! Output is deterministic: no timestamps, and order follows the input files.

mod banner;
mod error;
mod header;
mod init;
mod literal;

pub use banner::banner;
pub use error::CodegenError;
pub use header::{HeaderFile, struct_header, struct_headers, write_headers};
pub use init::{InitGenerator, InitOutput, RangeDiagnostic};
pub use literal::{c_literal, c_type, format_real};
