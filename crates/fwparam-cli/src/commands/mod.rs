//! CLI command implementations.

pub mod common;
pub mod convert;
pub mod init;
pub mod params;
pub mod structs;
