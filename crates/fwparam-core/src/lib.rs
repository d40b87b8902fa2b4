//! fwparam Core - parameter value conversion for 24-bit fixed-point firmware
//!
//! This crate turns tunable parameters expressed in user units (milliseconds,
//! dB SPL, dB/s, plain integers) into the values a 24-bit fixed-point DSP
//! firmware stores, with bounds checking against both the user-declared range
//! and the numeric range of the chosen fixed-point format.
//!
//! # Core Abstractions
//!
//! ## Descriptors
//!
//! - [`ParamDescriptor`] - Format, bounds, legal values and conversion of one parameter
//! - [`FixedPointFormat`] - Fractional bit count in a 24-bit signed word
//! - [`LegalValues`] - Step or explicit list of admitted user values
//!
//! ## Conversion
//!
//! - [`UnitConversion`] - Named formulas (`WdrcTC`, `Input_dB_SPL`, ...) and scale factors
//! - [`Converter`] - Limits, legality check, conversion, clamping and quantization
//! - [`evaluate`] - Arithmetic over named system constants, for scale expressions
//!
//! ## System Constants
//!
//! - [`SystemConstants`] - Sample rates, decimation factors and full-scale levels
//!   the formulas depend on
//!
//! # no_std Support
//!
//! The conversion engine has no I/O and builds without `std`:
//!
//! ```toml
//! [dependencies]
//! fwparam-core = { version = "0.1", default-features = false }
//! ```
//!
//! Enable the `tracing` feature to log range corrections and legal-list misses.
//!
//! # Example
//!
//! ```rust
//! use fwparam_core::{Converter, FirmwareValue, ParamDescriptor, SystemConstants, UnitConversion};
//!
//! let sys = SystemConstants::DEFAULT;
//! let converter = Converter::new(&sys);
//!
//! let attack = ParamDescriptor::fixed(23)
//!     .unwrap()
//!     .with_range(1.0, 1000.0)
//!     .with_conversion(UnitConversion::WdrcTimeConstant);
//!
//! let result = converter.convert(12.0, &attack, "AttackTime").unwrap();
//! let FirmwareValue::Fractional(coeff) = result.value else { panic!() };
//! assert!((coeff - 0.1993).abs() < 1e-3);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod constants;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod expr;
pub mod fixed_point;
pub mod formula;
pub mod legal;

// Re-export main types at crate root
pub use constants::{
    DB10_TO_LOG2, DB20_TO_LOG2, LOG2_TO_DB10, LOG2_TO_DB20, MAX_FRACT_BITS, SystemConstants,
};
pub use convert::{ConversionResult, Converter, FirmwareValue, IntegerRounding, convert};
pub use descriptor::{ParamDescriptor, UserRange};
pub use error::ConvertError;
pub use expr::{ExprError, ExprErrorKind, evaluate};
pub use fixed_point::{FixedPointFormat, Limits, RangeViolation};
pub use formula::{UnitConversion, time_constant_coeff};
pub use legal::{LegalEntry, LegalValues};
