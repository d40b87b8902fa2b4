//! Conversion errors.

use alloc::string::String;

use crate::expr::ExprError;

/// A descriptor that cannot produce a firmware value.
///
/// These are configuration errors: the batch driver must stop rather than
/// emit a plausible-looking constant. Values that merely fall outside a legal
/// set are not errors; they come back as
/// [`FirmwareValue::Invalid`](crate::FirmwareValue::Invalid).
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// A step list was declared without `UserMin`/`UserMax` to step between.
    StepWithoutRange,
    /// A step list with a zero, negative or non-finite step.
    NonPositiveStep(f64),
    /// A list entry whose value part is not an integer.
    InvalidListEntry(String),
    /// A conversion selector that is neither a known formula nor a valid
    /// scale expression.
    Expression(ExprError),
    /// A scale factor that is infinite or NaN.
    NonFiniteScale(f64),
    /// Fractional bits outside `0..=23`.
    FractBitsOutOfRange(i64),
    /// Only one of `UserMin`/`UserMax` was given.
    HalfSpecifiedRange,
}

impl core::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::StepWithoutRange => write!(f, "step list requires UserMin and UserMax"),
            Self::NonPositiveStep(step) => write!(f, "step list has non-positive step {step}"),
            Self::InvalidListEntry(entry) => write!(f, "invalid list entry '{entry}'"),
            Self::Expression(err) => write!(f, "invalid conversion: {err}"),
            Self::NonFiniteScale(k) => write!(f, "scale factor {k} is not finite"),
            Self::FractBitsOutOfRange(bits) => {
                write!(f, "fractional bits {bits} outside 0..=23")
            }
            Self::HalfSpecifiedRange => {
                write!(f, "UserMin and UserMax must both be given or both be empty")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Expression(err) => Some(err),
            _ => None,
        }
    }
}
