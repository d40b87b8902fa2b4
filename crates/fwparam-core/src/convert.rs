//! The parameter value converter.
//!
//! [`Converter::convert`] turns one user-unit value into a bounds-checked
//! firmware value:
//!
//! 1. Derive firmware limits (from the format, or by converting the user
//!    bounds with the parameter's own formula).
//! 2. Check the value against the legal set, if any. A miss poisons the
//!    value (it continues as NaN) and sets `invalid_list`.
//! 3. Convert the value to firmware units.
//! 4. Reorder the limits if the formula inverted them and clamp.
//! 5. Quantize integer parameters.
//!
//! The result is never a silent NaN: an undefined value comes back as
//! [`FirmwareValue::Invalid`], which code generators must refuse to emit.

use libm::{round, trunc};

use crate::constants::SystemConstants;
use crate::descriptor::ParamDescriptor;
use crate::error::ConvertError;
use crate::fixed_point::{Limits, RangeViolation};

/// How integer parameters (`F = 0`) are quantized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegerRounding {
    /// Drop the fractional part (toward zero).
    #[default]
    Truncate,
    /// Round to nearest, halves away from zero.
    Nearest,
}

impl IntegerRounding {
    /// Apply the rounding mode.
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Truncate => trunc(value),
            Self::Nearest => round(value),
        }
    }
}

/// A converted firmware value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirmwareValue {
    /// Value of an integer parameter.
    Integer(i64),
    /// Value of a fixed-point parameter, before quantization to the word.
    Fractional(f64),
    /// The value is undefined and must not be emitted.
    Invalid,
}

impl FirmwareValue {
    /// Returns `true` for [`Invalid`](Self::Invalid).
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// Numeric value, or `None` if invalid.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Integer(v) => Some(v as f64),
            Self::Fractional(v) => Some(v),
            Self::Invalid => None,
        }
    }
}

impl core::fmt::Display for FirmwareValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Fractional(v) => write!(f, "{v}"),
            Self::Invalid => f.write_str("invalid"),
        }
    }
}

/// Outcome of one conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    /// The firmware value.
    pub value: FirmwareValue,
    /// Set when the value had to be clamped.
    pub range: Option<RangeViolation>,
    /// Set when the user value was not in the declared legal set.
    pub invalid_list: bool,
    /// Firmware-unit limits the value was checked against.
    pub limits: Limits,
}

impl ConversionResult {
    /// Returns `true` if the conversion needed no correction.
    pub fn is_clean(&self) -> bool {
        self.range.is_none() && !self.invalid_list && !self.value.is_invalid()
    }
}

/// Stateless converter bound to a set of system constants.
///
/// # Example
///
/// ```rust
/// use fwparam_core::{Converter, FirmwareValue, ParamDescriptor, RangeViolation, SystemConstants};
///
/// let sys = SystemConstants::DEFAULT;
/// let converter = Converter::new(&sys);
///
/// let desc = ParamDescriptor::integer();
/// let result = converter.convert(5.0, &desc, "GlobalA").unwrap();
/// assert_eq!(result.value, FirmwareValue::Integer(5));
/// assert!(result.is_clean());
///
/// let q20 = ParamDescriptor::fixed(20).unwrap();
/// let result = converter.convert(9.2, &q20, "Gain").unwrap();
/// assert_eq!(result.range, Some(RangeViolation::AboveMax));
/// assert_eq!(result.value, FirmwareValue::Fractional(result.limits.max));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    constants: &'a SystemConstants,
    rounding: IntegerRounding,
}

impl<'a> Converter<'a> {
    /// Create a converter that truncates integer parameters.
    pub fn new(constants: &'a SystemConstants) -> Self {
        Self {
            constants,
            rounding: IntegerRounding::default(),
        }
    }

    /// Set the integer rounding mode.
    pub fn with_rounding(mut self, rounding: IntegerRounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// The constants this converter uses.
    pub fn constants(&self) -> &'a SystemConstants {
        self.constants
    }

    /// The integer rounding mode.
    pub fn rounding(&self) -> IntegerRounding {
        self.rounding
    }

    /// Convert `user_value` for the parameter described by `desc`.
    ///
    /// `name` identifies the parameter in diagnostics. Range violations are
    /// corrected and reported in the result; values outside the legal set
    /// come back as [`FirmwareValue::Invalid`]. Only malformed descriptors
    /// return `Err`.
    pub fn convert(
        &self,
        user_value: f64,
        desc: &ParamDescriptor,
        name: &str,
    ) -> Result<ConversionResult, ConvertError> {
        let limits = desc.firmware_limits(self.constants);

        let mut invalid_list = false;
        let mut user_value = user_value;
        if let Some(legal) = &desc.legal
            && !legal.admits(user_value, desc.user_range)?
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(param = name, value = user_value, "value not found in legal list");
            invalid_list = true;
            user_value = f64::NAN;
        }

        let fw_value = desc.conversion.apply(user_value, self.constants);
        let (fw_value, range) = limits.clamp(fw_value);

        log_violation(name, range, &limits);

        let value = if fw_value.is_nan() {
            FirmwareValue::Invalid
        } else if desc.format.is_integer() {
            FirmwareValue::Integer(self.rounding.apply(fw_value) as i64)
        } else {
            FirmwareValue::Fractional(fw_value)
        };

        Ok(ConversionResult {
            value,
            range,
            invalid_list,
            limits,
        })
    }
}

#[cfg(feature = "tracing")]
fn log_violation(name: &str, range: Option<RangeViolation>, limits: &Limits) {
    match range {
        Some(RangeViolation::AboveMax) => {
            tracing::warn!(param = name, limit = limits.max, "out of bounds above max, limiting");
        }
        Some(RangeViolation::BelowMin) => {
            tracing::warn!(param = name, limit = limits.min, "out of bounds below min, limiting");
        }
        None => {}
    }
}

#[cfg(not(feature = "tracing"))]
fn log_violation(_name: &str, _range: Option<RangeViolation>, _limits: &Limits) {}

/// Convert with the default system constants and truncating rounding.
///
/// Shorthand for `Converter::new(&SystemConstants::DEFAULT).convert(..)`.
pub fn convert(
    user_value: f64,
    desc: &ParamDescriptor,
    name: &str,
) -> Result<ConversionResult, ConvertError> {
    Converter::new(&SystemConstants::DEFAULT).convert(user_value, desc, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::UnitConversion;
    use crate::legal::LegalEntry;
    use alloc::vec;

    #[test]
    fn plain_integer_passes_through() {
        let result = convert(5.0, &ParamDescriptor::integer(), "GlobalA").unwrap();
        assert_eq!(result.value, FirmwareValue::Integer(5));
        assert!(result.range.is_none());
        assert!(!result.invalid_list);
        assert_eq!(result.limits, Limits::new(-8_388_608.0, 8_388_607.0));
    }

    #[test]
    fn integer_truncates_toward_zero() {
        let desc = ParamDescriptor::integer();
        assert_eq!(convert(2.9, &desc, "p").unwrap().value, FirmwareValue::Integer(2));
        assert_eq!(convert(-2.9, &desc, "p").unwrap().value, FirmwareValue::Integer(-2));
    }

    #[test]
    fn integer_nearest_rounding() {
        let sys = SystemConstants::DEFAULT;
        let converter = Converter::new(&sys).with_rounding(IntegerRounding::Nearest);
        let desc = ParamDescriptor::integer();
        assert_eq!(converter.convert(2.5, &desc, "p").unwrap().value, FirmwareValue::Integer(3));
        assert_eq!(converter.convert(-2.5, &desc, "p").unwrap().value, FirmwareValue::Integer(-3));
        assert_eq!(converter.convert(2.4, &desc, "p").unwrap().value, FirmwareValue::Integer(2));
    }

    #[test]
    fn wdrc_time_constant_12ms() {
        let desc = ParamDescriptor::fixed(23)
            .unwrap()
            .with_conversion(UnitConversion::WdrcTimeConstant);
        let result = convert(12.0, &desc, "AtkTC").unwrap();
        let FirmwareValue::Fractional(v) = result.value else {
            panic!("expected fractional value, got {:?}", result.value);
        };
        assert!((v - 0.19926).abs() < 1e-4, "got {v}");
        assert!(result.is_clean());
    }

    #[test]
    fn clamps_above_derived_max() {
        let desc = ParamDescriptor::fixed(20).unwrap();
        let result = convert(9.2, &desc, "Gain").unwrap();
        let max = 8.0 - 1.0 / 1_048_576.0;
        assert_eq!(result.value, FirmwareValue::Fractional(max));
        assert_eq!(result.range, Some(RangeViolation::AboveMax));
    }

    #[test]
    fn clamps_below_user_min() {
        let desc = ParamDescriptor::integer().with_range(0.0, 100.0);
        let result = convert(-4.0, &desc, "Count").unwrap();
        assert_eq!(result.value, FirmwareValue::Integer(0));
        assert_eq!(result.range, Some(RangeViolation::BelowMin));
    }

    #[test]
    fn clamps_against_reordered_time_constant_limits() {
        // 0.5 ms is shorter than UserMin, so the coefficient exceeds the
        // coefficient of UserMin, which becomes the upper limit.
        let desc = ParamDescriptor::fixed(23)
            .unwrap()
            .with_range(1.0, 1000.0)
            .with_conversion(UnitConversion::WdrcTimeConstant);
        let result = convert(0.5, &desc, "RelTC").unwrap();
        assert_eq!(result.range, Some(RangeViolation::AboveMax));
        let expected = UnitConversion::WdrcTimeConstant.apply(1.0, &SystemConstants::DEFAULT);
        assert_eq!(result.value, FirmwareValue::Fractional(expected));
    }

    #[test]
    fn integer_truncates_after_clamping() {
        let desc = ParamDescriptor::integer().with_range(0.5, 10.0);
        let result = convert(0.25, &desc, "p").unwrap();
        assert_eq!(result.range, Some(RangeViolation::BelowMin));
        assert_eq!(result.value, FirmwareValue::Integer(0));

        let result = convert(0.5, &desc, "p").unwrap();
        assert_eq!(result.range, None);
        assert_eq!(result.value, FirmwareValue::Integer(0));

        let nearest = Converter::new(&SystemConstants::DEFAULT)
            .with_rounding(IntegerRounding::Nearest)
            .convert(0.25, &desc, "p")
            .unwrap();
        assert_eq!(nearest.value, FirmwareValue::Integer(1));
    }

    #[test]
    fn step_list_rejects_non_members() {
        let desc = ParamDescriptor::integer().with_range(0.0, 20.0).with_step(5.0);
        let bad = convert(7.0, &desc, "Mode").unwrap();
        assert!(bad.invalid_list);
        assert_eq!(bad.value, FirmwareValue::Invalid);
        assert!(bad.range.is_none());

        let good = convert(10.0, &desc, "Mode").unwrap();
        assert!(!good.invalid_list);
        assert_eq!(good.value, FirmwareValue::Integer(10));
    }

    #[test]
    fn explicit_list_rejects_non_members() {
        let desc = ParamDescriptor::integer().with_list(vec![
            LegalEntry::new(0).with_label("Off"),
            LegalEntry::new(2).with_label("Fast"),
        ]);
        assert_eq!(convert(2.0, &desc, "Speed").unwrap().value, FirmwareValue::Integer(2));
        let bad = convert(1.0, &desc, "Speed").unwrap();
        assert!(bad.invalid_list);
        assert!(bad.value.is_invalid());
    }

    #[test]
    fn step_without_range_is_an_error() {
        let desc = ParamDescriptor::integer().with_step(1.0);
        assert_eq!(
            convert(1.0, &desc, "p").unwrap_err(),
            ConvertError::StepWithoutRange
        );
    }

    #[test]
    fn nan_input_is_invalid() {
        let result = convert(f64::NAN, &ParamDescriptor::integer(), "p").unwrap();
        assert_eq!(result.value, FirmwareValue::Invalid);
        assert!(result.value.as_f64().is_none());
    }

    #[test]
    fn scale_conversion_with_user_bounds() {
        let desc = ParamDescriptor::fixed(16)
            .unwrap()
            .with_range(0.0, 10.0)
            .with_conversion(UnitConversion::Scale(0.5));
        let result = convert(4.0, &desc, "Slope").unwrap();
        assert_eq!(result.value, FirmwareValue::Fractional(2.0));
        assert_eq!(result.limits, Limits::new(0.0, 5.0));

        let clamped = convert(12.0, &desc, "Slope").unwrap();
        assert_eq!(clamped.value, FirmwareValue::Fractional(5.0));
        assert_eq!(clamped.range, Some(RangeViolation::AboveMax));
    }

    #[test]
    fn infinite_input_clamps() {
        let desc = ParamDescriptor::fixed(23).unwrap();
        let result = convert(f64::INFINITY, &desc, "p").unwrap();
        assert_eq!(result.range, Some(RangeViolation::AboveMax));
        assert_eq!(result.value, FirmwareValue::Fractional(result.limits.max));
    }
}
