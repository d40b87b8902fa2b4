//! Parameter descriptors.
//!
//! A [`ParamDescriptor`] is everything the converter needs to know about one
//! parameter: its fixed-point format, optional user-unit bounds, optional
//! discrete legal values, and the resolved unit conversion. Descriptors are
//! built once when definition files are loaded and then reused for every
//! value converted.

use crate::constants::SystemConstants;
use crate::error::ConvertError;
use crate::fixed_point::{FixedPointFormat, Limits};
use crate::formula::UnitConversion;
use crate::legal::{LegalEntry, LegalValues};

use alloc::vec::Vec;

/// Inclusive bounds in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserRange {
    /// `UserMin`.
    pub min: f64,
    /// `UserMax`.
    pub max: f64,
}

impl UserRange {
    /// Create a range from `UserMin` and `UserMax`.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Build a range from two optional bounds.
    ///
    /// Both absent gives `Ok(None)`; exactly one present is an error.
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Result<Option<Self>, ConvertError> {
        match (min, max) {
            (Some(min), Some(max)) => Ok(Some(Self::new(min, max))),
            (None, None) => Ok(None),
            _ => Err(ConvertError::HalfSpecifiedRange),
        }
    }
}

/// Declarative description of one tunable parameter.
///
/// # Example
///
/// ```rust
/// use fwparam_core::{ParamDescriptor, UnitConversion};
///
/// // Attack time: 0..1000 ms, stored as a Q0.23 smoothing coefficient.
/// let attack = ParamDescriptor::fixed(23)
///     .unwrap()
///     .with_range(0.0, 1000.0)
///     .with_conversion(UnitConversion::WdrcTimeConstant);
/// assert!(!attack.format.is_integer());
///
/// // Enable switch restricted to 0 or 1.
/// let enable = ParamDescriptor::integer().with_range(0.0, 1.0).with_step(1.0);
/// assert!(enable.format.is_integer());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamDescriptor {
    /// Fixed-point layout of the firmware value.
    pub format: FixedPointFormat,
    /// `UserMin`/`UserMax`, if declared.
    pub user_range: Option<UserRange>,
    /// Discrete legal values, if declared.
    pub legal: Option<LegalValues>,
    /// Conversion from user units to firmware units.
    pub conversion: UnitConversion,
}

impl ParamDescriptor {
    /// An unbounded integer parameter with no conversion.
    pub fn integer() -> Self {
        Self::default()
    }

    /// An unbounded fixed-point parameter with `fract_bits` fractional bits.
    pub fn fixed(fract_bits: u8) -> Result<Self, ConvertError> {
        let format = FixedPointFormat::new(fract_bits)
            .ok_or(ConvertError::FractBitsOutOfRange(i64::from(fract_bits)))?;
        Ok(Self {
            format,
            ..Self::default()
        })
    }

    /// Set the user-unit bounds.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.user_range = Some(UserRange::new(min, max));
        self
    }

    /// Restrict values to every `step` between the user bounds.
    pub fn with_step(mut self, step: f64) -> Self {
        self.legal = Some(LegalValues::Step(step));
        self
    }

    /// Restrict values to an explicit list.
    pub fn with_list(mut self, entries: Vec<LegalEntry>) -> Self {
        self.legal = Some(LegalValues::List(entries));
        self
    }

    /// Set the unit conversion.
    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Firmware-unit limits, ordered so that `min <= max`.
    ///
    /// Without user bounds the limits are the full range of the fixed-point
    /// format, used as-is. With user bounds each bound is passed through the
    /// same conversion as the value.
    pub fn firmware_limits(&self, constants: &SystemConstants) -> Limits {
        match self.user_range {
            None => self.format.limits(),
            Some(range) => Limits::new(
                self.conversion.apply(range.min, constants),
                self.conversion.apply(range.max, constants),
            )
            .ordered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS: SystemConstants = SystemConstants::DEFAULT;

    #[test]
    fn unbounded_limits_come_from_format() {
        let desc = ParamDescriptor::fixed(20).unwrap();
        let limits = desc.firmware_limits(&SYS);
        assert_eq!(limits.max, 8.0 - 1.0 / 1_048_576.0);
        assert_eq!(limits.min, -8.0);
    }

    #[test]
    fn user_limits_go_through_conversion() {
        let desc = ParamDescriptor::fixed(16)
            .unwrap()
            .with_range(40.0, 110.0)
            .with_conversion(UnitConversion::InputDbSpl);
        let limits = desc.firmware_limits(&SYS);
        assert_eq!(limits.max, 0.0);
        assert!((limits.min - (-70.0 * crate::constants::DB20_TO_LOG2)).abs() < 1e-12);
    }

    #[test]
    fn decreasing_conversion_limits_are_reordered() {
        // Longer time constants give smaller coefficients.
        let desc = ParamDescriptor::fixed(23)
            .unwrap()
            .with_range(1.0, 1000.0)
            .with_conversion(UnitConversion::WdrcTimeConstant);
        let limits = desc.firmware_limits(&SYS);
        assert!(limits.min < limits.max);
        assert_eq!(limits.max, UnitConversion::WdrcTimeConstant.apply(1.0, &SYS));
    }

    #[test]
    fn negative_scale_limits_are_reordered() {
        let desc = ParamDescriptor::integer()
            .with_range(0.0, 10.0)
            .with_conversion(UnitConversion::Scale(-2.0));
        assert_eq!(desc.firmware_limits(&SYS), Limits::new(-20.0, 0.0));
    }

    #[test]
    fn range_from_bounds() {
        assert_eq!(UserRange::from_bounds(None, None).unwrap(), None);
        assert_eq!(
            UserRange::from_bounds(Some(0.0), Some(1.0)).unwrap(),
            Some(UserRange::new(0.0, 1.0))
        );
        assert_eq!(
            UserRange::from_bounds(Some(0.0), None).unwrap_err(),
            ConvertError::HalfSpecifiedRange
        );
    }

    #[test]
    fn fixed_rejects_wide_fraction() {
        assert_eq!(
            ParamDescriptor::fixed(30).unwrap_err(),
            ConvertError::FractBitsOutOfRange(30)
        );
    }
}
