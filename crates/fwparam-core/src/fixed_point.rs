//! Fixed-point word formats and firmware-unit limits.
//!
//! Every tunable parameter lives in a 24-bit signed word. A format with `F`
//! fractional bits leaves `23 - F` integer bits above the binary point, so the
//! representable range is
//!
//! ```text
//! max = 2^(23 - F) - 2^-F
//! min = -2^(23 - F)
//! ```
//!
//! `F = 0` is a plain integer (`[-8388608, 8388607]`), `F = 23` is a pure
//! fraction (`[-1.0, 1.0 - 2^-23]`).

use libm::{exp2, round};

use crate::constants::MAX_FRACT_BITS;

/// Direction in which a value had to be limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeViolation {
    /// The value exceeded the upper limit and was set to it.
    AboveMax,
    /// The value fell below the lower limit and was set to it.
    BelowMin,
}

impl RangeViolation {
    /// Short human-readable description.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::AboveMax => "above max",
            Self::BelowMin => "below min",
        }
    }
}

impl core::fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.describe())
    }
}

/// Inclusive firmware-unit limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    /// Lower limit.
    pub min: f64,
    /// Upper limit.
    pub max: f64,
}

impl Limits {
    /// Create limits from a `(min, max)` pair as given.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Return the limits with `min <= max`.
    ///
    /// Decreasing conversion formulas map the user-unit maximum below the
    /// user-unit minimum; swapping restores a usable interval.
    #[must_use]
    pub fn ordered(self) -> Self {
        if self.max < self.min {
            Self {
                min: self.max,
                max: self.min,
            }
        } else {
            self
        }
    }

    /// Limit `value` to `[min, max]`, reporting which side was violated.
    ///
    /// Call on [`ordered`](Self::ordered) limits. NaN passes through
    /// unchanged with no violation.
    pub fn clamp(&self, value: f64) -> (f64, Option<RangeViolation>) {
        if value > self.max {
            (self.max, Some(RangeViolation::AboveMax))
        } else if value < self.min {
            (self.min, Some(RangeViolation::BelowMin))
        } else {
            (value, None)
        }
    }
}

/// Layout of a parameter inside the 24-bit firmware word.
///
/// # Example
///
/// ```rust
/// use fwparam_core::FixedPointFormat;
///
/// let q7_16 = FixedPointFormat::new(16).unwrap();
/// let limits = q7_16.limits();
/// assert_eq!(limits.max, 128.0 - 1.0 / 65536.0);
/// assert_eq!(limits.min, -128.0);
///
/// assert!(FixedPointFormat::new(24).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedPointFormat {
    fract_bits: u8,
}

impl FixedPointFormat {
    /// Plain integer format (`F = 0`).
    pub const INTEGER: Self = Self { fract_bits: 0 };

    /// Pure fraction format (`F = 23`).
    pub const FRAC24: Self = Self {
        fract_bits: MAX_FRACT_BITS,
    };

    /// Create a format with `fract_bits` bits after the binary point.
    ///
    /// Returns `None` if `fract_bits` exceeds [`MAX_FRACT_BITS`].
    pub const fn new(fract_bits: u8) -> Option<Self> {
        if fract_bits > MAX_FRACT_BITS {
            None
        } else {
            Some(Self { fract_bits })
        }
    }

    /// Number of fractional bits `F`.
    #[inline]
    pub const fn fract_bits(self) -> u8 {
        self.fract_bits
    }

    /// Returns `true` for the plain integer format.
    #[inline]
    pub const fn is_integer(self) -> bool {
        self.fract_bits == 0
    }

    /// Bits above the binary point, excluding the sign: `23 - F`.
    #[inline]
    pub const fn integer_bits(self) -> u8 {
        MAX_FRACT_BITS - self.fract_bits
    }

    /// Value of one least-significant bit: `2^-F`.
    #[inline]
    pub fn epsilon(self) -> f64 {
        exp2(-f64::from(self.fract_bits))
    }

    /// Full representable range of the format.
    pub fn limits(self) -> Limits {
        let span = exp2(f64::from(self.integer_bits()));
        Limits::new(-span, span - self.epsilon())
    }

    /// Raw signed word for `value`: `round(value * 2^F)`, saturated to 24 bits.
    ///
    /// NaN maps to `None`.
    pub fn to_raw(self, value: f64) -> Option<i32> {
        if value.is_nan() {
            return None;
        }
        const RAW_MAX: f64 = 8_388_607.0;
        const RAW_MIN: f64 = -8_388_608.0;
        let scaled = round(value * exp2(f64::from(self.fract_bits)));
        Some(scaled.clamp(RAW_MIN, RAW_MAX) as i32)
    }
}
