//! User-unit to firmware-unit conversion formulas.
//!
//! Descriptors select a conversion by name (`"WdrcTC"`, `"Input_dB_SPL"`, ...),
//! by numeric scale factor, or by a scale expression. [`UnitConversion`]
//! resolves that selector once, when the descriptor is loaded, into a closed
//! set of variants; converting a value is then a plain `match`.
//!
//! | Selector | Variant | Firmware value |
//! |----------|---------|----------------|
//! | `""` | [`Identity`](UnitConversion::Identity) | `v` |
//! | `k` / `"expr"` | [`Scale`](UnitConversion::Scale) | `v * k` |
//! | `"WdrcTC"` | [`WdrcTimeConstant`](UnitConversion::WdrcTimeConstant) | `1 - e^(-1 / (v/1000 * wdrc_rate))` |
//! | `"NrTC"` | [`NrTimeConstant`](UnitConversion::NrTimeConstant) | `1 - e^(-1 / (v/1000 * nr_rate))` |
//! | `"dBperSec_to_log2"` | [`DbPerSecToLog2`](UnitConversion::DbPerSecToLog2) | `v / (nr_rate * LOG2_TO_DB20)` |
//! | `"Input_dB_SPL"` | [`InputDbSpl`](UnitConversion::InputDbSpl) | `(v - fullscale_in) * DB20_TO_LOG2` |
//! | `"Output_dB_SPL"` | [`OutputDbSpl`](UnitConversion::OutputDbSpl) | `(v - fullscale_out) * DB20_TO_LOG2` |

use libm::exp;

use crate::constants::{DB20_TO_LOG2, LOG2_TO_DB20, SystemConstants};
use crate::error::ConvertError;
use crate::expr::evaluate;

/// A resolved conversion from user units to firmware units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum UnitConversion {
    /// Firmware value equals the user value.
    #[default]
    Identity,
    /// Linear scale factor.
    Scale(f64),
    /// Time constant in ms to a one-pole coefficient at the WDRC update rate.
    WdrcTimeConstant,
    /// Time constant in ms to a one-pole coefficient at the NR update rate.
    NrTimeConstant,
    /// Level slew rate in dB/s to log2 units per NR update.
    DbPerSecToLog2,
    /// Input level in dB SPL to log2 relative to input full scale.
    InputDbSpl,
    /// Output level in dB SPL to log2 relative to output full scale.
    OutputDbSpl,
}

impl UnitConversion {
    /// Resolve a textual selector.
    ///
    /// An empty selector is [`Identity`](Self::Identity). Known names map to
    /// their formula. Anything else is evaluated as a scale expression with
    /// [`evaluate`]; if that fails the selector is rejected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fwparam_core::{SystemConstants, UnitConversion};
    ///
    /// let sys = SystemConstants::DEFAULT;
    /// assert_eq!(UnitConversion::from_selector("", &sys).unwrap(), UnitConversion::Identity);
    /// assert_eq!(
    ///     UnitConversion::from_selector("WdrcTC", &sys).unwrap(),
    ///     UnitConversion::WdrcTimeConstant
    /// );
    /// assert_eq!(
    ///     UnitConversion::from_selector("(2**-3)", &sys).unwrap(),
    ///     UnitConversion::Scale(0.125)
    /// );
    /// assert!(UnitConversion::from_selector("NoSuchFormula", &sys).is_err());
    /// ```
    pub fn from_selector(selector: &str, constants: &SystemConstants) -> Result<Self, ConvertError> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Ok(Self::Identity);
        }
        if let Some(named) = Self::from_name(selector) {
            return Ok(named);
        }
        let factor = evaluate(selector, constants).map_err(ConvertError::Expression)?;
        Self::scale(factor)
    }

    /// Look up a named formula.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "WdrcTC" => Some(Self::WdrcTimeConstant),
            "NrTC" => Some(Self::NrTimeConstant),
            "dBperSec_to_log2" => Some(Self::DbPerSecToLog2),
            "Input_dB_SPL" => Some(Self::InputDbSpl),
            "Output_dB_SPL" => Some(Self::OutputDbSpl),
            _ => None,
        }
    }

    /// A scale conversion, rejecting non-finite factors.
    pub fn scale(factor: f64) -> Result<Self, ConvertError> {
        if factor.is_finite() {
            Ok(Self::Scale(factor))
        } else {
            Err(ConvertError::NonFiniteScale(factor))
        }
    }

    /// Selector spelling of this conversion, as written in descriptor files.
    ///
    /// Scale factors have no name and return `None`.
    pub const fn name(&self) -> Option<&'static str> {
        match self {
            Self::Identity => Some(""),
            Self::Scale(_) => None,
            Self::WdrcTimeConstant => Some("WdrcTC"),
            Self::NrTimeConstant => Some("NrTC"),
            Self::DbPerSecToLog2 => Some("dBperSec_to_log2"),
            Self::InputDbSpl => Some("Input_dB_SPL"),
            Self::OutputDbSpl => Some("Output_dB_SPL"),
        }
    }

    /// Map a user-unit value to firmware units.
    ///
    /// Pure; NaN in gives NaN out.
    pub fn apply(&self, value: f64, constants: &SystemConstants) -> f64 {
        match *self {
            Self::Identity => value,
            Self::Scale(k) => value * k,
            Self::WdrcTimeConstant => time_constant_coeff(value, constants.wdrc_update_rate()),
            Self::NrTimeConstant => time_constant_coeff(value, constants.nr_update_rate()),
            Self::DbPerSecToLog2 => value / (constants.nr_update_rate() * LOG2_TO_DB20),
            Self::InputDbSpl => (value - constants.fullscale_input_db_spl) * DB20_TO_LOG2,
            Self::OutputDbSpl => (value - constants.fullscale_output_db_spl) * DB20_TO_LOG2,
        }
    }
}

impl core::fmt::Display for UnitConversion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Identity => f.write_str("none"),
            Self::Scale(k) => write!(f, "x{k}"),
            other => f.write_str(other.name().unwrap_or_default()),
        }
    }
}

/// One-pole smoothing coefficient for a time constant of `tc_ms` milliseconds
/// at `update_rate` Hz.
///
/// A zero time constant gives a coefficient of exactly 1 (no smoothing).
#[inline]
pub fn time_constant_coeff(tc_ms: f64, update_rate: f64) -> f64 {
    let tc_seconds = tc_ms / 1000.0;
    1.0 - exp(-1.0 / (tc_seconds * update_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS: SystemConstants = SystemConstants::DEFAULT;

    #[test]
    fn wdrc_time_constant_12ms() {
        let fw = UnitConversion::WdrcTimeConstant.apply(12.0, &SYS);
        let expected = 1.0 - libm::exp(-1.0 / (0.012 * 375.0));
        assert!((fw - expected).abs() < 1e-15);
        assert!((fw - 0.1993).abs() < 1e-3, "got {fw}");
    }

    #[test]
    fn nr_time_constant_uses_fast_rate() {
        let wdrc = UnitConversion::WdrcTimeConstant.apply(12.0, &SYS);
        let nr = UnitConversion::NrTimeConstant.apply(12.0, &SYS);
        let expected = 1.0 - libm::exp(-1.0 / (0.012 * 750.0));
        assert!((nr - expected).abs() < 1e-15);
        // Same time constant at a faster update rate needs a smaller step.
        assert!(nr < wdrc);
    }

    #[test]
    fn zero_time_constant_is_unity() {
        assert_eq!(UnitConversion::WdrcTimeConstant.apply(0.0, &SYS), 1.0);
        assert_eq!(UnitConversion::NrTimeConstant.apply(0.0, &SYS), 1.0);
    }

    #[test]
    fn time_constant_decreases_with_length() {
        let short = UnitConversion::WdrcTimeConstant.apply(1.0, &SYS);
        let long = UnitConversion::WdrcTimeConstant.apply(1000.0, &SYS);
        assert!(long < short);
    }

    #[test]
    fn level_conversions() {
        assert_eq!(UnitConversion::InputDbSpl.apply(110.0, &SYS), 0.0);
        assert!((UnitConversion::InputDbSpl.apply(50.0, &SYS) - (-60.0 * DB20_TO_LOG2)).abs() < 1e-12);
        assert_eq!(UnitConversion::OutputDbSpl.apply(115.0, &SYS), 0.0);
        let one_octave = UnitConversion::OutputDbSpl.apply(115.0 - LOG2_TO_DB20, &SYS);
        assert!((one_octave + 1.0).abs() < 1e-12);
    }

    #[test]
    fn db_per_second() {
        let fw = UnitConversion::DbPerSecToLog2.apply(750.0 * LOG2_TO_DB20, &SYS);
        assert!((fw - 1.0).abs() < 1e-12);
    }

    #[test]
    fn identity_and_scale() {
        assert_eq!(UnitConversion::Identity.apply(-7.5, &SYS), -7.5);
        assert_eq!(UnitConversion::Scale(0.5).apply(3.0, &SYS), 1.5);
    }

    #[test]
    fn selectors_resolve() {
        for (text, expected) in [
            ("", UnitConversion::Identity),
            ("  ", UnitConversion::Identity),
            ("WdrcTC", UnitConversion::WdrcTimeConstant),
            ("NrTC", UnitConversion::NrTimeConstant),
            ("dBperSec_to_log2", UnitConversion::DbPerSecToLog2),
            ("Input_dB_SPL", UnitConversion::InputDbSpl),
            ("Output_dB_SPL", UnitConversion::OutputDbSpl),
            ("0.25", UnitConversion::Scale(0.25)),
            ("(1/4)", UnitConversion::Scale(0.25)),
        ] {
            assert_eq!(UnitConversion::from_selector(text, &SYS).unwrap(), expected, "{text:?}");
        }
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let err = UnitConversion::from_selector("wdrctc", &SYS).unwrap_err();
        assert!(matches!(err, ConvertError::Expression(_)));
    }

    #[test]
    fn non_finite_scale_is_rejected() {
        let err = UnitConversion::from_selector("(1/0)", &SYS).unwrap_err();
        assert!(matches!(err, ConvertError::NonFiniteScale(_)));
        assert!(UnitConversion::scale(f64::NAN).is_err());
    }

    #[test]
    fn names_round_trip() {
        for conv in [
            UnitConversion::WdrcTimeConstant,
            UnitConversion::NrTimeConstant,
            UnitConversion::DbPerSecToLog2,
            UnitConversion::InputDbSpl,
            UnitConversion::OutputDbSpl,
        ] {
            let name = conv.name().unwrap();
            assert_eq!(UnitConversion::from_name(name), Some(conv));
        }
        assert_eq!(UnitConversion::Scale(2.0).name(), None);
    }
}
