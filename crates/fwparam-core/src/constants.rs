//! Hardware-derived system constants.
//!
//! The conversion formulas depend on a handful of values fixed by the target
//! hardware: the baseband sample rate, the subband decimation, and the
//! decimation of the dynamics (WDRC) and noise-reduction (NR) update loops.
//! [`SystemConstants`] holds them. Build one per process (the defaults, or
//! values loaded from the project configuration) and pass it by reference;
//! the derived update rates are computed from it, never re-derived from
//! scratch by callers.
//!
//! # Derived Rates (defaults)
//!
//! | Quantity | Formula | Value |
//! |----------|---------|-------|
//! | Subband rate | `baseband / subband_decimation` | 3000 Hz |
//! | WDRC update rate | `subband / wdrc_channels` | 375 Hz |
//! | NR update rate | `subband / nr_decimation` | 750 Hz |

use libm::pow;

/// Fractional bits available in the 24-bit parameter word.
pub const MAX_FRACT_BITS: u8 = 23;

/// One log2 step expressed in 20·log10 decibels (≈ 6.0206 dB).
pub const LOG2_TO_DB20: f64 = 6.020599913279624;

/// Decibels (20·log10) to log2 units.
pub const DB20_TO_LOG2: f64 = 1.0 / LOG2_TO_DB20;

/// One log2 step expressed in 10·log10 decibels (≈ 3.0103 dB).
pub const LOG2_TO_DB10: f64 = 3.010299956639812;

/// Decibels (10·log10) to log2 units.
pub const DB10_TO_LOG2: f64 = 1.0 / LOG2_TO_DB10;

/// Target hardware constants used by the conversion formulas.
///
/// # Example
///
/// ```rust
/// use fwparam_core::SystemConstants;
///
/// let sys = SystemConstants::DEFAULT;
/// assert_eq!(sys.subband_sample_rate(), 3000.0);
/// assert_eq!(sys.wdrc_update_rate(), 375.0);
/// assert_eq!(sys.nr_update_rate(), 750.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemConstants {
    /// Baseband (converter) sample rate in Hz.
    pub baseband_sample_rate: f64,
    /// Decimation from baseband to the subband domain.
    pub subband_decimation: u32,
    /// Number of WDRC channels; the WDRC loop visits one channel per subband
    /// sample, so this is also its decimation rate.
    pub wdrc_channels: u32,
    /// Number of update slices in the noise-reduction loop.
    pub nr_decimation: u32,
    /// SNR (dB) at the bottom of the NR gain lookup table.
    pub nr_gain_lut_min_snr: f64,
    /// Input level in dB SPL that reaches digital full scale.
    pub fullscale_input_db_spl: f64,
    /// Output level in dB SPL produced by digital full scale.
    pub fullscale_output_db_spl: f64,
}

impl SystemConstants {
    /// Constants of the reference hardware.
    pub const DEFAULT: Self = Self {
        baseband_sample_rate: 24000.0,
        subband_decimation: 8,
        wdrc_channels: 8,
        nr_decimation: 4,
        nr_gain_lut_min_snr: -31.0,
        fullscale_input_db_spl: 110.0,
        fullscale_output_db_spl: 115.0,
    };

    /// Subband sample rate in Hz.
    #[inline]
    pub fn subband_sample_rate(&self) -> f64 {
        self.baseband_sample_rate / f64::from(self.subband_decimation)
    }

    /// WDRC decimation rate (equal to the channel count).
    #[inline]
    pub fn wdrc_decimation(&self) -> u32 {
        self.wdrc_channels
    }

    /// Update rate of the WDRC loop in Hz (the slow time-constant domain).
    #[inline]
    pub fn wdrc_update_rate(&self) -> f64 {
        self.subband_sample_rate() / f64::from(self.wdrc_decimation())
    }

    /// Update rate of the NR loop in Hz (the fast time-constant domain).
    #[inline]
    pub fn nr_update_rate(&self) -> f64 {
        self.subband_sample_rate() / f64::from(self.nr_decimation)
    }

    /// Linear minimum of the NR gain lookup table.
    ///
    /// The `/ 8` scaling of the SNR is a property of the firmware table, not
    /// a unit conversion.
    pub fn nr_gain_lut_min(&self) -> f64 {
        pow(2.0, self.nr_gain_lut_min_snr / 8.0) - 1.0
    }

    /// Look up a named constant, as used by descriptor scale expressions.
    ///
    /// Names follow the firmware's C macro spelling.
    pub fn lookup(&self, name: &str) -> Option<f64> {
        let value = match name {
            "BB_SAMPLE_RATE" => self.baseband_sample_rate,
            "SB_SAMPLE_RATE" => self.subband_sample_rate(),
            "LOG2_TO_DB20" => LOG2_TO_DB20,
            "DB20_TO_LOG2" => DB20_TO_LOG2,
            "LOG2_TO_DB10" => LOG2_TO_DB10,
            "DB10_TO_LOG2" => DB10_TO_LOG2,
            "WDRC_NUM_CHANNELS" => f64::from(self.wdrc_channels),
            "WDRC_DECIMATION_RATE" => f64::from(self.wdrc_decimation()),
            "WDRC_UPDATE_RATE" => self.wdrc_update_rate(),
            "NR_DECIMATION_RATE" => f64::from(self.nr_decimation),
            "NR_UPDATE_RATE" => self.nr_update_rate(),
            "NR_GAIN_LUT_MIN_SNR" => self.nr_gain_lut_min_snr,
            "NR_GAIN_LUT_MIN" => self.nr_gain_lut_min(),
            "dBSPL_FULLSCALE_INPUT" => self.fullscale_input_db_spl,
            "dBSPL_FULLSCALE_OUTPUT" => self.fullscale_output_db_spl,
            "MAX_FRAC_BITS" => f64::from(MAX_FRACT_BITS),
            "pi" => core::f64::consts::PI,
            "e" => core::f64::consts::E,
            _ => return None,
        };
        Some(value)
    }
}

impl Default for SystemConstants {
    fn default() -> Self {
        Self::DEFAULT
    }
}
