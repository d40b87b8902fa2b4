//! C type names and value literals.

use fwparam_core::{FirmwareValue, FixedPointFormat, MAX_FRACT_BITS};

/// C type of a parameter field.
///
/// ```rust
/// use fwparam_codegen::c_type;
/// use fwparam_core::FixedPointFormat;
///
/// assert_eq!(c_type(FixedPointFormat::INTEGER), "int24_t");
/// assert_eq!(c_type(FixedPointFormat::FRAC24), "frac24_t");
/// assert_eq!(c_type(FixedPointFormat::new(16).unwrap()), "frac16_t");
/// ```
pub fn c_type(format: FixedPointFormat) -> String {
    match format.fract_bits() {
        0 => "int24_t".to_string(),
        MAX_FRACT_BITS => "frac24_t".to_string(),
        bits => format!("frac{bits}_t"),
    }
}

/// Shortest text that reads back as exactly `value`, always with a decimal
/// point or exponent (`1.0`, `0.9999546000702375`, `1e-7`).
pub fn format_real(value: f64) -> String {
    format!("{value:?}")
}

/// Right-hand side of an init assignment.
///
/// Integers are parenthesized, `F = 23` and `F = 16` values go through the
/// firmware's `to_frac24`/`to_frac16` macros, other formats are bare reals.
/// Returns `None` for values that must not be emitted.
///
/// ```rust
/// use fwparam_codegen::c_literal;
/// use fwparam_core::{FirmwareValue, FixedPointFormat};
///
/// assert_eq!(c_literal(FirmwareValue::Integer(15), FixedPointFormat::INTEGER).unwrap(), "(15)");
/// assert_eq!(
///     c_literal(FirmwareValue::Fractional(1.0), FixedPointFormat::FRAC24).unwrap(),
///     "to_frac24(1.0)"
/// );
/// assert!(c_literal(FirmwareValue::Invalid, FixedPointFormat::FRAC24).is_none());
/// ```
pub fn c_literal(value: FirmwareValue, format: FixedPointFormat) -> Option<String> {
    match value {
        FirmwareValue::Integer(n) => Some(format!("({n})")),
        FirmwareValue::Fractional(v) if v.is_finite() => {
            let real = format_real(v);
            Some(match format.fract_bits() {
                MAX_FRACT_BITS => format!("to_frac24({real})"),
                16 => format!("to_frac16({real})"),
                _ => real,
            })
        }
        FirmwareValue::Fractional(_) | FirmwareValue::Invalid => None,
    }
}
