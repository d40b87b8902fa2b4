//! Discrete legal-value sets.
//!
//! A descriptor may restrict a parameter to a discrete set of user values,
//! either as a step (every `step` from `UserMin` up to `UserMax`) or as an
//! explicit list of `"value=label"` entries, where the label only matters to
//! fitting software.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::descriptor::UserRange;
use crate::error::ConvertError;

/// One entry of an explicit legal-value list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalEntry {
    /// User value the entry admits.
    pub value: i64,
    /// Display label for fitting software, if given.
    pub label: Option<String>,
}

impl LegalEntry {
    /// Create an unlabeled entry.
    pub fn new(value: i64) -> Self {
        Self { value, label: None }
    }

    /// Attach a display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parse `"value=label"` or a bare `"value"`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fwparam_core::LegalEntry;
    ///
    /// let entry = LegalEntry::parse("3=Fast").unwrap();
    /// assert_eq!(entry.value, 3);
    /// assert_eq!(entry.label.as_deref(), Some("Fast"));
    ///
    /// assert_eq!(LegalEntry::parse(" -2 ").unwrap().value, -2);
    /// assert!(LegalEntry::parse("Fast=3").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, ConvertError> {
        let (value, label) = match text.split_once('=') {
            Some((value, label)) => (value, Some(label.trim())),
            None => (text, None),
        };
        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|_| ConvertError::InvalidListEntry(text.to_string()))?;
        Ok(Self {
            value,
            label: label.filter(|l| !l.is_empty()).map(ToString::to_string),
        })
    }
}

/// A discrete set of legal user values.
#[derive(Debug, Clone, PartialEq)]
pub enum LegalValues {
    /// Every `step` from the user minimum through the user maximum.
    Step(f64),
    /// Explicit list of admitted values.
    List(Vec<LegalEntry>),
}

impl LegalValues {
    /// Returns `true` if `value` is in the set.
    ///
    /// A step admits `UserMin + k * step` for every `k >= 0` that stays at or
    /// below `UserMax`, and needs a user range and a positive, finite step
    /// size. Membership is computed rather than enumerated, so any grid size
    /// works. Step membership tolerates float error proportional to the
    /// step, so `0.1`-sized steps accept the values a user would type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use fwparam_core::{LegalValues, UserRange};
    ///
    /// let range = Some(UserRange::new(0.0, 20.0));
    /// let step = LegalValues::Step(5.0);
    /// assert!(step.admits(10.0, range).unwrap());
    /// assert!(!step.admits(7.0, range).unwrap());
    /// ```
    pub fn admits(&self, value: f64, range: Option<UserRange>) -> Result<bool, ConvertError> {
        match self {
            Self::List(entries) => Ok(entries.iter().any(|e| e.value as f64 == value)),
            Self::Step(step) => {
                let (range, step) = check_step(*step, range)?;
                let tolerance = step_tolerance(step);
                if !(value >= range.min - tolerance && value <= range.max + tolerance) {
                    return Ok(false);
                }
                let offset = (value - range.min) / step;
                let nearest = libm::round(offset);
                Ok((offset - nearest).abs() * step <= tolerance)
            }
        }
    }

    /// Check that the set is usable with `range`, without enumerating it.
    ///
    /// Lets descriptor loaders reject a step without bounds or a
    /// non-positive step before any value is converted.
    pub fn validate(&self, range: Option<UserRange>) -> Result<(), ConvertError> {
        match self {
            Self::List(_) => Ok(()),
            Self::Step(step) => check_step(*step, range).map(|_| ()),
        }
    }
}

fn step_tolerance(step: f64) -> f64 {
    step * 1e-9
}

fn check_step(step: f64, range: Option<UserRange>) -> Result<(UserRange, f64), ConvertError> {
    let range = range.ok_or(ConvertError::StepWithoutRange)?;
    if !(step.is_finite() && step > 0.0) {
        return Err(ConvertError::NonPositiveStep(step));
    }
    Ok((range, step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn step_grid_starts_at_min_and_stops_below_max() {
        let range = Some(UserRange::new(1.0, 10.0));
        let step = LegalValues::Step(4.0);
        let admitted: Vec<_> = (0..=12)
            .map(f64::from)
            .filter(|&v| step.admits(v, range).unwrap())
            .collect();
        assert_eq!(admitted, vec![1.0, 5.0, 9.0]);
    }

    #[test]
    fn step_membership() {
        let range = Some(UserRange::new(0.0, 20.0));
        let step = LegalValues::Step(5.0);
        assert!(step.admits(0.0, range).unwrap());
        assert!(step.admits(10.0, range).unwrap());
        assert!(step.admits(20.0, range).unwrap());
        assert!(!step.admits(7.0, range).unwrap());
        assert!(!step.admits(25.0, range).unwrap());
        assert!(!step.admits(-5.0, range).unwrap());
        assert!(!step.admits(f64::NAN, range).unwrap());
    }

    #[test]
    fn fractional_step_accepts_typed_values() {
        let range = Some(UserRange::new(0.0, 1.0));
        let step = LegalValues::Step(0.1);
        assert!(step.admits(0.3, range).unwrap());
        assert!(step.admits(0.7, range).unwrap());
        assert!(step.admits(1.0, range).unwrap());
        assert!(!step.admits(0.35, range).unwrap());
        assert!(!step.admits(1.1, range).unwrap());
    }

    #[test]
    fn step_requires_range() {
        let err = LegalValues::Step(1.0).admits(1.0, None).unwrap_err();
        assert_eq!(err, ConvertError::StepWithoutRange);
    }

    #[test]
    fn step_must_be_positive() {
        let range = Some(UserRange::new(0.0, 1.0));
        assert!(matches!(
            LegalValues::Step(0.0).validate(range),
            Err(ConvertError::NonPositiveStep(_))
        ));
        assert!(matches!(
            LegalValues::Step(-1.0).admits(0.0, range),
            Err(ConvertError::NonPositiveStep(_))
        ));
    }

    #[test]
    fn validate_checks_step_without_enumerating() {
        let range = Some(UserRange::new(0.0, 1e12));
        assert!(LegalValues::Step(1.0).validate(range).is_ok());
        assert_eq!(
            LegalValues::Step(1.0).validate(None),
            Err(ConvertError::StepWithoutRange)
        );
        assert!(LegalValues::List(vec![LegalEntry::new(1)]).validate(None).is_ok());
    }

    #[test]
    fn huge_step_grid_is_checked_without_enumerating() {
        let range = Some(UserRange::new(0.0, 1e12));
        let step = LegalValues::Step(1.0);
        assert!(step.admits(999_999_999_999.0, range).unwrap());
        assert!(step.admits(1e12, range).unwrap());
        assert!(!step.admits(0.5, range).unwrap());
        assert!(!step.admits(1e12 + 1.0, range).unwrap());
    }

    #[test]
    fn list_membership() {
        let list = LegalValues::List(vec![
            LegalEntry::new(0).with_label("Off"),
            LegalEntry::new(1).with_label("On"),
            LegalEntry::new(4),
        ]);
        assert!(list.admits(1.0, None).unwrap());
        assert!(list.admits(4.0, None).unwrap());
        assert!(!list.admits(2.0, None).unwrap());
        assert!(!list.admits(0.5, None).unwrap());
        assert!(!list.admits(f64::NAN, None).unwrap());
    }

    #[test]
    fn parse_entries() {
        assert_eq!(
            LegalEntry::parse("0=Off").unwrap(),
            LegalEntry::new(0).with_label("Off")
        );
        assert_eq!(LegalEntry::parse("12").unwrap(), LegalEntry::new(12));
        assert_eq!(LegalEntry::parse("5=").unwrap(), LegalEntry::new(5));
        assert_eq!(
            LegalEntry::parse("2=Mid=High").unwrap().label.as_deref(),
            Some("Mid=High")
        );
        assert!(matches!(
            LegalEntry::parse("Off=0"),
            Err(ConvertError::InvalidListEntry(_))
        ));
        assert!(LegalEntry::parse("1.5=Half").is_err());
    }
}
