//! Nullable numeric type used for every pollutant reading.
//!
//! Arithmetic on [`Measure`] propagates null: if either operand is missing
//! the result is missing. Unlike NaN, a null measure compares equal to
//! another null measure, so derived rows can be compared directly.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Measure(Option<f64>);

impl Measure {
    pub const NULL: Measure = Measure(None);

    /// Wraps a value as-is, including an infinite arithmetic result.
    pub fn new(value: f64) -> Self {
        Measure(Some(value))
    }

    /// Wraps a value read from input. Non-finite values (NaN, ±inf) are
    /// stored as null.
    pub fn finite(value: f64) -> Self {
        if value.is_finite() {
            Measure(Some(value))
        } else {
            Measure::NULL
        }
    }

    pub fn value(self) -> Option<f64> {
        self.0
    }

    pub fn is_null(self) -> bool {
        self.0.is_none()
    }
}

impl From<f64> for Measure {
    fn from(value: f64) -> Self {
        Measure::finite(value)
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Measure::NULL, Measure::finite)
    }
}

impl Add for Measure {
    type Output = Measure;

    fn add(self, rhs: Measure) -> Measure {
        match (self.0, rhs.0) {
            (Some(a), Some(b)) => Measure::new(a + b),
            _ => Measure::NULL,
        }
    }
}

impl Mul<f64> for Measure {
    type Output = Measure;

    fn mul(self, weight: f64) -> Measure {
        match self.0 {
            Some(v) => Measure::new(v * weight),
            None => Measure::NULL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_propagates_null() {
        assert_eq!(Measure::new(1.0) + Measure::NULL, Measure::NULL);
        assert_eq!(Measure::NULL + Measure::new(1.0), Measure::NULL);
        assert_eq!(Measure::new(1.5) + Measure::new(2.5), Measure::new(4.0));
    }

    #[test]
    fn test_mul_propagates_null() {
        assert_eq!(Measure::NULL * 5.0, Measure::NULL);
        assert_eq!(Measure::new(3.0) * 5.0, Measure::new(15.0));
    }

    #[test]
    fn test_non_finite_input_is_null() {
        assert!(Measure::finite(f64::NAN).is_null());
        assert!(Measure::finite(f64::INFINITY).is_null());
        assert!(Measure::from(f64::INFINITY).is_null());
        assert!(Measure::from(Some(f64::NEG_INFINITY)).is_null());
    }

    #[test]
    fn test_overflow_stays_present() {
        let sum = Measure::new(f64::MAX) * 5.0 + Measure::new(1.0);
        assert_eq!(sum.value(), Some(f64::INFINITY));

        let product = Measure::new(1e308) * 5.0;
        assert!(!product.is_null());
    }

    #[test]
    fn test_null_equals_null() {
        assert_eq!(Measure::NULL, Measure::from(None));
    }

    #[test]
    fn test_serializes_as_plain_option() {
        assert_eq!(serde_json::to_string(&Measure::new(2.5)).unwrap(), "2.5");
        assert_eq!(serde_json::to_string(&Measure::NULL).unwrap(), "null");
    }
}
