//! number.rs
//! Numeric terms across the integer, arbitrary-precision and floating domains.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A numeric term value.
///
/// Structural equality (`==`) distinguishes domains, so `Int(1) != Float(1.0)`.
/// Use [`Number::numeric_eq`] to compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
    /// Arbitrary-precision decimal.
    Decimal(Decimal),
}

/// The numeric representations, ordered from narrowest to widest.
///
/// Combining terms promotes to the widest domain among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericDomain {
    Integer,
    Decimal,
    Float,
}

impl Number {
    pub fn domain(&self) -> NumericDomain {
        match self {
            Number::Int(_) => NumericDomain::Integer,
            Number::Decimal(_) => NumericDomain::Decimal,
            Number::Float(_) => NumericDomain::Float,
        }
    }

    /// Lossy conversion used by the floating-point operations (power, square root).
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
            Number::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Number::Int(i) => Some(Decimal::from(*i)),
            Number::Decimal(d) => Some(*d),
            Number::Float(f) => Decimal::from_f64(*f),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::Float(f) => *f == 0.0,
            Number::Decimal(d) => d.is_zero(),
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int(i) => *i < 0,
            Number::Float(f) => *f < 0.0,
            Number::Decimal(d) => !d.is_zero() && d.is_sign_negative(),
        }
    }

    /// Returns -1, 0 or 1 using the sign semantics of the value's own domain.
    ///
    /// Floating zero (either sign) and NaN report 0.
    pub fn signum(&self) -> i64 {
        match self {
            Number::Int(i) => i.signum(),
            Number::Decimal(d) => {
                if d.is_zero() {
                    0
                } else if d.is_sign_negative() {
                    -1
                } else {
                    1
                }
            }
            Number::Float(f) => {
                if f.is_nan() || *f == 0.0 {
                    0
                } else {
                    f.signum() as i64
                }
            }
        }
    }

    /// Compares by numeric value across domains. `None` when either side is NaN.
    pub fn numeric_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            (Number::Decimal(a), Number::Decimal(b)) => Some(a.cmp(b)),
            (Number::Int(a), Number::Decimal(b)) => Some(Decimal::from(*a).cmp(b)),
            (Number::Decimal(a), Number::Int(b)) => Some(a.cmp(&Decimal::from(*b))),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(b),
            (Number::Int(i), Number::Float(f)) => cmp_int_float(*i, *f),
            (Number::Float(f), Number::Int(i)) => cmp_int_float(*i, *f).map(Ordering::reverse),
            (Number::Decimal(d), Number::Float(f)) => cmp_decimal_float(*d, *f),
            (Number::Float(f), Number::Decimal(d)) => cmp_decimal_float(*d, *f).map(Ordering::reverse),
        }
    }

    pub fn numeric_eq(&self, other: &Number) -> bool {
        self.numeric_cmp(other) == Some(Ordering::Equal)
    }

    /// Absolute value in the same domain; `i64::MIN` escapes to float.
    pub fn abs(&self) -> Number {
        match self {
            Number::Int(i) => i.checked_abs().map_or(Number::Float((*i as f64).abs()), Number::Int),
            Number::Float(f) => Number::Float(f.abs()),
            Number::Decimal(d) => Number::Decimal(d.abs()),
        }
    }
}

/// Exact comparison of an integer with a float.
///
/// When the integer rounds onto the float, the float is integral and the tie
/// is broken in the integer domain.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    match (i as f64).partial_cmp(&f)? {
        // 2^63 is the only rounded value outside the i64 range.
        Ordering::Equal if f >= 9_223_372_036_854_775_808.0 => Some(Ordering::Less),
        Ordering::Equal => Some(i.cmp(&(f as i64))),
        unequal => Some(unequal),
    }
}

/// Compares as decimals when the float converts, otherwise (out of decimal
/// range) as floats.
fn cmp_decimal_float(d: Decimal, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    match Decimal::from_f64(f) {
        Some(fd) => Some(d.cmp(&fd)),
        None => d.to_f64().unwrap_or(f64::NAN).partial_cmp(&f),
    }
}

/// The widest domain among `numbers`, or `Integer` for an empty slice.
pub fn widest_domain(numbers: &[Number]) -> NumericDomain {
    numbers.iter().map(Number::domain).max().unwrap_or(NumericDomain::Integer)
}

/// Folds `numbers` with a binary operator in their widest domain.
///
/// Integer overflow promotes the whole fold to float; decimal overflow does the same.
fn fold_promoted(
    numbers: &[Number],
    int_op: fn(i64, i64) -> Option<i64>,
    dec_op: fn(Decimal, Decimal) -> Option<Decimal>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Number> {
    let (first, rest) = numbers.split_first()?;
    let float_fold = || {
        Number::Float(rest.iter().fold(first.to_f64(), |acc, n| float_op(acc, n.to_f64())))
    };

    let result = match widest_domain(numbers) {
        NumericDomain::Integer => {
            let mut acc = match first {
                Number::Int(i) => *i,
                _ => return Some(float_fold()),
            };
            for n in rest {
                let next = match n {
                    Number::Int(i) => int_op(acc, *i),
                    _ => None,
                };
                match next {
                    Some(v) => acc = v,
                    None => return Some(float_fold()),
                }
            }
            Number::Int(acc)
        }
        NumericDomain::Decimal => {
            let mut acc = match first.to_decimal() {
                Some(d) => d,
                None => return Some(float_fold()),
            };
            for n in rest {
                match n.to_decimal().and_then(|d| dec_op(acc, d)) {
                    Some(v) => acc = v,
                    None => return Some(float_fold()),
                }
            }
            Number::Decimal(acc)
        }
        NumericDomain::Float => float_fold(),
    };
    Some(result)
}

/// Sum in the widest domain. Empty input sums to `Int(0)`.
pub fn sum(numbers: &[Number]) -> Number {
    fold_promoted(numbers, i64::checked_add, Decimal::checked_add, |a, b| a + b)
        .unwrap_or(Number::Int(0))
}

/// `numbers[0] - numbers[1] - ...` in the widest domain.
pub fn difference(numbers: &[Number]) -> Option<Number> {
    fold_promoted(numbers, i64::checked_sub, Decimal::checked_sub, |a, b| a - b)
}

/// Product in the widest domain. Empty input multiplies to `Int(1)`.
pub fn product(numbers: &[Number]) -> Number {
    fold_promoted(numbers, i64::checked_mul, Decimal::checked_mul, |a, b| a * b)
        .unwrap_or(Number::Int(1))
}

/// Mean in the widest domain: integer means truncate toward zero.
pub fn mean_promoted(numbers: &[Number]) -> Option<Number> {
    if numbers.is_empty() {
        return None;
    }
    let count = numbers.len();
    match widest_domain(numbers) {
        NumericDomain::Integer => {
            // Summed in i128 so that integer means never overflow.
            let total: i128 = numbers
                .iter()
                .map(|n| match n {
                    Number::Int(i) => *i as i128,
                    other => other.to_f64() as i128,
                })
                .sum();
            let mean = total / count as i128;
            Some(i64::try_from(mean).map_or(Number::Float(mean as f64), Number::Int))
        }
        NumericDomain::Decimal => match sum(numbers) {
            Number::Decimal(total) => Some(
                total
                    .checked_div(Decimal::from(count as u64))
                    .map_or_else(|| Number::Float(mean_float(numbers)), Number::Decimal),
            ),
            _ => Some(Number::Float(mean_float(numbers))),
        },
        NumericDomain::Float => Some(Number::Float(mean_float(numbers))),
    }
}

/// Mean computed in floating point regardless of domain.
pub fn mean_float(numbers: &[Number]) -> f64 {
    if numbers.is_empty() {
        return f64::NAN;
    }
    numbers.iter().map(Number::to_f64).sum::<f64>() / numbers.len() as f64
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(v) => write!(f, "{:?}", v),
            Number::Decimal(d) => write!(f, "{}", d),
        }
    }
}

impl From<i64> for Number {
    fn from(i: i64) -> Self {
        Number::Int(i)
    }
}

impl From<i32> for Number {
    fn from(i: i32) -> Self {
        Number::Int(i as i64)
    }
}

impl From<f64> for Number {
    fn from(f: f64) -> Self {
        Number::Float(f)
    }
}

impl From<Decimal> for Number {
    fn from(d: Decimal) -> Self {
        Number::Decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Number {
        Number::Decimal(Decimal::from_str(s).unwrap())
    }

    #[rstest]
    #[case(Number::Int(5), 1)]
    #[case(Number::Int(0), 0)]
    #[case(Number::Int(-7), -1)]
    #[case(Number::Float(-3.2), -1)]
    #[case(Number::Float(0.4), 1)]
    #[case(Number::Float(-0.0), 0)]
    #[case(Number::Float(f64::NAN), 0)]
    #[case(dec("-0.001"), -1)]
    #[case(dec("0.00"), 0)]
    fn test_signum_uses_native_domain(#[case] n: Number, #[case] expected: i64) {
        assert_eq!(n.signum(), expected);
    }

    #[test]
    fn test_numeric_equality_crosses_domains() {
        assert!(Number::Int(1).numeric_eq(&Number::Float(1.0)));
        assert!(Number::Int(2).numeric_eq(&dec("2.00")));
        assert!(!Number::Float(f64::NAN).numeric_eq(&Number::Float(f64::NAN)));
        assert_ne!(Number::Int(1), Number::Float(1.0));
    }

    #[rstest]
    #[case(Number::Int(9_007_199_254_740_993), Number::Float(9_007_199_254_740_992.0), Ordering::Greater)]
    #[case(Number::Int(9_007_199_254_740_992), Number::Float(9_007_199_254_740_992.0), Ordering::Equal)]
    #[case(Number::Int(i64::MAX), Number::Float(9_223_372_036_854_775_808.0), Ordering::Less)]
    #[case(Number::Int(i64::MIN), Number::Float(-9_223_372_036_854_775_808.0), Ordering::Equal)]
    #[case(Number::Int(3), Number::Float(2.5), Ordering::Greater)]
    #[case(Number::Int(1), Number::Float(f64::INFINITY), Ordering::Less)]
    #[case(dec("2.5"), Number::Float(2.5), Ordering::Equal)]
    #[case(dec("2.5"), Number::Float(3.0), Ordering::Less)]
    #[case(dec("1"), Number::Float(1e30), Ordering::Less)]
    fn test_numeric_cmp_with_floats_is_exact(#[case] a: Number, #[case] b: Number, #[case] expected: Ordering) {
        assert_eq!(a.numeric_cmp(&b), Some(expected));
        assert_eq!(b.numeric_cmp(&a), Some(expected.reverse()));
    }

    #[test]
    fn test_nan_is_unordered() {
        assert_eq!(Number::Int(1).numeric_cmp(&Number::Float(f64::NAN)), None);
        assert_eq!(Number::Float(f64::NAN).numeric_cmp(&dec("1")), None);
    }

    #[test]
    fn test_sum_promotes_to_widest_domain() {
        assert_eq!(sum(&[Number::Int(1), Number::Int(2)]), Number::Int(3));
        assert_eq!(sum(&[Number::Int(1), dec("0.5")]), dec("1.5"));
        assert_eq!(sum(&[Number::Int(1), dec("0.5"), Number::Float(0.5)]), Number::Float(2.0));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let total = sum(&[Number::Int(i64::MAX), Number::Int(1)]);
        assert_eq!(total.domain(), NumericDomain::Float);
        assert_eq!(product(&[Number::Int(i64::MAX), Number::Int(2)]).domain(), NumericDomain::Float);
    }

    #[test]
    fn test_mean_truncates_integers() {
        assert_eq!(mean_promoted(&[Number::Int(1), Number::Int(2)]), Some(Number::Int(1)));
        assert_eq!(mean_promoted(&[Number::Int(-1), Number::Int(-2)]), Some(Number::Int(-1)));
        assert_eq!(
            mean_promoted(&[Number::Int(i64::MAX), Number::Int(i64::MAX)]),
            Some(Number::Int(i64::MAX))
        );
        assert_eq!(mean_promoted(&[Number::Int(1), Number::Float(3.0)]), Some(Number::Float(2.0)));
        assert_eq!(mean_promoted(&[Number::Int(1), dec("2")]), Some(dec("1.5")));
        assert_eq!(mean_promoted(&[]), None);
    }

    #[test]
    fn test_difference_is_left_fold() {
        assert_eq!(
            difference(&[Number::Int(10), Number::Int(3), Number::Int(2)]),
            Some(Number::Int(5))
        );
        assert_eq!(difference(&[]), None);
    }

    #[test]
    fn test_abs_keeps_domain() {
        assert_eq!(Number::Int(-4).abs(), Number::Int(4));
        assert_eq!(dec("-1.25").abs(), dec("1.25"));
        assert_eq!(Number::Int(i64::MIN).abs().domain(), NumericDomain::Float);
    }
}
