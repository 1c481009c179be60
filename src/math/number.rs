use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::KernelError;

/// Exact field type used for every coordinate.
pub type Ft = BigRational;

/// Builds an exact number from an integer.
#[must_use]
pub fn ft(value: i64) -> Ft {
    BigRational::from_integer(BigInt::from(value))
}

/// Converts a finite double to the exact rational it represents.
///
/// # Errors
///
/// Returns [`KernelError::NonFiniteValue`] for NaN and infinities.
pub fn ft_from_f64(value: f64) -> Result<Ft, KernelError> {
    if !value.is_finite() {
        return Err(KernelError::NonFiniteValue(value));
    }
    BigRational::from_float(value).ok_or(KernelError::NonFiniteValue(value))
}

/// Nearest double approximation of an exact number.
#[must_use]
pub fn ft_to_f64(value: &Ft) -> f64 {
    let numer = value.numer();
    let denom = value.denom();
    if let (Some(n), Some(d)) = (numer.to_f64(), denom.to_f64()) {
        if n.is_finite() && d.is_finite() {
            return n / d;
        }
    }
    // Scale both terms down so they fit in a double.
    let bits = numer.bits().max(denom.bits());
    let shift = usize::try_from(bits.saturating_sub(1000)).unwrap_or(usize::MAX);
    let n = (numer >> shift).to_f64().unwrap_or(f64::NAN);
    let d = (denom >> shift).to_f64().unwrap_or(f64::NAN);
    if d == 0.0 {
        if numer.is_negative() {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    } else {
        n / d
    }
}

/// Returns a double interval `[lo, hi]` guaranteed to contain `value`.
#[must_use]
pub fn ft_interval(value: &Ft) -> (f64, f64) {
    let approx = ft_to_f64(value);
    if !approx.is_finite() {
        return (approx.min(f64::MAX), approx.max(f64::MIN));
    }
    let Ok(exact) = ft_from_f64(approx) else {
        return (approx, approx);
    };
    match exact.cmp(value) {
        std::cmp::Ordering::Equal => (approx, approx),
        std::cmp::Ordering::Less => (approx, next_up(approx)),
        std::cmp::Ordering::Greater => (next_down(approx), approx),
    }
}

fn next_up(value: f64) -> f64 {
    if value == 0.0 {
        f64::from_bits(1)
    } else if value > 0.0 {
        f64::from_bits(value.to_bits() + 1)
    } else {
        f64::from_bits(value.to_bits() - 1)
    }
}

fn next_down(value: f64) -> f64 {
    -next_up(-value)
}

/// Rounds `value` to the grid `1 / scale` by rounding the exact
/// numerator/denominator pair. Used to bound the bit growth of exact
/// numbers in iterative algorithms. A non-positive scale is a no-op.
#[must_use]
pub fn round_ft(value: &Ft, scale: i64) -> Ft {
    if scale <= 0 {
        return value.clone();
    }
    let s = ft(scale);
    (value * &s).round() / s
}

/// Approximate square root of an exact, non-negative number.
#[must_use]
pub fn ft_sqrt(value: &Ft) -> f64 {
    if value.is_zero() || value.is_negative() {
        return 0.0;
    }
    ft_to_f64(value).sqrt()
}

/// Returns the sign of an exact number as an ordering against zero.
#[must_use]
pub fn sign(value: &Ft) -> std::cmp::Ordering {
    if value.is_zero() {
        std::cmp::Ordering::Equal
    } else if value.is_positive() {
        std::cmp::Ordering::Greater
    } else {
        std::cmp::Ordering::Less
    }
}
