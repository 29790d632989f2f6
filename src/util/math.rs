//! Numeric helpers shared by the quantizer.

/// Rounds to the nearest integer, resolving halves to the even neighbour.
///
/// Bucket boundaries fall exactly on half-integers for grid-aligned boxes, so
/// the tie rule decides which bucket they land in.
#[inline]
pub(crate) fn round_even(value: f32) -> f32 {
    value.round_ties_even()
}

/// Rounds and converts to an integer bin index.
///
/// The conversion saturates: infinities clamp to the `i64` range and NaN
/// maps to zero.
#[inline]
pub(crate) fn to_bin(value: f32) -> i64 {
    round_even(value) as i64
}

#[cfg(test)]
mod tests {
    use super::{round_even, to_bin};

    #[test]
    fn round_even_resolves_halves_to_even() {
        assert_eq!(round_even(0.5), 0.0);
        assert_eq!(round_even(1.5), 2.0);
        assert_eq!(round_even(2.5), 2.0);
        assert_eq!(round_even(-0.5), -0.0);
        assert_eq!(round_even(-1.5), -2.0);
        assert_eq!(round_even(1.4999), 1.0);
    }

    #[test]
    fn to_bin_saturates_non_finite_values() {
        assert_eq!(to_bin(f32::INFINITY), i64::MAX);
        assert_eq!(to_bin(f32::NEG_INFINITY), i64::MIN);
        assert_eq!(to_bin(f32::NAN), 0);
        assert_eq!(to_bin(-3.2), -3);
    }
}
