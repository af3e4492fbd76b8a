//! Exact integer geometry.
//!
//! Positions and velocities are `i32`. Differences of two coordinates are
//! carried in `i64`, which still needs 33 bits, so every squared term is
//! taken in `i128`.

/// Floor of the square root of `n`, via Newton's method seeded at `n / 2`.
///
/// Negative inputs have no real root and yield 0.
pub fn isqrt(n: i128) -> i128 {
    if n <= 1 {
        return n.max(0);
    }

    // n / 2 is always an over-estimate for n >= 2, so the sequence only falls.
    let mut x0 = n / 2;
    let mut x1 = (x0 + n / x0) / 2;

    while x1 < x0 {
        x0 = x1;
        x1 = (x0 + n / x0) / 2;
    }

    x0
}

#[inline]
pub fn distance_squared(dx: i64, dy: i64) -> i128 {
    square(dx) + square(dy)
}

/// Truncated Euclidean length of `(dx, dy)`.
#[inline]
pub fn distance(dx: i64, dy: i64) -> i64 {
    // sqrt(2) * 2^63 would not fit; saturate instead.
    i64::try_from(isqrt(distance_squared(dx, dy))).unwrap_or(i64::MAX)
}

#[inline]
pub fn square(value: i64) -> i128 {
    i128::from(value) * i128::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isqrt_small_values() {
        let expected = [0, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3];
        for (n, root) in expected.iter().enumerate() {
            assert_eq!(isqrt(n as i128), *root, "isqrt({n})");
        }
    }

    #[test]
    fn isqrt_brackets_the_true_root() {
        let mut n = 0i128;
        while n < 2_000_000 {
            let k = isqrt(n);
            assert!(k * k <= n, "isqrt({n}) = {k} is too large");
            assert!((k + 1) * (k + 1) > n, "isqrt({n}) = {k} is too small");
            n += 7;
        }
    }

    #[test]
    fn isqrt_exact_squares_and_neighbours() {
        for k in [2i128, 10, 127, 1_000, 46_340, 3_037_000_499, 6_074_000_999] {
            assert_eq!(isqrt(k * k), k);
            assert_eq!(isqrt(k * k - 1), k - 1);
            assert_eq!(isqrt(k * k + 1), k);
        }
    }

    #[test]
    fn isqrt_handles_wide_extremes() {
        assert_eq!(isqrt(i128::from(i64::MAX)), 3_037_000_499);
        assert_eq!(isqrt(i128::MAX), 13_043_817_825_332_782_212);
        assert_eq!(isqrt(-5), 0);
    }

    #[test]
    fn distance_truncates() {
        assert_eq!(distance(3, 4), 5);
        assert_eq!(distance(-3, 4), 5);
        assert_eq!(distance(1, 1), 1);
        assert_eq!(distance(0, 0), 0);
        assert_eq!(distance_squared(-6, 8), 100);
    }

    #[test]
    fn opposite_corner_differences_do_not_overflow() {
        // i32::MAX - i32::MIN on both axes: each square alone exceeds i64.
        let span = i64::from(i32::MAX) - i64::from(i32::MIN);
        assert_eq!(span, 4_294_967_295);
        assert_eq!(square(span), 18_446_744_065_119_617_025);
        assert_eq!(distance_squared(span, -span), 2 * 18_446_744_065_119_617_025);
        assert_eq!(distance(span, -span), 6_074_000_998);
        assert_eq!(distance(-span, 0), span);
    }
}
