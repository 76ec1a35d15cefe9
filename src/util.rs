//! Test assertions and fixtures.

/// Assert two floats differ by at most `tol`.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r, tol) = ($left, $right, $tol);
        let diff = (l - r).abs();
        assert!(
            diff <= tol,
            "{} and {} differ by {} (tolerance {})",
            l,
            r,
            diff,
            tol
        );
    }};
}

/// Assert two vectors have the same length and agree elementwise within `tol`.
#[macro_export]
macro_rules! assert_vec_close {
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r) = ($left, $right);
        assert_eq!(l.len(), r.len(), "vector lengths differ");
        for (a, b) in l.iter().zip(r.iter()) {
            $crate::assert_close!(*a, *b, $tol);
        }
    }};
}
