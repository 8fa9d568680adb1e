//! Complex scalar type used throughout the crate, plus the tiny numerical
//! hygiene helpers of spec §4.7/§6.3.
//!
//! The teacher crate this core grew from hand-rolled its own `Complex` type
//! because, at the time, `nalgebra` had no complex-scalar support
//! (`nalgebra` issue #266, referenced in the original `matrix.rs`). That gap
//! is long closed, so this crate uses `num_complex::Complex64` directly and
//! lets `nalgebra` do the heavy linear algebra.

pub use num_complex::Complex64 as C;

/// Absolute values at or below this are reported as exact zero (spec §6.3).
pub const TINY: f64 = 1e-12;

/// Clip a real value to exact zero if it is below [`TINY`] in magnitude.
pub fn clip_tiny(x: f64) -> f64 {
    if x.abs() <= TINY {
        0.0
    } else {
        x
    }
}

/// Clip both components of a complex value to exact zero if negligible.
pub fn clip_complex(z: C) -> C {
    C::new(clip_tiny(z.re), clip_tiny(z.im))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_only_tiny_values() {
        assert_eq!(clip_tiny(1e-13), 0.0);
        assert_eq!(clip_tiny(-1e-13), 0.0);
        assert_eq!(clip_tiny(1e-6), 1e-6);
    }
}
