//! Bloch vector and purity derivation, plus the post-pipeline numerical
//! hygiene pass of spec §4.7.

use nalgebra::Matrix2;

use crate::complex::{clip_tiny, C};

pub type Rdm = Matrix2<C>;

/// `bloch(rho) = (2*Re(rho01), -2*Im(rho01), Re(rho00 - rho11))`.
pub fn bloch(rho: &Rdm) -> [f64; 3] {
    [
        2.0 * rho[(0, 1)].re,
        -2.0 * rho[(0, 1)].im,
        rho[(0, 0)].re - rho[(1, 1)].re,
    ]
}

/// `purity(rho) = Re(Tr(rho * rho))`, clamped to `[0, 1]`.
pub fn purity(rho: &Rdm) -> f64 {
    let tr = (rho * rho).trace();
    tr.re.clamp(0.0, 1.0)
}

/// `rho <- 1/2 (rho + rho^dagger)`.
pub fn hermitize(rho: &Rdm) -> Rdm {
    let h = rho.adjoint();
    (rho + h) * C::new(0.5, 0.0)
}

/// `rho <- rho / Re(Tr(rho))`.
pub fn normalize(rho: &Rdm) -> Rdm {
    let tr = rho.trace().re;
    if tr.abs() < 1e-300 {
        return *rho;
    }
    rho / C::new(tr, 0.0)
}

/// Clip negligible matrix entries to exact zero (spec §6.3, |entry| <= 1e-12).
pub fn clip_rdm(rho: &Rdm) -> Rdm {
    Matrix2::new(
        crate::complex::clip_complex(rho[(0, 0)]),
        crate::complex::clip_complex(rho[(0, 1)]),
        crate::complex::clip_complex(rho[(1, 0)]),
        crate::complex::clip_complex(rho[(1, 1)]),
    )
}

/// If the Bloch vector's norm exceeds 1 by more than 1e-9, rescale it to
/// unit norm; smaller overshoots are left untouched (spec §4.7).
pub fn clamp_bloch(b: [f64; 3]) -> [f64; 3] {
    let norm = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();
    if norm > 1.0 + 1e-9 {
        [clip_tiny(b[0] / norm), clip_tiny(b[1] / norm), clip_tiny(b[2] / norm)]
    } else {
        [clip_tiny(b[0]), clip_tiny(b[1]), clip_tiny(b[2])]
    }
}

/// Run the full post-processing pass of spec §4.7 on a raw RDM: hermitize,
/// normalize, then clip tiny entries.
pub fn postprocess_rdm(rho: &Rdm) -> Rdm {
    clip_rdm(&normalize(&hermitize(rho)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ket0() -> Rdm {
        Matrix2::new(C::new(1.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0))
    }

    fn maximally_mixed() -> Rdm {
        Matrix2::new(C::new(0.5, 0.0), C::new(0.0, 0.0), C::new(0.0, 0.0), C::new(0.5, 0.0))
    }

    #[test]
    fn ket0_has_unit_purity_and_plus_z_bloch() {
        let rho = ket0();
        assert_eq!(bloch(&rho), [0.0, 0.0, 1.0]);
        assert!((purity(&rho) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn maximally_mixed_has_half_purity_and_zero_bloch() {
        let rho = maximally_mixed();
        assert_eq!(bloch(&rho), [0.0, 0.0, 0.0]);
        assert!((purity(&rho) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn purity_matches_bloch_norm_identity() {
        // purity = (1 + |bloch|^2) / 2 (spec §8 property 6).
        for rho in [ket0(), maximally_mixed()] {
            let b = bloch(&rho);
            let norm2 = b[0] * b[0] + b[1] * b[1] + b[2] * b[2];
            assert!((purity(&rho) - (1.0 + norm2) / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn hermitize_fixes_small_asymmetry() {
        let rho = Matrix2::new(
            C::new(0.5, 0.0),
            C::new(0.1, 1e-3),
            C::new(0.1, -1e-3 + 2e-3),
            C::new(0.5, 0.0),
        );
        let h = hermitize(&rho);
        assert!((h[(0, 1)] - h[(1, 0)].conj()).norm() < 1e-12);
    }
}
