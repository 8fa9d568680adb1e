//! Gate matrix constructors for the whitelisted single-qubit gate set
//! (spec §4.2/§6.2).
//!
//! Two-qubit gates (`cx`, `cy`, `cz`, `ch`) are represented structurally in
//! [`crate::ir::Instruction::Controlled1`] as a control/target pair plus the
//! *target-side* 2x2 unitary, reusing these same constructors — there is no
//! separate 4x4 matrix type for them (see `crate::kernels`).

use crate::complex::C;
use std::f64::consts::FRAC_1_SQRT_2;

/// Row-major 2x2 unitary: `[m00, m01, m10, m11]`.
pub type Mat2 = [C; 4];

const ZERO: C = C::new(0.0, 0.0);
const ONE: C = C::new(1.0, 0.0);

pub fn id() -> Mat2 {
    [ONE, ZERO, ZERO, ONE]
}

pub fn x() -> Mat2 {
    [ZERO, ONE, ONE, ZERO]
}

pub fn y() -> Mat2 {
    [ZERO, C::new(0.0, -1.0), C::new(0.0, 1.0), ZERO]
}

pub fn z() -> Mat2 {
    [ONE, ZERO, ZERO, -ONE]
}

pub fn h() -> Mat2 {
    let s = C::new(FRAC_1_SQRT_2, 0.0);
    [s, s, s, -s]
}

pub fn s() -> Mat2 {
    [ONE, ZERO, ZERO, C::new(0.0, 1.0)]
}

pub fn sdg() -> Mat2 {
    [ONE, ZERO, ZERO, C::new(0.0, -1.0)]
}

pub fn t() -> Mat2 {
    [ONE, ZERO, ZERO, C::from_polar(1.0, std::f64::consts::FRAC_PI_4)]
}

pub fn tdg() -> Mat2 {
    [ONE, ZERO, ZERO, C::from_polar(1.0, -std::f64::consts::FRAC_PI_4)]
}

pub fn sx() -> Mat2 {
    let a = C::new(0.5, 0.5);
    let b = C::new(0.5, -0.5);
    [a, b, b, a]
}

pub fn rx(theta: f64) -> Mat2 {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [C::new(c, 0.0), C::new(0.0, -s), C::new(0.0, -s), C::new(c, 0.0)]
}

pub fn ry(theta: f64) -> Mat2 {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [C::new(c, 0.0), C::new(-s, 0.0), C::new(s, 0.0), C::new(c, 0.0)]
}

pub fn rz(theta: f64) -> Mat2 {
    [C::from_polar(1.0, -theta / 2.0), ZERO, ZERO, C::from_polar(1.0, theta / 2.0)]
}

/// `u1(lambda)`, equivalent to `p(lambda)`.
pub fn u1(lambda: f64) -> Mat2 {
    [ONE, ZERO, ZERO, C::from_polar(1.0, lambda)]
}

/// Alias kept distinct from [`u1`] only at the parser/gate-name level; the
/// matrix is identical (spec §6.2 lists both `u1` and `p` as accepted
/// gate names with the same concrete interpretation).
pub fn p(lambda: f64) -> Mat2 {
    u1(lambda)
}

pub fn u2(phi: f64, lambda: f64) -> Mat2 {
    u3(std::f64::consts::FRAC_PI_2, phi, lambda)
}

pub fn u3(theta: f64, phi: f64, lambda: f64) -> Mat2 {
    let c = (theta / 2.0).cos();
    let s = (theta / 2.0).sin();
    [
        C::new(c, 0.0),
        -C::from_polar(1.0, lambda) * s,
        C::from_polar(1.0, phi) * s,
        C::from_polar(1.0, phi + lambda) * c,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::clip_complex;

    fn approx_eq(a: Mat2, b: Mat2) {
        for (x, y) in a.iter().zip(b.iter()) {
            let d = clip_complex(x - y);
            assert!(d.norm() < 1e-9, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn u3_reduces_to_named_gates() {
        approx_eq(u3(std::f64::consts::PI, 0.0, std::f64::consts::PI), x());
        approx_eq(u1(0.0), id());
        approx_eq(p(std::f64::consts::PI), z());
    }

    #[test]
    fn h_squares_to_identity_entry() {
        let hm = h();
        // (H*H)[0][0] = h00*h00 + h01*h10, should equal 1.
        let got = hm[0] * hm[0] + hm[1] * hm[2];
        assert!((got - ONE).norm() < 1e-9);
    }
}
