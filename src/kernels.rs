//! Bit-indexed statevector kernels and per-qubit RDM extraction (spec §4.4).
//!
//! Basis index `b` encodes qubit `i` in bit `i` (spec §3, "Endianness").
//! These kernels generalize the teacher crate's `index1`/`index2` bit-
//! splicing helpers (`simulatortools.rs`) from "build the `2^n x 2^n`
//! enlarged operator, then multiply" to in-place amplitude updates: each
//! gate touches only the O(2^n) basis pairs it actually acts on, so no
//! `4^n` intermediate is ever materialized for the unitary/trajectory
//! pipelines (spec §4.4 "Complexity").

use nalgebra::{DMatrix, Matrix2};

use crate::gate::Mat2;
use crate::complex::C;

/// Remove bit `i` from `b`, shifting higher bits down by one
/// (teacher's `index1` run in reverse).
#[inline]
pub fn without_bit(b: usize, i: usize) -> usize {
    let low = b & ((1 << i) - 1);
    let high = (b >> (i + 1)) << i;
    high | low
}

/// Insert `value` (0 or 1) as bit `i` of `k`, shifting bits `>= i` up by one.
/// This is exactly the teacher's `index1(b, i, k)`.
#[inline]
pub fn insert_bit(k: usize, i: usize, value: usize) -> usize {
    let low = k & ((1 << i) - 1);
    let high = (k >> i) << (i + 1);
    high | (value << i) | low
}

#[inline]
fn bit(b: usize, i: usize) -> usize {
    (b >> i) & 1
}

/// Apply a single-qubit unitary `m` to `qubit` in place.
pub fn apply_single(state: &mut [C], n: usize, qubit: usize, m: &Mat2) {
    let half = 1usize << (n - 1);
    for k in 0..half {
        let b0 = insert_bit(k, qubit, 0);
        let b1 = insert_bit(k, qubit, 1);
        let a0 = state[b0];
        let a1 = state[b1];
        state[b0] = m[0] * a0 + m[1] * a1;
        state[b1] = m[2] * a0 + m[3] * a1;
    }
}

/// Apply `m` to `target` only on basis indices where `control`'s bit is 1.
pub fn apply_controlled(state: &mut [C], n: usize, control: usize, target: usize, m: &Mat2) {
    for b in 0..(1usize << n) {
        if bit(b, target) == 0 && bit(b, control) == 1 {
            let b0 = b;
            let b1 = b | (1 << target);
            let a0 = state[b0];
            let a1 = state[b1];
            state[b0] = m[0] * a0 + m[1] * a1;
            state[b1] = m[2] * a0 + m[3] * a1;
        }
    }
}

/// Toffoli: flip `target` iff both `control0` and `control1` are 1.
pub fn apply_toffoli(state: &mut [C], n: usize, control0: usize, control1: usize, target: usize) {
    for b in 0..(1usize << n) {
        if bit(b, target) == 0 && bit(b, control0) == 1 && bit(b, control1) == 1 {
            state.swap(b, b | (1 << target));
        }
    }
}

/// Exchange the amplitudes of any basis-index pair differing exactly in
/// bits `a` and `b`.
pub fn apply_swap(state: &mut [C], n: usize, a: usize, b: usize) {
    for idx in 0..(1usize << n) {
        if bit(idx, a) == 0 && bit(idx, b) == 1 {
            let other = (idx & !(1 << a) & !(1 << b)) | (1 << a);
            state.swap(idx, other);
        }
    }
}

/// Extract the reduced density matrix of `qubit` from a full statevector
/// via the reshape+GEMM kernel of spec §4.4: view `state` as a
/// `2 x 2^{n-1}` matrix `V` (rows = the traced qubit's value, columns = the
/// remaining qubits packed in their original relative order) and compute
/// `V * V^\dagger` with a single dense matrix-matrix multiply.
pub fn rdm_from_statevector(state: &[C], n: usize, qubit: usize) -> Matrix2<C> {
    let cols = 1usize << (n - 1);
    let mut v = DMatrix::<C>::zeros(2, cols);
    for b in 0..state.len() {
        let row = bit(b, qubit);
        let col = without_bit(b, qubit);
        v[(row, col)] = state[b];
    }
    let vt = v.adjoint();
    let rho = &v * &vt;
    Matrix2::new(rho[(0, 0)], rho[(0, 1)], rho[(1, 0)], rho[(1, 1)])
}
