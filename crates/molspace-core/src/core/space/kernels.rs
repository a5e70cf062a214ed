//! Inner loops shared by every space.
//!
//! A space only decides which constant shift to apply to the outer group; the
//! loops below do the per-pair work. `value` maps a squared distance to the
//! stored quantity and `better` folds the stored values into the single value
//! the caller gets back.

use crate::core::geometry::matrix::PairMatrix;
use nalgebra::{Point3, Vector3};

#[inline]
pub(super) fn dist(d2: f64) -> f64 {
    d2.sqrt()
}

#[inline]
pub(super) fn dist2(d2: f64) -> f64 {
    d2
}

#[inline]
pub(super) fn inv_dist(d2: f64) -> f64 {
    1.0 / d2.sqrt()
}

#[inline]
pub(super) fn inv_dist2(d2: f64) -> f64 {
    1.0 / d2
}

/// Fills `matrix` with the symmetric intra-group values; the diagonal is zero and
/// does not take part in the reduction.
pub(super) fn intra<F, B>(
    coords: &[Point3<f64>],
    matrix: &mut PairMatrix,
    value: F,
    better: B,
    init: f64,
) -> f64
where
    F: Fn(f64) -> f64,
    B: Fn(f64, f64) -> f64,
{
    let n = coords.len();
    matrix.redimension(n, n);

    let mut best = init;
    for i in 0..n {
        // SAFETY: the matrix was just redimensioned to n x n and i, j < n.
        unsafe { matrix.set_unchecked(i, i, 0.0) };
        for j in (i + 1)..n {
            let v = value((coords[j] - coords[i]).norm_squared());
            unsafe {
                matrix.set_unchecked(i, j, v);
                matrix.set_unchecked(j, i, v);
            }
            best = better(best, v);
        }
    }
    best
}

/// Fills `matrix` with `outer.len() × inner.len()` values, with every outer point
/// moved by `-shift` first.
pub(super) fn inter<F, B>(
    outer: &[Point3<f64>],
    inner: &[Point3<f64>],
    shift: &Vector3<f64>,
    matrix: &mut PairMatrix,
    value: F,
    better: B,
    init: f64,
) -> f64
where
    F: Fn(f64) -> f64,
    B: Fn(f64, f64) -> f64,
{
    matrix.redimension(outer.len(), inner.len());

    let mut best = init;
    for (i, p0) in outer.iter().enumerate() {
        let p0 = p0 - shift;
        for (slot, p1) in matrix.row_mut(i).iter_mut().zip(inner) {
            let v = value((p1 - p0).norm_squared());
            *slot = v;
            best = better(best, v);
        }
    }
    best
}

/// Like [`inter`], storing the vector from each shifted outer point to each inner
/// point. Returns the shortest distance.
pub(super) fn inter_vectors(
    outer: &[Point3<f64>],
    inner: &[Point3<f64>],
    shift: &Vector3<f64>,
    matrix: &mut PairMatrix<Vector3<f64>>,
) -> f64 {
    matrix.redimension_with(outer.len(), inner.len(), Vector3::zeros());

    let mut min_d2 = f64::INFINITY;
    for (i, p0) in outer.iter().enumerate() {
        let p0 = p0 - shift;
        for (slot, p1) in matrix.row_mut(i).iter_mut().zip(inner) {
            let v = p1 - p0;
            min_d2 = min_d2.min(v.norm_squared());
            *slot = v;
        }
    }
    min_d2.sqrt()
}

/// Smallest squared distance between the shifted outer points and the inner
/// points, without storing anything.
pub(super) fn min_dist2(outer: &[Point3<f64>], inner: &[Point3<f64>], shift: &Vector3<f64>) -> f64 {
    let mut min_d2 = f64::INFINITY;
    for p0 in outer {
        let p0 = p0 - shift;
        for p1 in inner {
            min_d2 = min_d2.min((p1 - p0).norm_squared());
        }
    }
    min_d2
}

pub(super) fn min_intra_dist2(coords: &[Point3<f64>]) -> f64 {
    let mut min_d2 = f64::INFINITY;
    for (i, p0) in coords.iter().enumerate() {
        for p1 in &coords[i + 1..] {
            min_d2 = min_d2.min((p1 - p0).norm_squared());
        }
    }
    min_d2
}
