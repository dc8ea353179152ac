// src/utils/geometry.rs

use nalgebra::Vector3;

/// Arithmetic mean of a set of points; `None` for an empty set.
pub fn centroid(points: &[Vector3<f64>]) -> Option<Vector3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p);
    Some(sum / points.len() as f64)
}

/// Unit vector along `v`, or `None` when `v` has zero (or non-finite) length.
pub fn unit_vector(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    let l = v.norm();
    if l == 0.0 || !l.is_finite() {
        None
    } else {
        Some(v / l)
    }
}

/// Fourth corner of the parallelogram spanned from `apex` towards `a` and `b`.
pub fn parallelogram_vertex(a: &Vector3<f64>, apex: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
    a - apex + b
}
