//! Planar geometry helpers for pose analysis.
//!
//! Joint angles are computed on the 2D (x, y) projection of the
//! normalized camera coordinates; the z component of a landmark is
//! too noisy from a monocular estimator to be load-bearing here.

use nalgebra::Vector2;

use crate::types::Landmark;

/// Angle in degrees at vertex `b` formed by the rays `b -> a` and
/// `b -> c`, via the dot-product / arccos formula. Always in [0, 180].
///
/// The cosine is clamped to [-1, 1] before the inverse cosine to guard
/// against floating-point overshoot. Degenerate rays (coincident
/// points) yield 0.0 rather than NaN so downstream threshold checks
/// stay well defined.
pub fn angle_at(a: &Landmark, b: &Landmark, c: &Landmark) -> f64 {
    let v1 = Vector2::new(a.x - b.x, a.y - b.y);
    let v2 = Vector2::new(c.x - b.x, c.y - b.y);

    let norms = v1.norm() * v2.norm();
    if norms < 1e-10 {
        return 0.0;
    }

    let cos = (v1.dot(&v2) / norms).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}

/// Euclidean distance between two landmarks on the (x, y) plane.
pub fn planar_distance(a: &Landmark, b: &Landmark) -> f64 {
    Vector2::new(a.x - b.x, a.y - b.y).norm()
}
