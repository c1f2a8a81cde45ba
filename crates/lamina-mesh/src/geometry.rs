//! Closed-surface geometry.
//!
//! The enclosed volume of an oriented triangulated surface follows from the
//! divergence theorem: every triangle spans a tetrahedron with the origin,
//! and the signed tetrahedron volumes sum to the enclosed volume. The sum
//! is independent of where the origin lies as long as the surface is closed.

use lamina_math::DVec3;

/// Area vector of triangle `(p0, p1, p2)`: `(p1 - p0) × (p2 - p0)`.
///
/// Its direction is the right-hand-rule normal, its magnitude twice the area.
#[inline]
pub fn face_area_vector(p0: DVec3, p1: DVec3, p2: DVec3) -> DVec3 {
    (p1 - p0).cross(p2 - p0)
}

/// Signed volume of the tetrahedron `(origin, p0, p1, p2)`.
#[inline]
pub fn signed_tetra_volume(p0: DVec3, p1: DVec3, p2: DVec3) -> f64 {
    p0.dot(p1.cross(p2)) / 6.0
}

/// Signed volume enclosed by an oriented triangle list.
///
/// `position` maps a vertex index to its current position. Outward-wound
/// surfaces give a positive volume. The sum runs sequentially, so
/// repeated evaluation of the same geometry reproduces the same bits.
pub fn signed_volume<F, I>(position: F, triangles: I) -> f64
where
    F: Fn(u32) -> DVec3,
    I: IntoIterator<Item = [u32; 3]>,
{
    triangles
        .into_iter()
        .map(|[a, b, c]| signed_tetra_volume(position(a), position(b), position(c)))
        .sum()
}

/// Arithmetic mean of a point set. Zero for an empty set.
pub fn centroid(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}
