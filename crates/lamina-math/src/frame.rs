//! In-plane frame of a triangle embedded in 3-D.
//!
//! A membrane triangle is a 2-D element living in 3-D space. The frame puts
//! vertex 0 at the origin, the edge 0→1 along the local x axis and vertex 2
//! in the upper half plane, so the edge matrix of the triangle is a 2×2
//! upper-triangular matrix. Deformation gradients are then plain 2×2
//! matrices mapping the reference edge matrix onto the current one.

use glam::{DMat2, DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Orthonormal in-plane frame of a triangle plus its local edge matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriangleFrame {
    /// Unit vector along the edge 0→1.
    pub x_axis: DVec3,
    /// Unit vector in the triangle plane, perpendicular to `x_axis`,
    /// pointing to the side of vertex 2.
    pub y_axis: DVec3,
    /// Edge matrix in local coordinates. Column 0 is the edge 0→1,
    /// column 1 is the edge 0→2.
    pub edges: DMat2,
}

impl TriangleFrame {
    /// Builds the frame of triangle `(p0, p1, p2)`.
    ///
    /// Returns `None` when twice the triangle area falls below
    /// `area_eps`; no in-plane frame exists for a degenerate triangle.
    pub fn new(p0: DVec3, p1: DVec3, p2: DVec3, area_eps: f64) -> Option<Self> {
        let e1 = p1 - p0;
        let e2 = p2 - p0;

        let len1 = e1.length();
        if len1 <= 0.0 {
            return None;
        }
        let x_axis = e1 / len1;

        // Component of e2 perpendicular to the first edge
        let along = e2.dot(x_axis);
        let perp = e2 - x_axis * along;
        let height = perp.length();
        if len1 * height < area_eps {
            return None;
        }
        let y_axis = perp / height;

        Some(Self {
            x_axis,
            y_axis,
            edges: DMat2::from_cols(DVec2::new(len1, 0.0), DVec2::new(along, height)),
        })
    }

    /// Triangle area (half the determinant of the edge matrix).
    #[inline]
    pub fn area(&self) -> f64 {
        0.5 * self.edges.determinant()
    }

    /// Maps a local 2-D vector back into 3-D.
    #[inline]
    pub fn to_world(&self, v: DVec2) -> DVec3 {
        self.x_axis * v.x + self.y_axis * v.y
    }

    /// Projects a 3-D vector onto the triangle plane, in local coordinates.
    #[inline]
    pub fn to_local(&self, v: DVec3) -> DVec2 {
        DVec2::new(v.dot(self.x_axis), v.dot(self.y_axis))
    }
}

/// Twice the area of triangle `(p0, p1, p2)`, i.e. `|(p1 - p0) × (p2 - p0)|`.
#[inline]
pub fn double_area(p0: DVec3, p1: DVec3, p2: DVec3) -> f64 {
    (p1 - p0).cross(p2 - p0).length()
}
