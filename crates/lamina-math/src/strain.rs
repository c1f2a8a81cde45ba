//! Strain measures of an in-plane deformation gradient.
//!
//! For a membrane element the deformation gradient `F` is 2×2 (reference
//! plane → current plane). Strain energies of isotropic membranes depend on
//! `F` only through the right Cauchy-Green tensor `C = Fᵀ F`, and in 2-D
//! through its two invariants
//!
//! - `I1 = tr(C) - 2` (isotropic stretch)
//! - `I2 = det(C) - 1` (area change)
//!
//! both of which vanish in the reference configuration.

use glam::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

/// The two strain invariants of a 2-D deformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrainInvariants {
    /// `tr(C) - 2`.
    pub i1: f64,
    /// `det(C) - 1`.
    pub i2: f64,
}

impl StrainInvariants {
    /// Invariants of the undeformed state.
    pub const ZERO: Self = Self { i1: 0.0, i2: 0.0 };

    /// Invariants of a right Cauchy-Green tensor.
    #[inline]
    pub fn from_cauchy_green(c: &DMat2) -> Self {
        Self {
            i1: trace(c) - 2.0,
            i2: c.determinant() - 1.0,
        }
    }
}

/// Right Cauchy-Green tensor `C = Fᵀ F`.
///
/// Measures stretch independent of rotation.
#[inline]
pub fn right_cauchy_green(f: &DMat2) -> DMat2 {
    f.transpose() * *f
}

/// Trace of a 2×2 matrix.
#[inline]
pub fn trace(m: &DMat2) -> f64 {
    m.x_axis.x + m.y_axis.y
}

/// Cofactor matrix, `∂ det(M) / ∂M`.
///
/// For `M = [[a, b], [c, d]]` this is `[[d, -c], [-b, a]]`.
#[inline]
pub fn cofactor(m: &DMat2) -> DMat2 {
    // Columns of M are (a, c) and (b, d)
    let a = m.x_axis.x;
    let c = m.x_axis.y;
    let b = m.y_axis.x;
    let d = m.y_axis.y;
    DMat2::from_cols(DVec2::new(d, -b), DVec2::new(-c, a))
}
