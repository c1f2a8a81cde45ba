//! Dihedral bending between two triangles sharing an edge (DihedralBendingForce).
//!
//! ## Geometry
//!
//! A bending bond holds four vertices `[p0, p1, p2, p3]` describing the
//! triangles `(p0, p1, p2)` and `(p0, p2, p3)`, which share the edge
//! `e = p2 − p0`:
//! ```text
//!          p1
//!         /  \
//!       p0 ── p2
//!         \  /
//!          p3
//! ```
//! With the right-hand-rule normals `nA = (p1 − p0) × e` and
//! `nB = e × (p3 − p0)` the signed dihedral angle is
//!
//! `θ = atan2((nA × nB) · ê, nA · nB)`
//!
//! so `|θ| = arccos(n̂A · n̂B)`, and `θ = 0` for a flat pair. The interior
//! angle between the two faces is `π − |θ|`.
//!
//! Energy `E = kb/2 · (θ − θ₀)²`, forces `−kb (θ − θ₀) ∂θ/∂pᵢ`, using the
//! closed-form gradient of the signed angle.

use std::f64::consts::PI;

use lamina_math::DVec3;
use lamina_types::constants::{DEGENERATE_AREA_THRESHOLD, DEGENERATE_EDGE_THRESHOLD};
use lamina_types::{BondFault, LaminaError, LaminaResult};
use serde::{Deserialize, Serialize};

/// Where the reference dihedral angle of a bending bond comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceAngle {
    /// Captured from the geometry at activation.
    Initial,
    /// Flat pair (`θ₀ = 0`, interior angle π).
    Flat,
    /// Explicit signed dihedral angle in radians.
    Explicit(f64),
}

/// Parameters of a bending bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TribendParams {
    /// Bending modulus.
    pub kb: f64,
    #[serde(default = "default_reference")]
    pub reference: ReferenceAngle,
}

fn default_reference() -> ReferenceAngle {
    ReferenceAngle::Initial
}

impl TribendParams {
    /// Bond whose reference angle is captured at activation.
    pub fn initial(kb: f64) -> Self {
        Self {
            kb,
            reference: ReferenceAngle::Initial,
        }
    }

    /// Bond that relaxes toward a flat pair.
    pub fn flat(kb: f64) -> Self {
        Self {
            kb,
            reference: ReferenceAngle::Flat,
        }
    }

    pub fn validate(&self) -> LaminaResult<()> {
        if !(self.kb.is_finite() && self.kb >= 0.0) {
            return Err(LaminaError::InvalidParameter(format!(
                "bending modulus kb must be finite and non-negative, got {}",
                self.kb
            )));
        }
        if let ReferenceAngle::Explicit(theta) = self.reference {
            if !(theta.is_finite() && theta.abs() <= PI) {
                return Err(LaminaError::InvalidParameter(format!(
                    "explicit reference angle must lie in [-π, π], got {}",
                    theta
                )));
            }
        }
        Ok(())
    }

    /// Resolves the reference angle for the activation geometry `p`.
    ///
    /// Returns `None` only for [`ReferenceAngle::Initial`] on a degenerate pair.
    pub fn resolve_reference(&self, p: [DVec3; 4]) -> Option<f64> {
        match self.reference {
            ReferenceAngle::Initial => dihedral_angle(p),
            ReferenceAngle::Flat => Some(0.0),
            ReferenceAngle::Explicit(theta) => Some(theta),
        }
    }
}

/// Forces and energy of one bending bond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BendingContribution {
    pub forces: [DVec3; 4],
    pub energy: f64,
    /// Signed dihedral angle at evaluation.
    pub angle: f64,
}

struct Hinge {
    n_a: DVec3,
    n_b: DVec3,
    edge: DVec3,
    edge_len: f64,
}

impl Hinge {
    fn new(p: [DVec3; 4]) -> Option<Self> {
        let edge = p[2] - p[0];
        let edge_len = edge.length();
        if edge_len < DEGENERATE_EDGE_THRESHOLD {
            return None;
        }
        let n_a = (p[1] - p[0]).cross(edge);
        let n_b = edge.cross(p[3] - p[0]);
        if n_a.length() < DEGENERATE_AREA_THRESHOLD || n_b.length() < DEGENERATE_AREA_THRESHOLD {
            return None;
        }
        Some(Self {
            n_a,
            n_b,
            edge,
            edge_len,
        })
    }

    fn angle(&self) -> f64 {
        let sin = self.n_a.cross(self.n_b).dot(self.edge) / self.edge_len;
        let cos = self.n_a.dot(self.n_b);
        sin.atan2(cos)
    }
}

/// Signed dihedral angle of the pair, `None` if either triangle or the
/// shared edge is degenerate.
pub fn dihedral_angle(p: [DVec3; 4]) -> Option<f64> {
    Hinge::new(p).map(|h| h.angle())
}

/// Interior angle between the two faces: π for a flat pair.
pub fn interior_angle(p: [DVec3; 4]) -> Option<f64> {
    dihedral_angle(p).map(|theta| PI - theta.abs())
}

/// Difference of two angles wrapped into `(−π, π]`.
fn wrapped_difference(theta: f64, reference: f64) -> f64 {
    let d = theta - reference;
    if d > PI {
        d - 2.0 * PI
    } else if d <= -PI {
        d + 2.0 * PI
    } else {
        d
    }
}

/// Evaluates the bending forces of one bond against reference angle `theta_ref`.
pub fn evaluate(
    kb: f64,
    theta_ref: f64,
    p: [DVec3; 4],
) -> Result<BendingContribution, BondFault> {
    let hinge = Hinge::new(p).ok_or(BondFault::DegenerateGeometry)?;
    let theta = hinge.angle();
    let delta = wrapped_difference(theta, theta_ref);

    // ∂θ/∂p for the wing vertices
    let g1 = hinge.n_a * (hinge.edge_len / hinge.n_a.length_squared());
    let g3 = hinge.n_b * (hinge.edge_len / hinge.n_b.length_squared());

    // Edge vertices share the wing gradients by the wings' projections on the edge
    let le2 = hinge.edge_len * hinge.edge_len;
    let ta = (p[1] - p[0]).dot(hinge.edge) / le2;
    let tb = (p[3] - p[0]).dot(hinge.edge) / le2;
    let g0 = -g1 * (1.0 - ta) - g3 * (1.0 - tb);
    let g2 = -g1 * ta - g3 * tb;

    let scale = -kb * delta;
    Ok(BendingContribution {
        forces: [g0 * scale, g1 * scale, g2 * scale, g3 * scale],
        energy: 0.5 * kb * delta * delta,
        angle: theta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_keeps_small_differences() {
        assert_eq!(wrapped_difference(0.3, 0.1), 0.3 - 0.1);
    }

    #[test]
    fn wrapping_crosses_the_branch_cut() {
        let d = wrapped_difference(-PI + 0.1, PI - 0.1);
        assert!((d - 0.2).abs() < 1e-12);
    }

    #[test]
    fn collapsed_edge_is_degenerate() {
        let p = [DVec3::ZERO, DVec3::Y, DVec3::ZERO, DVec3::X];
        assert!(Hinge::new(p).is_none());
    }
}
