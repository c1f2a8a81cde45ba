//! Whole-mesh volume conservation (VolumeConservationForce).
//!
//! The enclosed volume `V` of a closed, outward-wound mesh is the signed
//! tetrahedron sum over its triangles. With `V₀` the reference volume and
//! `κ` the modulus, every triangle pushes its three vertices along its
//! inward area vector:
//!
//! `fᵢ += −κ (V − V₀) / V · ½ (p1 − p0) × (p2 − p0)`
//!
//! An expanded mesh (`V > V₀`) is pulled inward, a compressed one pushed
//! outward, and the undeformed mesh feels exactly zero force.
//!
//! On a closed mesh `Σ ½ (p1 − p0) × (p2 − p0) = 3 ∂V/∂pᵢ`, so the force is
//! `−3κ (V − V₀) / V · ∂V/∂pᵢ`, the gradient of
//!
//! `E = 3κ (V − V₀ − V₀ ln(V / V₀))`.

use lamina_math::DVec3;
use lamina_mesh::geometry::{face_area_vector, signed_volume};
use lamina_types::constants::DEGENERATE_VOLUME_THRESHOLD;
use lamina_types::{BondFault, LaminaError, LaminaResult, VertexId};
use serde::{Deserialize, Serialize};

use crate::particles::ForceBuffer;

/// Parameters of a volume-conservation bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolConsParams {
    /// Volume modulus.
    pub kappa_v: f64,
}

impl VolConsParams {
    pub fn new(kappa_v: f64) -> Self {
        Self { kappa_v }
    }

    pub fn validate(&self) -> LaminaResult<()> {
        if !(self.kappa_v.is_finite() && self.kappa_v >= 0.0) {
            return Err(LaminaError::InvalidParameter(format!(
                "volume modulus kappa_v must be finite and non-negative, got {}",
                self.kappa_v
            )));
        }
        Ok(())
    }
}

/// Volume state of one mesh after a force evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeContribution {
    /// Current enclosed volume.
    pub volume: f64,
    /// `3κ (V − V₀ − V₀ ln(V / V₀))`.
    pub energy: f64,
}

/// Enclosed volume of `triangles` with vertex positions looked up in `positions`.
pub fn mesh_volume(positions: &[DVec3], triangles: &[[VertexId; 3]]) -> f64 {
    signed_volume(
        |i| positions[i as usize],
        triangles.iter().map(|t| [t[0].0, t[1].0, t[2].0]),
    )
}

fn potential(kappa_v: f64, reference_volume: f64, volume: f64) -> f64 {
    3.0 * kappa_v * (volume - reference_volume - reference_volume * (volume / reference_volume).ln())
}

/// Volume energy of `triangles` at `positions`, `None` when the mesh has
/// collapsed or turned inside out.
pub fn energy(
    params: &VolConsParams,
    reference_volume: f64,
    triangles: &[[VertexId; 3]],
    positions: &[DVec3],
) -> Option<f64> {
    let volume = mesh_volume(positions, triangles);
    (volume >= DEGENERATE_VOLUME_THRESHOLD)
        .then(|| potential(params.kappa_v, reference_volume, volume))
}

/// Accumulates the volume-conservation forces of one mesh into `out`.
///
/// Fails with [`BondFault::DegenerateGeometry`] when the current volume
/// has collapsed to (near) zero or turned negative; no force is applied
/// in that case.
pub fn accumulate(
    params: &VolConsParams,
    reference_volume: f64,
    triangles: &[[VertexId; 3]],
    positions: &[DVec3],
    out: &mut ForceBuffer,
) -> Result<VolumeContribution, BondFault> {
    let volume = mesh_volume(positions, triangles);
    if volume < DEGENERATE_VOLUME_THRESHOLD {
        return Err(BondFault::DegenerateGeometry);
    }

    let delta = volume - reference_volume;
    let fact = params.kappa_v * delta / volume;
    if fact != 0.0 {
        for tri in triangles {
            let [a, b, c] = *tri;
            let n = face_area_vector(
                positions[a.index()],
                positions[b.index()],
                positions[c.index()],
            );
            let force = n * (-0.5 * fact);
            out.add_all(tri, &[force; 3]);
        }
    }

    Ok(VolumeContribution {
        volume,
        energy: potential(params.kappa_v, reference_volume, volume),
    })
}
