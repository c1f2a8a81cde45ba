//! In-plane triangle elasticity (ElasticTriangleForce).
//!
//! Each triangle is treated as a 2-D finite element. At activation the
//! triangle is laid into its own plane ([`TriangleFrame`]) and the inverse
//! reference edge matrix `Dm⁻¹` is stored. Every step:
//!
//! 1. Lay the current triangle into its own plane, giving `Ds`
//! 2. Deformation gradient `F = Ds · Dm⁻¹`
//! 3. First Piola stress `P` from the elastic law
//! 4. In-plane forces on vertices 1 and 2 are the columns of
//!    `H = −A₀ · P · Dm⁻ᵀ`; vertex 0 receives minus their sum
//!
//! The energy depends on `F` only through `Fᵀ F`, so the three forces sum
//! to zero and carry no net torque.

use lamina_material::ElasticLaw;
use lamina_math::{DMat2, DVec3, TriangleFrame};
use lamina_types::constants::{DEFAULT_MAX_STRETCH, DEGENERATE_AREA_THRESHOLD};
use lamina_types::{BondFault, LaminaError, LaminaResult};
use serde::{Deserialize, Serialize};

/// Parameters of a triangle bond.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrielParams {
    /// Largest allowed ratio of current to reference edge length.
    #[serde(default = "default_max_stretch")]
    pub max_stretch: f64,
    /// Elastic law and its moduli.
    pub law: ElasticLaw,
}

fn default_max_stretch() -> f64 {
    DEFAULT_MAX_STRETCH
}

impl TrielParams {
    /// Skalak triangle with no area modulus and the default stretch limit.
    pub fn skalak(k1: f64) -> Self {
        Self {
            max_stretch: DEFAULT_MAX_STRETCH,
            law: ElasticLaw::skalak(k1),
        }
    }

    pub fn with_max_stretch(mut self, max_stretch: f64) -> Self {
        self.max_stretch = max_stretch;
        self
    }

    pub fn validate(&self) -> LaminaResult<()> {
        self.law.validate()?;
        if !(self.max_stretch.is_finite() && self.max_stretch > 0.0) {
            return Err(LaminaError::InvalidParameter(format!(
                "max_stretch must be positive and finite, got {}",
                self.max_stretch
            )));
        }
        Ok(())
    }
}

impl Default for TrielParams {
    fn default() -> Self {
        Self::skalak(0.0)
    }
}

/// Reference shape of a triangle, captured once at activation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrielReference {
    /// Inverse of the reference edge matrix in the triangle's own frame.
    pub dm_inv: DMat2,
    /// Reference area.
    pub area: f64,
    /// Reference lengths of the edges 0→1, 0→2 and 1→2.
    pub edge_lengths: [f64; 3],
}

impl TrielReference {
    /// Captures the reference shape from vertex positions.
    ///
    /// Returns `None` for a triangle with (near) zero area.
    pub fn capture(p: [DVec3; 3]) -> Option<Self> {
        let frame = TriangleFrame::new(p[0], p[1], p[2], DEGENERATE_AREA_THRESHOLD)?;
        Some(Self {
            dm_inv: frame.edges.inverse(),
            area: frame.area(),
            edge_lengths: edge_lengths(p),
        })
    }
}

/// Forces and energy of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleContribution {
    pub forces: [DVec3; 3],
    pub energy: f64,
}

/// Largest ratio of current to reference edge length.
pub fn max_stretch_ratio(reference: &TrielReference, p: [DVec3; 3]) -> f64 {
    let current = edge_lengths(p);
    current
        .iter()
        .zip(&reference.edge_lengths)
        .map(|(c, r)| c / r)
        .fold(0.0, f64::max)
}

/// Evaluates the elastic forces of one triangle.
///
/// Fails with [`BondFault::Broken`] when any edge exceeds `max_stretch`
/// times its reference length, and with [`BondFault::DegenerateGeometry`]
/// when the current triangle has collapsed. Neither applies any force.
pub fn evaluate(
    params: &TrielParams,
    reference: &TrielReference,
    p: [DVec3; 3],
) -> Result<TriangleContribution, BondFault> {
    let stretch = max_stretch_ratio(reference, p);
    if stretch > params.max_stretch {
        return Err(BondFault::Broken {
            stretch,
            limit: params.max_stretch,
        });
    }

    let current = TriangleFrame::new(p[0], p[1], p[2], DEGENERATE_AREA_THRESHOLD)
        .ok_or(BondFault::DegenerateGeometry)?;

    let f = current.edges * reference.dm_inv;
    let response = params.law.stress(&f);
    let h = response.piola * reference.dm_inv.transpose() * -reference.area;

    let f1 = current.to_world(h.x_axis);
    let f2 = current.to_world(h.y_axis);
    Ok(TriangleContribution {
        forces: [-(f1 + f2), f1, f2],
        energy: reference.area * response.energy_density,
    })
}

/// Elastic energy of one triangle, without forces.
pub fn energy(params: &TrielParams, reference: &TrielReference, p: [DVec3; 3]) -> Option<f64> {
    let current = TriangleFrame::new(p[0], p[1], p[2], DEGENERATE_AREA_THRESHOLD)?;
    let f = current.edges * reference.dm_inv;
    Some(reference.area * params.law.stress(&f).energy_density)
}

fn edge_lengths(p: [DVec3; 3]) -> [f64; 3] {
    [
        p[0].distance(p[1]),
        p[0].distance(p[2]),
        p[1].distance(p[2]),
    ]
}
