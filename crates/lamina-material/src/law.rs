//! Elastic laws: the core material abstraction.
//!
//! Every law is written in terms of the invariants of the right
//! Cauchy-Green tensor `C = Fᵀ F` of a 2×2 deformation gradient:
//!
//! - `I1 = tr(C) - 2`
//! - `I2 = det(C) - 1`
//!
//! Both invariants vanish at rest and every law here is stress-free there.

use lamina_math::strain::{cofactor, right_cauchy_green};
use lamina_math::{DMat2, StrainInvariants};
use lamina_types::{LaminaError, LaminaResult};
use serde::{Deserialize, Serialize};

/// Strain energy density law of a membrane triangle.
///
/// Serialized with an explicit `law` tag:
///
/// ```toml
/// law = "skalak"
/// k1 = 15.0
/// k2 = 0.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum ElasticLaw {
    /// Skalak law for area-preserving, shear-resisting membranes.
    ///
    /// `W = k1/2 · (I1² + 2·I1 − 2·I2) + k2/2 · I2²`
    Skalak {
        /// Shear/stretch modulus.
        k1: f64,
        /// Area dilation modulus. Usually zero.
        #[serde(default)]
        k2: f64,
    },

    /// Compressible neo-Hookean membrane.
    ///
    /// `W = k1 · (I1 + 1/(I2 + 1) − 1)`
    NeoHookean {
        /// Shear modulus.
        k1: f64,
    },
}

/// Stress state of one element at its current deformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressResponse {
    /// First Piola-Kirchhoff stress `P = ∂W/∂F`.
    pub piola: DMat2,
    /// Energy per unit reference area.
    pub energy_density: f64,
}

impl ElasticLaw {
    /// Skalak law with no area modulus.
    pub fn skalak(k1: f64) -> Self {
        Self::Skalak { k1, k2: 0.0 }
    }

    /// Short identifier used in logs and events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Skalak { .. } => "skalak",
            Self::NeoHookean { .. } => "neo_hookean",
        }
    }

    /// Rejects negative or non-finite moduli.
    pub fn validate(&self) -> LaminaResult<()> {
        let moduli = match *self {
            Self::Skalak { k1, k2 } => vec![("k1", k1), ("k2", k2)],
            Self::NeoHookean { k1 } => vec![("k1", k1)],
        };
        for (name, value) in moduli {
            if !value.is_finite() || value < 0.0 {
                return Err(LaminaError::InvalidParameter(format!(
                    "{} modulus {} must be finite and non-negative, got {}",
                    self.name(),
                    name,
                    value
                )));
            }
        }
        Ok(())
    }

    /// Energy per unit reference area.
    pub fn energy_density(&self, inv: StrainInvariants) -> f64 {
        let StrainInvariants { i1, i2 } = inv;
        match *self {
            Self::Skalak { k1, k2 } => {
                0.5 * k1 * (i1 * i1 + 2.0 * i1 - 2.0 * i2) + 0.5 * k2 * i2 * i2
            }
            Self::NeoHookean { k1 } => k1 * (i1 + 1.0 / (i2 + 1.0) - 1.0),
        }
    }

    /// Partial derivatives `(∂W/∂I1, ∂W/∂I2)`.
    pub fn invariant_derivatives(&self, inv: StrainInvariants) -> (f64, f64) {
        let StrainInvariants { i1, i2 } = inv;
        match *self {
            Self::Skalak { k1, k2 } => (k1 * (i1 + 1.0), -k1 + k2 * i2),
            Self::NeoHookean { k1 } => {
                let j2 = i2 + 1.0;
                (k1, -k1 / (j2 * j2))
            }
        }
    }

    /// First Piola-Kirchhoff stress for the deformation gradient `f`.
    ///
    /// With `∂I1/∂F = 2F` and `∂I2/∂F = 2F·cof(C)`:
    /// `P = 2F · (W1·I + W2·cof(C))`.
    pub fn stress(&self, f: &DMat2) -> StressResponse {
        let c = right_cauchy_green(f);
        let inv = StrainInvariants::from_cauchy_green(&c);
        let (w1, w2) = self.invariant_derivatives(inv);
        let inner = DMat2::IDENTITY * w1 + cofactor(&c) * w2;
        StressResponse {
            piola: *f * inner * 2.0,
            energy_density: self.energy_density(inv),
        }
    }
}

impl Default for ElasticLaw {
    fn default() -> Self {
        Self::skalak(0.0)
    }
}
