//! Simulation event types.
//!
//! Events are small value types tagged with the step that produced them.
//! Identifiers are carried as raw integers so the telemetry crate stays
//! independent of the engine's type vocabulary.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Integration step counter (0 before the first step).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Membrane energy contribution a [`EventKind::MembraneEnergy`] event reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyKind {
    Stretching,
    Bending,
    Volume,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Integration step started.
    StepBegin {
        /// Simulation time at the start of the step.
        sim_time: f64,
    },

    /// Integration step completed.
    StepEnd {
        /// Simulation time at the end of the step.
        sim_time: f64,
        /// Kinetic energy of the non-tracer particles.
        kinetic: f64,
    },

    /// Reference geometry captured for every pending bond.
    ReferenceCaptured {
        triangles: u32,
        bendings: u32,
        volumes: u32,
    },

    /// A triangle bond exceeded its stretch limit and was disabled.
    BondBroken {
        bond: u32,
        /// Largest current/reference edge length ratio.
        stretch: f64,
    },

    /// A bond contributed no force because its geometry degenerated.
    DegenerateGeometry {
        bond: u32,
    },

    /// Summed elastic energy of one bond kind.
    MembraneEnergy {
        kind: EnergyKind,
        energy: f64,
    },

    /// Enclosed volume of a mesh relative to its reference.
    VolumeDrift {
        mesh: u16,
        volume: f64,
        reference: f64,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
