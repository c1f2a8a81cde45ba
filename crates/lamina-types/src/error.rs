//! Error types for the Lamina engine.
//!
//! Configuration-time failures are fatal and returned as [`LaminaError`].
//! Conditions detected while evaluating a single bond are reported as a
//! [`BondFault`] and never abort the surrounding force step.

use thiserror::Error;

use crate::ids::{BondId, MeshId, VertexId};

/// Unified error type for the Lamina engine.
#[derive(Debug, Error)]
pub enum LaminaError {
    /// Mesh data is malformed (index out of range, repeated vertex, ...).
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A volume mesh is not a closed, consistently oriented 2-manifold.
    #[error("Inconsistent topology for mesh {mesh:?}: {reason}")]
    InconsistentTopology {
        mesh: MeshId,
        reason: String,
    },

    /// A bond or material parameter is out of its valid range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bond references a vertex the particle store does not hold.
    #[error("Bond {bond:?} references unknown vertex {vertex:?} (store holds {len} particles)")]
    UnknownVertex {
        bond: BondId,
        vertex: VertexId,
        len: usize,
    },

    /// Lookup of a bond id that was never registered.
    #[error("Unknown bond {0:?}")]
    UnknownBond(BondId),

    /// Reference geometry captured at activation is unusable.
    #[error("Degenerate reference geometry for bond {bond:?}: {reason}")]
    DegenerateReference {
        bond: BondId,
        reason: String,
    },

    /// Forces were requested before reference geometry was captured.
    #[error("Force model not activated: {pending} bond(s) have no reference geometry")]
    NotActivated {
        pending: usize,
    },
}

/// Convenience alias for `Result<T, LaminaError>`.
pub type LaminaResult<T> = Result<T, LaminaError>;

/// Recoverable per-bond condition raised during force evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BondFault {
    /// An edge stretched past `limit` times its reference length.
    #[error("bond broken: edge stretch {stretch:.3} exceeds limit {limit:.3}")]
    Broken {
        stretch: f64,
        limit: f64,
    },

    /// Near-zero area, edge length or volume; the bond contributes no force.
    #[error("degenerate geometry")]
    DegenerateGeometry,
}
