//! # lamina-types
//!
//! Shared types, identifiers, error types, and numerical constants
//! for the Lamina immersed-boundary membrane engine.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other Lamina crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{BondFault, LaminaError, LaminaResult};
pub use ids::{BondId, MeshId, VertexId};
