//! # lamina-math
//!
//! Linear algebra primitives for the Lamina membrane engine.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec3`, `DMat2`, ...)
//! - [`TriangleFrame`]: the in-plane 2-D frame of a triangle in 3-D
//! - Strain measures of a 2×2 deformation gradient (Cauchy-Green tensor,
//!   invariants, cofactor)

pub mod frame;
pub mod strain;

pub use frame::TriangleFrame;
pub use strain::StrainInvariants;

// Re-export glam types as the canonical math types for Lamina.
pub use glam::{DMat2, DVec2, DVec3};
