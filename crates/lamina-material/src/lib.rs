//! # lamina-material
//!
//! Constitutive laws for in-plane membrane elasticity.
//!
//! ## Design
//!
//! The set of laws is small and evaluated for every triangle every step,
//! so [`ElasticLaw`] is a closed enum rather than a trait object. Each
//! variant defines a strain energy density `W(I1, I2)` over the two 2-D
//! strain invariants; stress and vertex forces follow from the two
//! partial derivatives `∂W/∂I1` and `∂W/∂I2`.

pub mod law;

pub use law::{ElasticLaw, StressResponse};
