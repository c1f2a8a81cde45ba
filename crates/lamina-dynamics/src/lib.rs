//! # lamina-dynamics
//!
//! Reference time integration for membrane systems.
//!
//! ## Key Types
//!
//! - [`ParticleState`]: SoA particle buffers implementing the force model's
//!   particle store traits.
//! - [`MembraneSystem`]: Particles, the membrane force driver and the medium.
//! - [`Integrator`]: Time integration strategy trait.
//! - [`LangevinIntegrator`]: Velocity Verlet with a Langevin thermostat;
//!   tracers are advected by the medium instead.
//! - [`scenarios`]: Canonical set-ups (bending pair, triangle relaxation,
//!   volume cube).

pub mod config;
pub mod langevin;
pub mod scenarios;
pub mod state;
pub mod strategy;
pub mod system;

pub use config::{IntegratorConfig, LangevinConfig};
pub use langevin::LangevinIntegrator;
pub use state::ParticleState;
pub use strategy::{Integrator, RunSummary, StepResult};
pub use system::MembraneSystem;
