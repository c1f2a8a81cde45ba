//! # lamina-forces
//!
//! Force laws of the immersed-boundary membrane model and the driver that
//! applies them once per integration step.
//!
//! ## Architecture
//!
//! ```text
//! BondRegistry ──► MeshForceStep::evaluate(store)
//!                    ├── capture pending references (first evaluation)
//!                    ├── ElasticTriangleForce   (triel, rayon fold/reduce)
//!                    ├── DihedralBendingForce   (tribend, rayon fold/reduce)
//!                    ├── VolumeConservationForce (volcons, one per mesh)
//!                    └── ForceBuffer ──► ParticleStore::add_force
//! ```
//!
//! Tracer particles are moved by [`advection::TracerAdvection`], which
//! couples accumulated forces and velocities to an external [`MediumField`].
//!
//! [`MediumField`]: advection::MediumField

pub mod advection;
pub mod analysis;
pub mod bonds;
pub mod config;
pub mod particles;
pub mod step;
pub mod tribend;
pub mod triel;
pub mod volcons;

pub use advection::{MediumField, ShearMedium, TracerAdvection, UniformMedium};
pub use bonds::{BondRegistry, BondStatus, MembraneBonds, MembraneParams};
pub use config::ForceStepConfig;
pub use particles::{ForceBuffer, ParticleKinematics, ParticleStore};
pub use step::{BrokenBond, MembraneEnergy, MeshForceStep, StepReport, StepState, VolumeSample};
pub use tribend::{ReferenceAngle, TribendParams};
pub use triel::{TrielParams, TrielReference};
pub use volcons::VolConsParams;
