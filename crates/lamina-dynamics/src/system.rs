//! Everything one integrator advances: particles, membrane forces and the
//! medium that carries the tracers.

use lamina_forces::{ForceStepConfig, MediumField, MeshForceStep, UniformMedium};

use crate::state::ParticleState;

/// A membrane simulation.
///
/// Mutable access to the particles or to the bond registry marks the
/// stored forces as stale, so the next run recomputes them before moving
/// anything.
pub struct MembraneSystem {
    particles: ParticleState,
    forces: MeshForceStep,
    medium: Box<dyn MediumField + Send>,
    /// Simulation time.
    pub time: f64,
    /// Completed integration steps.
    pub step_count: u64,
    forces_current: bool,
}

impl MembraneSystem {
    /// A system whose tracers sit in a medium at rest.
    pub fn new(particles: ParticleState, forces: MeshForceStep) -> Self {
        Self::with_medium(particles, forces, Box::new(UniformMedium::at_rest()))
    }

    pub fn with_medium(
        particles: ParticleState,
        forces: MeshForceStep,
        medium: Box<dyn MediumField + Send>,
    ) -> Self {
        Self {
            particles,
            forces,
            medium,
            time: 0.0,
            step_count: 0,
            forces_current: false,
        }
    }

    /// A system with no bonds yet.
    pub fn unbonded(particles: ParticleState, config: ForceStepConfig) -> Self {
        Self::new(particles, MeshForceStep::new(config))
    }

    pub fn particles(&self) -> &ParticleState {
        &self.particles
    }

    /// Mutable particle access. Invalidates the stored forces.
    pub fn particles_mut(&mut self) -> &mut ParticleState {
        self.forces_current = false;
        &mut self.particles
    }

    pub fn forces(&self) -> &MeshForceStep {
        &self.forces
    }

    /// Mutable force-model access. Invalidates the stored forces.
    pub fn forces_mut(&mut self) -> &mut MeshForceStep {
        self.forces_current = false;
        &mut self.forces
    }

    pub fn medium(&self) -> &dyn MediumField {
        self.medium.as_ref()
    }

    /// Whether the particle force buffer matches the current positions.
    pub fn forces_current(&self) -> bool {
        self.forces_current
    }

    /// Split borrow for integrators.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&mut ParticleState, &mut MeshForceStep, &mut (dyn MediumField + Send)) {
        (&mut self.particles, &mut self.forces, self.medium.as_mut())
    }

    pub(crate) fn mark_forces_current(&mut self) {
        self.forces_current = true;
    }
}

impl std::fmt::Debug for MembraneSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MembraneSystem")
            .field("particles", &self.particles.count)
            .field("bonds", &self.forces.registry().len())
            .field("time", &self.time)
            .field("step_count", &self.step_count)
            .field("forces_current", &self.forces_current)
            .finish()
    }
}
