//! Particle store seam.
//!
//! The force model never owns particles. It reads positions and
//! accumulates forces through [`ParticleStore`]; tracer advection also
//! needs velocities and position updates through [`ParticleKinematics`].

use lamina_math::DVec3;
use lamina_types::VertexId;

/// Read positions, accumulate forces.
pub trait ParticleStore {
    /// Number of particles. Valid ids are `0..len()`.
    fn len(&self) -> usize;

    /// Returns true if the store holds no particles.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position of particle `id`.
    fn position(&self, id: VertexId) -> DVec3;

    /// Adds `force` to the accumulated force of particle `id`.
    fn add_force(&mut self, id: VertexId, force: DVec3);

    /// Whether particle `id` is an inertialess tracer.
    fn is_tracer(&self, id: VertexId) -> bool;
}

/// Full kinematic access, used when tracers are advected.
pub trait ParticleKinematics: ParticleStore {
    /// Accumulated force of particle `id`.
    fn force(&self, id: VertexId) -> DVec3;

    fn velocity(&self, id: VertexId) -> DVec3;

    fn set_velocity(&mut self, id: VertexId, velocity: DVec3);

    fn set_position(&mut self, id: VertexId, position: DVec3);
}

/// Dense per-particle force accumulator.
///
/// Bond evaluation writes here instead of into the store, so parallel
/// workers can each fold into a private buffer and merge afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceBuffer {
    forces: Vec<DVec3>,
}

impl ForceBuffer {
    /// Zeroed buffer for `len` particles.
    pub fn zeros(len: usize) -> Self {
        Self {
            forces: vec![DVec3::ZERO; len],
        }
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Accumulated force on `id`.
    #[inline]
    pub fn get(&self, id: VertexId) -> DVec3 {
        self.forces[id.index()]
    }

    /// Adds `force` to particle `id`.
    #[inline]
    pub fn add(&mut self, id: VertexId, force: DVec3) {
        self.forces[id.index()] += force;
    }

    /// Adds one force per vertex.
    #[inline]
    pub fn add_all<const N: usize>(&mut self, ids: &[VertexId; N], forces: &[DVec3; N]) {
        for (&id, &f) in ids.iter().zip(forces) {
            self.add(id, f);
        }
    }

    /// Element-wise sum of two buffers of equal length.
    pub fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.forces.iter_mut().zip(other.forces) {
            *a += b;
        }
        self
    }

    /// Sum of all forces.
    pub fn total(&self) -> DVec3 {
        self.forces.iter().copied().sum()
    }

    /// Forces as a slice, indexed by particle.
    pub fn as_slice(&self) -> &[DVec3] {
        &self.forces
    }

    /// Adds every non-zero entry to the store.
    pub fn flush_into<S: ParticleStore + ?Sized>(&self, store: &mut S) {
        for (i, &f) in self.forces.iter().enumerate() {
            if f != DVec3::ZERO {
                store.add_force(VertexId(i as u32), f);
            }
        }
    }
}
