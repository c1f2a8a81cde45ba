//! Tracer advection (TracerAdvection).
//!
//! Inertialess tracers are not integrated with Newton's second law. Their
//! accumulated membrane force is handed to the surrounding medium as a
//! reaction force, and they move with the medium velocity sampled at their
//! position. The medium itself is external and seen only through
//! [`MediumField`].

use lamina_math::DVec3;
use lamina_types::VertexId;

use crate::particles::ParticleKinematics;

/// The medium tracers are immersed in.
pub trait MediumField {
    /// Medium velocity at `position`.
    fn velocity_at(&self, position: DVec3) -> DVec3;

    /// Couples `force`, exerted by a tracer at `position`, into the medium.
    fn apply_reaction_force(&mut self, position: DVec3, force: DVec3);

    /// Advances the medium by `dt`, consuming the deposited forces.
    fn advance(&mut self, _dt: f64) {}
}

/// Adapter between membrane forces and a [`MediumField`]. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracerAdvection;

impl TracerAdvection {
    /// Medium velocity at `position`.
    #[inline]
    pub fn sample_velocity<M: MediumField + ?Sized>(medium: &M, position: DVec3) -> DVec3 {
        medium.velocity_at(position)
    }

    /// Hands `force` to the medium at `position`.
    #[inline]
    pub fn deposit_force<M: MediumField + ?Sized>(medium: &mut M, position: DVec3, force: DVec3) {
        medium.apply_reaction_force(position, force);
    }

    /// Deposits the accumulated force of every tracer into the medium.
    ///
    /// Returns the number of tracers visited.
    pub fn spread_forces<S, M>(store: &S, medium: &mut M) -> usize
    where
        S: ParticleKinematics + ?Sized,
        M: MediumField + ?Sized,
    {
        let mut count = 0;
        for id in tracers(store) {
            Self::deposit_force(medium, store.position(id), store.force(id));
            count += 1;
        }
        count
    }

    /// Sets every tracer's velocity to the sampled medium velocity and
    /// moves it by `velocity · dt`.
    pub fn update_tracers<S, M>(store: &mut S, medium: &M, dt: f64)
    where
        S: ParticleKinematics + ?Sized,
        M: MediumField + ?Sized,
    {
        let ids: Vec<VertexId> = tracers(store).collect();
        for id in ids {
            let position = store.position(id);
            let velocity = Self::sample_velocity(medium, position);
            store.set_velocity(id, velocity);
            store.set_position(id, position + velocity * dt);
        }
    }
}

fn tracers<S: ParticleKinematics + ?Sized>(store: &S) -> impl Iterator<Item = VertexId> + '_ {
    (0..store.len() as u32)
        .map(VertexId)
        .filter(move |&id| store.is_tracer(id))
}

/// A medium moving with one constant velocity everywhere.
///
/// Deposited forces do not change the flow; they are summed so tests and
/// diagnostics can check momentum transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UniformMedium {
    pub velocity: DVec3,
    /// Forces deposited since the last [`advance`](MediumField::advance).
    pub pending_force: DVec3,
    /// Impulse transferred over all completed steps.
    pub impulse: DVec3,
}

impl UniformMedium {
    /// A medium at rest.
    pub fn at_rest() -> Self {
        Self::default()
    }

    pub fn moving(velocity: DVec3) -> Self {
        Self {
            velocity,
            ..Self::default()
        }
    }
}

impl MediumField for UniformMedium {
    fn velocity_at(&self, _position: DVec3) -> DVec3 {
        self.velocity
    }

    fn apply_reaction_force(&mut self, _position: DVec3, force: DVec3) {
        self.pending_force += force;
    }

    fn advance(&mut self, dt: f64) {
        self.impulse += self.pending_force * dt;
        self.pending_force = DVec3::ZERO;
    }
}

/// Simple shear flow `v = (rate · (z − z0), 0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearMedium {
    pub rate: f64,
    /// Height of the plane at rest.
    pub z0: f64,
}

impl MediumField for ShearMedium {
    fn velocity_at(&self, position: DVec3) -> DVec3 {
        DVec3::new(self.rate * (position.z - self.z0), 0.0, 0.0)
    }

    fn apply_reaction_force(&mut self, _position: DVec3, _force: DVec3) {}
}
