//! Particle state: SoA buffers for all per-particle data.
//!
//! This is the particle store the reference integrator advances. The force
//! model reaches it only through [`ParticleStore`] and
//! [`ParticleKinematics`].

use lamina_forces::{ParticleKinematics, ParticleStore};
use lamina_math::DVec3;
use lamina_mesh::TriangleMesh;
use lamina_types::{LaminaError, LaminaResult, VertexId};

/// SoA particle buffers.
///
/// # Layout
///
/// All arrays have length `count`. Channels are stored contiguously:
/// ```text
/// pos_x: [x0, x1, x2, ...]
/// pos_y: [y0, y1, y2, ...]
/// ...
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParticleState {
    /// Number of particles.
    pub count: usize,

    // ─── Position ───
    pub pos_x: Vec<f64>,
    pub pos_y: Vec<f64>,
    pub pos_z: Vec<f64>,

    // ─── Velocity ───
    pub vel_x: Vec<f64>,
    pub vel_y: Vec<f64>,
    pub vel_z: Vec<f64>,

    // ─── Accumulated force ───
    pub force_x: Vec<f64>,
    pub force_y: Vec<f64>,
    pub force_z: Vec<f64>,

    /// Inertial mass. Ignored for tracers.
    pub mass: Vec<f64>,
    /// Inertialess tracer flag.
    pub tracer: Vec<bool>,
}

impl ParticleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One particle per point, all with unit mass.
    pub fn from_positions(points: &[DVec3], tracer: bool) -> Self {
        let mut state = Self::new();
        for &p in points {
            state.push(p, tracer);
        }
        state
    }

    /// One particle per mesh vertex, in vertex order.
    pub fn from_mesh(mesh: &TriangleMesh, tracer: bool) -> Self {
        let mut state = Self::new();
        state.append_mesh(mesh, tracer);
        state
    }

    /// Appends a particle at rest with unit mass and returns its id.
    pub fn push(&mut self, position: DVec3, tracer: bool) -> VertexId {
        let id = VertexId(self.count as u32);
        self.pos_x.push(position.x);
        self.pos_y.push(position.y);
        self.pos_z.push(position.z);
        self.vel_x.push(0.0);
        self.vel_y.push(0.0);
        self.vel_z.push(0.0);
        self.force_x.push(0.0);
        self.force_y.push(0.0);
        self.force_z.push(0.0);
        self.mass.push(1.0);
        self.tracer.push(tracer);
        self.count += 1;
        id
    }

    /// Appends every vertex of `mesh` and returns the id of the first one.
    ///
    /// Mesh vertex `i` becomes particle `first + i`, which is the offset
    /// [`BondRegistry::add_membrane`](lamina_forces::BondRegistry::add_membrane)
    /// expects.
    pub fn append_mesh(&mut self, mesh: &TriangleMesh, tracer: bool) -> VertexId {
        let first = VertexId(self.count as u32);
        for i in 0..mesh.vertex_count() {
            self.push(mesh.position(i), tracer);
        }
        first
    }

    /// All positions as vectors.
    pub fn positions(&self) -> Vec<DVec3> {
        (0..self.count).map(|i| self.pos(i)).collect()
    }

    /// All accumulated forces as vectors.
    pub fn forces(&self) -> Vec<DVec3> {
        (0..self.count)
            .map(|i| DVec3::new(self.force_x[i], self.force_y[i], self.force_z[i]))
            .collect()
    }

    /// Sets the mass of one particle.
    pub fn set_mass(&mut self, id: VertexId, mass: f64) -> LaminaResult<()> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(LaminaError::InvalidParameter(format!(
                "particle mass must be positive and finite, got {mass}"
            )));
        }
        self.check(id)?;
        self.mass[id.index()] = mass;
        Ok(())
    }

    /// Zeroes every accumulated force.
    pub fn clear_forces(&mut self) {
        self.force_x.fill(0.0);
        self.force_y.fill(0.0);
        self.force_z.fill(0.0);
    }

    /// Kinetic energy of the non-tracer particles: 0.5 * Σ m_i * ||v_i||².
    pub fn kinetic_energy(&self) -> f64 {
        (0..self.count)
            .filter(|&i| !self.tracer[i])
            .map(|i| 0.5 * self.mass[i] * self.vel(i).length_squared())
            .sum()
    }

    /// Euclidean distance between two particles.
    pub fn distance(&self, a: VertexId, b: VertexId) -> f64 {
        self.pos(a.index()).distance(self.pos(b.index()))
    }

    /// Adds `offsets[i]` to the position of particle `i`.
    pub fn displace(&mut self, offsets: &[DVec3]) -> LaminaResult<()> {
        if offsets.len() != self.count {
            return Err(LaminaError::InvalidParameter(format!(
                "displacement count ({}) != particle count ({})",
                offsets.len(),
                self.count
            )));
        }
        for (i, d) in offsets.iter().enumerate() {
            self.pos_x[i] += d.x;
            self.pos_y[i] += d.y;
            self.pos_z[i] += d.z;
        }
        Ok(())
    }

    /// Scales every position about `center` by `factor`.
    pub fn scale_about(&mut self, center: DVec3, factor: f64) {
        for i in 0..self.count {
            let p = center + (self.pos(i) - center) * factor;
            self.write_pos(i, p);
        }
    }

    #[inline]
    fn pos(&self, i: usize) -> DVec3 {
        DVec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    #[inline]
    fn vel(&self, i: usize) -> DVec3 {
        DVec3::new(self.vel_x[i], self.vel_y[i], self.vel_z[i])
    }

    #[inline]
    fn write_pos(&mut self, i: usize, p: DVec3) {
        self.pos_x[i] = p.x;
        self.pos_y[i] = p.y;
        self.pos_z[i] = p.z;
    }

    fn check(&self, id: VertexId) -> LaminaResult<()> {
        if id.index() < self.count {
            Ok(())
        } else {
            Err(LaminaError::InvalidParameter(format!(
                "particle {:?} out of range ({} particles)",
                id, self.count
            )))
        }
    }
}

impl ParticleStore for ParticleState {
    fn len(&self) -> usize {
        self.count
    }

    fn position(&self, id: VertexId) -> DVec3 {
        self.pos(id.index())
    }

    fn add_force(&mut self, id: VertexId, force: DVec3) {
        let i = id.index();
        self.force_x[i] += force.x;
        self.force_y[i] += force.y;
        self.force_z[i] += force.z;
    }

    fn is_tracer(&self, id: VertexId) -> bool {
        self.tracer[id.index()]
    }
}

impl ParticleKinematics for ParticleState {
    fn force(&self, id: VertexId) -> DVec3 {
        let i = id.index();
        DVec3::new(self.force_x[i], self.force_y[i], self.force_z[i])
    }

    fn velocity(&self, id: VertexId) -> DVec3 {
        self.vel(id.index())
    }

    fn set_velocity(&mut self, id: VertexId, velocity: DVec3) {
        let i = id.index();
        self.vel_x[i] = velocity.x;
        self.vel_y[i] = velocity.y;
        self.vel_z[i] = velocity.z;
    }

    fn set_position(&mut self, id: VertexId, position: DVec3) {
        self.write_pos(id.index(), position);
    }
}
