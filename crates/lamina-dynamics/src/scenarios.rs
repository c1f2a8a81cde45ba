//! Canonical membrane set-ups.
//!
//! Each builder returns a system whose reference geometry is already
//! captured, together with the integrator configured for it:
//!
//! - [`bending_pair`]: two triangles sharing an edge, with one weak and
//!   one strong elastic bond plus a bending bond.
//! - [`triangle_relaxation`]: one distorted elastic triangle next to
//!   three unbonded bystanders.
//! - [`volume_cube`]: the canonical cube of tracers carrying a volume bond.

use lamina_forces::{
    ForceStepConfig, MembraneParams, MeshForceStep, TribendParams, TrielParams, VolConsParams,
};
use lamina_math::DVec3;
use lamina_mesh::generators::cube;
use lamina_types::{BondId, LaminaResult, MeshId, VertexId};

use crate::config::IntegratorConfig;
use crate::langevin::LangevinIntegrator;
use crate::state::ParticleState;
use crate::strategy::{Integrator, RunSummary};
use crate::system::MembraneSystem;

/// Fixed twist applied to the bending pair.
pub const BENDING_PAIR_TWIST: [[f64; 3]; 4] = [
    [0.31, 0.72, 0.05],
    [0.64, 0.18, 0.93],
    [0.27, 0.55, 0.41],
    [0.86, 0.09, 0.67],
];

/// Distortion applied to bystanders and bonded triangle alike.
pub const TRIANGLE_DISTORTION: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, -0.2, 0.3], [1.0, 1.0, 1.0]];

/// A system with its integrator.
#[derive(Debug)]
pub struct Scenario {
    pub system: MembraneSystem,
    pub integrator: LangevinIntegrator,
}

impl Scenario {
    fn activate(mut system: MembraneSystem, config: IntegratorConfig) -> LaminaResult<Self> {
        let mut integrator = LangevinIntegrator::new(config)?;
        integrator.run(&mut system, 0, true)?;
        Ok(Self { system, integrator })
    }

    /// Runs `steps` integration steps.
    pub fn run(&mut self, steps: u32) -> LaminaResult<RunSummary> {
        self.integrator.run(&mut self.system, steps, false)
    }

    /// Recomputes forces at the current positions without moving anything.
    pub fn recalc(&mut self) -> LaminaResult<RunSummary> {
        self.integrator.run(&mut self.system, 0, true)
    }

    fn positions<const N: usize>(&self, ids: [VertexId; N]) -> [DVec3; N] {
        let positions = self.system.particles().positions();
        ids.map(|id| positions[id.index()])
    }
}

/// Two triangles `(p0,p1,p2)` and `(p0,p2,p3)` folded about `p0–p2`.
#[derive(Debug)]
pub struct BendingPair {
    pub scenario: Scenario,
    pub vertices: [VertexId; 4],
    pub weak: BondId,
    pub strong: BondId,
    pub bending: BondId,
}

impl BendingPair {
    /// Adds [`BENDING_PAIR_TWIST`] to the four vertices.
    pub fn twist(&mut self) -> LaminaResult<()> {
        let offsets = BENDING_PAIR_TWIST.map(DVec3::from_array);
        self.scenario.system.particles_mut().displace(&offsets)
    }

    /// Signed dihedral angle, zero when both triangles are coplanar.
    pub fn dihedral(&self) -> Option<f64> {
        lamina_forces::tribend::dihedral_angle(self.scenario.positions(self.vertices))
    }
}

/// Builds the flat bending pair with γ = 10 and kT = 0.
///
/// The weak triangle has k1 = 0.1, the strong one k1 = 10, both rupture at
/// 2.4 times their reference edge lengths, and the bending bond has
/// kb = 1 with the reference angle taken from the flat start.
pub fn bending_pair() -> LaminaResult<BendingPair> {
    let points = [
        DVec3::new(5.0, 5.0, 5.0),
        DVec3::new(5.0, 5.0, 6.0),
        DVec3::new(5.0, 6.0, 6.0),
        DVec3::new(5.0, 6.0, 5.0),
    ];
    let vertices = VertexId::many([0, 1, 2, 3]);
    let [p0, p1, p2, p3] = vertices;

    let mut forces = MeshForceStep::new(ForceStepConfig::default().with_energy());
    let registry = forces.registry_mut();
    let weak = registry.add_triangle([p0, p1, p2], TrielParams::skalak(0.1))?;
    let strong = registry.add_triangle([p0, p2, p3], TrielParams::skalak(10.0))?;
    let bending = registry.add_bending(vertices, TribendParams::initial(1.0))?;

    let system = MembraneSystem::new(ParticleState::from_positions(&points, false), forces);
    Ok(BendingPair {
        scenario: Scenario::activate(system, IntegratorConfig::damped(10.0))?,
        vertices,
        weak,
        strong,
        bending,
    })
}

/// One elastic triangle and three unbonded particles.
#[derive(Debug)]
pub struct TriangleRelaxation {
    pub scenario: Scenario,
    pub bystanders: [VertexId; 3],
    pub triangle: [VertexId; 3],
    pub bond: BondId,
}

impl TriangleRelaxation {
    /// Adds [`TRIANGLE_DISTORTION`] to the bystanders and to the triangle.
    pub fn distort(&mut self) -> LaminaResult<()> {
        let offsets: Vec<DVec3> = TRIANGLE_DISTORTION
            .iter()
            .chain(TRIANGLE_DISTORTION.iter())
            .map(|&d| DVec3::from_array(d))
            .collect();
        self.scenario.system.particles_mut().displace(&offsets)
    }

    /// Current lengths of the edges `t0–t1` and `t0–t2`.
    pub fn edge_lengths(&self) -> [f64; 2] {
        let [t0, t1, t2] = self.triangle;
        let particles = self.scenario.system.particles();
        [particles.distance(t0, t1), particles.distance(t0, t2)]
    }

    pub fn bystander_positions(&self) -> [DVec3; 3] {
        self.scenario.positions(self.bystanders)
    }
}

/// Builds the triangle scenario with kT = 0 and friction `gamma`.
///
/// The triangle `(2,5,5), (2,5,6), (2,6,6)` has a Skalak bond with
/// k1 = 15; its reference edge lengths are 1 and √2.
pub fn triangle_relaxation(gamma: f64) -> LaminaResult<TriangleRelaxation> {
    let points = [
        DVec3::new(5.0, 5.0, 5.0),
        DVec3::new(5.0, 5.0, 6.0),
        DVec3::new(5.0, 6.0, 6.0),
        DVec3::new(2.0, 5.0, 5.0),
        DVec3::new(2.0, 5.0, 6.0),
        DVec3::new(2.0, 6.0, 6.0),
    ];
    let bystanders = VertexId::many([0, 1, 2]);
    let triangle = VertexId::many([3, 4, 5]);

    let mut forces = MeshForceStep::new(ForceStepConfig::default());
    let bond = forces
        .registry_mut()
        .add_triangle(triangle, TrielParams::skalak(15.0))?;

    let system = MembraneSystem::new(ParticleState::from_positions(&points, false), forces);
    Ok(TriangleRelaxation {
        scenario: Scenario::activate(system, IntegratorConfig::damped(gamma))?,
        bystanders,
        triangle,
        bond,
    })
}

/// Unit cube of tracers with a volume bond.
#[derive(Debug)]
pub struct VolumeCube {
    pub scenario: Scenario,
    pub mesh: MeshId,
    pub center: DVec3,
}

impl VolumeCube {
    /// Scales the cube about its center.
    pub fn inflate(&mut self, factor: f64) {
        let center = self.center;
        self.scenario
            .system
            .particles_mut()
            .scale_about(center, factor);
    }

    /// Accumulated force on every vertex, in canonical vertex order.
    pub fn forces(&self) -> Vec<DVec3> {
        self.scenario.system.particles().forces()
    }
}

/// Builds the canonical cube centered at `(5, 5, 5)` with κV = 1.
///
/// The triangle bonds have zero moduli; they only carry the surface. The
/// reference volume is captured from the unit cube.
pub fn volume_cube() -> LaminaResult<VolumeCube> {
    let center = DVec3::splat(5.0);
    let mesh = cube(1.0, center);
    let mesh_id = MeshId(15);

    let particles = ParticleState::from_mesh(&mesh, true);
    let mut forces = MeshForceStep::new(ForceStepConfig::default().with_energy());
    let params = MembraneParams {
        triel: Some(TrielParams::skalak(0.0).with_max_stretch(3.0)),
        tribend: None,
        volcons: Some(VolConsParams::new(1.0)),
    };
    forces
        .registry_mut()
        .add_membrane(mesh_id, &mesh, VertexId(0), &params)?;

    let system = MembraneSystem::new(particles, forces);
    Ok(VolumeCube {
        scenario: Scenario::activate(system, IntegratorConfig::damped(1.0))?,
        mesh: mesh_id,
        center,
    })
}
