//! Integration tests for the bond registry, the force driver and tracer advection.

use approx::assert_abs_diff_eq;
use lamina_forces::analysis::bonded_observables;
use lamina_forces::bonds::CaptureSummary;
use lamina_forces::{
    BondRegistry, BondStatus, ForceStepConfig, MediumField, MembraneParams, MeshForceStep,
    ParticleKinematics, ParticleStore, ShearMedium, StepState, TracerAdvection, TribendParams,
    TrielParams, UniformMedium, VolConsParams,
};
use lamina_math::DVec3;
use lamina_mesh::generators::{cube, icosphere, quad_grid};
use lamina_types::{BondId, LaminaError, MeshId, VertexId};

/// Minimal particle store for driving the force model.
#[derive(Debug, Clone, Default)]
struct Particles {
    pos: Vec<DVec3>,
    vel: Vec<DVec3>,
    force: Vec<DVec3>,
    tracer: Vec<bool>,
}

impl Particles {
    fn tracers(points: &[DVec3]) -> Self {
        Self {
            pos: points.to_vec(),
            vel: vec![DVec3::ZERO; points.len()],
            force: vec![DVec3::ZERO; points.len()],
            tracer: vec![true; points.len()],
        }
    }

    fn clear_forces(&mut self) {
        self.force.iter_mut().for_each(|f| *f = DVec3::ZERO);
    }
}

impl ParticleStore for Particles {
    fn len(&self) -> usize {
        self.pos.len()
    }

    fn position(&self, id: VertexId) -> DVec3 {
        self.pos[id.index()]
    }

    fn add_force(&mut self, id: VertexId, force: DVec3) {
        self.force[id.index()] += force;
    }

    fn is_tracer(&self, id: VertexId) -> bool {
        self.tracer[id.index()]
    }
}

impl ParticleKinematics for Particles {
    fn force(&self, id: VertexId) -> DVec3 {
        self.force[id.index()]
    }

    fn velocity(&self, id: VertexId) -> DVec3 {
        self.vel[id.index()]
    }

    fn set_velocity(&mut self, id: VertexId, velocity: DVec3) {
        self.vel[id.index()] = velocity;
    }

    fn set_position(&mut self, id: VertexId, position: DVec3) {
        self.pos[id.index()] = position;
    }
}

fn single_triangle() -> (MeshForceStep, Particles, BondId) {
    let mut step = MeshForceStep::default();
    let id = step
        .registry_mut()
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y]);
    (step, store, id)
}

// ─── Registry Tests ───────────────────────────────────────────

#[test]
fn bonds_get_sequential_ids() {
    let mut registry = BondRegistry::new();
    let a = registry
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let b = registry
        .add_bending(VertexId::many([0, 1, 2, 3]), TribendParams::flat(1.0))
        .unwrap();
    assert_eq!(a, BondId(0));
    assert_eq!(b, BondId(1));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.pending_count(), 2);
    assert_eq!(registry.status(a).unwrap(), BondStatus::Pending);
}

#[test]
fn repeated_vertex_is_rejected() {
    let mut registry = BondRegistry::new();
    let result = registry.add_triangle(VertexId::many([0, 1, 1]), TrielParams::skalak(1.0));
    assert!(matches!(result, Err(LaminaError::InvalidParameter(_))));
    assert!(registry.is_empty());
}

#[test]
fn invalid_parameters_are_rejected() {
    let mut registry = BondRegistry::new();
    assert!(registry
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(-2.0))
        .is_err());
    assert!(registry
        .add_bending(VertexId::many([0, 1, 2, 3]), TribendParams::flat(f64::NAN))
        .is_err());
}

#[test]
fn open_mesh_cannot_carry_volume_bond() {
    let mut registry = BondRegistry::new();
    let mesh = quad_grid(2, 2, 1.0, 1.0);
    let tris = mesh.triangles().map(VertexId::many).collect();
    let result = registry.add_volume(MeshId(0), tris, VolConsParams::new(1.0));
    assert!(matches!(
        result,
        Err(LaminaError::InconsistentTopology { mesh: MeshId(0), .. })
    ));
}

#[test]
fn flipped_triangle_is_inconsistent_topology() {
    let mut registry = BondRegistry::new();
    let mut tris: Vec<[VertexId; 3]> = cube(1.0, DVec3::ZERO).triangles().map(VertexId::many).collect();
    tris[3].swap(0, 1);
    assert!(matches!(
        registry.add_volume(MeshId(1), tris, VolConsParams::new(1.0)),
        Err(LaminaError::InconsistentTopology { .. })
    ));
}

#[test]
fn one_volume_bond_per_mesh() {
    let mut registry = BondRegistry::new();
    let tris: Vec<[VertexId; 3]> = cube(1.0, DVec3::ZERO).triangles().map(VertexId::many).collect();
    registry
        .add_volume(MeshId(3), tris.clone(), VolConsParams::new(1.0))
        .unwrap();
    assert!(registry
        .add_volume(MeshId(3), tris.clone(), VolConsParams::new(1.0))
        .is_err());
    assert!(registry
        .add_volume(MeshId(4), tris, VolConsParams::new(1.0))
        .is_ok());
}

#[test]
fn remove_bond() {
    let mut registry = BondRegistry::new();
    let a = registry
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let b = registry
        .add_triangle(VertexId::many([1, 2, 3]), TrielParams::skalak(1.0))
        .unwrap();
    registry.remove(a).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.triangle(b).is_some());
    assert!(matches!(registry.remove(a), Err(LaminaError::UnknownBond(_))));
}

#[test]
fn membrane_on_closed_mesh() {
    let mut registry = BondRegistry::new();
    let mesh = icosphere(1.0, 1);
    let params = MembraneParams {
        triel: Some(TrielParams::skalak(1.0)),
        tribend: Some(TribendParams::initial(0.5)),
        volcons: Some(VolConsParams::new(1.0)),
    };
    let bonds = registry
        .add_membrane(MeshId(0), &mesh, VertexId(10), &params)
        .unwrap();
    assert_eq!(bonds.triangles.len(), 80);
    assert_eq!(bonds.bendings.len(), 120);
    assert!(bonds.volume.is_some());

    let first = registry.triangle(bonds.triangles[0]).unwrap();
    let [a, b, c] = mesh.triangle(0);
    assert_eq!(first.vertices, [VertexId(a + 10), VertexId(b + 10), VertexId(c + 10)]);
}

#[test]
fn membrane_on_open_mesh_leaves_registry_unchanged() {
    let mut registry = BondRegistry::new();
    let params = MembraneParams {
        triel: Some(TrielParams::skalak(1.0)),
        volcons: Some(VolConsParams::new(1.0)),
        ..Default::default()
    };
    let result = registry.add_membrane(MeshId(0), &quad_grid(2, 2, 1.0, 1.0), VertexId(0), &params);
    assert!(result.is_err());
    assert!(registry.is_empty());
}

#[test]
fn membrane_with_bad_volume_modulus_adds_nothing() {
    let mut registry = BondRegistry::new();
    let existing = registry
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let params = MembraneParams {
        triel: Some(TrielParams::skalak(1.0)),
        tribend: Some(TribendParams::initial(1.0)),
        volcons: Some(VolConsParams::new(-1.0)),
    };
    let result = registry.add_membrane(MeshId(1), &cube(1.0, DVec3::ZERO), VertexId(3), &params);
    assert!(matches!(result, Err(LaminaError::InvalidParameter(_))));
    assert_eq!(registry.len(), 1);
    assert!(registry.triangle(existing).is_some());
    assert!(registry.volume(MeshId(1)).is_none());

    let next = registry
        .add_triangle(VertexId::many([3, 4, 5]), TrielParams::skalak(1.0))
        .unwrap();
    assert_eq!(next, BondId(1));
}

#[test]
fn membrane_params_toml_roundtrip() {
    let params = MembraneParams {
        triel: Some(TrielParams::skalak(15.0)),
        tribend: Some(TribendParams::flat(1.0)),
        volcons: None,
    };
    let text = toml::to_string(&params).unwrap();
    let back: MembraneParams = toml::from_str(&text).unwrap();
    assert_eq!(back, params);
}

// ─── Driver State Tests ───────────────────────────────────────

#[test]
fn first_evaluation_captures_references() {
    let (mut step, mut store, id) = single_triangle();
    assert_eq!(step.state(), StepState::Uninitialized);

    let report = step.evaluate(&mut store).unwrap();
    assert_eq!(step.state(), StepState::Active);
    assert_eq!(report.captured.triangles, 1);
    assert_eq!(step.registry().status(id).unwrap(), BondStatus::Active);
    for f in &store.force {
        assert_abs_diff_eq!(*f, DVec3::ZERO, epsilon = 1e-12);
    }

    let again = step.evaluate(&mut store).unwrap();
    assert_eq!(again.captured, CaptureSummary::default());
}

#[test]
fn reference_is_captured_once() {
    let (mut step, mut store, id) = single_triangle();
    step.activate(&store).unwrap();
    let captured = *step.registry().triangle(id).unwrap().reference().unwrap();

    store.pos[1] = DVec3::new(1.5, 0.0, 0.0);
    step.evaluate(&mut store).unwrap();
    assert_eq!(*step.registry().triangle(id).unwrap().reference().unwrap(), captured);
    assert!(store.force[1].x < 0.0);
}

#[test]
fn queries_before_activation_fail() {
    let (step, store, _) = single_triangle();
    assert!(matches!(
        step.energy(&store),
        Err(LaminaError::NotActivated { pending: 1 })
    ));
    assert!(step.forces(&store).is_err());
}

#[test]
fn unknown_vertex_is_reported() {
    let mut step = MeshForceStep::default();
    step.registry_mut()
        .add_triangle(VertexId::many([0, 1, 7]), TrielParams::skalak(1.0))
        .unwrap();
    let mut store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y]);
    assert!(matches!(
        step.evaluate(&mut store),
        Err(LaminaError::UnknownVertex { vertex: VertexId(7), len: 3, .. })
    ));
}

#[test]
fn degenerate_reference_is_fatal() {
    let mut step = MeshForceStep::default();
    step.registry_mut()
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::X * 2.0]);
    assert!(matches!(
        step.activate(&store),
        Err(LaminaError::DegenerateReference { .. })
    ));
}

#[test]
fn inward_wound_mesh_is_rejected_at_activation() {
    let mesh = cube(1.0, DVec3::ZERO);
    let inward: Vec<[VertexId; 3]> = mesh
        .triangles()
        .map(|[a, b, c]| VertexId::many([a, c, b]))
        .collect();
    let mut step = MeshForceStep::default();
    step.registry_mut()
        .add_volume(MeshId(0), inward, VolConsParams::new(1.0))
        .unwrap();
    let store = Particles::tracers(&mesh.positions());
    assert!(matches!(
        step.activate(&store),
        Err(LaminaError::InconsistentTopology { .. })
    ));
}

#[test]
fn bonds_added_later_capture_at_their_first_evaluation() {
    let mut step = MeshForceStep::default();
    step.registry_mut()
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let mut store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)]);
    step.evaluate(&mut store).unwrap();

    let late = step
        .registry_mut()
        .add_triangle(VertexId::many([1, 3, 2]), TrielParams::skalak(1.0))
        .unwrap();
    assert_eq!(step.state(), StepState::Uninitialized);
    let report = step.evaluate(&mut store).unwrap();
    assert_eq!(report.captured.triangles, 1);
    assert_eq!(step.registry().status(late).unwrap(), BondStatus::Active);
}

#[test]
fn removing_a_bond_keeps_the_driver_active() {
    let mut step = MeshForceStep::default();
    let first = step
        .registry_mut()
        .add_triangle(VertexId::many([0, 1, 2]), TrielParams::skalak(1.0))
        .unwrap();
    step.registry_mut()
        .add_triangle(VertexId::many([1, 3, 2]), TrielParams::skalak(1.0))
        .unwrap();
    let mut store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)]);
    step.evaluate(&mut store).unwrap();

    step.registry_mut().remove(first).unwrap();
    assert_eq!(step.state(), StepState::Active);
    store.pos[3] = DVec3::new(1.5, 1.5, 0.0);
    assert!(step.energy(&store).unwrap().stretching > 0.0);
    assert!(step.forces(&store).is_ok());
}

// ─── Rupture Tests ────────────────────────────────────────────

#[test]
fn rupture_is_flagged_exactly_once() {
    let (mut step, mut store, id) = single_triangle();
    step.evaluate(&mut store).unwrap();

    store.pos[1] = DVec3::new(3.0, 0.0, 0.0);
    store.clear_forces();
    let report = step.evaluate(&mut store).unwrap();
    assert_eq!(report.newly_broken.len(), 1);
    assert_eq!(report.newly_broken[0].bond, id);
    assert_abs_diff_eq!(report.newly_broken[0].stretch, 3.0, epsilon = 1e-12);
    assert_eq!(store.force, vec![DVec3::ZERO; 3]);
    assert_eq!(step.registry().broken_count(), 1);

    let later = step.evaluate(&mut store).unwrap();
    assert!(later.newly_broken.is_empty());
    assert_eq!(step.registry().status(id).unwrap(), BondStatus::Broken);
    assert_eq!(store.force, vec![DVec3::ZERO; 3]);
}

#[test]
fn broken_bond_stays_broken_after_recovery() {
    let (mut step, mut store, id) = single_triangle();
    step.evaluate(&mut store).unwrap();
    store.pos[1] = DVec3::new(3.0, 0.0, 0.0);
    step.evaluate(&mut store).unwrap();

    store.pos[1] = DVec3::new(1.5, 0.0, 0.0);
    store.clear_forces();
    step.evaluate(&mut store).unwrap();
    assert_eq!(step.registry().status(id).unwrap(), BondStatus::Broken);
    assert_eq!(store.force, vec![DVec3::ZERO; 3]);
}

#[test]
fn degenerate_bending_is_skipped_not_fatal() {
    let mut step = MeshForceStep::default();
    let bend = step
        .registry_mut()
        .add_bending(VertexId::many([0, 1, 2, 3]), TribendParams::flat(1.0))
        .unwrap();
    let mut store = Particles::tracers(&[
        DVec3::ZERO,
        DVec3::new(-1.0, 0.5, 0.0),
        DVec3::Y,
        DVec3::new(1.0, 0.5, 0.0),
    ]);
    step.evaluate(&mut store).unwrap();

    store.pos[3] = DVec3::new(0.0, 0.5, 0.0);
    let report = step.evaluate(&mut store).unwrap();
    assert_eq!(report.degenerate, vec![bend]);
    assert_eq!(step.registry().status(bend).unwrap(), BondStatus::Active);
}

// ─── Volume Driver Tests ──────────────────────────────────────

#[test]
fn cube_volume_scenario() {
    let center = DVec3::splat(5.0);
    let mesh = cube(1.0, center);
    let mut step = MeshForceStep::default();
    step.registry_mut()
        .add_membrane(
            MeshId(15),
            &mesh,
            VertexId(0),
            &MembraneParams {
                triel: Some(TrielParams::skalak(0.0).with_max_stretch(3.0)),
                volcons: Some(VolConsParams::new(1.0)),
                ..Default::default()
            },
        )
        .unwrap();

    let mut store = Particles::tracers(&mesh.positions());
    let report = step.evaluate(&mut store).unwrap();
    assert_eq!(report.volumes.len(), 1);
    assert_eq!(report.volumes[0].volume, report.volumes[0].reference);
    assert_eq!(store.force, vec![DVec3::ZERO; 8]);

    let mut doubled = mesh.clone();
    doubled.scale_about(center, 2.0);
    store.pos = doubled.positions();
    store.clear_forces();
    step.evaluate(&mut store).unwrap();

    let expected = [
        [1.0, 2.0, 2.0],
        [2.0, 1.0, -2.0],
        [2.0, -1.0, 1.0],
        [1.0, -2.0, -1.0],
        [-1.0, -2.0, 2.0],
        [-2.0, -1.0, -2.0],
        [-2.0, 1.0, 1.0],
        [-1.0, 2.0, -1.0],
    ];
    for (f, e) in store.force.iter().zip(expected) {
        assert_abs_diff_eq!(*f, DVec3::from_array(e) * 1.75, epsilon = 1e-9);
    }

    let observables = bonded_observables(step.registry());
    assert_abs_diff_eq!(observables.energy, 0.0, epsilon = 1e-10);
    assert_abs_diff_eq!(observables.pressure, 0.0, epsilon = 1e-10);
}

// ─── Parallel Evaluation Tests ────────────────────────────────

fn perturbed_sphere() -> (lamina_mesh::TriangleMesh, Vec<DVec3>) {
    let mesh = icosphere(1.0, 2);
    let perturbed = mesh
        .positions()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let s = i as f64;
            *p * (1.0 + 0.05 * (s * 0.7).sin()) + DVec3::new(0.01 * (s * 1.3).cos(), 0.0, 0.02)
        })
        .collect();
    (mesh, perturbed)
}

fn membrane_step(mesh: &lamina_mesh::TriangleMesh, config: ForceStepConfig) -> MeshForceStep {
    let mut step = MeshForceStep::new(config);
    step.registry_mut()
        .add_membrane(
            MeshId(0),
            mesh,
            VertexId(0),
            &MembraneParams {
                triel: Some(TrielParams::skalak(2.0)),
                tribend: Some(TribendParams::initial(0.3)),
                volcons: Some(VolConsParams::new(5.0)),
            },
        )
        .unwrap();
    step
}

#[test]
fn parallel_matches_sequential() {
    let (mesh, perturbed) = perturbed_sphere();
    let mut results = Vec::new();
    for config in [ForceStepConfig::sequential().with_energy(), ForceStepConfig::parallel()] {
        let mut step = membrane_step(&mesh, config);
        let mut store = Particles::tracers(&mesh.positions());
        step.activate(&store).unwrap();
        store.pos = perturbed.clone();
        let report = step.evaluate(&mut store).unwrap();
        results.push((store.force, report.energy.unwrap()));
    }

    let (seq_forces, seq_energy) = &results[0];
    let (par_forces, par_energy) = &results[1];
    for (a, b) in seq_forces.iter().zip(par_forces) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
    }
    assert_abs_diff_eq!(seq_energy.total(), par_energy.total(), epsilon = 1e-10);
    assert!(seq_energy.stretching > 0.0);
    assert!(seq_energy.bending > 0.0);
    assert!(seq_energy.volume > 0.0);
}

#[test]
fn membrane_forces_sum_to_zero() {
    let (mesh, perturbed) = perturbed_sphere();
    let mut step = membrane_step(&mesh, ForceStepConfig::default());
    let mut store = Particles::tracers(&mesh.positions());
    step.activate(&store).unwrap();
    store.pos = perturbed;

    let forces = step.forces(&store).unwrap();
    assert_abs_diff_eq!(forces.total(), DVec3::ZERO, epsilon = 1e-10);
}

#[test]
fn energy_query_does_not_touch_forces() {
    let (mesh, perturbed) = perturbed_sphere();
    let mut step = membrane_step(&mesh, ForceStepConfig::default());
    let mut store = Particles::tracers(&mesh.positions());
    step.activate(&store).unwrap();
    assert_abs_diff_eq!(step.energy(&store).unwrap().total(), 0.0, epsilon = 1e-12);

    store.pos = perturbed;
    assert!(step.energy(&store).unwrap().total() > 0.0);
    assert_eq!(store.force, vec![DVec3::ZERO; mesh.vertex_count()]);
}

#[test]
fn energy_is_absent_unless_tracked() {
    let (mut step, mut store, _) = single_triangle();
    assert!(step.evaluate(&mut store).unwrap().energy.is_none());
}

// ─── Tracer Advection Tests ───────────────────────────────────

#[test]
fn tracers_follow_the_medium() {
    let mut store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y]);
    store.tracer[2] = false;
    let medium = UniformMedium::moving(DVec3::new(0.5, 0.0, -1.0));

    TracerAdvection::update_tracers(&mut store, &medium, 0.1);
    assert_abs_diff_eq!(store.pos[0], DVec3::new(0.05, 0.0, -0.1), epsilon = 1e-15);
    assert_abs_diff_eq!(store.vel[1], DVec3::new(0.5, 0.0, -1.0), epsilon = 1e-15);
    assert_eq!(store.pos[2], DVec3::Y);
    assert_eq!(store.vel[2], DVec3::ZERO);
}

#[test]
fn tracer_forces_are_deposited() {
    let mut store = Particles::tracers(&[DVec3::ZERO, DVec3::X, DVec3::Y]);
    store.tracer[1] = false;
    store.force = vec![DVec3::X, DVec3::Y * 10.0, DVec3::Z];
    let mut medium = UniformMedium::at_rest();

    assert_eq!(TracerAdvection::spread_forces(&store, &mut medium), 2);
    assert_eq!(medium.pending_force, DVec3::new(1.0, 0.0, 1.0));

    medium.advance(0.5);
    assert_eq!(medium.impulse, DVec3::new(0.5, 0.0, 0.5));
    assert_eq!(medium.pending_force, DVec3::ZERO);
}

#[test]
fn shear_flow_moves_tracers_by_height() {
    let mut store = Particles::tracers(&[DVec3::new(0.0, 0.0, 1.0), DVec3::new(0.0, 0.0, -2.0)]);
    let medium = ShearMedium { rate: 2.0, z0: 0.0 };
    TracerAdvection::update_tracers(&mut store, &medium, 0.5);
    assert_abs_diff_eq!(store.pos[0].x, 1.0, epsilon = 1e-15);
    assert_abs_diff_eq!(store.pos[1].x, -2.0, epsilon = 1e-15);
}

#[test]
fn sample_and_deposit_delegate_to_medium() {
    let mut medium = UniformMedium::moving(DVec3::Z);
    assert_eq!(TracerAdvection::sample_velocity(&medium, DVec3::splat(9.0)), DVec3::Z);
    TracerAdvection::deposit_force(&mut medium, DVec3::ZERO, DVec3::X * 2.0);
    assert_eq!(medium.pending_force, DVec3::X * 2.0);
}
