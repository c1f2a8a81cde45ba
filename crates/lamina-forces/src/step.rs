//! The per-step force driver (MeshForceStep).
//!
//! ## State machine
//!
//! ```text
//! Uninitialized ──(first evaluate / activate)──► Active ──► Active ...
//!       ▲                                           │
//!       └──────────── new bonds registered ─────────┘
//! ```
//!
//! The transition into `Active` captures the reference geometry of every
//! pending bond from the positions at that moment. Each evaluation then
//! reads a snapshot of all positions, evaluates triangle and bending bonds
//! (in parallel above [`ForceStepConfig::parallel_threshold`]) and the
//! volume bonds, and accumulates everything into the particle store.
//! Per-bond faults never abort the step; they are collected into the
//! [`StepReport`].

use lamina_math::DVec3;
use lamina_types::{BondFault, BondId, LaminaError, LaminaResult, MeshId, VertexId};
use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use crate::bonds::{BendingBond, BondRegistry, BondStatus, CaptureSummary, TriangleBond};
use crate::config::ForceStepConfig;
use crate::particles::{ForceBuffer, ParticleStore};
use crate::{tribend, triel, volcons};

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    /// Some bonds have no reference geometry yet.
    Uninitialized,
    /// Every bond has its reference geometry.
    Active,
}

/// Summed elastic energy per bond kind.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MembraneEnergy {
    pub stretching: f64,
    pub bending: f64,
    pub volume: f64,
}

impl MembraneEnergy {
    pub fn total(&self) -> f64 {
        self.stretching + self.bending + self.volume
    }
}

/// A triangle bond that ruptured during a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrokenBond {
    pub bond: BondId,
    /// Largest current/reference edge length ratio at rupture.
    pub stretch: f64,
}

/// Enclosed volume of one mesh after a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSample {
    pub mesh: MeshId,
    pub volume: f64,
    pub reference: f64,
}

/// Outcome of one [`MeshForceStep::evaluate`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// References captured during this call.
    pub captured: CaptureSummary,
    /// Membrane energy, when [`ForceStepConfig::track_energy`] is set.
    pub energy: Option<MembraneEnergy>,
    /// Triangle bonds that ruptured during this call.
    pub newly_broken: Vec<BrokenBond>,
    /// Bonds skipped this call because their geometry degenerated.
    pub degenerate: Vec<BondId>,
    /// Volume of every mesh carrying an active volume bond.
    pub volumes: Vec<VolumeSample>,
}

/// Partial result of one evaluation pass, mergeable across workers.
struct Partial {
    forces: ForceBuffer,
    energy: f64,
    faults: Vec<(usize, BondFault)>,
}

impl Partial {
    fn new(len: usize) -> Self {
        Self {
            forces: ForceBuffer::zeros(len),
            energy: 0.0,
            faults: Vec::new(),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.forces = self.forces.merge(other.forces);
        self.energy += other.energy;
        self.faults.extend(other.faults);
        self
    }
}

/// Everything one evaluation computes, before it is applied.
struct Evaluation {
    forces: ForceBuffer,
    energy: MembraneEnergy,
    triangle_faults: Vec<(usize, BondFault)>,
    bending_faults: Vec<(usize, BondFault)>,
    volume_faults: Vec<usize>,
    volumes: Vec<VolumeSample>,
}

/// Applies all registered membrane bonds once per integration step.
#[derive(Debug, Clone)]
pub struct MeshForceStep {
    registry: BondRegistry,
    config: ForceStepConfig,
    activated: bool,
}

impl MeshForceStep {
    pub fn new(config: ForceStepConfig) -> Self {
        Self::with_registry(BondRegistry::new(), config)
    }

    pub fn with_registry(registry: BondRegistry, config: ForceStepConfig) -> Self {
        Self {
            registry,
            config,
            activated: false,
        }
    }

    pub fn registry(&self) -> &BondRegistry {
        &self.registry
    }

    /// Mutable registry access. Bonds added here leave the driver
    /// `Uninitialized` until their reference is captured on the next
    /// evaluation; removing bonds keeps it `Active`.
    pub fn registry_mut(&mut self) -> &mut BondRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &ForceStepConfig {
        &self.config
    }

    pub fn state(&self) -> StepState {
        if self.activated && self.registry.pending_count() == 0 {
            StepState::Active
        } else {
            StepState::Uninitialized
        }
    }

    /// Captures the reference geometry of every pending bond from the
    /// current positions in `store`, without applying any force.
    pub fn activate<S: ParticleStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> LaminaResult<CaptureSummary> {
        let positions = snapshot(store);
        self.activate_from(&positions)
    }

    /// Evaluates every active bond and adds the resulting forces to `store`.
    ///
    /// On the first call (or after new bonds were registered) the pending
    /// reference geometry is captured from the current positions first.
    pub fn evaluate<S: ParticleStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> LaminaResult<StepReport> {
        let positions = snapshot(store);
        let captured = if self.state() == StepState::Uninitialized {
            self.activate_from(&positions)?
        } else {
            CaptureSummary::default()
        };
        self.check_vertices(positions.len())?;

        let evaluation = self.compute(&positions);
        evaluation.forces.flush_into(store);

        let mut report = self.apply_faults(&evaluation);
        report.captured = captured;
        report.volumes = evaluation.volumes;
        if self.config.track_energy {
            trace!(
                stretching = evaluation.energy.stretching,
                bending = evaluation.energy.bending,
                volume = evaluation.energy.volume,
                "membrane energy"
            );
            report.energy = Some(evaluation.energy);
        }
        Ok(report)
    }

    /// Membrane energy at the current positions, without applying forces.
    pub fn energy<S: ParticleStore + ?Sized>(&self, store: &S) -> LaminaResult<MembraneEnergy> {
        if self.state() == StepState::Uninitialized {
            return Err(LaminaError::NotActivated {
                pending: self.registry.pending_count(),
            });
        }
        let positions = snapshot(store);
        self.check_vertices(positions.len())?;
        Ok(self.compute(&positions).energy)
    }

    /// Forces at the current positions, without applying them or
    /// changing any bond state.
    pub fn forces<S: ParticleStore + ?Sized>(&self, store: &S) -> LaminaResult<ForceBuffer> {
        if self.state() == StepState::Uninitialized {
            return Err(LaminaError::NotActivated {
                pending: self.registry.pending_count(),
            });
        }
        let positions = snapshot(store);
        self.check_vertices(positions.len())?;
        Ok(self.compute(&positions).forces)
    }

    fn activate_from(&mut self, positions: &[DVec3]) -> LaminaResult<CaptureSummary> {
        let summary = self.registry.capture_pending(positions)?;
        if summary.total() > 0 {
            info!(
                triangles = summary.triangles,
                bendings = summary.bendings,
                volumes = summary.volumes,
                "captured reference geometry"
            );
        }
        self.activated = true;
        Ok(summary)
    }

    fn check_vertices(&self, len: usize) -> LaminaResult<()> {
        let check = |bond: BondId, vertices: &[VertexId]| -> LaminaResult<()> {
            match vertices.iter().find(|v| v.index() >= len) {
                Some(&vertex) => Err(LaminaError::UnknownVertex { bond, vertex, len }),
                None => Ok(()),
            }
        };
        for b in &self.registry.triangles {
            check(b.id, &b.vertices)?;
        }
        for b in &self.registry.bendings {
            check(b.id, &b.vertices)?;
        }
        for b in &self.registry.volumes {
            for tri in &b.triangles {
                check(b.id, tri)?;
            }
        }
        Ok(())
    }

    fn compute(&self, positions: &[DVec3]) -> Evaluation {
        let len = positions.len();
        let triangles = triangle_pass(
            &self.registry.triangles,
            positions,
            self.config.runs_parallel(self.registry.triangles.len()),
        );
        let bendings = bending_pass(
            &self.registry.bendings,
            positions,
            self.config.runs_parallel(self.registry.bendings.len()),
        );

        // The volume sum stays sequential so an undeformed mesh reproduces
        // its reference volume bit for bit.
        let mut forces = ForceBuffer::zeros(len);
        let mut volume_energy = 0.0;
        let mut volume_faults = Vec::new();
        let mut volumes = Vec::new();
        for (i, bond) in self.registry.volumes.iter().enumerate() {
            let Some(reference) = bond.reference_volume else {
                continue;
            };
            if bond.status != BondStatus::Active {
                continue;
            }
            match volcons::accumulate(&bond.params, reference, &bond.triangles, positions, &mut forces)
            {
                Ok(contribution) => {
                    volume_energy += contribution.energy;
                    volumes.push(VolumeSample {
                        mesh: bond.mesh,
                        volume: contribution.volume,
                        reference,
                    });
                }
                Err(_) => volume_faults.push(i),
            }
        }

        let mut triangle_faults = triangles.faults;
        let mut bending_faults = bendings.faults;
        triangle_faults.sort_by_key(|(i, _)| *i);
        bending_faults.sort_by_key(|(i, _)| *i);

        Evaluation {
            forces: forces.merge(triangles.forces).merge(bendings.forces),
            energy: MembraneEnergy {
                stretching: triangles.energy,
                bending: bendings.energy,
                volume: volume_energy,
            },
            triangle_faults,
            bending_faults,
            volume_faults,
            volumes,
        }
    }

    fn apply_faults(&mut self, evaluation: &Evaluation) -> StepReport {
        let mut report = StepReport::default();

        for &(i, fault) in &evaluation.triangle_faults {
            let bond = &mut self.registry.triangles[i];
            match fault {
                BondFault::Broken { stretch, limit } => {
                    bond.status = BondStatus::Broken;
                    warn!(bond = bond.id.0, stretch, limit, "triangle bond broken");
                    report.newly_broken.push(BrokenBond {
                        bond: bond.id,
                        stretch,
                    });
                }
                BondFault::DegenerateGeometry => {
                    debug!(bond = bond.id.0, "degenerate triangle skipped");
                    report.degenerate.push(bond.id);
                }
            }
        }
        for &(i, _) in &evaluation.bending_faults {
            let id = self.registry.bendings[i].id;
            debug!(bond = id.0, "degenerate bending pair skipped");
            report.degenerate.push(id);
        }
        for &i in &evaluation.volume_faults {
            let bond = &self.registry.volumes[i];
            debug!(bond = bond.id.0, mesh = bond.mesh.0, "collapsed mesh volume skipped");
            report.degenerate.push(bond.id);
        }
        report
    }
}

impl Default for MeshForceStep {
    fn default() -> Self {
        Self::new(ForceStepConfig::default())
    }
}

fn snapshot<S: ParticleStore + ?Sized>(store: &S) -> Vec<DVec3> {
    (0..store.len())
        .map(|i| store.position(VertexId(i as u32)))
        .collect()
}

fn triangle_pass(bonds: &[TriangleBond], positions: &[DVec3], parallel: bool) -> Partial {
    let len = positions.len();
    let eval = |mut acc: Partial, (i, bond): (usize, &TriangleBond)| {
        let Some(reference) = bond.reference.as_ref() else {
            return acc;
        };
        if bond.status != BondStatus::Active {
            return acc;
        }
        let p = bond.vertices.map(|v| positions[v.index()]);
        match triel::evaluate(&bond.params, reference, p) {
            Ok(c) => {
                acc.forces.add_all(&bond.vertices, &c.forces);
                acc.energy += c.energy;
            }
            Err(fault) => acc.faults.push((i, fault)),
        }
        acc
    };

    if parallel {
        bonds
            .par_iter()
            .enumerate()
            .fold(|| Partial::new(len), eval)
            .reduce(|| Partial::new(len), Partial::merge)
    } else {
        bonds.iter().enumerate().fold(Partial::new(len), eval)
    }
}

fn bending_pass(bonds: &[BendingBond], positions: &[DVec3], parallel: bool) -> Partial {
    let len = positions.len();
    let eval = |mut acc: Partial, (i, bond): (usize, &BendingBond)| {
        let Some(theta_ref) = bond.reference_angle else {
            return acc;
        };
        if bond.status != BondStatus::Active {
            return acc;
        }
        let p = bond.vertices.map(|v| positions[v.index()]);
        match tribend::evaluate(bond.params.kb, theta_ref, p) {
            Ok(c) => {
                acc.forces.add_all(&bond.vertices, &c.forces);
                acc.energy += c.energy;
            }
            Err(fault) => acc.faults.push((i, fault)),
        }
        acc
    };

    if parallel {
        bonds
            .par_iter()
            .enumerate()
            .fold(|| Partial::new(len), eval)
            .reduce(|| Partial::new(len), Partial::merge)
    } else {
        bonds.iter().enumerate().fold(Partial::new(len), eval)
    }
}
