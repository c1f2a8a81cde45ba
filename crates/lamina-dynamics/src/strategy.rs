//! Integrator strategy trait: the abstraction over time integration.
//!
//! The membrane force model is called once per step by whichever
//! integrator drives the system. The reference implementation is
//! [`LangevinIntegrator`](crate::langevin::LangevinIntegrator).

use lamina_forces::bonds::CaptureSummary;
use lamina_forces::{BrokenBond, MembraneEnergy, StepReport, VolumeSample};
use lamina_types::{BondId, LaminaResult};

use crate::system::MembraneSystem;

/// Result of one integration step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Report of the force evaluation at the end of the step.
    pub report: StepReport,
    /// Kinetic energy of the non-tracer particles after the step.
    pub kinetic: f64,
    /// Number of tracers moved with the medium.
    pub tracers_advected: usize,
}

/// Aggregate of one [`Integrator::run`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Steps performed.
    pub steps: u32,
    /// Simulation time after the run.
    pub sim_time: f64,
    /// References captured during the run.
    pub captured: CaptureSummary,
    /// Triangle bonds that ruptured during the run.
    pub broken: Vec<BrokenBond>,
    /// Every degenerate-geometry skip, one entry per bond and evaluation.
    pub degenerate: Vec<BondId>,
    /// Membrane energy of the last evaluation, if tracked.
    pub energy: Option<MembraneEnergy>,
    /// Mesh volumes of the last evaluation.
    pub volumes: Vec<VolumeSample>,
    /// Kinetic energy of the non-tracer particles after the run.
    pub kinetic: f64,
}

impl RunSummary {
    pub(crate) fn absorb(&mut self, report: StepReport) {
        self.captured.triangles += report.captured.triangles;
        self.captured.bendings += report.captured.bendings;
        self.captured.volumes += report.captured.volumes;
        self.broken.extend(report.newly_broken);
        self.degenerate.extend(report.degenerate);
        if report.energy.is_some() {
            self.energy = report.energy;
        }
        self.volumes = report.volumes;
    }
}

/// Trait for time integrators.
///
/// ```text
/// integrator.run(&mut system, 0, true)?;   // capture references, fill forces
/// integrator.run(&mut system, n, false)?;  // advance n steps
/// ```
pub trait Integrator: Send {
    /// Recomputes all forces at the current positions without moving
    /// anything. The first call activates the membrane force model.
    fn compute_forces(&mut self, system: &mut MembraneSystem) -> LaminaResult<StepReport>;

    /// Advances the system by one time step.
    fn step(&mut self, system: &mut MembraneSystem) -> LaminaResult<StepResult>;

    /// Returns the integrator's name.
    fn name(&self) -> &str;

    /// Runs `steps` steps. Forces are recomputed first when
    /// `recalc_forces` is set or when they are stale, so
    /// `run(system, 0, true)` only activates the model and fills the force
    /// buffer.
    fn run(
        &mut self,
        system: &mut MembraneSystem,
        steps: u32,
        recalc_forces: bool,
    ) -> LaminaResult<RunSummary> {
        let mut summary = RunSummary::default();
        if recalc_forces || !system.forces_current() {
            let report = self.compute_forces(system)?;
            summary.absorb(report);
        }
        for _ in 0..steps {
            let result = self.step(system)?;
            summary.absorb(result.report);
            summary.steps += 1;
        }
        summary.sim_time = system.time;
        summary.kinetic = system.particles().kinetic_energy();
        Ok(summary)
    }
}
