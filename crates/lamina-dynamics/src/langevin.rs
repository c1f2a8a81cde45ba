//! Velocity Verlet with a Langevin thermostat.
//!
//! ## Per-step pipeline
//!
//! ```text
//! 1. v += ½·dt·f/m, x += dt·v          (non-tracers)
//! 2. deposit tracer forces, advance the medium by dt
//! 3. tracers: v = medium velocity, x += dt·v
//! 4. f = membrane forces − γ·v + noise  (thermostat on non-tracers only)
//! 5. v += ½·dt·f/m                      (non-tracers)
//! ```
//!
//! The friction in step 4 sees the half-step velocity. The random force is
//! uniform with variance `2γkT/dt` per component and vanishes at kT = 0.

use lamina_forces::{ParticleKinematics, ParticleStore, StepReport, TracerAdvection};
use lamina_math::DVec3;
use lamina_telemetry::{EnergyKind, EventBus, EventKind, SimulationEvent};
use lamina_types::{LaminaResult, VertexId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::config::IntegratorConfig;
use crate::state::ParticleState;
use crate::strategy::{Integrator, StepResult};
use crate::system::MembraneSystem;

/// Reference integrator for membrane systems.
pub struct LangevinIntegrator {
    config: IntegratorConfig,
    rng: StdRng,
    bus: Option<EventBus>,
}

impl LangevinIntegrator {
    /// Validates `config` and seeds the random force stream.
    pub fn new(config: IntegratorConfig) -> LaminaResult<Self> {
        config.validate()?;
        let seed = config.thermostat.map_or(0, |t| t.seed);
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            bus: None,
        })
    }

    /// Attaches an event bus. Events are flushed after every force
    /// evaluation and at the end of every step.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn event_bus(&self) -> Option<&EventBus> {
        self.bus.as_ref()
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    /// Friction and random force on every non-tracer particle.
    fn apply_thermostat(&mut self, particles: &mut ParticleState) {
        let Some(thermostat) = self.config.thermostat else {
            return;
        };
        let amplitude = thermostat.noise_amplitude(self.config.time_step);
        for i in 0..particles.count {
            if particles.tracer[i] {
                continue;
            }
            let id = VertexId(i as u32);
            let mut f = -thermostat.gamma * particles.velocity(id);
            if amplitude > 0.0 {
                let noise = DVec3::new(
                    self.rng.gen_range(-0.5..0.5),
                    self.rng.gen_range(-0.5..0.5),
                    self.rng.gen_range(-0.5..0.5),
                );
                f += amplitude * noise;
            }
            particles.add_force(id, f);
        }
    }

    fn emit(&self, step: u64, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit(SimulationEvent::new(step, kind));
        }
    }

    fn emit_report(&mut self, step: u64, report: &StepReport) {
        if self.bus.is_none() {
            return;
        }
        let captured = report.captured;
        if captured.total() > 0 {
            self.emit(
                step,
                EventKind::ReferenceCaptured {
                    triangles: captured.triangles as u32,
                    bendings: captured.bendings as u32,
                    volumes: captured.volumes as u32,
                },
            );
        }
        for broken in &report.newly_broken {
            self.emit(
                step,
                EventKind::BondBroken {
                    bond: broken.bond.0,
                    stretch: broken.stretch,
                },
            );
        }
        for id in &report.degenerate {
            self.emit(step, EventKind::DegenerateGeometry { bond: id.0 });
        }
        if let Some(energy) = report.energy {
            for (kind, value) in [
                (EnergyKind::Stretching, energy.stretching),
                (EnergyKind::Bending, energy.bending),
                (EnergyKind::Volume, energy.volume),
            ] {
                self.emit(step, EventKind::MembraneEnergy { kind, energy: value });
            }
        }
        for sample in &report.volumes {
            self.emit(
                step,
                EventKind::VolumeDrift {
                    mesh: sample.mesh.0,
                    volume: sample.volume,
                    reference: sample.reference,
                },
            );
        }
        self.flush();
    }

    fn flush(&mut self) {
        if let Some(bus) = &mut self.bus {
            bus.flush();
        }
    }
}

impl Integrator for LangevinIntegrator {
    fn compute_forces(&mut self, system: &mut MembraneSystem) -> LaminaResult<StepReport> {
        let step = system.step_count;
        let (particles, forces, _) = system.parts_mut();
        particles.clear_forces();
        let report = forces.evaluate(particles)?;
        self.apply_thermostat(particles);
        system.mark_forces_current();
        self.emit_report(step, &report);
        Ok(report)
    }

    fn step(&mut self, system: &mut MembraneSystem) -> LaminaResult<StepResult> {
        let stale = if system.forces_current() {
            None
        } else {
            Some(self.compute_forces(system)?)
        };

        let dt = self.config.time_step;
        let step = system.step_count + 1;
        self.emit(step, EventKind::StepBegin { sim_time: system.time });

        let (particles, _, medium) = system.parts_mut();
        half_kick(particles, dt);
        drift(particles, dt);
        let tracers = TracerAdvection::spread_forces(&*particles, medium);
        medium.advance(dt);
        TracerAdvection::update_tracers(particles, &*medium, dt);

        system.step_count = step;
        system.time += dt;
        let mut report = self.compute_forces(system)?;

        let (particles, _, _) = system.parts_mut();
        half_kick(particles, dt);
        let kinetic = particles.kinetic_energy();
        trace!(step, kinetic, tracers, "integration step");
        self.emit(
            step,
            EventKind::StepEnd {
                sim_time: system.time,
                kinetic,
            },
        );
        self.flush();

        if let Some(first) = stale {
            report = combine(first, report);
        }
        Ok(StepResult {
            report,
            kinetic,
            tracers_advected: tracers,
        })
    }

    fn name(&self) -> &str {
        "langevin-verlet"
    }
}

impl std::fmt::Debug for LangevinIntegrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangevinIntegrator")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish()
    }
}

/// `v += ½·dt·f/m` on non-tracers.
fn half_kick(particles: &mut ParticleState, dt: f64) {
    for i in 0..particles.count {
        if particles.tracer[i] {
            continue;
        }
        let scale = 0.5 * dt / particles.mass[i];
        particles.vel_x[i] += scale * particles.force_x[i];
        particles.vel_y[i] += scale * particles.force_y[i];
        particles.vel_z[i] += scale * particles.force_z[i];
    }
}

/// `x += dt·v` on non-tracers.
fn drift(particles: &mut ParticleState, dt: f64) {
    for i in 0..particles.count {
        if particles.tracer[i] {
            continue;
        }
        particles.pos_x[i] += dt * particles.vel_x[i];
        particles.pos_y[i] += dt * particles.vel_y[i];
        particles.pos_z[i] += dt * particles.vel_z[i];
    }
}

/// Folds the report of a catch-up force evaluation into the step report.
fn combine(first: StepReport, mut second: StepReport) -> StepReport {
    second.captured.triangles += first.captured.triangles;
    second.captured.bendings += first.captured.bendings;
    second.captured.volumes += first.captured.volumes;
    let mut broken = first.newly_broken;
    broken.append(&mut second.newly_broken);
    second.newly_broken = broken;
    let mut degenerate = first.degenerate;
    degenerate.append(&mut second.degenerate);
    second.degenerate = degenerate;
    second
}
