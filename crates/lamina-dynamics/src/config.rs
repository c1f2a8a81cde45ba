//! Integrator configuration.
//!
//! Parameters that control the reference integrator: time step and the
//! optional Langevin thermostat.

use lamina_types::constants::DEFAULT_TIME_STEP;
use lamina_types::{LaminaError, LaminaResult};
use serde::{Deserialize, Serialize};

/// Configuration for [`LangevinIntegrator`](crate::langevin::LangevinIntegrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Integration time step.
    pub time_step: f64,

    /// Langevin thermostat acting on non-tracer particles. `None` runs
    /// plain velocity Verlet.
    #[serde(default)]
    pub thermostat: Option<LangevinConfig>,
}

/// Langevin thermostat parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LangevinConfig {
    /// Thermal energy. Zero disables the random force.
    pub kt: f64,
    /// Friction coefficient.
    pub gamma: f64,
    /// Seed of the random force stream.
    #[serde(default)]
    pub seed: u64,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            thermostat: Some(LangevinConfig::athermal(1.0)),
        }
    }
}

impl IntegratorConfig {
    /// Velocity Verlet without a thermostat.
    pub fn newtonian() -> Self {
        Self {
            thermostat: None,
            ..Default::default()
        }
    }

    /// Zero-temperature friction `gamma`, the relaxation setting.
    pub fn damped(gamma: f64) -> Self {
        Self {
            thermostat: Some(LangevinConfig::athermal(gamma)),
            ..Default::default()
        }
    }

    /// Full Langevin dynamics at temperature `kt`.
    pub fn langevin(kt: f64, gamma: f64, seed: u64) -> Self {
        Self {
            thermostat: Some(LangevinConfig { kt, gamma, seed }),
            ..Default::default()
        }
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Rejects non-positive time steps and negative thermostat parameters.
    pub fn validate(&self) -> LaminaResult<()> {
        if !(self.time_step > 0.0 && self.time_step.is_finite()) {
            return Err(LaminaError::InvalidConfig(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if let Some(thermostat) = &self.thermostat {
            thermostat.validate()?;
        }
        Ok(())
    }
}

impl LangevinConfig {
    /// Friction only.
    pub fn athermal(gamma: f64) -> Self {
        Self {
            kt: 0.0,
            gamma,
            seed: 0,
        }
    }

    pub fn validate(&self) -> LaminaResult<()> {
        for (name, value) in [("kt", self.kt), ("gamma", self.gamma)] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(LaminaError::InvalidConfig(format!(
                    "thermostat {name} must be non-negative and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Amplitude of the uniform random force per component,
    /// `sqrt(24 γ kT / dt)`, so that its variance is `2 γ kT / dt`.
    pub fn noise_amplitude(&self, dt: f64) -> f64 {
        (24.0 * self.gamma * self.kt / dt).sqrt()
    }
}
