//! # lamina-telemetry
//!
//! Event bus for simulation telemetry. The integrator emits structured
//! events (step boundaries, reference capture, bond ruptures, membrane
//! energy, volume drift) that pluggable sinks consume.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EnergyKind, EventKind, SimulationEvent};
pub use sinks::{EventSink, EventLog, TracingSink, VecSink};
