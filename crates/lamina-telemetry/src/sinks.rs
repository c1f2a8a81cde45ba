//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Shared handle to the events a [`VecSink`] has collected.
///
/// The sink itself moves into the bus as a `Box<dyn EventSink>`; the log
/// handle stays with the caller for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<SimulationEvent>>>);

impl EventLog {
    /// Snapshot of all collected events.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of collected events.
    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no event was collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collected events whose payload satisfies `pred`.
    pub fn filter(&self, pred: impl Fn(&EventKind) -> bool) -> Vec<SimulationEvent> {
        self.events().into_iter().filter(|e| pred(&e.kind)).collect()
    }

    fn push(&self, event: SimulationEvent) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

/// A sink that stores events for testing and inspection.
#[derive(Debug, Default)]
pub struct VecSink {
    log: EventLog,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink together with a handle to its log.
    pub fn with_log() -> (Self, EventLog) {
        let sink = Self::new();
        let log = sink.log.clone();
        (sink, log)
    }

    /// Handle to the collected events.
    pub fn log(&self) -> EventLog {
        self.log.clone()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        self.log.push(event.clone());
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that forwards events to `tracing`.
///
/// Bond ruptures are logged at `warn`, step boundaries at `trace`,
/// everything else at `debug`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        match &event.kind {
            EventKind::BondBroken { bond, stretch } => {
                tracing::warn!(step = event.step, bond, stretch, "bond_broken");
            }
            EventKind::StepBegin { .. } | EventKind::StepEnd { .. } => {
                tracing::trace!(step = event.step, event = ?event.kind, "simulation_event");
            }
            kind => {
                tracing::debug!(step = event.step, event = ?kind, "simulation_event");
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
