//! Integration tests for lamina-telemetry.

use lamina_telemetry::bus::EventBus;
use lamina_telemetry::events::{EnergyKind, EventKind, SimulationEvent};
use lamina_telemetry::sinks::{TracingSink, VecSink};

#[test]
fn emit_and_flush() {
    let (sink, log) = VecSink::with_log();
    let mut bus = EventBus::new().with_sink(Box::new(sink));

    bus.emit(SimulationEvent::new(0, EventKind::StepBegin { sim_time: 0.0 }));
    bus.emit(SimulationEvent::new(
        0,
        EventKind::StepEnd {
            sim_time: 0.05,
            kinetic: 0.0,
        },
    ));

    assert!(log.is_empty());
    assert_eq!(bus.flush(), 2);
    assert_eq!(log.len(), 2);
    assert_eq!(
        log.events()[0].kind,
        EventKind::StepBegin { sim_time: 0.0 }
    );
}

#[test]
fn disabled_bus_drops_events() {
    let (sink, log) = VecSink::with_log();
    let mut bus = EventBus::new().with_sink(Box::new(sink));
    bus.set_enabled(false);
    assert!(!bus.is_enabled());
    bus.emit(SimulationEvent::new(0, EventKind::StepBegin { sim_time: 0.0 }));
    assert_eq!(bus.flush(), 0);
    assert!(log.is_empty());
}

#[test]
fn every_sink_sees_every_event() {
    let (a, log_a) = VecSink::with_log();
    let (b, log_b) = VecSink::with_log();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(a));
    bus.add_sink(Box::new(b));
    bus.add_sink(Box::new(TracingSink::new()));
    assert_eq!(bus.sink_count(), 3);

    bus.emit(SimulationEvent::new(3, EventKind::DegenerateGeometry { bond: 7 }));
    bus.finish();
    assert_eq!(log_a.len(), 1);
    assert_eq!(log_b.len(), 1);
}

#[test]
fn log_filter_selects_kind() {
    let (sink, log) = VecSink::with_log();
    let mut bus = EventBus::new().with_sink(Box::new(sink));
    bus.emit(SimulationEvent::new(1, EventKind::StepBegin { sim_time: 0.05 }));
    bus.emit(SimulationEvent::new(
        1,
        EventKind::BondBroken {
            bond: 4,
            stretch: 2.6,
        },
    ));
    bus.flush();

    let broken = log.filter(|k| matches!(k, EventKind::BondBroken { .. }));
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].step, 1);
}

#[test]
fn event_serialization() {
    let event = SimulationEvent::new(
        5,
        EventKind::MembraneEnergy {
            kind: EnergyKind::Bending,
            energy: 0.5,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("bending"));
    let recovered: SimulationEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered, event);
}

#[test]
fn volume_drift_event() {
    let event = SimulationEvent::new(
        10,
        EventKind::VolumeDrift {
            mesh: 0,
            volume: 8.0,
            reference: 1.0,
        },
    );
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("reference"));
}
