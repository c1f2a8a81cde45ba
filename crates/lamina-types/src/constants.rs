//! Numerical thresholds and simulation defaults.

/// Default integration time step, in simulation time units.
pub const DEFAULT_TIME_STEP: f64 = 0.05;

/// Default maximum relative edge stretch before a triangle bond ruptures.
pub const DEFAULT_MAX_STRETCH: f64 = 2.4;

/// Bond count below which force evaluation stays on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Twice-area (normal magnitude) below which a triangle counts as degenerate.
pub const DEGENERATE_AREA_THRESHOLD: f64 = 1.0e-12;

/// Edge length below which a shared bending edge counts as degenerate.
pub const DEGENERATE_EDGE_THRESHOLD: f64 = 1.0e-12;

/// Enclosed volume magnitude below which a mesh counts as collapsed.
pub const DEGENERATE_VOLUME_THRESHOLD: f64 = 1.0e-12;
