//! Default parameters and numerical tolerances.

/// Default weight `λ` of the quadratic regularizer.
pub const DEFAULT_REGULARIZER:   f64 = 1f64;
/// Default convergence threshold `ε` of the bundle method.
pub const DEFAULT_TOLERANCE:     f64 = 1e-3;

/// Relative amount by which the lower bound may exceed
/// the best observed value before the bundle method
/// reports a numerical anomaly.
pub const NEGATIVE_GAP_TOLERANCE: f64 = 1e-9;

/// Duality gap and feasibility tolerance handed to `clarabel`.
pub const SOLVER_TOLERANCE:      f64 = 1e-10;
/// Tolerance for treating a relaxed variable as integral.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;
/// Relative tolerance for pruning a branch-and-bound node.
pub const PRUNING_TOLERANCE:     f64 = 1e-9;
/// Tolerance for checking a rounded assignment against its constraints.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// Default number of nodes a branch-and-bound search may explore.
pub const DEFAULT_MAX_NODES:   usize = 10_000;
/// Default interval (in iterations) between two progress lines.
pub const DEFAULT_PRINT_EVERY: usize = 10;
