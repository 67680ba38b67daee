//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use solar_upgrade::engine::types::{EngineParams, SimulationInput, SimulationResult};
use solar_upgrade::engine::{Simulation, compute_benefits, run_simulation};

/// Default form state (5400 kWh, 6.56 → 9.02 kWp, 13560 EUR, yield 1200).
pub fn default_input() -> SimulationInput {
    SimulationInput::default()
}

/// Default business rules (50% deduction over 10 years, four-point coverage).
pub fn default_params() -> EngineParams {
    EngineParams::default()
}

/// Runs `input` with the default business rules.
pub fn compute(input: &SimulationInput) -> SimulationResult {
    compute_benefits(input, &default_params()).expect("input should be valid")
}

/// Runs `input` with the default business rules, keeping the projection.
pub fn simulate(input: &SimulationInput) -> Simulation {
    run_simulation(input, &default_params()).expect("input should be valid")
}

/// Asserts `actual` is within `tol` of `expected`.
pub fn assert_close(label: &str, actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "{label}: expected {expected}, got {actual} (tolerance {tol})"
    );
}
