/// Benefit aggregation over the production, coverage and projection stages.
pub mod benefits;
/// Self-consumption coverage policies.
pub mod coverage;
pub mod irr;
/// Yearly yield and inverter clipping.
pub mod production;
pub mod projection;
pub mod types;

pub use benefits::{Simulation, compute_benefits, run_simulation};
pub use coverage::CoveragePolicy;
pub use irr::IrrOutcome;
pub use types::{EngineParams, IrrSettings, SimulationInput, SimulationResult};
