//! Benefit aggregator: production, coverage, incentives and horizons in one pass.

use tracing::debug;

use super::irr::solve_irr;
use super::production::estimate_production;
use super::projection::{
    FlowBasis, YearProjection, cumulative_benefit, cumulative_bill_savings, payback_year,
    project_years,
};
use super::types::{EngineParams, SimulationInput, SimulationResult};
use crate::error::EngineError;

/// Length of the short horizon and of the IRR cash-flow stream (years).
pub const SHORT_HORIZON_YEARS: u32 = 10;
/// Length of the long horizon (years).
pub const LONG_HORIZON_YEARS: u32 = 20;

/// A complete run: the inputs, the named results and the yearly projection behind them.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub input: SimulationInput,
    pub params: EngineParams,
    pub result: SimulationResult,
    /// One row per year over the long horizon.
    pub projection: Vec<YearProjection>,
}

/// Computes the benefit mapping for one input.
///
/// # Errors
///
/// Returns `EngineError::Validation` if any input is outside its domain.
///
/// # Examples
///
/// ```
/// use solar_upgrade::engine::benefits::compute_benefits;
/// use solar_upgrade::engine::types::{EngineParams, SimulationInput};
///
/// let result = compute_benefits(&SimulationInput::default(), &EngineParams::default()).unwrap();
/// assert!(result.exported_kwh > 0.0);
/// ```
pub fn compute_benefits(
    input: &SimulationInput,
    params: &EngineParams,
) -> Result<SimulationResult, EngineError> {
    run_simulation(input, params).map(|sim| sim.result)
}

/// Like [`compute_benefits`], also returning the yearly projection.
///
/// # Errors
///
/// Returns `EngineError::Validation` if any input is outside its domain.
pub fn run_simulation(
    input: &SimulationInput,
    params: &EngineParams,
) -> Result<Simulation, EngineError> {
    input.validate()?;

    let consumption = input.annual_consumption_kwh;
    let price = input.avoided_energy_price_eur_per_kwh;

    // Production
    let base_production_kwh = input.base_capacity_kwp * input.yield_kwh_per_kwp;
    let upgraded = estimate_production(
        input.upgraded_capacity_kwp,
        input.yield_kwh_per_kwp,
        consumption,
        params,
    );

    // Coverage
    let upgraded_coverage = match input.upgraded_coverage_fraction {
        Some(coverage) => coverage,
        None => {
            let derived = params.coverage_policy.coverage(input.upgraded_capacity_kwp);
            debug!(policy = %params.coverage_policy, derived, "derived upgraded coverage");
            derived
        }
    };

    // A tier cannot self-consume more than it produces.
    let base_self_consumed_kwh =
        (consumption * input.base_coverage_fraction).min(base_production_kwh);
    let upgraded_self_consumed_kwh =
        (consumption * upgraded_coverage).min(upgraded.effective_kwh);
    let incremental_self_consumed_kwh =
        (upgraded_self_consumed_kwh - base_self_consumed_kwh).max(0.0);
    let exported_kwh = (upgraded.effective_kwh - upgraded_self_consumed_kwh).max(0.0);

    // Year-one economics
    let incremental_value_eur = incremental_self_consumed_kwh * price;
    let feed_in_revenue_eur = exported_kwh * input.feed_in_rate_eur_per_kwh;
    let community_revenue_eur =
        exported_kwh * input.shared_energy_quota * input.community_rate_eur_per_kwh;
    let annual_incentive_eur = incremental_value_eur + feed_in_revenue_eur + community_revenue_eur;

    let total_deduction_eur = input.install_cost_eur * params.deduction_rate;
    let annual_deduction_eur = if params.deduction_years == 0 {
        0.0
    } else {
        total_deduction_eur / f64::from(params.deduction_years)
    };
    let annual_benefit_eur = annual_incentive_eur + annual_deduction_eur;
    // Incremental kWh are already valued above.
    let bill_savings_eur = base_self_consumed_kwh * price;

    // Horizons
    let basis = FlowBasis {
        base_self_consumed_kwh,
        incremental_self_consumed_kwh,
        exported_kwh,
        initial_price_eur_per_kwh: price,
        annual_price_escalation: input.annual_price_escalation,
        feed_in_rate_eur_per_kwh: input.feed_in_rate_eur_per_kwh,
        community_rate_eur_per_kwh: input.community_rate_eur_per_kwh,
        shared_energy_quota: input.shared_energy_quota,
        annual_deduction_eur,
        deduction_years: params.deduction_years,
    };
    let projection = project_years(&basis, LONG_HORIZON_YEARS);
    let short = SHORT_HORIZON_YEARS as usize;
    let long = LONG_HORIZON_YEARS as usize;

    let benefit_10y_eur = cumulative_benefit(&projection, short);
    let benefit_20y_eur = cumulative_benefit(&projection, long);
    let bill_savings_10y_eur = cumulative_bill_savings(&projection, short);
    let bill_savings_20y_eur = cumulative_bill_savings(&projection, long);
    let annual_total_savings_eur = projection.first().map_or(0.0, |year| year.total_eur);

    // IRR over the short horizon
    let flows: Vec<f64> = std::iter::once(-input.install_cost_eur)
        .chain(projection.iter().take(short).map(|year| year.total_eur))
        .collect();
    let irr_10y = solve_irr(&flows, &params.irr);

    let result = SimulationResult {
        base_production_kwh,
        upgraded_theoretical_kwh: upgraded.theoretical_kwh,
        clip_fraction: upgraded.clip_fraction,
        upgraded_production_kwh: upgraded.effective_kwh,
        upgraded_coverage_fraction: upgraded_coverage,
        base_self_consumed_kwh,
        upgraded_self_consumed_kwh,
        incremental_self_consumed_kwh,
        exported_kwh,
        incremental_value_eur,
        feed_in_revenue_eur,
        community_revenue_eur,
        annual_incentive_eur,
        total_deduction_eur,
        annual_deduction_eur,
        annual_benefit_eur,
        bill_savings_eur,
        annual_total_savings_eur,
        benefit_10y_eur,
        benefit_20y_eur,
        bill_savings_10y_eur,
        bill_savings_20y_eur,
        total_savings_10y_eur: benefit_10y_eur + bill_savings_10y_eur,
        total_savings_20y_eur: benefit_20y_eur + bill_savings_20y_eur,
        payback_year: payback_year(&projection, input.install_cost_eur),
        irr_10y,
    };

    Ok(Simulation {
        input: input.clone(),
        params: params.clone(),
        result,
        projection,
    })
}
