//! Request and response types of the web front-end.
//!
//! The HTML form speaks in percentages, the engine in fractions; the
//! conversion happens here and nowhere else.

use serde::{Deserialize, Serialize};

use crate::engine::projection::YearProjection;
use crate::engine::types::{EngineParams, SimulationInput, SimulationResult};
use crate::error::ValidationError;

/// Smallest annual consumption the form accepts (kWh).
pub const MIN_FORM_CONSUMPTION_KWH: f64 = 500.0;
/// Largest annual consumption the form accepts (kWh).
pub const MAX_FORM_CONSUMPTION_KWH: f64 = 50_000.0;

/// Fields posted by the simulation form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormInput {
    pub customer: String,
    pub annual_consumption_kwh: f64,
    pub base_capacity_kwp: f64,
    pub upgraded_capacity_kwp: f64,
    pub install_cost_eur: f64,
    pub avoided_energy_price_eur_per_kwh: f64,
    pub feed_in_rate_eur_per_kwh: f64,
    pub community_rate_eur_per_kwh: f64,
    pub shared_energy_quota_percent: f64,
    pub yield_kwh_per_kwp: f64,
    pub base_coverage_percent: f64,
    /// Empty means "derive from the upgraded capacity".
    #[serde(default)]
    pub upgraded_coverage_percent: String,
    #[serde(default)]
    pub annual_price_escalation_percent: f64,
}

impl FormInput {
    /// Form state for `input`.
    ///
    /// The upgraded coverage is left blank unless `input` fixes it, so a
    /// resubmitted form keeps deriving it from the posted capacity.
    pub fn prefilled(customer: &str, input: &SimulationInput) -> Self {
        Self {
            customer: customer.to_string(),
            annual_consumption_kwh: input.annual_consumption_kwh,
            base_capacity_kwp: input.base_capacity_kwp,
            upgraded_capacity_kwp: input.upgraded_capacity_kwp,
            install_cost_eur: input.install_cost_eur,
            avoided_energy_price_eur_per_kwh: input.avoided_energy_price_eur_per_kwh,
            feed_in_rate_eur_per_kwh: input.feed_in_rate_eur_per_kwh,
            community_rate_eur_per_kwh: input.community_rate_eur_per_kwh,
            shared_energy_quota_percent: to_percent(input.shared_energy_quota),
            yield_kwh_per_kwp: input.yield_kwh_per_kwp,
            base_coverage_percent: to_percent(input.base_coverage_fraction),
            upgraded_coverage_percent: input
                .upgraded_coverage_fraction
                .map(|c| format!("{:.1}", c * 100.0))
                .unwrap_or_default(),
            annual_price_escalation_percent: to_percent(input.annual_price_escalation),
        }
    }

    /// Coverage the engine derives for the posted upgraded capacity, as shown
    /// next to the blank field.
    pub fn derived_coverage_percent(&self, params: &EngineParams) -> String {
        let coverage = params.coverage_policy.coverage(self.upgraded_capacity_kwp);
        format!("{:.1}", coverage * 100.0)
    }

    /// Converts percentages to fractions.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the consumption is outside the form's
    /// range or the upgraded coverage is neither empty nor a number.
    /// Remaining domain checks are left to [`SimulationInput::validate`].
    pub fn to_input(&self) -> Result<SimulationInput, ValidationError> {
        if !(MIN_FORM_CONSUMPTION_KWH..=MAX_FORM_CONSUMPTION_KWH)
            .contains(&self.annual_consumption_kwh)
        {
            return Err(ValidationError::new(
                "annual_consumption_kwh",
                format!(
                    "must be between {MIN_FORM_CONSUMPTION_KWH} and \
                     {MAX_FORM_CONSUMPTION_KWH} kWh, got {}",
                    self.annual_consumption_kwh
                ),
            ));
        }

        let upgraded_coverage = match self.upgraded_coverage_percent.trim() {
            "" => None,
            text => {
                let percent: f64 = text.replace(',', ".").parse().map_err(|_| {
                    ValidationError::new(
                        "upgraded_coverage_percent",
                        format!("must be a number or empty, got \"{text}\""),
                    )
                })?;
                Some(percent / 100.0)
            }
        };

        Ok(SimulationInput {
            annual_consumption_kwh: self.annual_consumption_kwh,
            base_capacity_kwp: self.base_capacity_kwp,
            upgraded_capacity_kwp: self.upgraded_capacity_kwp,
            install_cost_eur: self.install_cost_eur,
            avoided_energy_price_eur_per_kwh: self.avoided_energy_price_eur_per_kwh,
            feed_in_rate_eur_per_kwh: self.feed_in_rate_eur_per_kwh,
            community_rate_eur_per_kwh: self.community_rate_eur_per_kwh,
            shared_energy_quota: self.shared_energy_quota_percent / 100.0,
            yield_kwh_per_kwp: self.yield_kwh_per_kwp,
            base_coverage_fraction: self.base_coverage_percent / 100.0,
            upgraded_coverage_fraction: upgraded_coverage,
            annual_price_escalation: self.annual_price_escalation_percent / 100.0,
        })
    }
}

fn to_percent(fraction: f64) -> f64 {
    // Rounded so that 0.5 shows as 50 rather than 50.00000000000001.
    (fraction * 100.0 * 1e6).round() / 1e6
}

/// Body of a successful `POST /api/simulate`.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub result: SimulationResult,
    pub projection: Vec<YearProjection>,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
