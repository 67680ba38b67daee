//! Core engine types: inputs, parameters, and the named result mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::coverage::CoveragePolicy;
use super::irr::IrrOutcome;
use crate::error::ValidationError;

/// Inputs of one benefit computation, built fresh from form or scenario state.
///
/// # Examples
///
/// ```
/// use solar_upgrade::engine::types::SimulationInput;
///
/// let input = SimulationInput::default();
/// assert_eq!(input.upgraded_capacity_kwp, 9.02);
/// assert!(input.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Yearly electricity use of the customer (kWh, > 0).
    pub annual_consumption_kwh: f64,
    /// Nameplate power of the base installation (kWp, > 0).
    pub base_capacity_kwp: f64,
    /// Nameplate power of the upgraded installation (kWp, > 0).
    pub upgraded_capacity_kwp: f64,
    /// Total capital cost of the upgraded installation (EUR, >= 0).
    pub install_cost_eur: f64,
    /// Price of each kWh the customer no longer buys from the grid (EUR/kWh).
    pub avoided_energy_price_eur_per_kwh: f64,
    /// Feed-in (RID) rate paid for exported energy (EUR/kWh).
    pub feed_in_rate_eur_per_kwh: f64,
    /// Energy-community (CER) incentive on shared energy (EUR/kWh).
    pub community_rate_eur_per_kwh: f64,
    /// Fraction of exported energy counted as shared inside the community (0.0 to 1.0).
    pub shared_energy_quota: f64,
    /// Site yield per installed kWp (kWh/kWp), proxy for the climate zone.
    pub yield_kwh_per_kwp: f64,
    /// Share of consumption covered by the base installation (0.0 to 1.0).
    pub base_coverage_fraction: f64,
    /// Share of consumption covered by the upgraded installation (0.0 to 1.0).
    ///
    /// `None` lets the coverage estimator derive it from the upgraded capacity.
    pub upgraded_coverage_fraction: Option<f64>,
    /// Yearly growth rate of the avoided-energy price (>= 0).
    pub annual_price_escalation: f64,
}

impl Default for SimulationInput {
    /// The default form state: 5400 kWh, 6.56 kWp upgraded to 9.02 kWp for 13560 EUR.
    fn default() -> Self {
        Self {
            annual_consumption_kwh: 5400.0,
            base_capacity_kwp: 6.56,
            upgraded_capacity_kwp: 9.02,
            install_cost_eur: 13560.0,
            avoided_energy_price_eur_per_kwh: 0.30,
            feed_in_rate_eur_per_kwh: 0.137,
            community_rate_eur_per_kwh: 0.06,
            shared_energy_quota: 0.50,
            yield_kwh_per_kwp: 1200.0,
            base_coverage_fraction: 0.80,
            upgraded_coverage_fraction: None,
            annual_price_escalation: 0.0,
        }
    }
}

impl SimulationInput {
    /// Checks every field against its domain and fails on the first violation.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.validation_errors().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Every domain violation, in field order. Empty when the input is valid.
    pub fn validation_errors(&self) -> Vec<ValidationError> {
        let mut checks = vec![
            positive("annual_consumption_kwh", self.annual_consumption_kwh),
            positive("base_capacity_kwp", self.base_capacity_kwp),
            positive("upgraded_capacity_kwp", self.upgraded_capacity_kwp),
            positive("yield_kwh_per_kwp", self.yield_kwh_per_kwp),
            non_negative("install_cost_eur", self.install_cost_eur),
            non_negative(
                "avoided_energy_price_eur_per_kwh",
                self.avoided_energy_price_eur_per_kwh,
            ),
            non_negative("feed_in_rate_eur_per_kwh", self.feed_in_rate_eur_per_kwh),
            non_negative(
                "community_rate_eur_per_kwh",
                self.community_rate_eur_per_kwh,
            ),
            non_negative("annual_price_escalation", self.annual_price_escalation),
            unit_interval("shared_energy_quota", self.shared_energy_quota),
            unit_interval("base_coverage_fraction", self.base_coverage_fraction),
        ];
        if let Some(coverage) = self.upgraded_coverage_fraction {
            checks.push(unit_interval("upgraded_coverage_fraction", coverage));
        }
        checks.into_iter().filter_map(Result::err).collect()
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new(field, format!("must be finite, got {value}")))
    }
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, format!("must be > 0, got {value}")))
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(field, format!("must be >= 0, got {value}")))
    }
}

pub(crate) fn unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("must be in [0.0, 1.0], got {value}"),
        ))
    }
}

/// Newton-Raphson settings for the internal-rate-of-return solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IrrSettings {
    /// Starting rate estimate.
    pub guess: f64,
    /// Convergence threshold on the magnitude of one update.
    pub tolerance: f64,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Default for IrrSettings {
    fn default() -> Self {
        Self {
            guess: 0.1,
            tolerance: 1e-6,
            max_iterations: 1000,
        }
    }
}

/// Business and numeric parameters of the engine, passed explicitly to every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineParams {
    /// Share of the install cost returned as fiscal deduction.
    pub deduction_rate: f64,
    /// Number of years over which the deduction is spread evenly.
    pub deduction_years: u32,
    /// Clipping only applies at or below this yearly consumption (kWh).
    pub clipping_consumption_limit_kwh: f64,
    /// Yields at or below this value fall in the north zone (kWh/kWp).
    pub north_max_yield: f64,
    /// Yields at or below this value (and above the north limit) fall in the center zone.
    pub center_max_yield: f64,
    /// Policy deriving the upgraded coverage when the input leaves it open.
    pub coverage_policy: CoveragePolicy,
    /// Root-finder settings.
    pub irr: IrrSettings,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            deduction_rate: 0.50,
            deduction_years: 10,
            clipping_consumption_limit_kwh: 9000.0,
            north_max_yield: 1250.0,
            center_max_yield: 1400.0,
            coverage_policy: CoveragePolicy::FourPoint,
            irr: IrrSettings::default(),
        }
    }
}

/// Flat named result of one benefit computation.
///
/// Serialized keys are the stable names consumed by the form and the report.
/// All energies are in kWh, all money in EUR, fractions are unitless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    /// Base installation production (kWh/year).
    #[serde(rename = "produzione_base")]
    pub base_production_kwh: f64,
    /// Upgraded production before inverter clipping (kWh/year).
    #[serde(rename = "produzione_bonus_teorica")]
    pub upgraded_theoretical_kwh: f64,
    /// Clipping derate applied to the upgraded installation.
    #[serde(rename = "percentuale_clipping")]
    pub clip_fraction: f64,
    /// Upgraded production after clipping (kWh/year).
    #[serde(rename = "produzione_bonus")]
    pub upgraded_production_kwh: f64,
    /// Coverage fraction used for the upgraded installation.
    #[serde(rename = "copertura_bonus")]
    pub upgraded_coverage_fraction: f64,
    /// Consumption self-supplied by the base installation (kWh/year).
    #[serde(rename = "autoconsumo_base")]
    pub base_self_consumed_kwh: f64,
    /// Consumption self-supplied by the upgraded installation (kWh/year).
    #[serde(rename = "autoconsumo_bonus")]
    pub upgraded_self_consumed_kwh: f64,
    /// Self-consumption gained by the upgrade (kWh/year).
    #[serde(rename = "delta_autoconsumo")]
    pub incremental_self_consumed_kwh: f64,
    /// Upgraded production exported to the grid (kWh/year).
    #[serde(rename = "energia_immessa")]
    pub exported_kwh: f64,
    /// Value of the incremental self-consumption.
    #[serde(rename = "vantaggio_extra_autoconsumo")]
    pub incremental_value_eur: f64,
    /// Feed-in revenue.
    #[serde(rename = "rid_annuo")]
    pub feed_in_revenue_eur: f64,
    /// Energy-community revenue on the shared part of the export.
    #[serde(rename = "cer_prudente")]
    pub community_revenue_eur: f64,
    /// Incremental value + feed-in + community.
    #[serde(rename = "totale_benefici_annui")]
    pub annual_incentive_eur: f64,
    /// Whole fiscal deduction.
    #[serde(rename = "detrazione_totale")]
    pub total_deduction_eur: f64,
    /// Deduction collected in each deduction year.
    #[serde(rename = "detrazione_annua")]
    pub annual_deduction_eur: f64,
    /// Incentives plus yearly deduction.
    #[serde(rename = "beneficio_annuale_totale")]
    pub annual_benefit_eur: f64,
    /// Bill savings of the base self-consumption, excluding the incremental part.
    #[serde(rename = "risparmio_bolletta")]
    pub bill_savings_eur: f64,
    /// First-year benefit plus bill savings.
    #[serde(rename = "risparmio_complessivo_annuo")]
    pub annual_total_savings_eur: f64,
    /// Cumulative benefit (incentives + deduction) over 10 years.
    #[serde(rename = "beneficio_10_anni")]
    pub benefit_10y_eur: f64,
    /// Cumulative benefit (incentives + deduction) over 20 years.
    #[serde(rename = "beneficio_20_anni")]
    pub benefit_20y_eur: f64,
    /// Cumulative bill savings over 10 years.
    #[serde(rename = "risparmio_bolletta_10")]
    pub bill_savings_10y_eur: f64,
    /// Cumulative bill savings over 20 years.
    #[serde(rename = "risparmio_bolletta_20")]
    pub bill_savings_20y_eur: f64,
    /// Benefit plus bill savings over 10 years.
    #[serde(rename = "risparmio_complessivo_10")]
    pub total_savings_10y_eur: f64,
    /// Benefit plus bill savings over 20 years.
    #[serde(rename = "risparmio_complessivo_20")]
    pub total_savings_20y_eur: f64,
    /// First year whose cumulative all-in benefit covers the install cost.
    #[serde(rename = "anno_rientro")]
    pub payback_year: Option<u32>,
    /// Internal rate of return of the 10-year cash-flow stream.
    #[serde(rename = "irr_10")]
    pub irr_10y: IrrOutcome,
}

impl SimulationResult {
    /// Ordered `(key, value)` list of every numeric output.
    ///
    /// The IRR is included as a percentage only when the solver produced a number;
    /// the payback year only when it is reached.
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        let mut values = vec![
            ("produzione_base", self.base_production_kwh),
            ("produzione_bonus_teorica", self.upgraded_theoretical_kwh),
            ("percentuale_clipping", self.clip_fraction),
            ("produzione_bonus", self.upgraded_production_kwh),
            ("copertura_bonus", self.upgraded_coverage_fraction),
            ("autoconsumo_base", self.base_self_consumed_kwh),
            ("autoconsumo_bonus", self.upgraded_self_consumed_kwh),
            ("delta_autoconsumo", self.incremental_self_consumed_kwh),
            ("energia_immessa", self.exported_kwh),
            ("vantaggio_extra_autoconsumo", self.incremental_value_eur),
            ("rid_annuo", self.feed_in_revenue_eur),
            ("cer_prudente", self.community_revenue_eur),
            ("totale_benefici_annui", self.annual_incentive_eur),
            ("detrazione_totale", self.total_deduction_eur),
            ("detrazione_annua", self.annual_deduction_eur),
            ("beneficio_annuale_totale", self.annual_benefit_eur),
            ("risparmio_bolletta", self.bill_savings_eur),
            ("risparmio_complessivo_annuo", self.annual_total_savings_eur),
            ("beneficio_10_anni", self.benefit_10y_eur),
            ("beneficio_20_anni", self.benefit_20y_eur),
            ("risparmio_bolletta_10", self.bill_savings_10y_eur),
            ("risparmio_bolletta_20", self.bill_savings_20y_eur),
            ("risparmio_complessivo_10", self.total_savings_10y_eur),
            ("risparmio_complessivo_20", self.total_savings_20y_eur),
        ];
        if let Some(year) = self.payback_year {
            values.push(("anno_rientro", f64::from(year)));
        }
        // An unstable estimate stays in `irr_10y` but never reaches the flat mapping.
        if let Some(rate) = self.irr_10y.converged_rate() {
            values.push(("irr_10", rate * 100.0));
        }
        values
    }

    /// Looks up one output by its stable key.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.named_values()
            .into_iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Energy (kWh/year) ---")?;
        writeln!(f, "Base production:        {:.0}", self.base_production_kwh)?;
        writeln!(
            f,
            "Upgraded production:    {:.0} (clipping {:.1}%)",
            self.upgraded_production_kwh,
            self.clip_fraction * 100.0
        )?;
        writeln!(
            f,
            "Upgraded coverage:      {:.1}%",
            self.upgraded_coverage_fraction * 100.0
        )?;
        writeln!(f, "Base self-consumed:     {:.0}", self.base_self_consumed_kwh)?;
        writeln!(f, "Upgraded self-consumed: {:.0}", self.upgraded_self_consumed_kwh)?;
        writeln!(f, "Incremental self-cons.: {:.0}", self.incremental_self_consumed_kwh)?;
        writeln!(f, "Exported:               {:.0}", self.exported_kwh)?;
        writeln!(f)?;
        writeln!(f, "--- Annual benefits (EUR) ---")?;
        writeln!(f, "Extra self-consumption: {:.2}", self.incremental_value_eur)?;
        writeln!(f, "Feed-in (RID):          {:.2}", self.feed_in_revenue_eur)?;
        writeln!(f, "Community (CER):        {:.2}", self.community_revenue_eur)?;
        writeln!(f, "Incentives total:       {:.2}", self.annual_incentive_eur)?;
        writeln!(f, "Fiscal deduction:       {:.2}", self.annual_deduction_eur)?;
        writeln!(f, "Annual benefit:         {:.2}", self.annual_benefit_eur)?;
        writeln!(f, "Bill savings:           {:.2}", self.bill_savings_eur)?;
        writeln!(f, "Annual total savings:   {:.2}", self.annual_total_savings_eur)?;
        writeln!(f)?;
        writeln!(f, "--- Horizons (EUR) ---")?;
        writeln!(f, "Benefit 10 years:       {:.2}", self.benefit_10y_eur)?;
        writeln!(f, "Benefit 20 years:       {:.2}", self.benefit_20y_eur)?;
        writeln!(f, "Total savings 10 years: {:.2}", self.total_savings_10y_eur)?;
        writeln!(f, "Total savings 20 years: {:.2}", self.total_savings_20y_eur)?;
        match self.payback_year {
            Some(year) => writeln!(f, "Payback year:           {year}")?,
            None => writeln!(f, "Payback year:           not within 20 years")?,
        }
        write!(f, "IRR 10 years:           {}", self.irr_10y)
    }
}
