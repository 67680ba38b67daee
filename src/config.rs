//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::engine::coverage::CoveragePolicy;
use crate::engine::types::{
    EngineParams, IrrSettings, SimulationInput, non_negative, positive, unit_interval,
};
use crate::error::ValidationError;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the default form state. Load from
/// TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::default_scenario`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Customer identity and consumption.
    #[serde(default)]
    pub customer: CustomerConfig,
    /// Base and upgraded installation.
    #[serde(default)]
    pub plant: PlantConfig,
    /// Prices, incentive rates and escalation.
    #[serde(default)]
    pub market: MarketConfig,
    /// Business rules and solver settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Customer identity and consumption.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomerConfig {
    /// Name printed on the report and used in its file name.
    pub name: String,
    /// Yearly electricity use (kWh, must be > 0).
    pub annual_consumption_kwh: f64,
}

impl Default for CustomerConfig {
    fn default() -> Self {
        Self {
            name: "Cliente".to_string(),
            annual_consumption_kwh: SimulationInput::default().annual_consumption_kwh,
        }
    }
}

/// Base and upgraded installation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Base installation power (kWp).
    pub base_capacity_kwp: f64,
    /// Upgraded installation power (kWp).
    pub upgraded_capacity_kwp: f64,
    /// Capital cost of the upgraded installation (EUR).
    pub install_cost_eur: f64,
    /// Site yield (kWh/kWp).
    pub yield_kwh_per_kwp: f64,
    /// Share of consumption covered by the base installation (0.0–1.0).
    pub base_coverage_fraction: f64,
    /// Share covered by the upgraded installation; derived from capacity when omitted.
    pub upgraded_coverage_fraction: Option<f64>,
}

impl Default for PlantConfig {
    fn default() -> Self {
        let input = SimulationInput::default();
        Self {
            base_capacity_kwp: input.base_capacity_kwp,
            upgraded_capacity_kwp: input.upgraded_capacity_kwp,
            install_cost_eur: input.install_cost_eur,
            yield_kwh_per_kwp: input.yield_kwh_per_kwp,
            base_coverage_fraction: input.base_coverage_fraction,
            upgraded_coverage_fraction: input.upgraded_coverage_fraction,
        }
    }
}

/// Prices, incentive rates and escalation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    /// Avoided grid price (EUR/kWh).
    pub avoided_energy_price_eur_per_kwh: f64,
    /// Feed-in rate (EUR/kWh).
    pub feed_in_rate_eur_per_kwh: f64,
    /// Energy-community incentive (EUR/kWh).
    pub community_rate_eur_per_kwh: f64,
    /// Shared fraction of the exported energy (0.0–1.0).
    pub shared_energy_quota: f64,
    /// Yearly growth of the avoided price.
    pub annual_price_escalation: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        let input = SimulationInput::default();
        Self {
            avoided_energy_price_eur_per_kwh: input.avoided_energy_price_eur_per_kwh,
            feed_in_rate_eur_per_kwh: input.feed_in_rate_eur_per_kwh,
            community_rate_eur_per_kwh: input.community_rate_eur_per_kwh,
            shared_energy_quota: input.shared_energy_quota,
            annual_price_escalation: input.annual_price_escalation,
        }
    }
}

/// Business rules and solver settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub deduction_rate: f64,
    pub deduction_years: u32,
    pub clipping_consumption_limit_kwh: f64,
    pub north_max_yield: f64,
    pub center_max_yield: f64,
    /// `"four_point"` or `"two_tier"`.
    pub coverage_policy: CoveragePolicy,
    pub irr_guess: f64,
    pub irr_tolerance: f64,
    pub irr_max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = EngineParams::default();
        Self {
            deduction_rate: params.deduction_rate,
            deduction_years: params.deduction_years,
            clipping_consumption_limit_kwh: params.clipping_consumption_limit_kwh,
            north_max_yield: params.north_max_yield,
            center_max_yield: params.center_max_yield,
            coverage_policy: params.coverage_policy,
            irr_guess: params.irr.guess,
            irr_tolerance: params.irr.tolerance,
            irr_max_iterations: params.irr.max_iterations,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"plant.base_capacity_kwp"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the default form state.
    pub fn default_scenario() -> Self {
        Self {
            customer: CustomerConfig::default(),
            plant: PlantConfig::default(),
            market: MarketConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Returns the south preset: high-yield site with a rising energy price.
    pub fn south() -> Self {
        Self {
            plant: PlantConfig {
                yield_kwh_per_kwp: 1450.0,
                ..PlantConfig::default()
            },
            market: MarketConfig {
                annual_price_escalation: 0.02,
                ..MarketConfig::default()
            },
            ..Self::default_scenario()
        }
    }

    /// Returns the no-clipping preset: a large consumer with the biggest upgrade.
    pub fn no_clipping() -> Self {
        Self {
            customer: CustomerConfig {
                annual_consumption_kwh: 9500.0,
                ..CustomerConfig::default()
            },
            plant: PlantConfig {
                upgraded_capacity_kwp: 9.84,
                install_cost_eur: 15000.0,
                ..PlantConfig::default()
            },
            ..Self::default_scenario()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "south", "no_clipping"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_scenario()),
            "south" => Ok(Self::south()),
            "no_clipping" => Ok(Self::no_clipping()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Builds the engine input for this scenario.
    pub fn to_input(&self) -> SimulationInput {
        SimulationInput {
            annual_consumption_kwh: self.customer.annual_consumption_kwh,
            base_capacity_kwp: self.plant.base_capacity_kwp,
            upgraded_capacity_kwp: self.plant.upgraded_capacity_kwp,
            install_cost_eur: self.plant.install_cost_eur,
            avoided_energy_price_eur_per_kwh: self.market.avoided_energy_price_eur_per_kwh,
            feed_in_rate_eur_per_kwh: self.market.feed_in_rate_eur_per_kwh,
            community_rate_eur_per_kwh: self.market.community_rate_eur_per_kwh,
            shared_energy_quota: self.market.shared_energy_quota,
            yield_kwh_per_kwp: self.plant.yield_kwh_per_kwp,
            base_coverage_fraction: self.plant.base_coverage_fraction,
            upgraded_coverage_fraction: self.plant.upgraded_coverage_fraction,
            annual_price_escalation: self.market.annual_price_escalation,
        }
    }

    /// Builds the engine parameters for this scenario.
    pub fn engine_params(&self) -> EngineParams {
        let e = &self.engine;
        EngineParams {
            deduction_rate: e.deduction_rate,
            deduction_years: e.deduction_years,
            clipping_consumption_limit_kwh: e.clipping_consumption_limit_kwh,
            north_max_yield: e.north_max_yield,
            center_max_yield: e.center_max_yield,
            coverage_policy: e.coverage_policy,
            irr: IrrSettings {
                guess: e.irr_guess,
                tolerance: e.irr_tolerance,
                max_iterations: e.irr_max_iterations,
            },
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let c = &self.customer;
        if c.name.trim().is_empty() {
            errors.push(ConfigError {
                field: "customer.name".into(),
                message: "must not be empty".into(),
            });
        }

        errors.extend(self.to_input().validation_errors().into_iter().map(|err| ConfigError {
            field: format!("{}.{}", input_section(err.field), err.field),
            message: err.message,
        }));

        let e = &self.engine;
        push(&mut errors, unit_interval("engine.deduction_rate", e.deduction_rate));
        if e.deduction_years == 0 {
            errors.push(ConfigError {
                field: "engine.deduction_years".into(),
                message: "must be > 0".into(),
            });
        }
        push(
            &mut errors,
            non_negative(
                "engine.clipping_consumption_limit_kwh",
                e.clipping_consumption_limit_kwh,
            ),
        );
        if !(e.north_max_yield < e.center_max_yield) {
            errors.push(ConfigError {
                field: "engine.north_max_yield".into(),
                message: "must be < engine.center_max_yield".into(),
            });
        }
        if !e.irr_guess.is_finite() || e.irr_guess <= -1.0 {
            errors.push(ConfigError {
                field: "engine.irr_guess".into(),
                message: format!("must be finite and > -1, got {}", e.irr_guess),
            });
        }
        push(&mut errors, positive("engine.irr_tolerance", e.irr_tolerance));
        if e.irr_max_iterations == 0 {
            errors.push(ConfigError {
                field: "engine.irr_max_iterations".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }
}

/// Section of the scenario file holding an engine input field.
fn input_section(field: &str) -> &'static str {
    match field {
        "annual_consumption_kwh" => "customer",
        "base_capacity_kwp"
        | "upgraded_capacity_kwp"
        | "install_cost_eur"
        | "yield_kwh_per_kwp"
        | "base_coverage_fraction"
        | "upgraded_coverage_fraction" => "plant",
        _ => "market",
    }
}

fn push(errors: &mut Vec<ConfigError>, check: Result<(), ValidationError>) {
    if let Err(err) = check {
        errors.push(ConfigError {
            field: err.field.into(),
            message: err.message,
        });
    }
}
