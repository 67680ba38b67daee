//! Production estimator: yearly yield with inverter clipping on small residential sites.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::types::EngineParams;

/// Climate zone inferred from the site yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateZone {
    North,
    Center,
    South,
}

impl ClimateZone {
    /// Classifies a site yield using the thresholds in `params`.
    ///
    /// Both thresholds are inclusive upper bounds.
    pub fn from_yield(yield_kwh_per_kwp: f64, params: &EngineParams) -> Self {
        if yield_kwh_per_kwp <= params.north_max_yield {
            Self::North
        } else if yield_kwh_per_kwp <= params.center_max_yield {
            Self::Center
        } else {
            Self::South
        }
    }
}

impl fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::North => "north",
            Self::Center => "center",
            Self::South => "south",
        };
        f.write_str(name)
    }
}

/// One row of the clipping table: derates per zone for a canonical capacity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClippingRow {
    /// Canonical capacity in hundredths of kWp (820 = 8.20 kWp).
    pub capacity_centi_kwp: i64,
    pub north: f64,
    pub center: f64,
    pub south: f64,
}

impl ClippingRow {
    fn derate(&self, zone: ClimateZone) -> f64 {
        match zone {
            ClimateZone::North => self.north,
            ClimateZone::Center => self.center,
            ClimateZone::South => self.south,
        }
    }
}

/// Clipping derates of a 6 kW inverter, keyed by canonical upgraded capacity.
///
/// Capacities outside the table get no derate in any zone.
pub const CLIPPING_TABLE: [ClippingRow; 3] = [
    ClippingRow {
        capacity_centi_kwp: 820,
        north: 0.015,
        center: 0.019,
        south: 0.023,
    },
    ClippingRow {
        capacity_centi_kwp: 902,
        north: 0.029,
        center: 0.034,
        south: 0.041,
    },
    ClippingRow {
        capacity_centi_kwp: 984,
        north: 0.045,
        center: 0.052,
        south: 0.059,
    },
];

/// Output of [`estimate_production`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductionEstimate {
    /// Capacity times yield (kWh/year).
    pub theoretical_kwh: f64,
    /// Derate applied (0.0 when clipping does not apply).
    pub clip_fraction: f64,
    /// Production after clipping (kWh/year).
    pub effective_kwh: f64,
}

/// Looks up the clipping derate for a capacity rounded to two decimals.
pub fn clip_fraction(capacity_kwp: f64, zone: ClimateZone) -> Option<f64> {
    let centi_kwp = (capacity_kwp * 100.0).round() as i64;
    CLIPPING_TABLE
        .iter()
        .find(|row| row.capacity_centi_kwp == centi_kwp)
        .map(|row| row.derate(zone))
}

/// Estimates the yearly production of an installation.
///
/// Clipping applies only when `annual_consumption_kwh` is at or below
/// `params.clipping_consumption_limit_kwh`.
///
/// # Examples
///
/// ```
/// use solar_upgrade::engine::production::estimate_production;
/// use solar_upgrade::engine::types::EngineParams;
///
/// let est = estimate_production(9.02, 1200.0, 5000.0, &EngineParams::default());
/// assert_eq!(est.clip_fraction, 0.029);
/// ```
pub fn estimate_production(
    capacity_kwp: f64,
    yield_kwh_per_kwp: f64,
    annual_consumption_kwh: f64,
    params: &EngineParams,
) -> ProductionEstimate {
    let theoretical_kwh = capacity_kwp * yield_kwh_per_kwp;

    let clip = if annual_consumption_kwh <= params.clipping_consumption_limit_kwh {
        let zone = ClimateZone::from_yield(yield_kwh_per_kwp, params);
        let derate = clip_fraction(capacity_kwp, zone);
        debug!(capacity_kwp, %zone, ?derate, "clipping table lookup");
        derate.unwrap_or(0.0)
    } else {
        0.0
    };

    ProductionEstimate {
        theoretical_kwh,
        clip_fraction: clip,
        effective_kwh: theoretical_kwh * (1.0 - clip),
    }
}
