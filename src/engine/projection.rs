//! Year-by-year projection of the upgrade's cash flows with price escalation.

use serde::Serialize;

/// Yearly quantities that stay constant over the horizon.
///
/// Only the avoided-energy price changes from one year to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBasis {
    /// Self-consumption of the base installation (kWh/year).
    pub base_self_consumed_kwh: f64,
    /// Self-consumption gained by the upgrade (kWh/year).
    pub incremental_self_consumed_kwh: f64,
    /// Exported energy of the upgraded installation (kWh/year).
    pub exported_kwh: f64,
    /// Avoided-energy price in year 1 (EUR/kWh).
    pub initial_price_eur_per_kwh: f64,
    /// Compounding growth of the avoided-energy price.
    pub annual_price_escalation: f64,
    pub feed_in_rate_eur_per_kwh: f64,
    pub community_rate_eur_per_kwh: f64,
    pub shared_energy_quota: f64,
    /// Deduction collected in each of the first `deduction_years` years.
    pub annual_deduction_eur: f64,
    pub deduction_years: u32,
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearProjection {
    /// Year number, starting at 1.
    pub year: u32,
    /// Avoided-energy price applied in this year (EUR/kWh).
    pub energy_price_eur_per_kwh: f64,
    pub incremental_value_eur: f64,
    pub feed_in_eur: f64,
    pub community_eur: f64,
    /// Zero after the deduction period.
    pub deduction_eur: f64,
    pub bill_savings_eur: f64,
    /// Incentives plus deduction, excluding bill savings.
    pub benefit_eur: f64,
    /// Benefit plus bill savings.
    pub total_eur: f64,
    /// Running sum of `total_eur` up to and including this year.
    pub cumulative_total_eur: f64,
}

/// Projects `years` consecutive years.
///
/// The price of year `n + 1` is the price of year `n` times `1 + escalation`,
/// so a longer horizon carries the compounded price over instead of resetting it.
pub fn project_years(basis: &FlowBasis, years: u32) -> Vec<YearProjection> {
    let mut rows = Vec::with_capacity(years as usize);
    let mut price = basis.initial_price_eur_per_kwh;
    let mut cumulative = 0.0;

    for year in 1..=years {
        let incremental_value_eur = basis.incremental_self_consumed_kwh * price;
        let feed_in_eur = basis.exported_kwh * basis.feed_in_rate_eur_per_kwh;
        let community_eur =
            basis.exported_kwh * basis.shared_energy_quota * basis.community_rate_eur_per_kwh;
        let deduction_eur = if year <= basis.deduction_years {
            basis.annual_deduction_eur
        } else {
            0.0
        };
        let bill_savings_eur = basis.base_self_consumed_kwh * price;

        let benefit_eur = incremental_value_eur + feed_in_eur + community_eur + deduction_eur;
        let total_eur = benefit_eur + bill_savings_eur;
        cumulative += total_eur;

        rows.push(YearProjection {
            year,
            energy_price_eur_per_kwh: price,
            incremental_value_eur,
            feed_in_eur,
            community_eur,
            deduction_eur,
            bill_savings_eur,
            benefit_eur,
            total_eur,
            cumulative_total_eur: cumulative,
        });

        price *= 1.0 + basis.annual_price_escalation;
    }

    rows
}

/// Sum of `benefit_eur` over the first `years` rows.
pub fn cumulative_benefit(rows: &[YearProjection], years: usize) -> f64 {
    rows.iter().take(years).map(|r| r.benefit_eur).sum()
}

/// Sum of `bill_savings_eur` over the first `years` rows.
pub fn cumulative_bill_savings(rows: &[YearProjection], years: usize) -> f64 {
    rows.iter().take(years).map(|r| r.bill_savings_eur).sum()
}

/// First year whose cumulative all-in total reaches `install_cost_eur`.
pub fn payback_year(rows: &[YearProjection], install_cost_eur: f64) -> Option<u32> {
    rows.iter()
        .find(|r| r.cumulative_total_eur >= install_cost_eur)
        .map(|r| r.year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basis(escalation: f64) -> FlowBasis {
        FlowBasis {
            base_self_consumed_kwh: 1000.0,
            incremental_self_consumed_kwh: 100.0,
            exported_kwh: 2000.0,
            initial_price_eur_per_kwh: 0.25,
            annual_price_escalation: escalation,
            feed_in_rate_eur_per_kwh: 0.10,
            community_rate_eur_per_kwh: 0.05,
            shared_energy_quota: 0.5,
            annual_deduction_eur: 300.0,
            deduction_years: 10,
        }
    }

    #[test]
    fn produces_one_row_per_year() {
        let rows = project_years(&basis(0.0), 20);
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].year, 1);
        assert_eq!(rows[19].year, 20);
    }

    #[test]
    fn deduction_stops_after_deduction_years() {
        let rows = project_years(&basis(0.03), 20);
        assert!(rows[..10].iter().all(|r| r.deduction_eur == 300.0));
        assert!(rows[10..].iter().all(|r| r.deduction_eur == 0.0));
    }

    #[test]
    fn price_compounds_and_carries_over() {
        let rows = project_years(&basis(0.10), 12);
        assert_eq!(rows[0].energy_price_eur_per_kwh, 0.25);
        let expected_year_11 = 0.25 * 1.1_f64.powi(10);
        assert!((rows[10].energy_price_eur_per_kwh - expected_year_11).abs() < 1e-12);
    }

    #[test]
    fn fixed_incentives_ignore_escalation() {
        let rows = project_years(&basis(0.05), 5);
        for r in &rows {
            assert_eq!(r.feed_in_eur, 200.0);
            assert_eq!(r.community_eur, 50.0);
        }
    }

    #[test]
    fn cumulative_matches_running_sum() {
        let rows = project_years(&basis(0.02), 20);
        let sum: f64 = rows.iter().map(|r| r.total_eur).sum();
        assert!((rows[19].cumulative_total_eur - sum).abs() < 1e-9);
        let split = cumulative_benefit(&rows, 20) + cumulative_bill_savings(&rows, 20);
        assert!((split - sum).abs() < 1e-9);
    }

    #[test]
    fn payback_year_is_first_year_reaching_cost() {
        // Year total: 25 + 200 + 50 + 300 + 250 = 825
        let rows = project_years(&basis(0.0), 20);
        assert_eq!(payback_year(&rows, 825.0), Some(1));
        assert_eq!(payback_year(&rows, 826.0), Some(2));
        assert_eq!(payback_year(&rows, 1e9), None);
    }

    #[test]
    fn zero_years_is_empty() {
        assert!(project_years(&basis(0.0), 0).is_empty());
    }
}
