//! Customer-facing presentation of a simulation: charts, HTML report, markdown summary.

pub mod chart;
pub mod document;

pub use document::{render_report, report_file_name, write_report};

use crate::engine::types::SimulationResult;

/// Formats an amount with two decimals and comma thousands separators.
///
/// # Examples
///
/// ```
/// use solar_upgrade::report::format_eur;
///
/// assert_eq!(format_eur(13560.0), "13,560.00");
/// assert_eq!(format_eur(-1234567.891), "-1,234,567.89");
/// ```
pub fn format_eur(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, decimals) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{decimals}")
}

/// Today's date as shown on the report.
pub fn today() -> String {
    chrono::Local::now().format("%d/%m/%Y").to_string()
}

/// Short markdown summary for chat or e-mail.
pub fn markdown_summary(
    base_capacity_kwp: f64,
    upgraded_capacity_kwp: f64,
    result: &SimulationResult,
) -> String {
    format!(
        "### Report Cliente\n\
         \n\
         Impianto standard: **{base_capacity_kwp:.2} kWp**  \n\
         Impianto potenziato: **{upgraded_capacity_kwp:.2} kWp**\n\
         \n\
         ---\n\
         \n\
         ## Beneficio annuo complessivo\n\
         \n\
         ➡ **{:.0} € / anno**\n\
         \n\
         ---\n\
         \n\
         ## Beneficio totale\n\
         \n\
         - 10 anni: **{:.0} €**\n\
         - 20 anni: **{:.0} €**\n",
        result.annual_benefit_eur, result.benefit_10y_eur, result.benefit_20y_eur,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute_benefits;
    use crate::engine::types::{EngineParams, SimulationInput};

    #[test]
    fn format_eur_groups_thousands() {
        assert_eq!(format_eur(0.0), "0.00");
        assert_eq!(format_eur(999.999), "1,000.00");
        assert_eq!(format_eur(1769.203368), "1,769.20");
        assert_eq!(format_eur(123.4), "123.40");
    }

    #[test]
    fn format_eur_drops_sign_of_negative_zero() {
        assert_eq!(format_eur(-0.001), "0.00");
    }

    #[test]
    fn summary_lists_both_horizons() {
        let input = SimulationInput::default();
        let result = compute_benefits(&input, &EngineParams::default());
        assert!(result.is_ok());
        let text = result
            .map(|r| markdown_summary(input.base_capacity_kwp, input.upgraded_capacity_kwp, &r))
            .unwrap_or_default();
        assert!(text.contains("Impianto standard: **6.56 kWp**"));
        assert!(text.contains("Impianto potenziato: **9.02 kWp**"));
        assert!(text.contains("- 10 anni: **17692 €**"));
        assert!(text.contains("- 20 anni: **28604 €**"));
        assert!(text.contains("1769 € / anno"));
    }
}
