//! Print-ready HTML customer report.

use std::fs;
use std::path::{Path, PathBuf};

use askama::Template;
use tracing::info;

use super::chart::{horizon_chart_svg, payback_chart_svg};
use super::format_eur;
use crate::engine::Simulation;
use crate::error::ReportError;

/// One line of the annual breakdown table.
#[derive(Debug, Clone)]
pub struct BreakdownRow {
    pub label: &'static str,
    pub value: String,
    /// Highlights the closing line of the table.
    pub emphasis: bool,
}

#[derive(Debug, Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub customer: String,
    pub date: String,
    pub base_capacity_kwp: String,
    pub upgraded_capacity_kwp: String,
    pub install_cost: String,
    pub annual_benefit: String,
    pub annual_total_savings: String,
    pub breakdown: Vec<BreakdownRow>,
    pub benefit_10y: String,
    pub benefit_20y: String,
    pub total_savings_10y: String,
    pub payback: String,
    pub irr: String,
    pub payback_svg: String,
    pub horizon_svg: String,
}

impl ReportTemplate {
    /// Builds the report view for one simulation.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Chart` if either chart fails to render.
    pub fn new(customer: &str, date: &str, sim: &Simulation) -> Result<Self, ReportError> {
        let r = &sim.result;
        let breakdown = vec![
            row("Extra autoconsumo (Upgrade)", r.incremental_value_eur),
            row("RID energia immessa", r.feed_in_revenue_eur),
            row("CER prudente", r.community_revenue_eur),
            row("Totale benefici Upgrade + CER", r.annual_incentive_eur),
            row("Detrazione fiscale annua", r.annual_deduction_eur),
            row("Beneficio annuale totale", r.annual_benefit_eur),
            row("Risparmio bolletta annuo", r.bill_savings_eur),
            BreakdownRow {
                emphasis: true,
                ..row("Risparmio complessivo annuo", r.annual_total_savings_eur)
            },
        ];

        Ok(Self {
            customer: customer.to_string(),
            date: date.to_string(),
            base_capacity_kwp: format!("{:.2}", sim.input.base_capacity_kwp),
            upgraded_capacity_kwp: format!("{:.2}", sim.input.upgraded_capacity_kwp),
            install_cost: format_eur(sim.input.install_cost_eur),
            annual_benefit: format_eur(r.annual_benefit_eur),
            annual_total_savings: format_eur(r.annual_total_savings_eur),
            breakdown,
            benefit_10y: format_eur(r.benefit_10y_eur),
            benefit_20y: format_eur(r.benefit_20y_eur),
            total_savings_10y: format_eur(r.total_savings_10y_eur),
            payback: r.payback_year.map_or_else(
                || "oltre 20 anni".to_string(),
                |year| format!("anno {year}"),
            ),
            irr: r.irr_10y.to_string(),
            payback_svg: payback_chart_svg(sim.input.install_cost_eur, &sim.projection)?,
            horizon_svg: horizon_chart_svg(r.benefit_10y_eur, r.benefit_20y_eur)?,
        })
    }
}

fn row(label: &'static str, value: f64) -> BreakdownRow {
    BreakdownRow {
        label,
        value: format_eur(value),
        emphasis: false,
    }
}

/// Renders the complete HTML report.
///
/// # Errors
///
/// Returns `ReportError` if a chart or the template fails to render.
pub fn render_report(customer: &str, date: &str, sim: &Simulation) -> Result<String, ReportError> {
    let template = ReportTemplate::new(customer, date, sim)?;
    Ok(template.render()?)
}

/// File name of the report for `customer`, with unsafe characters replaced.
///
/// # Examples
///
/// ```
/// use solar_upgrade::report::report_file_name;
///
/// assert_eq!(report_file_name("Mario Rossi"), "Report_Mario_Rossi.html");
/// ```
pub fn report_file_name(customer: &str) -> String {
    let safe: String = customer
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("Report_{safe}.html")
}

/// Renders the report and writes it into `dir` as `Report_<customer>.html`.
///
/// # Arguments
///
/// * `dir` - Existing output directory
/// * `customer` - Customer name shown on the first section
/// * `date` - Simulation date, already formatted
/// * `sim` - Completed simulation
///
/// # Returns
///
/// Path of the written file.
///
/// # Errors
///
/// Returns `ReportError` if rendering fails or the file cannot be written.
pub fn write_report(
    dir: &Path,
    customer: &str,
    date: &str,
    sim: &Simulation,
) -> Result<PathBuf, ReportError> {
    let html = render_report(customer, date, sim)?;
    let path = dir.join(report_file_name(customer));
    fs::write(&path, html).map_err(|source| ReportError::Write {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::run_simulation;
    use crate::engine::types::{EngineParams, SimulationInput};

    fn simulation() -> Option<Simulation> {
        run_simulation(&SimulationInput::default(), &EngineParams::default()).ok()
    }

    #[test]
    fn file_name_replaces_separators() {
        assert_eq!(report_file_name("Rossi/Bianchi"), "Report_Rossi_Bianchi.html");
        assert_eq!(report_file_name(" Verdi "), "Report_Verdi.html");
    }

    #[test]
    fn report_has_three_sections() {
        let sim = simulation();
        assert!(sim.is_some());
        let html = sim
            .as_ref()
            .and_then(|s| render_report("Rossi", "01/02/2026", s).ok())
            .unwrap_or_default();
        assert!(html.contains("Rossi"));
        assert!(html.contains("01/02/2026"));
        assert!(html.contains("Dettaglio Benefici Economici Annui"));
        assert!(html.contains("Proiezione nel Tempo"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn breakdown_uses_formatted_amounts() {
        let sim = simulation();
        let view = sim
            .as_ref()
            .and_then(|s| ReportTemplate::new("Rossi", "01/02/2026", s).ok());
        let view = view.as_ref();
        assert_eq!(view.map(|v| v.breakdown.len()), Some(8));
        assert_eq!(view.map(|v| v.install_cost.as_str()), Some("13,560.00"));
        assert_eq!(
            view.and_then(|v| v.breakdown.last()).map(|r| r.emphasis),
            Some(true)
        );
    }

    #[test]
    fn customer_name_is_escaped() {
        let sim = simulation();
        let html = sim
            .as_ref()
            .and_then(|s| render_report("<b>x</b>", "01/02/2026", s).ok())
            .unwrap_or_default();
        assert!(!html.contains("<b>x</b>"));
    }
}
