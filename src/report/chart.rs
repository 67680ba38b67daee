//! SVG charts embedded in the customer report.

use plotters::prelude::*;

use crate::engine::projection::YearProjection;
use crate::error::ReportError;

pub const CHART_WIDTH: u32 = 640;
pub const CHART_HEIGHT: u32 = 400;

const LINE_COLOR: RGBColor = RGBColor(33, 150, 243);
const COST_COLOR: RGBColor = RGBColor(229, 57, 53);
const BAR_COLOR: RGBColor = RGBColor(76, 175, 80);

/// Cumulative all-in savings per year against the flat install cost.
///
/// The curve starts at year 0 with nothing recovered and follows the
/// projection's running total, so escalation bends it upwards.
///
/// # Errors
///
/// Returns `ReportError::Chart` if plotting fails.
pub fn payback_chart_svg(
    install_cost_eur: f64,
    rows: &[YearProjection],
) -> Result<String, ReportError> {
    render_payback(install_cost_eur, rows).map_err(|e| ReportError::Chart(e.to_string()))
}

/// Two bars: cumulative benefit over 10 and over 20 years.
///
/// # Errors
///
/// Returns `ReportError::Chart` if plotting fails.
pub fn horizon_chart_svg(
    benefit_10y_eur: f64,
    benefit_20y_eur: f64,
) -> Result<String, ReportError> {
    render_horizons(benefit_10y_eur, benefit_20y_eur)
        .map_err(|e| ReportError::Chart(e.to_string()))
}

fn render_payback(
    install_cost_eur: f64,
    rows: &[YearProjection],
) -> Result<String, Box<dyn std::error::Error>> {
    let mut svg_data = String::new();

    let last_year = rows.last().map_or(0, |r| r.year);
    let peak = rows
        .iter()
        .map(|r| r.cumulative_total_eur)
        .fold(install_cost_eur, f64::max);
    let y_max = if peak > 0.0 { peak * 1.1 } else { 1.0 };

    {
        let root = SVGBackend::with_string(&mut svg_data, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Rientro dell'investimento (Payback)", ("sans-serif", 20, &BLACK))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0u32..last_year.max(1), 0f64..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Anni")
            .y_desc("Beneficio cumulato (€)")
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        let curve = std::iter::once((0, 0.0))
            .chain(rows.iter().map(|r| (r.year, r.cumulative_total_eur)));
        chart
            .draw_series(LineSeries::new(curve, LINE_COLOR.stroke_width(2)))?
            .label("Risparmio cumulato")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], LINE_COLOR));

        chart
            .draw_series(LineSeries::new(
                [(0, install_cost_eur), (last_year.max(1), install_cost_eur)],
                COST_COLOR.stroke_width(2),
            ))?
            .label("Costo impianto")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], COST_COLOR));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }

    Ok(svg_data)
}

fn render_horizons(
    benefit_10y_eur: f64,
    benefit_20y_eur: f64,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut svg_data = String::new();

    let peak = benefit_10y_eur.max(benefit_20y_eur);
    let y_max = if peak > 0.0 { peak * 1.2 } else { 1.0 };
    let bars = [
        ("10 anni", 0.0, benefit_10y_eur),
        ("20 anni", 1.0, benefit_20y_eur),
    ];

    {
        let root = SVGBackend::with_string(&mut svg_data, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Beneficio Totale nel Tempo", ("sans-serif", 20, &BLACK))
            .margin(15)
            .x_label_area_size(20)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..1.5f64, 0f64..y_max)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .y_desc("Euro (€)")
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        chart.draw_series(bars.iter().map(|(_, x, value)| {
            Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *value)], BAR_COLOR.filled())
        }))?;

        // Labels sit just above each bar.
        chart.draw_series(bars.iter().map(|(label, x, value)| {
            Text::new(
                format!("{label}: € {value:.0}"),
                (x - 0.25, value + y_max * 0.04),
                ("sans-serif", 14).into_font(),
            )
        }))?;

        root.present()?;
    }

    Ok(svg_data)
}
