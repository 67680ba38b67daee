//! Request handlers for the form, results page, JSON API and report download.

use std::sync::Arc;

use askama::Template;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use tracing::{error, info, warn};

use super::AppState;
use super::types::{ErrorResponse, FormInput, SimulateResponse};
use crate::engine::types::{EngineParams, SimulationInput, SimulationResult};
use crate::engine::{Simulation, run_simulation};
use crate::error::EngineError;
use crate::report::chart::{horizon_chart_svg, payback_chart_svg};
use crate::report::{render_report, report_file_name, today};

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    form: FormInput,
    /// Derived upgraded coverage shown while the field is blank.
    coverage_hint: String,
    error: Option<String>,
}

impl FormTemplate {
    fn new(form: FormInput, params: &EngineParams, error: Option<String>) -> Self {
        Self {
            coverage_hint: form.derived_coverage_percent(params),
            form,
            error,
        }
    }
}

/// One line of the results table.
struct ResultRow {
    label: &'static str,
    value: String,
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultTemplate {
    form: FormInput,
    rows: Vec<ResultRow>,
    payback: String,
    irr: String,
    payback_svg: String,
    horizon_svg: String,
}

/// Renders the form prefilled with the default state.
///
/// `GET /` → 200 + HTML form
pub async fn index(State(state): State<Arc<AppState>>) -> Response {
    let form = FormInput::prefilled(&state.customer, &SimulationInput::default());
    render_html(StatusCode::OK, &FormTemplate::new(form, &state.params, None))
}

/// Runs the posted form and renders the results page.
///
/// `POST /simulate` → 200 + HTML results
/// invalid input → 400 + the form with the error message
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let (form, sim) = match run_form(&state, form) {
        Ok(ok) => ok,
        Err(response) => return response,
    };

    let charts = payback_chart_svg(sim.input.install_cost_eur, &sim.projection).and_then(|p| {
        horizon_chart_svg(sim.result.benefit_10y_eur, sim.result.benefit_20y_eur).map(|h| (p, h))
    });
    let (payback_svg, horizon_svg) = match charts {
        Ok(svgs) => svgs,
        Err(e) => {
            error!(error = %e, "chart rendering failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    let r = &sim.result;
    let page = ResultTemplate {
        rows: result_rows(r),
        payback: r.payback_year.map_or_else(
            || "oltre 20 anni".to_string(),
            |year| format!("anno {year}"),
        ),
        irr: r.irr_10y.to_string(),
        payback_svg,
        horizon_svg,
        form,
    };
    render_html(StatusCode::OK, &page)
}

/// Runs a JSON input and returns the named results plus the yearly projection.
///
/// `POST /api/simulate` → 200 + `SimulateResponse` JSON
/// invalid input → 400 + `ErrorResponse`
pub async fn api_simulate(
    State(state): State<Arc<AppState>>,
    input: Result<Json<SimulationInput>, JsonRejection>,
) -> Response {
    let Json(input) = match input {
        Ok(json) => json,
        Err(rejection) => return json_error(rejection.body_text()),
    };

    match run_simulation(&input, &state.params) {
        Ok(sim) => Json(SimulateResponse {
            result: sim.result,
            projection: sim.projection,
        })
        .into_response(),
        Err(e) => {
            warn!(error = %e, "rejected API input");
            json_error(e.to_string())
        }
    }
}

/// Runs the posted form and returns the HTML report as a download.
///
/// `POST /report` → 200 + `Report_<customer>.html` attachment
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormInput>, FormRejection>,
) -> Response {
    let (form, sim) = match run_form(&state, form) {
        Ok(ok) => ok,
        Err(response) => return response,
    };

    match render_report(&form.customer, &today(), &sim) {
        Ok(html) => {
            info!(customer = %form.customer, "report downloaded");
            let disposition = format!(
                "attachment; filename=\"{}\"",
                report_file_name(&form.customer)
            );
            (
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                html,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "report rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Extracts, converts and simulates a posted form; failures become a 400 form page.
fn run_form(
    state: &AppState,
    form: Result<Form<FormInput>, FormRejection>,
) -> Result<(FormInput, Simulation), Response> {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            let prefilled = FormInput::prefilled(&state.customer, &SimulationInput::default());
            return Err(form_error(state, prefilled, rejection.body_text()));
        }
    };

    let simulated = form
        .to_input()
        .map_err(EngineError::from)
        .and_then(|input| run_simulation(&input, &state.params));
    match simulated {
        Ok(sim) => Ok((form, sim)),
        Err(e) => {
            warn!(error = %e, "rejected form input");
            let message = e.to_string();
            Err(form_error(state, form, message))
        }
    }
}

fn form_error(state: &AppState, form: FormInput, message: String) -> Response {
    render_html(
        StatusCode::BAD_REQUEST,
        &FormTemplate::new(form, &state.params, Some(message)),
    )
}

fn json_error(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse { error: message }),
    )
        .into_response()
}

fn render_html(status: StatusCode, template: &impl Template) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "template render error");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn result_rows(result: &SimulationResult) -> Vec<ResultRow> {
    result
        .named_values()
        .into_iter()
        .filter_map(|(key, value)| {
            let (label, unit) = label_for(key)?;
            Some(ResultRow {
                label,
                value: format_value(value, unit),
            })
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Unit {
    Kwh,
    Eur,
    Percent,
}

fn label_for(key: &str) -> Option<(&'static str, Unit)> {
    let entry = match key {
        "produzione_base" => ("Produzione impianto base", Unit::Kwh),
        "produzione_bonus_teorica" => ("Produzione potenziata teorica", Unit::Kwh),
        "percentuale_clipping" => ("Perdita per clipping", Unit::Percent),
        "produzione_bonus" => ("Produzione potenziata", Unit::Kwh),
        "copertura_bonus" => ("Copertura impianto potenziato", Unit::Percent),
        "autoconsumo_base" => ("Autoconsumo base", Unit::Kwh),
        "autoconsumo_bonus" => ("Autoconsumo potenziato", Unit::Kwh),
        "delta_autoconsumo" => ("Autoconsumo aggiuntivo", Unit::Kwh),
        "energia_immessa" => ("Energia immessa in rete", Unit::Kwh),
        "vantaggio_extra_autoconsumo" => ("Extra autoconsumo (Upgrade)", Unit::Eur),
        "rid_annuo" => ("RID energia immessa", Unit::Eur),
        "cer_prudente" => ("CER prudente", Unit::Eur),
        "totale_benefici_annui" => ("Totale benefici Upgrade + CER", Unit::Eur),
        "detrazione_totale" => ("Detrazione fiscale totale", Unit::Eur),
        "detrazione_annua" => ("Detrazione fiscale annua", Unit::Eur),
        "beneficio_annuale_totale" => ("Beneficio annuale totale", Unit::Eur),
        "risparmio_bolletta" => ("Risparmio bolletta annuo", Unit::Eur),
        "risparmio_complessivo_annuo" => ("Risparmio complessivo annuo", Unit::Eur),
        "beneficio_10_anni" => ("Beneficio totale 10 anni", Unit::Eur),
        "beneficio_20_anni" => ("Beneficio totale 20 anni", Unit::Eur),
        "risparmio_bolletta_10" => ("Risparmio bolletta 10 anni", Unit::Eur),
        "risparmio_bolletta_20" => ("Risparmio bolletta 20 anni", Unit::Eur),
        "risparmio_complessivo_10" => ("Risparmio complessivo 10 anni", Unit::Eur),
        "risparmio_complessivo_20" => ("Risparmio complessivo 20 anni", Unit::Eur),
        // Shown in dedicated rows.
        _ => return None,
    };
    Some(entry)
}

fn format_value(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Kwh => format!("{value:.0} kWh"),
        Unit::Eur => format!("€ {}", crate::report::format_eur(value)),
        Unit::Percent => format!("{:.1}%", value * 100.0),
    }
}
