//! End-to-end checks of the default form state against known-good figures.

mod common;

use solar_upgrade::engine::IrrOutcome;
use solar_upgrade::engine::types::SimulationInput;

use common::{assert_close, compute, default_input, simulate};

const TOL: f64 = 1e-6;

#[test]
fn default_state_energy_figures() {
    let r = compute(&default_input());

    assert_close("produzione_base", r.base_production_kwh, 7872.0, TOL);
    assert_close("produzione_bonus_teorica", r.upgraded_theoretical_kwh, 10824.0, TOL);
    assert_close("percentuale_clipping", r.clip_fraction, 0.029, 1e-12);
    assert_close("produzione_bonus", r.upgraded_production_kwh, 10510.104, TOL);
    assert_close("copertura_bonus", r.upgraded_coverage_fraction, 0.88, 1e-12);
    assert_close("autoconsumo_base", r.base_self_consumed_kwh, 4320.0, TOL);
    assert_close("autoconsumo_bonus", r.upgraded_self_consumed_kwh, 4752.0, TOL);
    assert_close("delta_autoconsumo", r.incremental_self_consumed_kwh, 432.0, TOL);
    assert_close("energia_immessa", r.exported_kwh, 5758.104, TOL);
}

#[test]
fn default_state_annual_figures() {
    let r = compute(&default_input());

    assert_close("vantaggio_extra_autoconsumo", r.incremental_value_eur, 129.6, TOL);
    assert_close("rid_annuo", r.feed_in_revenue_eur, 788.860248, TOL);
    assert_close("cer_prudente", r.community_revenue_eur, 172.74312, TOL);
    assert_close("totale_benefici_annui", r.annual_incentive_eur, 1091.203368, TOL);
    assert_close("detrazione_totale", r.total_deduction_eur, 6780.0, TOL);
    assert_close("detrazione_annua", r.annual_deduction_eur, 678.0, TOL);
    assert_close("beneficio_annuale_totale", r.annual_benefit_eur, 1769.203368, TOL);
    assert_close("risparmio_bolletta", r.bill_savings_eur, 1296.0, TOL);
    assert_close("risparmio_complessivo_annuo", r.annual_total_savings_eur, 3065.203368, TOL);
}

#[test]
fn default_state_horizons() {
    let r = compute(&default_input());

    assert_close("beneficio_10_anni", r.benefit_10y_eur, 17692.03368, TOL);
    assert_close("beneficio_20_anni", r.benefit_20y_eur, 28604.06736, TOL);
    assert_close("risparmio_complessivo_10", r.total_savings_10y_eur, 30652.03368, TOL);
    assert_close("risparmio_complessivo_20", r.total_savings_20y_eur, 54524.06736, TOL);
    assert_eq!(r.payback_year, Some(5));
}

#[test]
fn default_state_irr() {
    let r = compute(&default_input());
    let rate = match r.irr_10y {
        IrrOutcome::Converged(rate) => rate,
        other => panic!("expected a converged IRR, got {other:?}"),
    };
    assert_close("irr_10", rate, 0.184455, 1e-5);
    assert_close("irr_10 percent", r.get("irr_10").unwrap_or(f64::NAN), 18.4455, 1e-3);
}

#[test]
fn flat_price_horizons_are_multiples_of_annual() {
    let r = compute(&default_input());
    assert_close("b10", r.benefit_10y_eur, 10.0 * r.annual_benefit_eur, 1e-6);
    assert_close(
        "b20",
        r.benefit_20y_eur,
        20.0 * r.annual_incentive_eur + 10.0 * r.annual_deduction_eur,
        1e-6,
    );
}

#[test]
fn escalation_grows_only_price_linked_terms() {
    let flat = compute(&default_input());
    let rising = compute(&SimulationInput {
        annual_price_escalation: 0.02,
        ..default_input()
    });

    assert_close("b20 escalated", rising.benefit_20y_eur, 29161.0065, 1e-3);
    assert!(rising.bill_savings_20y_eur > flat.bill_savings_20y_eur);
    assert_eq!(rising.feed_in_revenue_eur, flat.feed_in_revenue_eur);
    assert_eq!(rising.community_revenue_eur, flat.community_revenue_eur);
    let rate = rising.irr_10y.converged_rate().unwrap_or(f64::NAN);
    assert_close("irr escalated", rate, 0.19302, 1e-4);
}

#[test]
fn upgraded_minus_incremental_equals_base() {
    for cons in [2000.0, 5400.0, 8000.0, 12000.0] {
        let r = compute(&SimulationInput {
            annual_consumption_kwh: cons,
            ..default_input()
        });
        if r.upgraded_self_consumed_kwh >= r.base_self_consumed_kwh {
            assert_close(
                "identity",
                r.upgraded_self_consumed_kwh - r.incremental_self_consumed_kwh,
                r.base_self_consumed_kwh,
                1e-9,
            );
        }
    }
}

#[test]
fn outputs_respect_invariants_across_inputs() {
    for (cons, cost, esc) in [
        (3000.0, 8000.0, 0.0),
        (5400.0, 13560.0, 0.01),
        (9500.0, 20000.0, 0.03),
        (15000.0, 0.0, 0.05),
    ] {
        let input = SimulationInput {
            annual_consumption_kwh: cons,
            install_cost_eur: cost,
            annual_price_escalation: esc,
            ..default_input()
        };
        let r = compute(&input);

        assert!(r.incremental_self_consumed_kwh >= 0.0);
        assert!(r.exported_kwh >= 0.0);
        assert!(r.base_self_consumed_kwh <= r.base_production_kwh + 1e-9);
        assert!(r.upgraded_self_consumed_kwh <= r.upgraded_production_kwh + 1e-9);
        assert!(r.upgraded_production_kwh <= r.upgraded_theoretical_kwh);
        assert!(r.benefit_20y_eur >= r.benefit_10y_eur);
        assert_close(
            "energy balance",
            r.upgraded_self_consumed_kwh + r.exported_kwh,
            r.upgraded_production_kwh,
            1e-6,
        );
    }
}

#[test]
fn identical_inputs_give_identical_results() {
    let input = default_input();
    assert_eq!(compute(&input), compute(&input));
}

#[test]
fn projection_backs_the_horizons() {
    let sim = simulate(&default_input());
    assert_eq!(sim.projection.len(), 20);
    let b10: f64 = sim.projection[..10].iter().map(|y| y.benefit_eur).sum();
    assert_close("b10 from projection", b10, sim.result.benefit_10y_eur, 1e-9);
    assert!(sim.projection[10..].iter().all(|y| y.deduction_eur == 0.0));
}

#[test]
fn large_consumer_skips_clipping() {
    let r = compute(&SimulationInput {
        annual_consumption_kwh: 9500.0,
        upgraded_capacity_kwp: 9.84,
        install_cost_eur: 15000.0,
        ..default_input()
    });
    assert_eq!(r.clip_fraction, 0.0);
    assert_eq!(r.upgraded_production_kwh, r.upgraded_theoretical_kwh);
    assert_close("copertura_bonus", r.upgraded_coverage_fraction, 0.91, 1e-12);
    assert_close("beneficio_20_anni", r.benefit_20y_eur, 24334.42, 1e-6);
}

#[test]
fn named_values_cover_every_key() {
    let r = compute(&default_input());
    let keys: Vec<&str> = r.named_values().into_iter().map(|(k, _)| k).collect();
    for key in [
        "produzione_base",
        "produzione_bonus",
        "autoconsumo_base",
        "autoconsumo_bonus",
        "delta_autoconsumo",
        "energia_immessa",
        "vantaggio_extra_autoconsumo",
        "rid_annuo",
        "cer_prudente",
        "totale_benefici_annui",
        "detrazione_annua",
        "beneficio_annuale_totale",
        "beneficio_10_anni",
        "beneficio_20_anni",
        "risparmio_bolletta",
        "risparmio_complessivo_annuo",
        "risparmio_complessivo_10",
        "risparmio_complessivo_20",
        "anno_rientro",
        "irr_10",
    ] {
        assert!(keys.contains(&key), "missing key {key}");
    }
}
