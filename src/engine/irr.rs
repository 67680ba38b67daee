//! Internal rate of return via Newton-Raphson.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use super::types::IrrSettings;

/// Outcome of the IRR root-finder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "rate", rename_all = "snake_case")]
pub enum IrrOutcome {
    /// The update fell below tolerance; the rate is trustworthy.
    Converged(f64),
    /// The iteration cap was hit; the last estimate is numerically unstable.
    DidNotConverge(f64),
    /// The NPV derivative vanished or the estimate left the finite range.
    Unsolvable,
}

impl IrrOutcome {
    /// Rate as a fraction, for either numeric variant.
    pub fn rate(self) -> Option<f64> {
        match self {
            Self::Converged(r) | Self::DidNotConverge(r) => Some(r),
            Self::Unsolvable => None,
        }
    }

    /// Rate as a fraction, only when converged.
    pub fn converged_rate(self) -> Option<f64> {
        match self {
            Self::Converged(r) => Some(r),
            Self::DidNotConverge(_) | Self::Unsolvable => None,
        }
    }
}

impl fmt::Display for IrrOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converged(r) => write!(f, "{:.2}%", r * 100.0),
            Self::DidNotConverge(r) => write!(f, "{:.2}% (not converged)", r * 100.0),
            Self::Unsolvable => f.write_str("n/a"),
        }
    }
}

/// Net present value of `flows` at `rate`; `flows[t]` is discounted by `(1+rate)^t`.
pub fn npv(flows: &[f64], rate: f64) -> f64 {
    let base = 1.0 + rate;
    flows
        .iter()
        .zip(0_i32..)
        .map(|(cf, t)| cf / base.powi(t))
        .sum()
}

/// Derivative of [`npv`] with respect to the rate.
pub fn npv_derivative(flows: &[f64], rate: f64) -> f64 {
    let base = 1.0 + rate;
    flows
        .iter()
        .zip(0_i32..)
        .skip(1)
        .map(|(cf, t)| -f64::from(t) * cf / base.powi(t + 1))
        .sum()
}

/// Solves `npv(flows, r) = 0` by Newton-Raphson starting from `settings.guess`.
///
/// # Examples
///
/// ```
/// use solar_upgrade::engine::irr::{IrrOutcome, solve_irr};
/// use solar_upgrade::engine::types::IrrSettings;
///
/// let outcome = solve_irr(&[-100.0, 110.0], &IrrSettings::default());
/// let rate = outcome.converged_rate().unwrap();
/// assert!((rate - 0.10).abs() < 1e-6);
/// ```
pub fn solve_irr(flows: &[f64], settings: &IrrSettings) -> IrrOutcome {
    let mut rate = settings.guess;

    for iteration in 0..settings.max_iterations {
        let value = npv(flows, rate);
        let slope = npv_derivative(flows, rate);
        if slope == 0.0 || !slope.is_finite() || !value.is_finite() {
            warn!(iteration, rate, "IRR derivative vanished, stream is unsolvable");
            return IrrOutcome::Unsolvable;
        }

        let next = rate - value / slope;
        if !next.is_finite() {
            warn!(iteration, "IRR estimate diverged");
            return IrrOutcome::Unsolvable;
        }
        if (next - rate).abs() < settings.tolerance {
            debug!(iterations = iteration + 1, rate = next, "IRR converged");
            return IrrOutcome::Converged(next);
        }
        rate = next;
    }

    warn!(
        max_iterations = settings.max_iterations,
        rate, "IRR did not converge"
    );
    IrrOutcome::DidNotConverge(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npv_at_zero_rate_is_plain_sum() {
        assert_eq!(npv(&[-100.0, 60.0, 60.0], 0.0), 20.0);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let flows = [-1000.0, 300.0, 400.0, 500.0];
        let h = 1e-6;
        let numeric = (npv(&flows, 0.1 + h) - npv(&flows, 0.1 - h)) / (2.0 * h);
        assert!((npv_derivative(&flows, 0.1) - numeric).abs() < 1e-3);
    }

    #[test]
    fn two_period_stream_converges_to_exact_rate() {
        let outcome = solve_irr(&[-1000.0, 1200.0], &IrrSettings::default());
        let rate = outcome.converged_rate();
        assert!(rate.is_some());
        assert!((rate.unwrap_or(0.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn annuity_root_has_zero_npv() {
        let mut flows = vec![-10_000.0];
        flows.extend(std::iter::repeat_n(1_500.0, 10));
        let outcome = solve_irr(&flows, &IrrSettings::default());
        let rate = outcome.converged_rate().unwrap_or(f64::NAN);
        assert!(npv(&flows, rate).abs() < 1e-3);
    }

    #[test]
    fn all_zero_stream_is_unsolvable() {
        let outcome = solve_irr(&[0.0; 11], &IrrSettings::default());
        assert_eq!(outcome, IrrOutcome::Unsolvable);
        assert_eq!(outcome.rate(), None);
    }

    #[test]
    fn iteration_cap_reports_non_convergence() {
        let settings = IrrSettings {
            max_iterations: 1,
            ..IrrSettings::default()
        };
        let outcome = solve_irr(&[-1000.0, 300.0, 400.0, 500.0], &settings);
        assert!(matches!(outcome, IrrOutcome::DidNotConverge(_)));
        assert!(outcome.rate().is_some());
        assert_eq!(outcome.converged_rate(), None);
    }

    #[test]
    fn display_formats_percent() {
        assert_eq!(IrrOutcome::Converged(0.1234).to_string(), "12.34%");
        assert_eq!(IrrOutcome::Unsolvable.to_string(), "n/a");
    }
}
