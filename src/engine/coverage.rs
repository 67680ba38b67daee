//! Coverage estimator: share of consumption an installation can self-supply.
//!
//! Both policies depend on installed capacity only and clamp at the edges of
//! their tables, so results always stay within the tabulated coverage range.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Selects how an absent upgraded coverage is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// Two capacity bands, each interpolating from 80% to 85%.
    TwoTier,
    /// Piecewise-linear over four fixed capacity points.
    #[default]
    FourPoint,
}

impl CoveragePolicy {
    /// Coverage fraction for `capacity_kwp` under this policy.
    pub fn coverage(self, capacity_kwp: f64) -> f64 {
        match self {
            Self::TwoTier => coverage_from_capacity(capacity_kwp),
            Self::FourPoint => bonus_coverage_from_capacity(capacity_kwp),
        }
    }
}

impl fmt::Display for CoveragePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoTier => f.write_str("two_tier"),
            Self::FourPoint => f.write_str("four_point"),
        }
    }
}

/// A capacity band `[floor_kwp, ceiling_kwp]` of the two-tier policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageBand {
    pub floor_kwp: f64,
    pub ceiling_kwp: f64,
}

/// Coverage at or below a band floor.
pub const BAND_FLOOR_COVERAGE: f64 = 0.80;
/// Coverage at or above a band ceiling.
pub const BAND_CEILING_COVERAGE: f64 = 0.85;

/// Capacities up to this value use the small band.
pub const SMALL_BAND_LIMIT_KWP: f64 = 5.74;

pub const SMALL_BAND: CoverageBand = CoverageBand {
    floor_kwp: 3.28,
    ceiling_kwp: 5.74,
};

pub const LARGE_BAND: CoverageBand = CoverageBand {
    floor_kwp: 6.56,
    ceiling_kwp: 9.84,
};

/// `(capacity_kwp, coverage)` points of the four-point policy, ordered by capacity.
pub const BONUS_COVERAGE_POINTS: [(f64, f64); 4] =
    [(6.56, 0.80), (7.38, 0.83), (9.02, 0.88), (9.84, 0.91)];

/// Two-tier linear coverage.
///
/// # Examples
///
/// ```
/// use solar_upgrade::engine::coverage::coverage_from_capacity;
///
/// assert_eq!(coverage_from_capacity(5.74), 0.85);
/// assert_eq!(coverage_from_capacity(6.56), 0.80);
/// ```
pub fn coverage_from_capacity(capacity_kwp: f64) -> f64 {
    let band = if capacity_kwp <= SMALL_BAND_LIMIT_KWP {
        SMALL_BAND
    } else {
        LARGE_BAND
    };

    if capacity_kwp <= band.floor_kwp {
        return BAND_FLOOR_COVERAGE;
    }
    if capacity_kwp >= band.ceiling_kwp {
        return BAND_CEILING_COVERAGE;
    }

    let position = (capacity_kwp - band.floor_kwp) / (band.ceiling_kwp - band.floor_kwp);
    BAND_FLOOR_COVERAGE + position * (BAND_CEILING_COVERAGE - BAND_FLOOR_COVERAGE)
}

/// Four-point piecewise-linear coverage, clamped outside `[6.56, 9.84]`.
pub fn bonus_coverage_from_capacity(capacity_kwp: f64) -> f64 {
    interpolate_clamped(&BONUS_COVERAGE_POINTS, capacity_kwp)
}

/// Linear interpolation over ordered `(x, y)` points, clamping to the end values.
fn interpolate_clamped(points: &[(f64, f64)], x: f64) -> f64 {
    let (Some(&(x_first, y_first)), Some(&(x_last, y_last))) = (points.first(), points.last())
    else {
        return 0.0;
    };
    if x <= x_first {
        return y_first;
    }
    if x >= x_last {
        return y_last;
    }

    points
        .windows(2)
        .find_map(|pair| {
            let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
            (x >= x0 && x <= x1).then(|| y0 + (x - x0) / (x1 - x0) * (y1 - y0))
        })
        .unwrap_or(y_last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_tier_band_edges() {
        assert_eq!(coverage_from_capacity(5.74), 0.85);
        assert_eq!(coverage_from_capacity(6.56), 0.80);
        assert_eq!(coverage_from_capacity(3.28), 0.80);
        assert_eq!(coverage_from_capacity(9.84), 0.85);
    }

    #[test]
    fn two_tier_interpolates_inside_band() {
        // 8.20 sits exactly halfway through [6.56, 9.84]
        let c = coverage_from_capacity(8.20);
        assert!((c - 0.825).abs() < 1e-12);
    }

    #[test]
    fn two_tier_gap_between_bands_uses_large_band_floor() {
        assert_eq!(coverage_from_capacity(6.0), 0.80);
    }

    #[test]
    fn two_tier_clamps_absurd_sizes() {
        assert_eq!(coverage_from_capacity(0.1), 0.80);
        assert_eq!(coverage_from_capacity(500.0), 0.85);
    }

    #[test]
    fn four_point_hits_table_points() {
        for (kwp, coverage) in BONUS_COVERAGE_POINTS {
            assert!((bonus_coverage_from_capacity(kwp) - coverage).abs() < 1e-12);
        }
    }

    #[test]
    fn four_point_interpolates_between_middle_points() {
        let expected = 0.83 + (8.20 - 7.38) / (9.02 - 7.38) * (0.88 - 0.83);
        assert!((bonus_coverage_from_capacity(8.20) - expected).abs() < 1e-12);
    }

    #[test]
    fn four_point_clamps_outside_domain() {
        assert_eq!(bonus_coverage_from_capacity(3.0), 0.80);
        assert_eq!(bonus_coverage_from_capacity(20.0), 0.91);
    }

    #[test]
    fn policy_dispatch() {
        assert_eq!(CoveragePolicy::default(), CoveragePolicy::FourPoint);
        assert_eq!(
            CoveragePolicy::TwoTier.coverage(5.74),
            coverage_from_capacity(5.74)
        );
        assert!((CoveragePolicy::FourPoint.coverage(9.02) - 0.88).abs() < 1e-12);
    }
}
