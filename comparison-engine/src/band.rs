use chrono::NaiveDate;
use common::PriceSeries;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Filled band plus price line, parallel to a shared date axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityBand {
    pub dates: Vec<NaiveDate>,
    pub lower: Vec<i64>,
    pub upper: Vec<i64>,
    pub line: Vec<i64>,
    /// Points whose raw band had to be corrected
    pub corrected: usize,
}

impl VolatilityBand {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Turn a generated series into a renderable band.
///
/// Guarantees `lower[i] <= line[i] <= upper[i]`. Inverted bounds are swapped,
/// and a published price outside its band widens the band to reach it; the
/// line itself is never moved.
pub fn compose_band(series: &PriceSeries) -> VolatilityBand {
    let n = series.len();
    let mut band = VolatilityBand {
        dates: Vec::with_capacity(n),
        lower: Vec::with_capacity(n),
        upper: Vec::with_capacity(n),
        line: Vec::with_capacity(n),
        corrected: 0,
    };

    for point in &series.points {
        let (lower, upper, fixed) = clamp_bounds(point.low_price, point.mean_price, point.high_price);
        if fixed {
            band.corrected += 1;
        }
        band.dates.push(point.date);
        band.lower.push(lower);
        band.upper.push(upper);
        band.line.push(point.mean_price);
    }

    if band.corrected > 0 {
        warn!(
            profile = %series.name,
            corrected = band.corrected,
            "corrected inconsistent price band"
        );
    }

    band
}

/// Returns `(lower, upper, corrected)` with `lower <= line <= upper`
pub fn clamp_bounds(low: i64, line: i64, high: i64) -> (i64, i64, bool) {
    let (lower, upper) = if low <= high { (low, high) } else { (high, low) };
    let lower_fixed = lower.min(line);
    let upper_fixed = upper.max(line);
    let corrected = low > high || lower_fixed != lower || upper_fixed != upper;
    (lower_fixed, upper_fixed, corrected)
}

/// Band width relative to the price line
pub fn bandwidth(upper: f64, middle: f64, lower: f64) -> f64 {
    if middle == 0.0 {
        return 0.0;
    }
    (upper - lower) / middle
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::{PricePoint, Role};
    use proptest::prelude::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn series(points: &[(i64, i64, i64)]) -> PriceSeries {
        PriceSeries {
            name: "TEST".to_string(),
            role: Role::Competitor,
            points: points
                .iter()
                .enumerate()
                .map(|(i, &(low, mean, high))| PricePoint {
                    date: date(10) + Duration::days(i as i64),
                    mean_price: mean,
                    low_price: low,
                    high_price: high,
                    seasonal_factor: 1.0,
                })
                .collect(),
        }
    }

    #[test]
    fn test_consistent_series_passes_through() {
        let band = compose_band(&series(&[(90, 100, 110), (80, 95, 120)]));

        assert_eq!(band.len(), 2);
        assert_eq!(band.dates, vec![date(10), date(11)]);
        assert_eq!(band.lower, vec![90, 80]);
        assert_eq!(band.upper, vec![110, 120]);
        assert_eq!(band.line, vec![100, 95]);
        assert_eq!(band.corrected, 0);
    }

    #[test]
    fn test_inverted_bounds_are_swapped() {
        let band = compose_band(&series(&[(110, 100, 90)]));
        assert_eq!(band.lower, vec![90]);
        assert_eq!(band.upper, vec![110]);
        assert_eq!(band.corrected, 1);
    }

    #[test]
    fn test_line_outside_band_widens_band() {
        let band = compose_band(&series(&[(90, 130, 110), (90, 70, 110)]));
        assert_eq!(band.line, vec![130, 70]);
        assert_eq!(band.lower, vec![90, 70]);
        assert_eq!(band.upper, vec![130, 110]);
        assert_eq!(band.corrected, 2);
    }

    #[test]
    fn test_empty_series() {
        let band = compose_band(&series(&[]));
        assert!(band.is_empty());
    }

    #[test]
    fn test_bandwidth() {
        assert_eq!(bandwidth(110.0, 100.0, 90.0), 0.2);
        assert_eq!(bandwidth(10.0, 0.0, -10.0), 0.0);
    }

    proptest! {
        #[test]
        fn composed_band_always_contains_line(
            raw in prop::collection::vec((-50_000i64..100_000, -50_000i64..100_000, -50_000i64..100_000), 0..60)
        ) {
            let band = compose_band(&series(&raw));
            prop_assert_eq!(band.len(), raw.len());
            for i in 0..band.len() {
                prop_assert!(band.lower[i] <= band.line[i]);
                prop_assert!(band.line[i] <= band.upper[i]);
                prop_assert_eq!(band.line[i], raw[i].1);
            }
        }
    }
}
