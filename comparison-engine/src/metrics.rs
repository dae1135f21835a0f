use common::PriceSeries;
use serde::{Deserialize, Serialize};

use crate::band::bandwidth;

/// How stable a generated series looks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub average_spread: f64,
    pub max_spread: i64,
    /// Average of `(high - low) / mean`
    pub average_bandwidth: f64,
    pub min_price: i64,
    pub max_price: i64,
    /// Highest published price over the median published price, in percent
    pub peak_surge_pct: f64,
    /// Standard deviation of day-over-day price changes, in percent
    pub daily_change_volatility: f64,
}

pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn calculate(series: &PriceSeries) -> StabilityMetrics {
        if series.is_empty() {
            return StabilityMetrics::default();
        }

        let prices = series.mean_prices();
        let min_price = prices.iter().copied().min().unwrap_or(0);
        let max_price = prices.iter().copied().max().unwrap_or(0);
        let max_spread = series.points.iter().map(|p| p.spread()).max().unwrap_or(0);

        let average_bandwidth = series
            .points
            .iter()
            .map(|p| bandwidth(p.high_price as f64, p.mean_price as f64, p.low_price as f64))
            .sum::<f64>()
            / series.len() as f64;

        // Surge relative to a typical day
        let median = Self::median(&prices);
        let peak_surge_pct = if median > 0.0 {
            (max_price as f64 / median - 1.0) * 100.0
        } else {
            0.0
        };

        let changes = Self::calculate_daily_changes(&prices);

        StabilityMetrics {
            average_spread: series.average_spread(),
            max_spread,
            average_bandwidth,
            min_price,
            max_price,
            peak_surge_pct,
            daily_change_volatility: Self::std_dev(&changes) * 100.0,
        }
    }

    /// Relative change between consecutive prices
    fn calculate_daily_changes(prices: &[i64]) -> Vec<f64> {
        prices
            .windows(2)
            .filter(|w| w[0] != 0)
            .map(|w| (w[1] as f64 - w[0] as f64) / w[0] as f64)
            .collect()
    }

    fn std_dev(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / (values.len() - 1) as f64;
        variance.sqrt()
    }

    fn median(prices: &[i64]) -> f64 {
        if prices.is_empty() {
            return 0.0;
        }
        let mut sorted = prices.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        }
    }
}
