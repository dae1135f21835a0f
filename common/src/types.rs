use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Which side of the comparison a profile sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reference,
    Competitor,
}

/// A named simulated price source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub name: String,
    pub role: Role,
    pub base_price: f64,
    #[serde(default)]
    pub volatility_factor: f64,
    #[serde(default = "default_price_level")]
    pub price_level_multiplier: f64,
}

fn default_price_level() -> f64 {
    1.0
}

impl PlatformProfile {
    /// Reference platform quoting from its own anchor price
    pub fn reference(name: &str, anchor: f64) -> Self {
        Self {
            name: name.to_string(),
            role: Role::Reference,
            base_price: anchor,
            volatility_factor: 0.0,
            price_level_multiplier: 1.0,
        }
    }

    pub fn competitor(name: &str, base_price: f64, volatility: f64, price_level: f64) -> Self {
        Self {
            name: name.to_string(),
            role: Role::Competitor,
            base_price,
            volatility_factor: volatility,
            price_level_multiplier: price_level,
        }
    }

    /// Reject profiles the generator cannot price
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SimulationError::invalid_profile(&self.name, "name must not be empty"));
        }
        if !self.base_price.is_finite() || self.base_price <= 0.0 {
            return Err(SimulationError::invalid_profile(
                &self.name,
                format!("base price must be positive, got {}", self.base_price),
            ));
        }
        if !self.volatility_factor.is_finite() || self.volatility_factor < 0.0 {
            return Err(SimulationError::invalid_profile(
                &self.name,
                format!(
                    "volatility factor must be non-negative, got {}",
                    self.volatility_factor
                ),
            ));
        }
        if !self.price_level_multiplier.is_finite() || self.price_level_multiplier <= 0.0 {
            return Err(SimulationError::invalid_profile(
                &self.name,
                format!(
                    "price level multiplier must be positive, got {}",
                    self.price_level_multiplier
                ),
            ));
        }
        Ok(())
    }
}

/// Inclusive calendar window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(SimulationError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of calendar days covered, both ends included
    pub fn num_days(&self) -> Result<usize> {
        self.validate()?;
        Ok((self.end - self.start).num_days() as usize + 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One sampled day for one profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub mean_price: i64,
    pub low_price: i64,
    pub high_price: i64,
    /// Seasonal multiplier that priced this day
    pub seasonal_factor: f64,
}

impl PricePoint {
    pub fn spread(&self) -> i64 {
        self.high_price.saturating_sub(self.low_price)
    }
}

/// Daily price points of one profile over one date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub name: String,
    pub role: Role,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn mean_prices(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.mean_price).collect()
    }

    pub fn point_on(&self, date: NaiveDate) -> Option<&PricePoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| &self.points[idx])
    }

    /// Average of `high - low` over the series
    pub fn average_spread(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        let total: f64 = self.points.iter().map(|p| p.spread() as f64).sum();
        total / self.points.len() as f64
    }
}

/// One reference series plus any number of competitor series over a shared range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRun {
    range: DateRange,
    reference: PriceSeries,
    competitors: Vec<PriceSeries>,
}

impl ComparisonRun {
    pub fn new(range: DateRange, reference: PriceSeries, competitors: Vec<PriceSeries>) -> Self {
        Self {
            range,
            reference,
            competitors,
        }
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn reference(&self) -> &PriceSeries {
        &self.reference
    }

    pub fn competitors(&self) -> &[PriceSeries] {
        &self.competitors
    }

    /// Reference first, then competitors in run order
    pub fn all_series(&self) -> impl Iterator<Item = &PriceSeries> {
        std::iter::once(&self.reference).chain(self.competitors.iter())
    }

    pub fn series(&self, name: &str) -> Option<&PriceSeries> {
        self.all_series().find(|s| s.name == name)
    }

    pub fn by_name(&self) -> BTreeMap<&str, &PriceSeries> {
        self.all_series().map(|s| (s.name.as_str(), s)).collect()
    }

    /// Series names ordered from narrowest to widest average band
    pub fn spread_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .all_series()
            .map(|s| (s.name.as_str(), s.average_spread()))
            .collect();
        ranking.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranking
    }
}
