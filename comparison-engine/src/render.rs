//! Chart-ready payloads for the rendering layer
//!
//! Nothing here draws anything. A [`ComparisonChart`] is plain data: one
//! [`ProfileChart`] per profile with its band, tooltips, colours and
//! annotations, keyed by profile name.

use chrono::NaiveDate;
use common::{ComparisonRun, PriceSeries, Result, Role, SimulationError, SimulationParameters};
use serde::{Deserialize, Serialize};

use crate::band::{compose_band, VolatilityBand};
use crate::metrics::{MetricsCalculator, StabilityMetrics};
use crate::seasonal::SeasonalFactorPolicy;
use crate::tooltip::{TooltipComposer, TooltipRecord};

const FALLBACK_COLOR: &str = "#555555";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAnnotation {
    pub date: NaiveDate,
    pub price: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileChart {
    pub name: String,
    pub role: Role,
    pub title: String,
    pub line_color: String,
    pub fill_color: String,
    pub band: VolatilityBand,
    pub tooltips: Vec<TooltipRecord>,
    pub metrics: StabilityMetrics,
    pub annotations: Vec<ChartAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonChart {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Reference first, then competitors in run order
    pub charts: Vec<ProfileChart>,
}

impl ComparisonChart {
    pub fn build(run: &ComparisonRun, params: &SimulationParameters) -> Result<Self> {
        let tooltips = TooltipComposer::new(params.tooltips.clone());
        let seasonal = SeasonalFactorPolicy::new(params.seasonal.clone(), params.roles.clone());

        let charts = run
            .all_series()
            .map(|series| build_profile_chart(series, params, &tooltips, &seasonal))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            start: run.range().start,
            end: run.range().end,
            charts,
        })
    }

    pub fn chart(&self, name: &str) -> Option<&ProfileChart> {
        self.charts.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

fn build_profile_chart(
    series: &PriceSeries,
    params: &SimulationParameters,
    tooltips: &TooltipComposer,
    seasonal: &SeasonalFactorPolicy,
) -> Result<ProfileChart> {
    let line_color = params
        .profile(&series.name)
        .map(|p| p.color.clone())
        .unwrap_or_else(|| FALLBACK_COLOR.to_string());

    let (opacity, title) = match series.role {
        Role::Reference => (
            params.reference_fill_opacity,
            format!("{}: Stability guaranteed", series.name),
        ),
        Role::Competitor => (params.competitor_fill_opacity, series.name.clone()),
    };

    let annotations = match (series.role, &params.holiday_annotation) {
        (Role::Reference, Some(text)) => holiday_annotation(series, seasonal, text),
        _ => Vec::new(),
    };

    Ok(ProfileChart {
        name: series.name.clone(),
        role: series.role,
        title,
        fill_color: hex_to_rgba(&line_color, opacity)?,
        line_color,
        band: compose_band(series),
        tooltips: tooltips.compose(series),
        metrics: MetricsCalculator::calculate(series),
        annotations,
    })
}

/// Pin `text` on the first holiday-window point of the series
fn holiday_annotation(
    series: &PriceSeries,
    seasonal: &SeasonalFactorPolicy,
    text: &str,
) -> Vec<ChartAnnotation> {
    let (Some(first), Some(last)) = (series.points.first(), series.points.last()) else {
        return Vec::new();
    };
    seasonal
        .first_holiday_between(first.date, last.date)
        .and_then(|date| series.point_on(date))
        .map(|p| ChartAnnotation {
            date: p.date,
            price: p.mean_price,
            text: text.to_string(),
        })
        .into_iter()
        .collect()
}

/// `#0A3069`, 0.15 -> `rgba(10, 48, 105, 0.15)`
pub fn hex_to_rgba(hex: &str, opacity: f64) -> Result<String> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(SimulationError::InvalidParameter(format!(
            "colour must be #RRGGBB, got {}",
            hex
        )));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| {
            SimulationError::InvalidParameter(format!("colour must be #RRGGBB, got {}", hex))
        })
    };
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    Ok(format!("rgba({}, {}, {}, {})", r, g, b, opacity))
}
