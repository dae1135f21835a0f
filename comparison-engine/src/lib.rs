pub mod band;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod render;
pub mod seasonal;
pub mod tooltip;

pub use band::{compose_band, VolatilityBand};
pub use data::{
    walk, DailyQuote, DateRangeWalker, FixedNoise, NoiseSource, PriceSeriesGenerator, RngNoise,
    SeededNoise,
};
pub use engine::ComparisonEngine;
pub use metrics::{MetricsCalculator, StabilityMetrics};
pub use render::{hex_to_rgba, ChartAnnotation, ComparisonChart, ProfileChart};
pub use seasonal::{SeasonalFactorPolicy, Surge};
pub use tooltip::{format_currency, TooltipComposer, TooltipRecord};

// Re-export common types
pub use common::{
    ComparisonRun, DateRange, PlatformProfile, PricePoint, PriceSeries, Result, Role,
    SimulationError, SimulationParameters,
};
