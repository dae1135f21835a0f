use chrono::NaiveDate;
use common::{
    BandModel, DateRange, PlatformProfile, PricePoint, PriceSeries, Result, RoleTable,
    SeasonalParameters, SimulationParameters,
};
use tracing::debug;

use super::calendar::DateRangeWalker;
use super::noise::NoiseSource;
use crate::seasonal::SeasonalFactorPolicy;

/// Deterministic part of a day's price, before any noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyQuote {
    pub factor: f64,
    pub mean_price: i64,
    pub gap: i64,
}

/// Generates synthetic daily price series for platform profiles
#[derive(Debug, Clone, Default)]
pub struct PriceSeriesGenerator {
    seasonal: SeasonalFactorPolicy,
    roles: RoleTable,
}

impl PriceSeriesGenerator {
    pub fn new(calendar: SeasonalParameters, roles: RoleTable) -> Self {
        Self {
            seasonal: SeasonalFactorPolicy::new(calendar, roles.clone()),
            roles,
        }
    }

    pub fn from_params(params: &SimulationParameters) -> Self {
        Self::new(params.seasonal.clone(), params.roles.clone())
    }

    pub fn seasonal(&self) -> &SeasonalFactorPolicy {
        &self.seasonal
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    /// Seasonal mean and band half-width for one day
    pub fn quote(&self, profile: &PlatformProfile, date: NaiveDate) -> DailyQuote {
        let policy = self.roles.for_role(profile.role);

        // Reference quotes from its own anchor, competitors from the market level
        let anchor = if policy.apply_price_level {
            profile.base_price * profile.price_level_multiplier
        } else {
            profile.base_price
        };
        let factor = self.seasonal.factor(date, profile.role);
        let mean_price = round_price(anchor * factor);
        let gap = match policy.band {
            BandModel::Proportional => round_price(mean_price as f64 * profile.volatility_factor),
            BandModel::Fixed { gap } => gap,
        };

        DailyQuote {
            factor,
            mean_price,
            gap,
        }
    }

    /// Generate one point per day of `range`.
    ///
    /// Each day takes exactly one noise draw, applied to both band bounds. Roles
    /// with `republish_with_noise` also publish the perturbed mean; the others
    /// publish the seasonal mean untouched.
    pub fn generate<N: NoiseSource + ?Sized>(
        &self,
        profile: &PlatformProfile,
        range: &DateRange,
        noise: &mut N,
    ) -> Result<PriceSeries> {
        profile.validate()?;
        let policy = self.roles.for_role(profile.role);
        policy.validate(profile.role)?;
        let dates = DateRangeWalker::new(range)?;

        let (noise_low, noise_high) = policy.noise_bounds();

        let mut points = Vec::with_capacity(dates.len());
        for date in dates {
            let quote = self.quote(profile, date);
            // One draw per day, shared by both bounds and the republished mean
            let jitter = noise.sample(noise_low, noise_high);

            // Oversized anchors clip at i64::MAX
            let low_price = round_price(quote.mean_price.saturating_sub(quote.gap) as f64 * jitter);
            let high_price = round_price(quote.mean_price.saturating_add(quote.gap) as f64 * jitter);

            // Reference keeps its headline price; competitors publish the noisy one
            let mean_price = if policy.republish_with_noise {
                round_price(quote.mean_price as f64 * jitter)
            } else {
                quote.mean_price
            };

            points.push(PricePoint {
                date,
                mean_price,
                low_price,
                high_price,
                seasonal_factor: quote.factor,
            });
        }

        debug!(
            profile = %profile.name,
            role = ?profile.role,
            points = points.len(),
            "generated price series"
        );

        Ok(PriceSeries {
            name: profile.name.clone(),
            role: profile.role,
            points,
        })
    }
}

fn round_price(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::noise::{FixedNoise, SeededNoise};
    use common::{Role, SimulationError};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pitch_range() -> DateRange {
        DateRange::new(date(2025, 10, 10), date(2025, 11, 5)).unwrap()
    }

    fn despegar() -> PlatformProfile {
        PlatformProfile::competitor("DESPEGAR", 22000.0, 0.25, 1.0)
    }

    fn kuali() -> PlatformProfile {
        PlatformProfile::reference("KUALI", 21500.0)
    }

    #[test]
    fn test_competitor_holiday_quote() {
        let generator = PriceSeriesGenerator::default();
        let quote = generator.quote(&despegar(), date(2025, 11, 1));

        assert_eq!(quote.factor, 1.85);
        assert_eq!(quote.mean_price, 40700);
        assert_eq!(quote.gap, 10175);
    }

    #[test]
    fn test_competitor_price_level_applies() {
        let generator = PriceSeriesGenerator::default();
        let pricetravel = PlatformProfile::competitor("PRICETRAVEL", 22000.0, 0.30, 0.92);
        // Wednesday, no surge
        let quote = generator.quote(&pricetravel, date(2025, 10, 15));
        assert_eq!(quote.mean_price, 20240);
        assert_eq!(quote.gap, 6072);
    }

    #[test]
    fn test_reference_ignores_price_level() {
        let generator = PriceSeriesGenerator::default();
        let mut reference = kuali();
        reference.price_level_multiplier = 2.0;
        let quote = generator.quote(&reference, date(2025, 10, 15));
        assert_eq!(quote.mean_price, 21500);
        assert_eq!(quote.gap, 1500);
    }

    #[test]
    fn test_reference_ordinary_day_band() {
        let generator = PriceSeriesGenerator::default();
        let range = DateRange::new(date(2025, 10, 15), date(2025, 10, 15)).unwrap();
        let mut noise = SeededNoise::seeded(3);
        let series = generator.generate(&kuali(), &range, &mut noise).unwrap();
        let point = series.points[0];

        assert_eq!(point.mean_price, 21500);
        assert!((19800..=20200).contains(&point.low_price));
        assert!((22770..=23230).contains(&point.high_price));
    }

    #[test]
    fn test_reference_mean_not_perturbed() {
        let generator = PriceSeriesGenerator::default();
        let mut noise = FixedNoise::constant(1.01);
        let series = generator.generate(&kuali(), &pitch_range(), &mut noise).unwrap();

        for point in &series.points {
            let expected = match point.seasonal_factor {
                f if f == 1.10 => 23650,
                f if f == 1.05 => 22575,
                _ => 21500,
            };
            assert_eq!(point.mean_price, expected);
        }
        let ordinary = series.point_on(date(2025, 10, 15)).unwrap();
        assert_eq!(ordinary.low_price, 20200);
        assert_eq!(ordinary.high_price, 23230);
    }

    #[test]
    fn test_competitor_mean_perturbed() {
        let generator = PriceSeriesGenerator::default();
        let range = DateRange::new(date(2025, 11, 1), date(2025, 11, 1)).unwrap();
        let mut noise = FixedNoise::constant(1.05);
        let series = generator.generate(&despegar(), &range, &mut noise).unwrap();
        let point = series.points[0];

        assert_eq!(point.mean_price, 42735);
        assert_eq!(point.low_price, 32051);
        assert_eq!(point.high_price, 53419);
    }

    #[test]
    fn test_one_draw_per_day() {
        let generator = PriceSeriesGenerator::default();
        let mut noise = FixedNoise::constant(1.0);
        let series = generator.generate(&despegar(), &pitch_range(), &mut noise).unwrap();
        assert_eq!(series.len(), 27);
        assert_eq!(noise.draws(), 27);
    }

    #[test]
    fn test_series_covers_range() {
        let generator = PriceSeriesGenerator::default();
        let mut noise = SeededNoise::seeded(11);
        let series = generator.generate(&despegar(), &pitch_range(), &mut noise).unwrap();

        assert_eq!(series.name, "DESPEGAR");
        assert_eq!(series.role, Role::Competitor);
        assert_eq!(series.len(), pitch_range().num_days().unwrap());
        for pair in series.points.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
        for point in &series.points {
            assert!(point.low_price <= point.mean_price);
            assert!(point.mean_price <= point.high_price);
        }
    }

    #[test]
    fn test_generation_is_reproducible() {
        let generator = PriceSeriesGenerator::default();
        let first = generator
            .generate(&despegar(), &pitch_range(), &mut SeededNoise::seeded(99))
            .unwrap();
        let second = generator
            .generate(&despegar(), &pitch_range(), &mut SeededNoise::seeded(99))
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_reference_band_narrower_than_competitors() {
        let generator = PriceSeriesGenerator::default();
        let reference = generator
            .generate(&kuali(), &pitch_range(), &mut SeededNoise::seeded(5))
            .unwrap();

        for (volatility, level) in [(0.25, 1.0), (0.40, 1.02), (0.20, 1.05), (0.30, 0.92)] {
            let competitor = PlatformProfile::competitor("C", 21500.0, volatility, level);
            let series = generator
                .generate(&competitor, &pitch_range(), &mut SeededNoise::seeded(5))
                .unwrap();
            assert!(reference.average_spread() < series.average_spread());
        }
    }

    #[test]
    fn test_invalid_profile_emits_nothing() {
        let generator = PriceSeriesGenerator::default();
        let mut noise = FixedNoise::constant(1.0);

        for base in [0.0, -100.0] {
            let profile = PlatformProfile::competitor("BROKEN", base, 0.25, 1.0);
            let result = generator.generate(&profile, &pitch_range(), &mut noise);
            assert!(matches!(result, Err(SimulationError::InvalidProfile { .. })));
        }
        assert_eq!(noise.draws(), 0);
    }

    #[test]
    fn test_invalid_range_emits_nothing() {
        let generator = PriceSeriesGenerator::default();
        let mut noise = FixedNoise::constant(1.0);
        let range = DateRange {
            start: date(2025, 11, 5),
            end: date(2025, 10, 10),
        };
        let result = generator.generate(&despegar(), &range, &mut noise);
        assert!(matches!(result, Err(SimulationError::InvalidRange { .. })));
        assert_eq!(noise.draws(), 0);
    }

    #[test]
    fn test_huge_base_price_saturates() {
        let generator = PriceSeriesGenerator::default();
        let profiles = [
            PlatformProfile::competitor("BIG", 1e19, 0.25, 1.0),
            PlatformProfile::reference("REF", 1e19),
        ];

        for profile in &profiles {
            let series = generator
                .generate(profile, &pitch_range(), &mut SeededNoise::seeded(4))
                .unwrap();
            assert_eq!(series.len(), 27);
            for point in &series.points {
                assert!(point.low_price <= point.high_price);
                assert!(point.spread() >= 0);
            }
            assert!(series.average_spread().is_finite());
        }
    }

    #[test]
    fn test_invalid_role_policy_emits_nothing() {
        let mut roles = RoleTable::default();
        roles.competitor.noise_half_width = 1.5;
        let generator = PriceSeriesGenerator::new(SeasonalParameters::default(), roles);
        let mut noise = FixedNoise::constant(1.0);

        let result = generator.generate(&despegar(), &pitch_range(), &mut noise);
        assert!(matches!(result, Err(SimulationError::InvalidParameter(_))));

        let mut roles = RoleTable::default();
        roles.competitor.noise_half_width = f64::NAN;
        let generator = PriceSeriesGenerator::new(SeasonalParameters::default(), roles);
        let result = generator.generate(&despegar(), &pitch_range(), &mut noise);
        assert!(result.is_err());
        assert_eq!(noise.draws(), 0);
    }

    #[test]
    fn test_zero_volatility_competitor_has_flat_band() {
        let generator = PriceSeriesGenerator::default();
        let profile = PlatformProfile::competitor("FLAT", 22000.0, 0.0, 1.0);
        let series = generator
            .generate(&profile, &pitch_range(), &mut SeededNoise::seeded(2))
            .unwrap();
        for point in &series.points {
            assert_eq!(point.low_price, point.high_price);
            assert_eq!(point.mean_price, point.low_price);
        }
    }
}
