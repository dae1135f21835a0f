use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::types::{DateRange, PlatformProfile, Role};

/// How a profile's daily band half-width is derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BandModel {
    /// `round(mean * volatility_factor)`
    Proportional,
    /// Same absolute gap every day
    Fixed { gap: i64 },
}

/// Per-role pricing behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePolicy {
    /// Multiplier inside the holiday window (wins over the weekend rule)
    pub holiday_factor: f64,
    /// Multiplier on surge weekdays
    pub weekend_factor: f64,
    /// Noise is drawn from `1 ± noise_half_width`
    pub noise_half_width: f64,
    /// Whether `price_level_multiplier` scales the anchor
    pub apply_price_level: bool,
    pub band: BandModel,
    /// Whether the published mean carries the same noise draw as the band
    pub republish_with_noise: bool,
}

impl RolePolicy {
    /// Volatile platform: full seasonal pass-through, wide noise
    pub fn competitor() -> Self {
        Self {
            holiday_factor: 1.85,
            weekend_factor: 1.15,
            noise_half_width: 0.05,
            apply_price_level: true,
            band: BandModel::Proportional,
            republish_with_noise: true,
        }
    }

    /// Stable platform: dampened surges, narrow fixed band, headline price untouched by noise
    pub fn reference() -> Self {
        Self {
            holiday_factor: 1.10,
            weekend_factor: 1.05,
            noise_half_width: 0.01,
            apply_price_level: false,
            band: BandModel::Fixed { gap: 1500 },
            republish_with_noise: false,
        }
    }

    pub fn noise_bounds(&self) -> (f64, f64) {
        (1.0 - self.noise_half_width, 1.0 + self.noise_half_width)
    }

    /// Reject factors and noise widths that would price below zero or break sampling
    pub fn validate(&self, role: Role) -> Result<()> {
        let label = format!("{:?}", role).to_lowercase();
        if !self.holiday_factor.is_finite() || self.holiday_factor < 0.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "{} holiday factor must be non-negative",
                label
            )));
        }
        if !self.weekend_factor.is_finite() || self.weekend_factor < 0.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "{} weekend factor must be non-negative",
                label
            )));
        }
        if !(0.0..1.0).contains(&self.noise_half_width) {
            return Err(SimulationError::InvalidParameter(format!(
                "{} noise half-width must be in [0, 1), got {}",
                label, self.noise_half_width
            )));
        }
        if let BandModel::Fixed { gap } = self.band {
            if gap < 0 {
                return Err(SimulationError::InvalidParameter(format!(
                    "{} fixed band gap must be non-negative, got {}",
                    label, gap
                )));
            }
        }
        Ok(())
    }
}

/// One policy per role, looked up by tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTable {
    pub reference: RolePolicy,
    pub competitor: RolePolicy,
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            reference: RolePolicy::reference(),
            competitor: RolePolicy::competitor(),
        }
    }
}

impl RoleTable {
    pub fn for_role(&self, role: Role) -> &RolePolicy {
        match role {
            Role::Reference => &self.reference,
            Role::Competitor => &self.competitor,
        }
    }
}

/// Calendar rules shared by every role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalParameters {
    /// Month whose opening days form the high-demand window
    pub holiday_month: u32,
    /// Length of the window, counted from day 1 of `holiday_month`
    pub holiday_days: u32,
    /// Weekdays priced with the weekend factor
    pub surge_weekdays: Vec<Weekday>,
}

impl Default for SeasonalParameters {
    fn default() -> Self {
        Self {
            holiday_month: 11,
            holiday_days: 2,
            surge_weekdays: vec![Weekday::Fri, Weekday::Sat, Weekday::Sun],
        }
    }
}

/// A labelled line of tooltip copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeField {
    pub label: String,
    pub text: String,
}

impl NarrativeField {
    pub fn new(label: &str, text: &str) -> Self {
        Self {
            label: label.to_string(),
            text: text.to_string(),
        }
    }
}

/// Tooltip copy for one role. `{name}` in the headline is replaced by the platform name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipTemplate {
    pub headline: String,
    pub fields: Vec<NarrativeField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipTable {
    pub reference: TooltipTemplate,
    pub competitor: TooltipTemplate,
}

impl Default for TooltipTable {
    fn default() -> Self {
        Self {
            reference: TooltipTemplate {
                headline: "{name} (US)".to_string(),
                fields: vec![
                    NarrativeField::new("GUARANTEE", "Protected, fixed price."),
                    NarrativeField::new("TECHNOLOGY", "Stability guarantee blocks surge increases."),
                    NarrativeField::new("BENEFIT", "Your budget is safe."),
                ],
            },
            competitor: TooltipTemplate {
                headline: "PLATFORM: {name}".to_string(),
                fields: vec![
                    NarrativeField::new("RISK", "Price varies hourly."),
                    NarrativeField::new("CAUSE", "Demand-driven speculation."),
                    NarrativeField::new("EFFECT", "You pay more when demand is high."),
                ],
            },
        }
    }
}

impl TooltipTable {
    pub fn for_role(&self, role: Role) -> &TooltipTemplate {
        match role {
            Role::Reference => &self.reference,
            Role::Competitor => &self.competitor,
        }
    }
}

/// A profile plus how it is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(flatten)]
    pub profile: PlatformProfile,
    /// Line colour as `#RRGGBB`
    pub color: String,
}

impl ProfileConfig {
    pub fn new(profile: PlatformProfile, color: &str) -> Self {
        Self {
            profile,
            color: color.to_string(),
        }
    }
}

/// Everything a comparison run is configured with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub range: DateRange,
    pub reference: ProfileConfig,
    #[serde(default)]
    pub competitors: Vec<ProfileConfig>,
    #[serde(default)]
    pub seasonal: SeasonalParameters,
    #[serde(default)]
    pub roles: RoleTable,
    #[serde(default)]
    pub tooltips: TooltipTable,
    #[serde(default = "default_reference_opacity")]
    pub reference_fill_opacity: f64,
    #[serde(default = "default_competitor_opacity")]
    pub competitor_fill_opacity: f64,
    #[serde(default)]
    pub holiday_annotation: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_reference_opacity() -> f64 {
    0.15
}

fn default_competitor_opacity() -> f64 {
    0.2
}

/// Base price every competitor starts from before its price level
pub const COMPETITOR_BASE_PRICE: f64 = 22000.0;
/// Anchor the reference platform quotes from
pub const REFERENCE_ANCHOR: f64 = 21500.0;

impl Default for SimulationParameters {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2025, 10, 10).unwrap_or_default();
        let end = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap_or_default();
        let competitor = |name: &str, volatility: f64, level: f64, color: &str| {
            ProfileConfig::new(
                PlatformProfile::competitor(name, COMPETITOR_BASE_PRICE, volatility, level),
                color,
            )
        };

        Self {
            range: DateRange { start, end },
            reference: ProfileConfig::new(
                PlatformProfile::reference("KUALI", REFERENCE_ANCHOR),
                "#0A3069",
            ),
            competitors: vec![
                competitor("DESPEGAR", 0.25, 1.0, "#8E44AD"),
                competitor("BOOKING", 0.40, 1.02, "#2E86C1"),
                competitor("EXPEDIA", 0.20, 1.05, "#F39C12"),
                competitor("PRICETRAVEL", 0.30, 0.92, "#3498DB"),
            ],
            seasonal: SeasonalParameters::default(),
            roles: RoleTable::default(),
            tooltips: TooltipTable::default(),
            reference_fill_opacity: default_reference_opacity(),
            competitor_fill_opacity: default_competitor_opacity(),
            holiday_annotation: Some("No price gouging on the holiday".to_string()),
            seed: None,
        }
    }
}

impl SimulationParameters {
    /// Parse and validate parameters from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;

        if !(1..=12).contains(&self.seasonal.holiday_month) {
            return Err(SimulationError::InvalidParameter(format!(
                "holiday month must be in 1..=12, got {}",
                self.seasonal.holiday_month
            )));
        }
        self.roles.reference.validate(Role::Reference)?;
        self.roles.competitor.validate(Role::Competitor)?;

        for opacity in [self.reference_fill_opacity, self.competitor_fill_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(SimulationError::InvalidParameter(format!(
                    "fill opacity must be in [0, 1], got {}",
                    opacity
                )));
            }
        }

        if self.reference.profile.role != Role::Reference {
            return Err(SimulationError::invalid_profile(
                &self.reference.profile.name,
                "reference slot holds a competitor profile",
            ));
        }
        self.reference.profile.validate()?;

        let mut seen = vec![self.reference.profile.name.as_str()];
        for entry in &self.competitors {
            if entry.profile.role != Role::Competitor {
                return Err(SimulationError::invalid_profile(
                    &entry.profile.name,
                    "competitor list holds a reference profile",
                ));
            }
            entry.profile.validate()?;
            if seen.contains(&entry.profile.name.as_str()) {
                return Err(SimulationError::invalid_profile(
                    &entry.profile.name,
                    "duplicate profile name",
                ));
            }
            seen.push(entry.profile.name.as_str());
        }
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&ProfileConfig> {
        std::iter::once(&self.reference)
            .chain(self.competitors.iter())
            .find(|entry| entry.profile.name == name)
    }

    pub fn competitor_profiles(&self) -> Vec<PlatformProfile> {
        self.competitors.iter().map(|c| c.profile.clone()).collect()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_competitor(mut self, profile: PlatformProfile, color: &str) -> Self {
        self.competitors.push(ProfileConfig::new(profile, color));
        self
    }

    pub fn without_competitors(mut self) -> Self {
        self.competitors.clear();
        self
    }
}
