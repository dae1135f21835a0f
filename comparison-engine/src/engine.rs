use std::time::Instant;

use common::{
    ComparisonRun, DateRange, PlatformProfile, PriceSeries, Result, Role, RoleTable,
    SimulationError, SimulationParameters,
};
use rayon::prelude::*;
use tracing::info;

use crate::data::noise::{NoiseSource, SeededNoise};
use crate::data::synthetic::PriceSeriesGenerator;

/// Runs the generator for a reference profile and its competitors over one shared range
#[derive(Debug, Clone, Default)]
pub struct ComparisonEngine {
    generator: PriceSeriesGenerator,
}

impl ComparisonEngine {
    pub fn new(generator: PriceSeriesGenerator) -> Self {
        Self { generator }
    }

    pub fn from_params(params: &SimulationParameters) -> Self {
        Self::new(PriceSeriesGenerator::from_params(params))
    }

    pub fn generator(&self) -> &PriceSeriesGenerator {
        &self.generator
    }

    /// Generate every profile from one shared noise source, reference first.
    ///
    /// Any failure aborts the whole run; there are no partial results.
    pub fn run<N: NoiseSource + ?Sized>(
        &self,
        reference: &PlatformProfile,
        competitors: &[PlatformProfile],
        range: &DateRange,
        noise: &mut N,
    ) -> Result<ComparisonRun> {
        let start_time = Instant::now();
        check_roster(self.generator.roles(), reference, competitors)?;

        // Reference draws first, then competitors in roster order
        let reference_series = self.generate_one(reference, range, noise)?;
        let mut competitor_series = Vec::with_capacity(competitors.len());
        for profile in competitors {
            competitor_series.push(self.generate_one(profile, range, noise)?);
        }

        let run = ComparisonRun::new(*range, reference_series, competitor_series);
        log_run(&run, start_time);
        Ok(run)
    }

    /// Generate every profile on the rayon pool.
    ///
    /// Profile `i` (reference = 0, competitors from 1) draws from
    /// `SeededNoise::stream(seed, i)`, so output depends only on the seed.
    pub fn run_parallel(
        &self,
        reference: &PlatformProfile,
        competitors: &[PlatformProfile],
        range: &DateRange,
        seed: u64,
    ) -> Result<ComparisonRun> {
        let start_time = Instant::now();
        check_roster(self.generator.roles(), reference, competitors)?;

        let profiles: Vec<&PlatformProfile> =
            std::iter::once(reference).chain(competitors.iter()).collect();

        let mut series: Vec<PriceSeries> = profiles
            .par_iter()
            .enumerate()
            .map(|(index, profile)| {
                let mut noise = SeededNoise::stream(seed, index as u64);
                self.generate_one(profile, range, &mut noise)
            })
            .collect::<Result<Vec<_>>>()?;

        // collect keeps input order, so slot 0 is the reference
        let competitor_series = series.split_off(1);
        let reference_series = series.remove(0);

        let run = ComparisonRun::new(*range, reference_series, competitor_series);
        log_run(&run, start_time);
        Ok(run)
    }

    /// Run the configured profiles and range.
    ///
    /// `params` is validated first; a rejected configuration is reported under
    /// the reference profile's name and no noise is drawn.
    pub fn run_configured<N: NoiseSource + ?Sized>(
        &self,
        params: &SimulationParameters,
        noise: &mut N,
    ) -> Result<ComparisonRun> {
        params
            .validate()
            .map_err(|e| SimulationError::comparison(&params.reference.profile.name, e))?;
        self.run(
            &params.reference.profile,
            &params.competitor_profiles(),
            &params.range,
            noise,
        )
    }

    fn generate_one<N: NoiseSource + ?Sized>(
        &self,
        profile: &PlatformProfile,
        range: &DateRange,
        noise: &mut N,
    ) -> Result<PriceSeries> {
        self.generator
            .generate(profile, range, noise)
            .map_err(|e| SimulationError::comparison(&profile.name, e))
    }
}

/// Every profile must be valid, sit in the slot matching its role, carry a unique
/// name and map to a usable role policy
fn check_roster(
    roles: &RoleTable,
    reference: &PlatformProfile,
    competitors: &[PlatformProfile],
) -> Result<()> {
    let wrap = |name: &str, reason: &str| {
        SimulationError::comparison(name, SimulationError::invalid_profile(name, reason))
    };

    if reference.role != Role::Reference {
        return Err(wrap(&reference.name, "reference slot holds a competitor profile"));
    }
    reference
        .validate()
        .and_then(|_| roles.reference.validate(Role::Reference))
        .map_err(|e| SimulationError::comparison(&reference.name, e))?;

    let mut seen: Vec<&str> = vec![reference.name.as_str()];
    for profile in competitors {
        if profile.role != Role::Competitor {
            return Err(wrap(&profile.name, "competitor list holds a reference profile"));
        }
        profile
            .validate()
            .and_then(|_| roles.competitor.validate(Role::Competitor))
            .map_err(|e| SimulationError::comparison(&profile.name, e))?;
        if seen.contains(&profile.name.as_str()) {
            return Err(wrap(&profile.name, "duplicate profile name"));
        }
        seen.push(profile.name.as_str());
    }
    Ok(())
}

fn log_run(run: &ComparisonRun, start_time: Instant) {
    info!(
        reference = %run.reference().name,
        competitors = run.competitors().len(),
        days = run.reference().len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "comparison run complete"
    );
}
