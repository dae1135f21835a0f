pub mod calendar;
pub mod noise;
pub mod synthetic;

pub use calendar::{walk, DateRangeWalker};
pub use noise::{FixedNoise, NoiseSource, RngNoise, SeededNoise};
pub use synthetic::{DailyQuote, PriceSeriesGenerator};
