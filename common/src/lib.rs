pub mod config;
pub mod error;
pub mod types;

pub use config::{
    BandModel, NarrativeField, ProfileConfig, RolePolicy, RoleTable, SeasonalParameters,
    SimulationParameters, TooltipTable, TooltipTemplate,
};
pub use error::{Result, SimulationError};
pub use types::*;
