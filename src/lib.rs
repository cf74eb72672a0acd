//! Gridded ModVege simulations
//!
//! Runs the [`modvege_core`] grass growth engine over many grid cells in parallel and
//! assembles gridded output arrays.
//!
//! ```ignore
//! let config = RunConfig::from_path("run.toml")?;
//! let run = config.runner().run(&cells)?;
//! let growth = run.to_array(Variable::Gro, true)?; // shape: (days, cells)
//! ```

pub mod config;
pub mod errors;
pub mod grid;
#[cfg(feature = "python")]
pub mod python;

pub use config::RunConfig;
pub use errors::{Error, Result};
pub use grid::{CellFailure, CellId, CellInput, GridRun, GridRunner};
pub use modvege_core::{
    self, AnnualSummary, CompartmentState, CutSchedule, DailyOutput, Management, ModVegeError,
    ModelConstants, OutputSeries, Simulation, SimulationOutput, SiteParameters, SpinUp, Variable,
    WeatherDay, WeatherSeries,
};
