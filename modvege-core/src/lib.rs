//! ModVege grassland growth engine
//!
//! A daily-step implementation of the ModVege model (Jouven et al., 2006). The sward is
//! represented by four structural compartments, green vegetative (GV), green reproductive
//! (GR), dead vegetative (DV) and dead reproductive (DR), each carrying a biomass and a mean
//! thermal age, plus a soil water reserve.
//!
//! # Module Organisation
//!
//! - `environment`: pure response functions (temperature, water, season, radiation, digestibility)
//! - `state`, `accumulator`: the carried daily state
//! - `management`: grazing and cutting rules
//! - `step`: the daily transition
//! - `driver`: sequencing a weather series for one cell, including spin-up
//! - `output`, `variables`: daily diagnostics and their stable names
//!
//! # Parameters
//!
//! Physiological constants live in [`constants::ModelConstants`] with defaults from the
//! published parameterisation. Site properties and the management rule live in
//! [`site::SiteParameters`].

pub mod accumulator;
pub mod constants;
pub mod driver;
pub mod environment;
pub mod errors;
pub mod management;
pub mod output;
pub mod site;
pub mod state;
pub mod step;
pub mod variables;
pub mod weather;

pub use constants::ModelConstants;
pub use driver::{Simulation, SimulationOutput, SpinUp};
pub use errors::{ModVegeError, ModVegeResult};
pub use output::{AnnualSummary, DailyOutput, OutputSeries};
pub use site::{CutSchedule, Management, SiteParameters};
pub use state::{Compartment, CompartmentState};
pub use variables::Variable;
pub use weather::{WeatherDay, WeatherSeries};
