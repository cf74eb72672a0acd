//! Run configuration
//!
//! A run is configured from a TOML document. Every table is optional:
//!
//! ```toml
//! spin_up = "leading_year"
//! threads = 4
//!
//! [constants]
//! st1 = 650.0
//!
//! [site]
//! water_holding_capacity = 120.0
//! nitrogen_index = 0.8
//!
//! [site.management]
//! mode = "cutting"
//! residual_height = 0.05
//! schedule = { kind = "calendar", days = [152, 213] }
//! ```
//!
//! Constants not listed keep their defaults.

use crate::errors::Result;
use crate::grid::GridRunner;
use log::debug;
use modvege_core::{ModelConstants, SiteParameters, SpinUp};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub constants: ModelConstants,
    /// Site parameters for single-cell runs; only the Python `run_cell` reads its
    /// management rule. Grid cells always carry their own [`SiteParameters`].
    pub site: Option<SiteParameters>,
    pub spin_up: SpinUp,
    /// Worker threads for grid runs; the rayon global pool when unset
    pub threads: Option<usize>,
}

impl RunConfig {
    /// Parse and validate a configuration.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading run configuration from {}", path.display());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.constants.validate()?;
        if let Some(site) = &self.site {
            site.validate()?;
        }
        Ok(())
    }

    /// A grid runner using these constants, spin-up policy and thread count.
    pub fn runner(&self) -> GridRunner {
        let runner = GridRunner::new(self.constants.clone(), self.spin_up);
        match self.threads {
            Some(n) => runner.with_threads(n),
            None => runner,
        }
    }
}
