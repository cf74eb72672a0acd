//! Parallel simulation over grid cells
//!
//! Cells share nothing but the model constants, so they are simulated as an independent
//! data-parallel map. Each cell is integrated sequentially by its own driver. A cell that
//! fails is recorded and reported; the others carry on.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use log::{info, warn};
use modvege_core::{
    ModVegeError, ModelConstants, Simulation, SimulationOutput, SiteParameters, SpinUp, Variable,
    WeatherSeries,
};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a cell on the simulation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub x: usize,
    pub y: usize,
}

impl CellId {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Weather and site of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellInput {
    pub cell: CellId,
    pub weather: WeatherSeries,
    pub site: SiteParameters,
}

/// A cell whose simulation did not complete.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFailure {
    pub cell: CellId,
    pub error: ModVegeError,
}

/// Runs one parameterisation of the model over many cells.
#[derive(Debug, Clone)]
pub struct GridRunner {
    constants: ModelConstants,
    spin_up: SpinUp,
    threads: Option<usize>,
}

impl GridRunner {
    pub fn new(constants: ModelConstants, spin_up: SpinUp) -> Self {
        Self {
            constants,
            spin_up,
            threads: None,
        }
    }

    /// Use a dedicated pool of `n` worker threads instead of the global rayon pool.
    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }

    /// Simulate every cell. Results keep the order of `cells`.
    ///
    /// Fails only if the worker pool cannot be built; per-cell errors are collected in
    /// the returned [`GridRun`].
    pub fn run(&self, cells: &[CellInput]) -> Result<GridRun> {
        let outcomes = match self.threads {
            Some(n) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(n).build()?;
                pool.install(|| self.run_cells(cells))
            }
            None => self.run_cells(cells),
        };

        let run = GridRun { outcomes };
        let failed = run.failures().count();
        info!(
            "Simulated {} cells ({} failed, {:?} spin-up)",
            run.len(),
            failed,
            self.spin_up
        );
        Ok(run)
    }

    fn run_cells(&self, cells: &[CellInput]) -> Vec<CellOutcome> {
        cells
            .par_iter()
            .map(|input| {
                self.run_cell(input).map_err(|error| {
                    warn!("Cell {} failed: {}", input.cell, error);
                    CellFailure {
                        cell: input.cell,
                        error,
                    }
                })
                .map(|output| (input.cell, output))
            })
            .collect()
    }

    fn run_cell(&self, input: &CellInput) -> std::result::Result<SimulationOutput, ModVegeError> {
        Simulation::new(self.constants.clone(), input.site.clone())?.run(
            &input.weather,
            None,
            self.spin_up,
        )
    }
}

/// Outcome of one cell: its output or the reason it failed.
pub type CellOutcome = std::result::Result<(CellId, SimulationOutput), CellFailure>;

/// Results of a grid run, in input order.
#[derive(Debug, Clone)]
pub struct GridRun {
    outcomes: Vec<CellOutcome>,
}

impl GridRun {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn outcomes(&self) -> &[CellOutcome] {
        &self.outcomes
    }

    pub fn cells(&self) -> Vec<CellId> {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok((cell, _)) => *cell,
                Err(failure) => failure.cell,
            })
            .collect()
    }

    pub fn successes(&self) -> impl Iterator<Item = (CellId, &SimulationOutput)> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok().map(|(cell, output)| (*cell, output)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &CellFailure> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }

    pub fn output(&self, cell: CellId) -> Option<&SimulationOutput> {
        self.successes()
            .find(|(id, _)| *id == cell)
            .map(|(_, output)| output)
    }

    /// Dates of the shared time axis, or an empty axis if no cell succeeded.
    pub fn dates(&self, reporting_only: bool) -> Result<Vec<NaiveDate>> {
        let mut successes = self.successes();
        let reference = match successes.next() {
            Some((_, output)) => output.series.dates(reporting_only),
            None => return Ok(Vec::new()),
        };
        for (cell, output) in successes {
            let dates = output.series.dates(reporting_only);
            if dates != reference {
                return Err(Error::GridMismatch {
                    cell,
                    reason: format!(
                        "{} days from {:?}, expected {} days from {:?}",
                        dates.len(),
                        dates.first(),
                        reference.len(),
                        reference.first()
                    ),
                });
            }
        }
        Ok(reference)
    }

    /// One variable for every cell as a (time x cell) array.
    ///
    /// Columns follow input order. Failed cells are filled with NaN.
    pub fn to_array(&self, variable: Variable, reporting_only: bool) -> Result<Array2<f64>> {
        let n_time = self.dates(reporting_only)?.len();
        let mut array = Array2::from_elem((n_time, self.len()), f64::NAN);
        for (j, outcome) in self.outcomes.iter().enumerate() {
            if let Ok((_, output)) = outcome {
                array
                    .column_mut(j)
                    .assign(&output.series.column(variable, reporting_only));
            }
        }
        Ok(array)
    }
}
