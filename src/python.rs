//! Python bindings
//!
//! Exposes a single-cell run to Python so that existing NetCDF tooling can feed
//! weather columns in as NumPy arrays and receive gridded-ready output columns back.

use crate::config::RunConfig;
use crate::errors::Error;
use chrono::NaiveDate;
use modvege_core::{Simulation, SiteParameters, Variable, WeatherSeries};
use numpy::{IntoPyArray, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Run one cell and return its reporting-period output.
///
/// The result maps each output variable name to a NumPy array, plus `date` holding ISO
/// dates. `config_toml` is a run configuration document; only its constants, management
/// and spin-up policy are used.
#[pyfunction]
#[pyo3(signature = (start_date, t, pp, par, pet, whc, ni, config_toml=None))]
#[allow(clippy::too_many_arguments)]
fn run_cell<'py>(
    py: Python<'py>,
    start_date: &str,
    t: PyReadonlyArray1<'py, f64>,
    pp: PyReadonlyArray1<'py, f64>,
    par: PyReadonlyArray1<'py, f64>,
    pet: PyReadonlyArray1<'py, f64>,
    whc: f64,
    ni: f64,
    config_toml: Option<&str>,
) -> PyResult<Bound<'py, PyDict>> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").map_err(|e| {
        PyValueError::new_err(format!("Invalid start date {}: {}", start_date, e))
    })?;
    let config = match config_toml {
        Some(s) => RunConfig::from_toml_str(s)?,
        None => RunConfig::default(),
    };
    let management = config.site.map(|s| s.management).unwrap_or_default();

    let weather = WeatherSeries::from_columns(
        start,
        t.as_slice()?,
        pp.as_slice()?,
        par.as_slice()?,
        pet.as_slice()?,
    )
    .map_err(Error::from)?;
    let simulation = Simulation::new(config.constants, SiteParameters::new(whc, ni, management))
        .map_err(Error::from)?;
    let output = py
        .allow_threads(|| simulation.run(&weather, None, config.spin_up))
        .map_err(Error::from)?;

    let result = PyDict::new_bound(py);
    for variable in Variable::ALL {
        result.set_item(
            variable.name(),
            output
                .series
                .column(variable, true)
                .into_pyarray_bound(py),
        )?;
    }
    let dates: Vec<String> = output
        .series
        .dates(true)
        .iter()
        .map(|d| d.to_string())
        .collect();
    result.set_item("date", dates)?;
    Ok(result)
}

#[pymodule]
#[pyo3(name = "_lib")]
fn modvege(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(run_cell, m)?)?;
    Ok(())
}
