use crate::grid::CellId;
use modvege_core::ModVegeError;
use thiserror::Error;

/// Error type for configuring and running simulations over many cells.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ModVegeError),
    #[error("Invalid run configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Could not build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Cell {cell} does not share the time axis of the grid: {reason}")]
    GridMismatch { cell: CellId, reason: String },
}

/// Convenience type for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
