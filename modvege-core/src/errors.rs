use chrono::NaiveDate;
use thiserror::Error;

/// Error type for the grass growth engine.
///
/// Input-contract problems (`EmptyWeather` through `SpinUpTooShort`) are raised before any
/// simulation happens. `InvariantViolation` is raised mid-run and indicates a modelling defect
/// rather than bad data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModVegeError {
    #[error("Weather series is empty")]
    EmptyWeather,
    #[error("Invalid weather value on {date}: {field}={value}")]
    InvalidWeather {
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },
    #[error("Weather series is not contiguous daily data: {previous} is followed by {next}")]
    NonContiguousDates { previous: NaiveDate, next: NaiveDate },
    #[error("Column {column} has length {actual}, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid parameter {name}={value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },
    #[error("Spin-up requires a complete first calendar year followed by a reporting period. {0}")]
    SpinUpTooShort(String),
    #[error("Numerical invariant violated on {date}: {quantity}={value}")]
    InvariantViolation {
        date: NaiveDate,
        quantity: &'static str,
        value: f64,
    },
}

impl ModVegeError {
    /// Whether this error is a defect in the model rather than a problem with the inputs.
    pub fn is_internal(&self) -> bool {
        matches!(self, ModVegeError::InvariantViolation { .. })
    }
}

/// Convenience type for `Result<T, ModVegeError>`.
pub type ModVegeResult<T> = Result<T, ModVegeError>;
