//! Daily weather forcing for a single grid cell.

use crate::errors::{ModVegeError, ModVegeResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One day of forcing at one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    /// Mean air temperature (°C)
    pub temperature: f64,
    /// Precipitation (mm day⁻¹)
    pub precipitation: f64,
    /// Photosynthetically active radiation (MJ m⁻² day⁻¹)
    pub par: f64,
    /// Potential evapotranspiration (mm day⁻¹)
    pub pet: f64,
}

impl WeatherDay {
    pub fn new(date: NaiveDate, temperature: f64, precipitation: f64, par: f64, pet: f64) -> Self {
        Self {
            date,
            temperature,
            precipitation,
            par,
            pet,
        }
    }

    fn validate(&self) -> ModVegeResult<()> {
        let fields = [
            ("T", self.temperature, false),
            ("PP", self.precipitation, true),
            ("PAR", self.par, true),
            ("PET", self.pet, true),
        ];
        for (field, value, non_negative) in fields {
            if !value.is_finite() || (non_negative && value < 0.0) {
                return Err(ModVegeError::InvalidWeather {
                    date: self.date,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Validated, contiguous daily weather series.
///
/// Must be non-empty, free of NaN or infinite values, with non-negative precipitation,
/// PAR and PET, and exactly one record per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<WeatherDay>", into = "Vec<WeatherDay>")]
pub struct WeatherSeries {
    days: Vec<WeatherDay>,
}

impl WeatherSeries {
    pub fn new(days: Vec<WeatherDay>) -> ModVegeResult<Self> {
        if days.is_empty() {
            return Err(ModVegeError::EmptyWeather);
        }
        for day in &days {
            day.validate()?;
        }
        for pair in days.windows(2) {
            if pair[0].date.succ_opt() != Some(pair[1].date) {
                return Err(ModVegeError::NonContiguousDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { days })
    }

    /// Build a series from parallel columns starting at `start`.
    pub fn from_columns(
        start: NaiveDate,
        temperature: &[f64],
        precipitation: &[f64],
        par: &[f64],
        pet: &[f64],
    ) -> ModVegeResult<Self> {
        let n = temperature.len();
        for (column, values) in [("PP", precipitation), ("PAR", par), ("PET", pet)] {
            if values.len() != n {
                return Err(ModVegeError::LengthMismatch {
                    column,
                    expected: n,
                    actual: values.len(),
                });
            }
        }

        let days = start
            .iter_days()
            .zip(temperature.iter().zip(precipitation).zip(par.iter().zip(pet)))
            .map(|(date, ((t, pp), (par, pet)))| WeatherDay::new(date, *t, *pp, *par, *pet))
            .collect();
        Self::new(days)
    }

    pub fn days(&self) -> &[WeatherDay] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns `true` if there are no days. Never true for a validated series.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.days[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.days[self.days.len() - 1].date
    }

    /// Number of leading days belonging to the first calendar year of the series.
    pub fn first_year_len(&self) -> usize {
        let year = self.first_date().year();
        self.days
            .iter()
            .take_while(|d| d.date.year() == year)
            .count()
    }

    /// Whether the series starts on the first of January.
    pub fn starts_on_new_year(&self) -> bool {
        self.first_date().ordinal() == 1
    }
}

impl TryFrom<Vec<WeatherDay>> for WeatherSeries {
    type Error = ModVegeError;

    fn try_from(days: Vec<WeatherDay>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<WeatherSeries> for Vec<WeatherDay> {
    fn from(series: WeatherSeries) -> Self {
        series.days
    }
}
