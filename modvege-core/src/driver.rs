//! Simulation driver
//!
//! Sequences the daily step over a full weather series for one grid cell. Day
//! `t + 1` depends on day `t`, so the loop is strictly sequential; parallelism
//! belongs to the caller, across cells and scenarios.
//!
//! # Spin-up
//!
//! The driver supports two spin-up conventions:
//!
//! - [`SpinUp::LeadingYear`]: the first calendar year of the supplied series is a
//!   spin-up year. It is simulated and its rows are kept in the output, flagged
//!   `spin_up`, so output stays aligned 1:1 with the input.
//!   [`OutputSeries::reporting`] discards them.
//! - [`SpinUp::RepeatFirstYear`]: the first calendar year of the series is simulated
//!   once beforehand to condition the state. Those rows are dropped, then the
//!   whole series is simulated from the conditioned state.

use crate::accumulator::AnnualAccumulator;
use crate::constants::ModelConstants;
use crate::environment::TemperatureWindow;
use crate::errors::{ModVegeError, ModVegeResult};
use crate::output::{DailyOutput, OutputSeries};
use crate::site::SiteParameters;
use crate::state::CompartmentState;
use crate::step::DailyStep;
use crate::weather::{WeatherDay, WeatherSeries};
use chrono::Datelike;
use log::debug;
use serde::{Deserialize, Serialize};

/// Spin-up policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinUp {
    /// Start reporting from the first day.
    None,
    /// The first calendar year of the series is spin-up and flagged in the output.
    #[default]
    LeadingYear,
    /// Condition the state on a repeat of the first calendar year, then run the full series.
    RepeatFirstYear,
}

/// Result of a single-cell run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub series: OutputSeries,
    /// State after the last simulated day, for chained runs
    pub final_state: CompartmentState,
    pub final_accumulator: AnnualAccumulator,
}

/// Mutable loop state carried between days.
struct Carry {
    state: CompartmentState,
    accumulator: AnnualAccumulator,
    window: TemperatureWindow,
}

/// A validated parameterisation of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    constants: ModelConstants,
    site: SiteParameters,
}

impl Simulation {
    pub fn new(constants: ModelConstants, site: SiteParameters) -> ModVegeResult<Self> {
        constants.validate()?;
        site.validate()?;
        Ok(Self { constants, site })
    }

    pub fn constants(&self) -> &ModelConstants {
        &self.constants
    }

    pub fn site(&self) -> &SiteParameters {
        &self.site
    }

    /// Run the model over `weather`.
    ///
    /// `initial` defaults to [`CompartmentState::seed`]. The returned series has exactly one
    /// row per input day.
    pub fn run(
        &self,
        weather: &WeatherSeries,
        initial: Option<&CompartmentState>,
        spin_up: SpinUp,
    ) -> ModVegeResult<SimulationOutput> {
        let state = initial
            .copied()
            .unwrap_or_else(|| CompartmentState::seed(&self.site));
        state.check(weather.first_date(), &self.site)?;

        let first_year = weather.first_date().year();
        let mut carry = Carry {
            state,
            accumulator: AnnualAccumulator::new(first_year),
            window: TemperatureWindow::new(self.constants.temperature_window_days),
        };

        let days = weather.days();
        let spin_up_days = match spin_up {
            SpinUp::None => 0,
            SpinUp::LeadingYear => {
                let n = self.spin_up_year_len(weather)?;
                if n == weather.len() {
                    return Err(ModVegeError::SpinUpTooShort(format!(
                        "The series ends on {} with no reporting period after the spin-up year",
                        weather.last_date()
                    )));
                }
                n
            }
            SpinUp::RepeatFirstYear => {
                let n = self.spin_up_year_len(weather)?;
                debug!("Conditioning state on {} days of {}", n, first_year);
                self.integrate(&days[..n], &mut carry, |_| {})?;
                // The main run starts over on the same calendar year
                carry.accumulator = AnnualAccumulator::new(first_year);
                0
            }
        };

        debug!(
            "Simulating {} days from {} to {} ({} spin-up days)",
            weather.len(),
            weather.first_date(),
            weather.last_date(),
            spin_up_days
        );

        let mut series = OutputSeries::with_capacity(weather.len());
        let mut index = 0;
        self.integrate(days, &mut carry, |mut row| {
            row.spin_up = index < spin_up_days;
            index += 1;
            series.push(row);
        })?;

        Ok(SimulationOutput {
            series,
            final_state: carry.state,
            final_accumulator: carry.accumulator,
        })
    }

    fn integrate<F>(&self, days: &[WeatherDay], carry: &mut Carry, mut sink: F) -> ModVegeResult<()>
    where
        F: FnMut(DailyOutput),
    {
        let step = DailyStep::new(&self.constants, &self.site);
        for day in days {
            let mean_temperature = carry.window.push(day.temperature);
            let outcome = step.advance(&carry.state, &carry.accumulator, day, mean_temperature)?;
            carry.state = outcome.state;
            carry.accumulator = outcome.accumulator;
            sink(outcome.output);
        }
        Ok(())
    }

    /// Length of the spin-up year, which must be a complete calendar year.
    fn spin_up_year_len(&self, weather: &WeatherSeries) -> ModVegeResult<usize> {
        if !weather.starts_on_new_year() {
            return Err(ModVegeError::SpinUpTooShort(format!(
                "The series starts on {} rather than on 1 January",
                weather.first_date()
            )));
        }
        let n = weather.first_year_len();
        let last = weather.days()[n - 1].date;
        if last.month() != 12 || last.day() != 31 {
            return Err(ModVegeError::SpinUpTooShort(format!(
                "The first calendar year ends on {}",
                last
            )));
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Management;
    use chrono::NaiveDate;

    fn constant_weather(start: NaiveDate, days: usize) -> WeatherSeries {
        WeatherSeries::from_columns(
            start,
            &vec![12.0; days],
            &vec![2.0; days],
            &vec![8.0; days],
            &vec![2.0; days],
        )
        .unwrap()
    }

    fn simulation() -> Simulation {
        Simulation::new(
            ModelConstants::default(),
            SiteParameters::new(120.0, 0.8, Management::None),
        )
        .unwrap()
    }

    fn jan1(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    #[test]
    fn test_invalid_site_rejected() {
        let result = Simulation::new(
            ModelConstants::default(),
            SiteParameters::new(120.0, 1.2, Management::None),
        );
        assert!(matches!(
            result,
            Err(ModVegeError::InvalidParameter {
                name: "nitrogen_index",
                ..
            })
        ));
    }

    #[test]
    fn test_output_aligned_with_input() {
        let weather = constant_weather(jan1(2001), 400);
        let output = simulation().run(&weather, None, SpinUp::None).unwrap();
        assert_eq!(output.series.len(), 400);
        assert_eq!(output.series.spin_up_len(), 0);
        assert_eq!(output.series.rows()[0].date, jan1(2001));
    }

    #[test]
    fn test_leading_year_flags_spin_up_rows() {
        // 2004 is a leap year
        let weather = constant_weather(jan1(2004), 366 + 365);
        let output = simulation()
            .run(&weather, None, SpinUp::LeadingYear)
            .unwrap();
        assert_eq!(output.series.len(), 731);
        assert_eq!(output.series.spin_up_len(), 366);
        assert_eq!(output.series.reporting()[0].date, jan1(2005));
    }

    #[test]
    fn test_leading_year_requires_reporting_period() {
        let weather = constant_weather(jan1(2001), 365);
        let err = simulation()
            .run(&weather, None, SpinUp::LeadingYear)
            .unwrap_err();
        assert!(matches!(err, ModVegeError::SpinUpTooShort(_)));
    }

    #[test]
    fn test_spin_up_requires_full_first_year() {
        let mid_year = constant_weather(NaiveDate::from_ymd_opt(2001, 3, 1).unwrap(), 700);
        assert!(simulation()
            .run(&mid_year, None, SpinUp::LeadingYear)
            .is_err());

        let short = constant_weather(jan1(2001), 200);
        assert!(simulation()
            .run(&short, None, SpinUp::RepeatFirstYear)
            .is_err());
    }

    #[test]
    fn test_repeat_first_year_conditions_state() {
        let weather = constant_weather(jan1(2001), 365 * 2);
        let plain = simulation().run(&weather, None, SpinUp::None).unwrap();
        let repeated = simulation()
            .run(&weather, None, SpinUp::RepeatFirstYear)
            .unwrap();

        assert_eq!(repeated.series.len(), weather.len());
        assert_eq!(repeated.series.spin_up_len(), 0);
        // The conditioned run starts from a developed sward
        let first_plain = plain.series.rows()[0];
        let first_repeated = repeated.series.rows()[0];
        assert!(first_repeated.bm > 10.0 * first_plain.bm);
        // Accumulators restart with the reporting period
        assert_eq!(first_repeated.st, 12.0);
    }

    #[test]
    fn test_rejects_invalid_initial_state() {
        let weather = constant_weather(jan1(2001), 10);
        let mut initial = CompartmentState::seed(simulation().site());
        initial.gv.biomass = -1.0;
        assert!(matches!(
            simulation().run(&weather, Some(&initial), SpinUp::None),
            Err(ModVegeError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_runs_are_deterministic() {
        let weather = constant_weather(jan1(2001), 500);
        let sim = simulation();
        let a = sim.run(&weather, None, SpinUp::LeadingYear).unwrap();
        let b = sim.run(&weather, None, SpinUp::LeadingYear).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.final_accumulator.year, 2002);
    }
}
