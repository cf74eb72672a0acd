//! Season-bounded running totals, reset on the first day of each calendar year.

use serde::{Deserialize, Serialize};

/// Running totals for the current calendar year.
///
/// Compartment biomass carries over between years; only these accumulators reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualAccumulator {
    pub year: i32,
    /// Sum of daily temperatures above the base since 1 January (°C d)
    pub sum_temperature: f64,
    /// Biomass ingested by grazing animals so far this year (kg DM ha⁻¹)
    pub ingested: f64,
    /// Biomass harvested by cutting so far this year (kg DM ha⁻¹)
    pub harvested: f64,
    /// Number of grazing or cutting events so far this year
    pub events: u32,
    /// Sum of temperatures on the day of the latest event this year
    pub last_event_sum_temperature: Option<f64>,
}

impl AnnualAccumulator {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            sum_temperature: 0.0,
            ingested: 0.0,
            harvested: 0.0,
            events: 0,
            last_event_sum_temperature: None,
        }
    }

    /// Reset when `year` differs from the year being accumulated.
    ///
    /// Returns `true` if a reset happened.
    pub fn roll_to(&mut self, year: i32) -> bool {
        if self.year == year {
            false
        } else {
            *self = Self::new(year);
            true
        }
    }

    /// Add one day's thermal time.
    pub fn add_thermal_time(&mut self, temperature: f64, base: f64) {
        self.sum_temperature += (temperature - base).max(0.0);
    }

    /// Record a grazing or cutting event.
    pub fn record_event(&mut self, ingested: f64, harvested: f64) {
        self.ingested += ingested;
        self.harvested += harvested;
        self.events += 1;
        self.last_event_sum_temperature = Some(self.sum_temperature);
    }

    /// Ingested plus harvested biomass so far this year (`c_bm`).
    pub fn cumulative_offtake(&self) -> f64 {
        self.ingested + self.harvested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thermal_time_ignores_cold_days() {
        let mut acc = AnnualAccumulator::new(2000);
        acc.add_thermal_time(12.0, 0.0);
        acc.add_thermal_time(-3.0, 0.0);
        acc.add_thermal_time(5.5, 0.0);
        assert_eq!(acc.sum_temperature, 17.5);
    }

    #[test]
    fn test_record_event() {
        let mut acc = AnnualAccumulator::new(2000);
        acc.add_thermal_time(300.0, 0.0);
        acc.record_event(120.0, 0.0);
        acc.record_event(0.0, 80.0);
        assert_eq!(acc.cumulative_offtake(), 200.0);
        assert_eq!(acc.events, 2);
        assert_eq!(acc.last_event_sum_temperature, Some(300.0));
    }

    #[test]
    fn test_roll_to_resets_only_on_new_year() {
        let mut acc = AnnualAccumulator::new(2000);
        acc.add_thermal_time(10.0, 0.0);
        acc.record_event(50.0, 0.0);

        assert!(!acc.roll_to(2000));
        assert_eq!(acc.ingested, 50.0);

        assert!(acc.roll_to(2001));
        assert_eq!(acc, AnnualAccumulator::new(2001));
    }
}
