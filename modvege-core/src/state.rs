//! Compartment state advanced by the daily step.
//!
//! The sward is held as four compartments, each with a standing biomass and a
//! mean age in thermal time, plus the soil water reserve:
//!
//! ```text
//!   growth ──> [GV] ──senescence──> [DV] ──abscission──> litter
//!   growth ──> [GR] ──senescence──> [DR] ──abscission──> litter
//! ```

use crate::errors::{ModVegeError, ModVegeResult};
use crate::site::SiteParameters;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Standing biomass and mean age of one compartment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Compartment {
    /// unit: kg DM ha⁻¹
    pub biomass: f64,
    /// unit: °C d
    pub age: f64,
}

impl Compartment {
    pub fn new(biomass: f64, age: f64) -> Self {
        Self { biomass, age }
    }

    /// Blend the carried-over age with new (age zero) input.
    ///
    /// `carried` is the biomass remaining from yesterday after today's losses and
    /// `added` the new biomass entering today. The carried tissue ages by `thermal_time`.
    pub fn blended_age(&self, carried: f64, added: f64, thermal_time: f64) -> f64 {
        let total = carried + added;
        if total <= 0.0 {
            0.0
        } else {
            (carried / total * (self.age + thermal_time)).max(0.0)
        }
    }
}

/// Mutable simulation state of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompartmentState {
    /// Green vegetative
    pub gv: Compartment,
    /// Green reproductive
    pub gr: Compartment,
    /// Dead vegetative
    pub dv: Compartment,
    /// Dead reproductive
    pub dr: Compartment,
    /// Soil water reserve (mm)
    pub water_reserve: f64,
}

impl CompartmentState {
    /// Small non-zero starting sward with a full soil profile.
    pub fn seed(site: &SiteParameters) -> Self {
        Self {
            gv: Compartment::new(10.0, 0.0),
            gr: Compartment::new(1.0, 0.0),
            dv: Compartment::new(10.0, 0.0),
            dr: Compartment::new(1.0, 0.0),
            water_reserve: site.water_holding_capacity,
        }
    }

    /// Compartments in `[GV, GR, DV, DR]` order.
    pub fn compartments(&self) -> [Compartment; 4] {
        [self.gv, self.gr, self.dv, self.dr]
    }

    pub fn biomass(&self) -> [f64; 4] {
        self.compartments().map(|c| c.biomass)
    }

    pub fn ages(&self) -> [f64; 4] {
        self.compartments().map(|c| c.age)
    }

    /// Total standing biomass (kg DM ha⁻¹).
    pub fn total_biomass(&self) -> f64 {
        self.biomass().iter().sum()
    }

    /// Green (GV + GR) biomass (kg DM ha⁻¹).
    pub fn green_biomass(&self) -> f64 {
        self.gv.biomass + self.gr.biomass
    }

    /// Replace the biomass of every compartment, keeping ages.
    pub fn set_biomass(&mut self, biomass: [f64; 4]) {
        self.gv.biomass = biomass[0];
        self.gr.biomass = biomass[1];
        self.dv.biomass = biomass[2];
        self.dr.biomass = biomass[3];
    }

    /// Check the numerical invariants of the state.
    ///
    /// Biomass and ages must be finite and non-negative, and the water reserve must lie
    /// within `[0, capacity]`. A failure here is a modelling defect.
    pub fn check(&self, date: NaiveDate, site: &SiteParameters) -> ModVegeResult<()> {
        const BIOMASS: [&str; 4] = ["bm_gv", "bm_gr", "bm_dv", "bm_dr"];
        const AGES: [&str; 4] = ["age_gv", "age_gr", "age_dv", "age_dr"];

        for (i, compartment) in self.compartments().iter().enumerate() {
            if !(compartment.biomass >= 0.0) || !compartment.biomass.is_finite() {
                return Err(ModVegeError::InvariantViolation {
                    date,
                    quantity: BIOMASS[i],
                    value: compartment.biomass,
                });
            }
            if !(compartment.age >= 0.0) || !compartment.age.is_finite() {
                return Err(ModVegeError::InvariantViolation {
                    date,
                    quantity: AGES[i],
                    value: compartment.age,
                });
            }
        }
        if !(0.0..=site.water_holding_capacity).contains(&self.water_reserve) {
            return Err(ModVegeError::InvariantViolation {
                date,
                quantity: "wr",
                value: self.water_reserve,
            });
        }
        Ok(())
    }
}
