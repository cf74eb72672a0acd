//! Per-cell site parameters and management rules.

use crate::errors::{ModVegeError, ModVegeResult};
use serde::{Deserialize, Serialize};

/// Lowest nitrogen nutritional index accepted by the model.
pub const MIN_NITROGEN_INDEX: f64 = 0.35;
/// Highest nitrogen nutritional index accepted by the model.
pub const MAX_NITROGEN_INDEX: f64 = 1.0;

/// Fixed parameters of one grid cell for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteParameters {
    /// Soil total available water holding capacity
    /// unit: mm
    pub water_holding_capacity: f64,

    /// Nitrogen nutritional index
    /// unit: dimensionless, [0.35, 1.0]
    pub nitrogen_index: f64,

    /// Grazing or cutting regime
    #[serde(default)]
    pub management: Management,
}

impl SiteParameters {
    pub fn new(water_holding_capacity: f64, nitrogen_index: f64, management: Management) -> Self {
        Self {
            water_holding_capacity,
            nitrogen_index,
            management,
        }
    }

    pub fn validate(&self) -> ModVegeResult<()> {
        if !(self.water_holding_capacity > 0.0) || !self.water_holding_capacity.is_finite() {
            return Err(invalid(
                "water_holding_capacity",
                self.water_holding_capacity,
                "must be a positive number of mm",
            ));
        }
        if !(MIN_NITROGEN_INDEX..=MAX_NITROGEN_INDEX).contains(&self.nitrogen_index) {
            return Err(invalid(
                "nitrogen_index",
                self.nitrogen_index,
                &format!(
                    "must lie in [{}, {}]",
                    MIN_NITROGEN_INDEX, MAX_NITROGEN_INDEX
                ),
            ));
        }
        self.management.validate()
    }
}

/// Offtake regime applied after each day's growth.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Management {
    /// No grazing and no cutting.
    #[default]
    None,
    /// Rotational grazing driven by stocking-rate demand.
    ///
    /// The herd enters when the green biomass available above the residual covers
    /// `rotation_length` days of intake for the whole stock, and grazes every
    /// compartment down to `residual_height`.
    Grazing {
        /// unit: m
        residual_height: f64,
        /// unit: LU ha⁻¹
        stocking_rate: f64,
        /// unit: kg DM LU⁻¹ day⁻¹
        intake_per_livestock_unit: f64,
        /// unit: days
        rotation_length: f64,
        /// First day of year on which animals are at grass (inclusive)
        season_start: u32,
        /// Last day of year on which animals are at grass (inclusive)
        season_end: u32,
    },
    /// Mechanical harvest down to `residual_height`.
    Cutting {
        /// unit: m
        residual_height: f64,
        schedule: CutSchedule,
    },
}

/// When a cut is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CutSchedule {
    /// Cut on fixed days of year (1-366).
    ///
    /// Days are ordinals, not month and day: in leap years every cut after
    /// 28 February lands one calendar date earlier (day 152 is 1 June in 2001
    /// but 31 May in 2000).
    Calendar { days: Vec<u32> },
    /// Cut when total standing biomass reaches `standing_biomass` (kg DM ha⁻¹),
    /// at most `max_cuts` times per calendar year.
    Threshold { standing_biomass: f64, max_cuts: u32 },
}

impl Management {
    /// Residual height the sward is reduced to, if any offtake is configured.
    pub fn residual_height(&self) -> Option<f64> {
        match self {
            Management::None => None,
            Management::Grazing {
                residual_height, ..
            }
            | Management::Cutting {
                residual_height, ..
            } => Some(*residual_height),
        }
    }

    /// Green biomass above the residual needed before the herd enters (kg DM ha⁻¹).
    pub fn grazing_demand(&self) -> Option<f64> {
        match self {
            Management::Grazing {
                stocking_rate,
                intake_per_livestock_unit,
                rotation_length,
                ..
            } => Some(stocking_rate * intake_per_livestock_unit * rotation_length),
            _ => None,
        }
    }

    fn validate(&self) -> ModVegeResult<()> {
        if let Some(height) = self.residual_height() {
            if !(height >= 0.0) || !height.is_finite() {
                return Err(invalid("residual_height", height, "must be non-negative"));
            }
        }
        match self {
            Management::None => Ok(()),
            Management::Grazing {
                stocking_rate,
                intake_per_livestock_unit,
                rotation_length,
                season_start,
                season_end,
                ..
            } => {
                for (name, value) in [
                    ("stocking_rate", *stocking_rate),
                    ("intake_per_livestock_unit", *intake_per_livestock_unit),
                    ("rotation_length", *rotation_length),
                ] {
                    if !(value > 0.0) || !value.is_finite() {
                        return Err(invalid(name, value, "must be positive"));
                    }
                }
                validate_day_of_year("season_start", *season_start)?;
                validate_day_of_year("season_end", *season_end)?;
                if season_start > season_end {
                    return Err(invalid(
                        "season_start",
                        *season_start as f64,
                        "grazing season must not end before it starts",
                    ));
                }
                Ok(())
            }
            Management::Cutting { schedule, .. } => match schedule {
                CutSchedule::Calendar { days } => days
                    .iter()
                    .try_for_each(|day| validate_day_of_year("cut day", *day)),
                CutSchedule::Threshold {
                    standing_biomass, ..
                } => {
                    if !(*standing_biomass > 0.0) || !standing_biomass.is_finite() {
                        Err(invalid(
                            "standing_biomass",
                            *standing_biomass,
                            "cut threshold must be positive",
                        ))
                    } else {
                        Ok(())
                    }
                }
            },
        }
    }
}

fn validate_day_of_year(name: &'static str, day: u32) -> ModVegeResult<()> {
    if (1..=366).contains(&day) {
        Ok(())
    } else {
        Err(invalid(name, day as f64, "day of year must lie in [1, 366]"))
    }
}

fn invalid(name: &'static str, value: f64, reason: &str) -> ModVegeError {
    ModVegeError::InvalidParameter {
        name,
        value,
        reason: reason.to_string(),
    }
}
