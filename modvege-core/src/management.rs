//! Grazing and cutting rules.
//!
//! Both rules remove biomass after the day's growth, senescence and abscission,
//! reducing each compartment to the biomass held below the residual height.

use crate::accumulator::AnnualAccumulator;
use crate::constants::ModelConstants;
use crate::site::{CutSchedule, Management};
use crate::state::CompartmentState;
use serde::{Deserialize, Serialize};

/// How removed biomass is accounted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfftakeKind {
    /// Ingested by grazing animals (`i_bm`)
    Grazing,
    /// Harvested by cutting (`h_bm`)
    Cutting,
}

/// Biomass removed by one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offtake {
    pub kind: OfftakeKind,
    /// Removed biomass per compartment `[GV, GR, DV, DR]` (kg DM ha⁻¹)
    pub removed: [f64; 4],
}

impl Offtake {
    pub fn total(&self) -> f64 {
        self.removed.iter().sum()
    }

    pub fn ingested(&self) -> f64 {
        match self.kind {
            OfftakeKind::Grazing => self.total(),
            OfftakeKind::Cutting => 0.0,
        }
    }

    pub fn harvested(&self) -> f64 {
        match self.kind {
            OfftakeKind::Grazing => 0.0,
            OfftakeKind::Cutting => self.total(),
        }
    }
}

/// Decide whether today's management rule fires.
///
/// `state` is the sward after today's growth and turnover.
pub fn triggered(
    management: &Management,
    state: &CompartmentState,
    day_of_year: u32,
    accumulator: &AnnualAccumulator,
    constants: &ModelConstants,
) -> Option<OfftakeKind> {
    match management {
        Management::None => None,
        Management::Grazing {
            residual_height,
            season_start,
            season_end,
            ..
        } => {
            if day_of_year < *season_start || day_of_year > *season_end {
                return None;
            }
            let residual = constants.residual_biomass(*residual_height);
            let available = (state.gv.biomass - residual[0]).max(0.0)
                + (state.gr.biomass - residual[1]).max(0.0);
            let demand = management.grazing_demand()?;
            (available > 0.0 && available >= demand).then_some(OfftakeKind::Grazing)
        }
        Management::Cutting {
            residual_height,
            schedule,
        } => {
            let fires = match schedule {
                CutSchedule::Calendar { days } => days.contains(&day_of_year),
                CutSchedule::Threshold {
                    standing_biomass,
                    max_cuts,
                } => {
                    accumulator.events < *max_cuts && state.total_biomass() >= *standing_biomass
                }
            };
            let residual: f64 = constants.residual_biomass(*residual_height).iter().sum();
            (fires && state.total_biomass() > residual).then_some(OfftakeKind::Cutting)
        }
    }
}

/// Remove biomass down to the residual of each compartment.
///
/// Compartments already at or below their residual are left untouched. Ages are kept:
/// removal is uniform through the removed layer.
pub fn remove_to_residual(
    state: &mut CompartmentState,
    residual_height: f64,
    kind: OfftakeKind,
    constants: &ModelConstants,
) -> Offtake {
    let residual = constants.residual_biomass(residual_height);
    let before = state.biomass();
    let mut after = before;
    let mut removed = [0.0; 4];
    for i in 0..4 {
        if before[i] > residual[i] {
            removed[i] = before[i] - residual[i];
            after[i] = residual[i];
        }
    }
    state.set_biomass(after);
    Offtake { kind, removed }
}
