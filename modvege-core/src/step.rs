//! Daily transition step
//!
//! Advances one cell's [`CompartmentState`] by one day.
//!
//! # Algorithm
//!
//! For each day, in order:
//!
//! 1. Leaf area index from green vegetative biomass, potential growth from PAR
//! 2. Environmental limitation and seasonal effect, giving actual growth
//! 3. Partition growth between GV and GR with the reproductive fraction
//! 4. Senescence of GV and GR into DV and DR, less respiration losses
//! 5. Abscission of DV and DR to litter
//! 6. Age update, blending carried-over and new tissue
//! 7. Water reserve update
//! 8. Grazing or cutting down to the residual height
//! 9. Diagnostics and annual accumulators
//!
//! Mass balance of the green and dead pools on a day without offtake:
//!
//! $$\Delta(GV + GR) = GRO - SEN_{GV} - SEN_{GR}$$
//!
//! $$\Delta(DV + DR) = (1 - \sigma_{GV}) SEN_{GV} + (1 - \sigma_{GR}) SEN_{GR} - ABS_{DV} - ABS_{DR}$$

use crate::accumulator::AnnualAccumulator;
use crate::constants::ModelConstants;
use crate::environment::{
    abscission_age_factor, actual_evapotranspiration, digestibility, environmental_limitation,
    leaf_area_index, nitrogen_response, par_function, potential_growth, reproductive_fraction,
    seasonal_effect, senescence_age_factor, temperature_function, water_stress,
};
use crate::errors::ModVegeResult;
use crate::management::{remove_to_residual, triggered, Offtake};
use crate::output::DailyOutput;
use crate::site::SiteParameters;
use crate::state::{Compartment, CompartmentState};
use crate::weather::WeatherDay;
use chrono::Datelike;
use log::trace;

/// Result of advancing one day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub state: CompartmentState,
    pub accumulator: AnnualAccumulator,
    pub output: DailyOutput,
    pub offtake: Option<Offtake>,
}

/// The daily transition for one parameterisation of one cell.
#[derive(Debug, Clone, Copy)]
pub struct DailyStep<'a> {
    constants: &'a ModelConstants,
    site: &'a SiteParameters,
}

impl<'a> DailyStep<'a> {
    /// Both arguments are assumed to be validated.
    pub fn new(constants: &'a ModelConstants, site: &'a SiteParameters) -> Self {
        Self { constants, site }
    }

    /// Advance `state` through `day`.
    ///
    /// `mean_temperature` is the running mean used by the temperature function; pass
    /// `day.temperature` to drive growth with the daily value. The accumulator is rolled
    /// over when `day` starts a new calendar year.
    ///
    /// Fails with `InvariantViolation` if the resulting state is not physically valid.
    pub fn advance(
        &self,
        state: &CompartmentState,
        accumulator: &AnnualAccumulator,
        day: &WeatherDay,
        mean_temperature: f64,
    ) -> ModVegeResult<StepOutcome> {
        let c = self.constants;
        let site = self.site;
        let t = day.temperature;

        let mut accumulator = *accumulator;
        accumulator.roll_to(day.date.year());
        accumulator.add_thermal_time(t, c.sum_temperature_base);
        let st = accumulator.sum_temperature;

        // 1. Canopy and potential growth
        let lai = leaf_area_index(state.gv.biomass, c);
        let pgro = potential_growth(day.par, lai, c);

        // 2. Limitation
        let f_water = water_stress(
            state.water_reserve / site.water_holding_capacity,
            day.pet,
            c,
        );
        let env = environmental_limitation(
            temperature_function(mean_temperature, c),
            nitrogen_response(site.nitrogen_index),
            par_function(day.par, c),
            f_water,
            c,
        );
        let sea = seasonal_effect(st, c);
        let gro = pgro * env * sea;

        // 3. Allocation
        let rep = self.reproductive_allocation(st, &accumulator);
        let gro_gv = gro * (1.0 - rep);
        let gro_gr = gro * rep;

        // 4. Senescence
        let sen_gv = senescence(
            &state.gv,
            t,
            c.senescence_rate_gv,
            c.frost_senescence_rate_gv,
            c.leaf_lifespan,
            c,
        );
        let sen_gr = senescence(
            &state.gr,
            t,
            c.senescence_rate_gr,
            c.frost_senescence_rate_gr,
            c.reproductive_period(),
            c,
        );
        let to_dv = (1.0 - c.respiration_loss_gv) * sen_gv;
        let to_dr = (1.0 - c.respiration_loss_gr) * sen_gr;

        // 5. Abscission
        let abs_dv = abscission(&state.dv, t, c.abscission_rate_dv, c.leaf_lifespan);
        let abs_dr = abscission(&state.dr, t, c.abscission_rate_dr, c.reproductive_period());

        // 6. Mass and age
        let thermal_time = t.max(0.0);
        let gv = advance_compartment(&state.gv, sen_gv, gro_gv, thermal_time);
        let gr = advance_compartment(&state.gr, sen_gr, gro_gr, thermal_time);
        let dv = advance_compartment(&state.dv, abs_dv, to_dv, thermal_time);
        let dr = advance_compartment(&state.dr, abs_dr, to_dr, thermal_time);

        // 7. Water
        let aet = actual_evapotranspiration(day.pet, lai);
        let water_reserve = (state.water_reserve + day.precipitation - aet)
            .clamp(0.0, site.water_holding_capacity);

        let mut next = CompartmentState {
            gv,
            gr,
            dv,
            dr,
            water_reserve,
        };

        // 8. Management
        let offtake = match (
            triggered(
                &site.management,
                &next,
                day.date.ordinal(),
                &accumulator,
                c,
            ),
            site.management.residual_height(),
        ) {
            (Some(kind), Some(height)) => {
                let offtake = remove_to_residual(&mut next, height, kind, c);
                accumulator.record_event(offtake.ingested(), offtake.harvested());
                trace!(
                    "{}: {:?} removed {:.1} kg DM/ha",
                    day.date,
                    kind,
                    offtake.total()
                );
                Some(offtake)
            }
            _ => None,
        };

        next.check(day.date, site)?;

        // 9. Diagnostics
        let biomass = next.biomass();
        let omd = digestibility(next.ages(), c);
        let bm = next.total_biomass();
        let weighted_omd = if bm > 0.0 {
            biomass.iter().zip(omd.iter()).map(|(b, o)| b * o).sum::<f64>() / bm
        } else {
            0.0
        };

        let output = DailyOutput {
            date: day.date,
            spin_up: false,
            pgro,
            gro,
            env,
            sea,
            lai,
            aet,
            st,
            sen_gv,
            sen_gr,
            abs_dv,
            abs_dr,
            bm,
            bm_gv: next.gv.biomass,
            bm_gr: next.gr.biomass,
            bm_dv: next.dv.biomass,
            bm_dr: next.dr.biomass,
            age_gv: next.gv.age,
            age_gr: next.gr.age,
            age_dv: next.dv.age,
            age_dr: next.dr.age,
            omd_gv: omd[0],
            omd_gr: omd[1],
            omd_dv: omd[2],
            omd_dr: omd[3],
            omd: weighted_omd,
            wr: next.water_reserve,
            i_bm: offtake.map_or(0.0, |o| o.ingested()),
            h_bm: offtake.map_or(0.0, |o| o.harvested()),
            c_bm: accumulator.cumulative_offtake(),
        };

        Ok(StepOutcome {
            state: next,
            accumulator,
            output,
            offtake,
        })
    }

    /// Fraction of today's growth allocated to the reproductive compartment.
    ///
    /// Non-zero only between ST1 and ST2. After a grazing or cut it restarts from zero
    /// and recovers linearly over `reproductive_recovery` degree-days.
    pub fn reproductive_allocation(&self, st: f64, accumulator: &AnnualAccumulator) -> f64 {
        let c = self.constants;
        if st < c.st1 || st > c.st2 {
            return 0.0;
        }
        let rep = reproductive_fraction(self.site.nitrogen_index);
        match accumulator.last_event_sum_temperature {
            Some(st_event) => rep * ((st - st_event) / c.reproductive_recovery).clamp(0.0, 1.0),
            None => rep,
        }
    }
}

/// Senescence of a green compartment, capped at its biomass.
///
/// Warm days (above T0) senesce with thermal time and age; freezing days senesce with
/// the frost rate in proportion to the frost intensity.
fn senescence(
    compartment: &Compartment,
    temperature: f64,
    rate: f64,
    frost_rate: f64,
    lifespan: f64,
    constants: &ModelConstants,
) -> f64 {
    let bm = compartment.biomass;
    let sen = if temperature > constants.min_growth_temperature {
        rate * bm * temperature * senescence_age_factor(compartment.age / lifespan)
    } else if temperature < 0.0 {
        frost_rate * bm * temperature.abs()
    } else {
        0.0
    };
    sen.min(bm)
}

/// Abscission of a dead compartment, capped at its biomass.
fn abscission(compartment: &Compartment, temperature: f64, rate: f64, lifespan: f64) -> f64 {
    let bm = compartment.biomass;
    if temperature > 0.0 {
        (rate * bm * temperature * abscission_age_factor(compartment.age / lifespan)).min(bm)
    } else {
        0.0
    }
}

fn advance_compartment(
    compartment: &Compartment,
    loss: f64,
    gain: f64,
    thermal_time: f64,
) -> Compartment {
    let carried = compartment.biomass - loss;
    Compartment {
        biomass: carried + gain,
        age: compartment.blended_age(carried, gain, thermal_time),
    }
}
