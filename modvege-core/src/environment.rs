//! Environmental response functions
//!
//! Pure functions mapping weather, canopy and phenological position to the
//! dimensionless factors that limit potential growth, plus the age and
//! digestibility curves used by the daily step.
//!
//! # Growth
//!
//! $$\text{GRO} = \text{PGRO} \times \text{ENV} \times \text{SEA}$$
//!
//! $$\text{PGRO} = \text{PAR} \times \text{RUE}_{max} \times (1 - e^{-k \cdot \text{LAI}}) \times 10$$
//!
//! $$\text{ENV} = \max(f(T) \times \text{NI} \times f(\text{PAR}) \times f(W), \text{floor})$$

use crate::constants::ModelConstants;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Temperature response of growth.
///
/// Piecewise linear: zero below T0, rising to one at T1, a plateau of one up to T2,
/// then falling to zero at the maximum growth temperature.
pub fn temperature_function(temperature: f64, constants: &ModelConstants) -> f64 {
    let t0 = constants.min_growth_temperature;
    let t1 = constants.lower_optimum_temperature;
    let t2 = constants.upper_optimum_temperature;
    let t_max = constants.max_growth_temperature;

    if temperature < t0 || temperature >= t_max {
        0.0
    } else if temperature < t1 {
        (temperature - t0) / (t1 - t0)
    } else if temperature <= t2 {
        1.0
    } else {
        (t_max - temperature) / (t_max - t2)
    }
}

/// Water stress factor in [0, 1].
///
/// `water_ratio` is the water reserve divided by the holding capacity. The shape of the
/// curve depends on atmospheric demand: the higher the PET, the earlier the sward is
/// limited as the soil dries.
pub fn water_stress(water_ratio: f64, pet: f64, constants: &ModelConstants) -> f64 {
    let w = water_ratio.clamp(0.0, 1.0);
    // (W, f(W)) breakpoints; beyond the last one the sward is unstressed
    let curve: &[(f64, f64)] = if pet < constants.pet_low_threshold {
        &[(0.0, 0.0), (0.2, 0.8), (0.4, 1.0)]
    } else if pet <= constants.pet_high_threshold {
        &[(0.0, 0.0), (0.2, 0.4), (0.6, 1.0)]
    } else {
        &[(0.0, 0.0), (0.4, 0.4), (0.8, 1.0)]
    };
    piecewise_linear(w, curve)
}

fn piecewise_linear(x: f64, points: &[(f64, f64)]) -> f64 {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x < x1 {
            return y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        }
    }
    points.last().map_or(1.0, |(_, y)| *y)
}

/// Seasonal effect on growth as a function of the annual sum of temperatures.
///
/// Encodes the spring flush: minimum until 200 °C d, ramping to the maximum by
/// ST1 - 200, held until ST1 - 100, then declining back to the minimum at ST2.
pub fn seasonal_effect(sum_temperature: f64, constants: &ModelConstants) -> f64 {
    let min = constants.min_seasonal_effect;
    let max = constants.max_seasonal_effect;
    let st1 = constants.st1;
    let st2 = constants.st2;

    if sum_temperature < 200.0 {
        min
    } else if sum_temperature < st1 - 200.0 {
        min + (max - min) * (sum_temperature - 200.0) / (st1 - 400.0)
    } else if sum_temperature <= st1 - 100.0 {
        max
    } else if sum_temperature <= st2 {
        max + (min - max) * (sum_temperature - st1 + 100.0) / (st2 - st1 + 100.0)
    } else {
        min
    }
}

/// Nitrogen response: growth scales linearly with the nitrogen nutritional index.
pub fn nitrogen_response(nitrogen_index: f64) -> f64 {
    nitrogen_index
}

/// Radiation use efficiency response to incident PAR.
pub fn par_function(par: f64, constants: &ModelConstants) -> f64 {
    if par < constants.par_saturation_threshold {
        1.0
    } else {
        (1.0 - constants.par_decline_slope * (par - constants.par_saturation_threshold)).max(0.0)
    }
}

/// Leaf area index from green vegetative biomass (kg DM ha⁻¹).
pub fn leaf_area_index(bm_gv: f64, constants: &ModelConstants) -> f64 {
    constants.specific_leaf_area * constants.lamina_fraction * bm_gv / 10.0
}

/// Fraction of incident light intercepted by the canopy.
pub fn light_interception(lai: f64, constants: &ModelConstants) -> f64 {
    1.0 - (-constants.light_extinction * lai).exp()
}

/// Potential growth (kg DM ha⁻¹ day⁻¹) before environmental limitation.
pub fn potential_growth(par: f64, lai: f64, constants: &ModelConstants) -> f64 {
    par * constants.max_radiation_use_efficiency * light_interception(lai, constants) * 10.0
}

/// Actual evapotranspiration (mm day⁻¹), limited by canopy cover.
pub fn actual_evapotranspiration(pet: f64, lai: f64) -> f64 {
    pet.min(pet * lai / 3.0)
}

/// Combine the multiplicative limitation factors, bounded below by the configured floor.
pub fn environmental_limitation(
    f_temperature: f64,
    f_nitrogen: f64,
    f_par: f64,
    f_water: f64,
    constants: &ModelConstants,
) -> f64 {
    (f_temperature * f_nitrogen * f_par * f_water).max(constants.environment_floor)
}

/// Share of growth allocated to reproductive tissue during the reproductive period.
pub fn reproductive_fraction(nitrogen_index: f64) -> f64 {
    0.25 + 0.75 * (nitrogen_index - 0.35) / 0.65
}

/// Senescence multiplier from relative age (age divided by the compartment lifespan).
pub fn senescence_age_factor(relative_age: f64) -> f64 {
    if relative_age < 1.0 / 3.0 {
        1.0
    } else if relative_age < 1.0 {
        3.0 * relative_age
    } else {
        3.0
    }
}

/// Abscission multiplier from relative age.
pub fn abscission_age_factor(relative_age: f64) -> f64 {
    if relative_age < 1.0 / 3.0 {
        1.0
    } else if relative_age < 2.0 / 3.0 {
        2.0
    } else {
        3.0
    }
}

/// Organic matter digestibility of each compartment.
///
/// Green tissue loses digestibility linearly with age down to its minimum; dead
/// tissue has constant digestibility.
pub fn digestibility(ages: [f64; 4], constants: &ModelConstants) -> [f64; 4] {
    let c = constants;
    let omd_gv = (c.max_omd_gv - ages[0] * (c.max_omd_gv - c.min_omd_gv) / c.leaf_lifespan)
        .max(c.min_omd_gv);
    let omd_gr = (c.max_omd_gr
        - ages[1] * (c.max_omd_gr - c.min_omd_gr) / c.reproductive_period())
    .max(c.min_omd_gr);
    [omd_gv, omd_gr, c.omd_dv, c.omd_dr]
}

/// Running mean of daily temperature over a fixed window.
///
/// Until the window fills, the mean is taken over the days seen so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureWindow {
    capacity: usize,
    values: VecDeque<f64>,
}

impl TemperatureWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Add today's temperature and return the updated mean.
    pub fn push(&mut self, temperature: f64) -> f64 {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(temperature);
        self.mean()
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            f64::NAN
        } else {
            self.values.iter().sum::<f64>() / self.values.len() as f64
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn c() -> ModelConstants {
        ModelConstants::default()
    }

    // ===== Temperature =====

    #[test]
    fn test_temperature_function_breakpoints() {
        let c = c();
        assert_eq!(temperature_function(3.99, &c), 0.0);
        assert_eq!(temperature_function(4.0, &c), 0.0);
        assert!(is_close!(temperature_function(7.0, &c), 0.5));
        assert_eq!(temperature_function(10.0, &c), 1.0);
        assert_eq!(temperature_function(15.0, &c), 1.0);
        assert_eq!(temperature_function(20.0, &c), 1.0);
        assert!(is_close!(temperature_function(30.0, &c), 0.5));
        assert_eq!(temperature_function(40.0, &c), 0.0);
        assert_eq!(temperature_function(-5.0, &c), 0.0);
    }

    // ===== Water stress =====

    #[test]
    fn test_water_stress_empty_and_full_reserve() {
        let c = c();
        for pet in [1.0, 5.0, 8.0] {
            assert_eq!(water_stress(0.0, pet, &c), 0.0);
            assert_eq!(water_stress(1.0, pet, &c), 1.0);
        }
    }

    #[test]
    fn test_water_stress_low_demand_curve() {
        let c = c();
        assert!(is_close!(water_stress(0.1, 2.0, &c), 0.4));
        assert!(is_close!(water_stress(0.2, 2.0, &c), 0.8));
        assert!(is_close!(water_stress(0.3, 2.0, &c), 0.9));
        assert_eq!(water_stress(0.4, 2.0, &c), 1.0);
    }

    #[test]
    fn test_water_stress_higher_demand_is_more_limiting() {
        let c = c();
        for w in [0.1, 0.3, 0.5, 0.7] {
            let low = water_stress(w, 2.0, &c);
            let mid = water_stress(w, 5.0, &c);
            let high = water_stress(w, 7.0, &c);
            assert!(low >= mid && mid >= high, "w={}: {} {} {}", w, low, mid, high);
        }
        assert!(is_close!(water_stress(0.6, 7.0, &c), 0.7));
    }

    #[test]
    fn test_water_stress_clamps_ratio() {
        let c = c();
        assert_eq!(water_stress(-0.5, 2.0, &c), 0.0);
        assert_eq!(water_stress(1.5, 7.0, &c), 1.0);
    }

    // ===== Seasonal effect =====

    #[test]
    fn test_seasonal_effect_shape() {
        let c = c();
        assert!(is_close!(seasonal_effect(0.0, &c), 0.6));
        assert!(is_close!(seasonal_effect(199.0, &c), 0.6));
        assert!(is_close!(seasonal_effect(300.0, &c), 0.9));
        assert!(is_close!(seasonal_effect(400.0, &c), 1.2));
        assert!(is_close!(seasonal_effect(500.0, &c), 1.2));
        assert!(is_close!(seasonal_effect(1200.0, &c), 0.6));
        assert!(is_close!(seasonal_effect(2500.0, &c), 0.6));
    }

    #[test]
    fn test_seasonal_effect_bounded() {
        let c = c();
        let mut st = 0.0;
        while st < 3000.0 {
            let sea = seasonal_effect(st, &c);
            assert!(
                (c.min_seasonal_effect..=c.max_seasonal_effect).contains(&sea),
                "SEA({}) = {}",
                st,
                sea
            );
            st += 7.5;
        }
    }

    // ===== Canopy and light =====

    #[test]
    fn test_leaf_area_index() {
        let c = c();
        assert!(is_close!(leaf_area_index(1000.0, &c), 2.244));
        assert_eq!(leaf_area_index(0.0, &c), 0.0);
    }

    #[test]
    fn test_potential_growth_saturates() {
        let c = c();
        assert_eq!(potential_growth(10.0, 0.0, &c), 0.0);
        let dense = potential_growth(10.0, 20.0, &c);
        assert!((dense - 300.0).abs() < 1e-2);
        assert!(potential_growth(10.0, 2.0, &c) < dense);
    }

    #[test]
    fn test_par_function() {
        let c = c();
        assert_eq!(par_function(4.0, &c), 1.0);
        assert!(is_close!(par_function(15.0, &c), 0.555));
        assert_eq!(par_function(100.0, &c), 0.0);
    }

    #[test]
    fn test_actual_evapotranspiration_limited_by_lai() {
        assert!(is_close!(actual_evapotranspiration(3.0, 1.5), 1.5));
        assert_eq!(actual_evapotranspiration(3.0, 4.0), 3.0);
        assert_eq!(actual_evapotranspiration(3.0, 0.0), 0.0);
    }

    // ===== Combination and allocation =====

    #[test]
    fn test_environmental_limitation_floor() {
        let mut c = c();
        assert_eq!(environmental_limitation(1.0, 0.8, 1.0, 0.0, &c), 0.0);
        c.environment_floor = 0.05;
        assert_eq!(environmental_limitation(1.0, 0.8, 1.0, 0.0, &c), 0.05);
        assert!(is_close!(environmental_limitation(0.5, 0.8, 1.0, 1.0, &c), 0.4));
    }

    #[test]
    fn test_nitrogen_response_linear() {
        assert_eq!(nitrogen_response(0.35), 0.35);
        assert_eq!(nitrogen_response(1.0), 1.0);
    }

    #[test]
    fn test_reproductive_fraction_range() {
        assert!(is_close!(reproductive_fraction(0.35), 0.25));
        assert!(is_close!(reproductive_fraction(1.0), 1.0));
    }

    #[test]
    fn test_age_factors() {
        assert_eq!(senescence_age_factor(0.0), 1.0);
        assert!(is_close!(senescence_age_factor(0.5), 1.5));
        assert_eq!(senescence_age_factor(2.0), 3.0);
        assert_eq!(abscission_age_factor(0.0), 1.0);
        assert_eq!(abscission_age_factor(0.5), 2.0);
        assert_eq!(abscission_age_factor(0.9), 3.0);
    }

    #[test]
    fn test_digestibility_declines_with_age() {
        let c = c();
        let young = digestibility([0.0; 4], &c);
        assert!(is_close!(young[0], 0.9));
        assert!(is_close!(young[1], 0.9));

        let mid = digestibility([250.0, 300.0, 0.0, 0.0], &c);
        assert!(is_close!(mid[0], 0.825));
        assert!(is_close!(mid[1], 0.775));

        let old = digestibility([5000.0, 5000.0, 5000.0, 5000.0], &c);
        assert_eq!(old, [0.75, 0.65, 0.45, 0.40]);
    }

    // ===== Temperature window =====

    #[test]
    fn test_temperature_window_partial_and_full() {
        let mut window = TemperatureWindow::new(3);
        assert!(window.mean().is_nan());
        assert!(is_close!(window.push(3.0), 3.0));
        assert!(is_close!(window.push(6.0), 4.5));
        assert!(is_close!(window.push(9.0), 6.0));
        assert!(is_close!(window.push(12.0), 9.0));
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_single_day_window_tracks_daily_temperature() {
        let mut window = TemperatureWindow::new(1);
        window.push(10.0);
        assert_eq!(window.push(-5.0), -5.0);
    }
}
