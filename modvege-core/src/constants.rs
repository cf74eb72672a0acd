//! Model constants
//!
//! Species- and model-level constants for the ModVege grass growth model.
//! These are immutable for a run and passed explicitly to every response
//! function and to the daily step, so several parameterisations can run
//! side by side.
//!
//! # Reference
//!
//! Jouven, M., Carrère, P. and Baumont, R. (2006). Model predicting dynamics
//! of biomass, structure and digestibility of herbage in managed permanent
//! pastures. 1. Model description. Grass and Forage Science, 61, 112-124.

use crate::errors::{ModVegeError, ModVegeResult};
use serde::{Deserialize, Serialize};

/// Constants of the ModVege model.
///
/// Grouped by process:
///
/// ```text
///   PAR ──> [LAI, RUE] ──> PGRO ──> x ENV x SEA ──> GRO ──> GV / GR
///                                                           │ senescence
///                                                           v
///                                                        DV / DR ──> abscission (litter)
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    /// Minimum temperature for growth (T0)
    /// unit: °C
    /// default: 4.0
    pub min_growth_temperature: f64,

    /// Temperature at which the growth response reaches its plateau (T1)
    /// unit: °C
    /// default: 10.0
    pub lower_optimum_temperature: f64,

    /// Temperature at which the growth plateau ends (T2)
    /// unit: °C
    /// default: 20.0
    pub upper_optimum_temperature: f64,

    /// Temperature at and above which growth stops
    /// unit: °C
    /// default: 40.0
    pub max_growth_temperature: f64,

    /// Number of days in the running mean used by the temperature function
    /// A value of 1 uses the daily temperature directly.
    /// default: 10
    pub temperature_window_days: usize,

    /// Specific leaf area
    /// unit: m² g⁻¹
    /// default: 0.033
    pub specific_leaf_area: f64,

    /// Fraction of green vegetative biomass that is leaf lamina
    /// unit: dimensionless
    /// default: 0.68
    pub lamina_fraction: f64,

    /// Maximum radiation use efficiency
    /// unit: g DM MJ⁻¹
    /// default: 3.0
    pub max_radiation_use_efficiency: f64,

    /// Light extinction coefficient for canopy interception
    /// unit: dimensionless
    /// default: 0.6
    pub light_extinction: f64,

    /// PAR above which radiation use efficiency declines
    /// unit: MJ m⁻² day⁻¹
    /// default: 5.0
    pub par_saturation_threshold: f64,

    /// Rate of decline of radiation use efficiency above the saturation threshold
    /// unit: m² day MJ⁻¹
    /// default: 0.0445
    pub par_decline_slope: f64,

    /// Base temperature of the annual sum of temperatures
    /// unit: °C
    /// default: 0.0
    pub sum_temperature_base: f64,

    /// Sum of temperatures at the onset of reproductive growth (ST1)
    /// unit: °C d
    /// default: 600.0
    pub st1: f64,

    /// Sum of temperatures at the end of reproductive growth (ST2)
    /// unit: °C d
    /// default: 1200.0
    pub st2: f64,

    /// Minimum of the seasonal effect
    /// default: 0.6
    pub min_seasonal_effect: f64,

    /// Maximum of the seasonal effect
    /// default: 1.2
    pub max_seasonal_effect: f64,

    /// Leaf lifespan (LLS)
    /// unit: °C d
    /// default: 500.0
    pub leaf_lifespan: f64,

    /// Senescence rate of green vegetative biomass on warm days
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.002
    pub senescence_rate_gv: f64,

    /// Senescence rate of green reproductive biomass on warm days
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.001
    pub senescence_rate_gr: f64,

    /// Senescence rate of green vegetative biomass on freezing days
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.002
    pub frost_senescence_rate_gv: f64,

    /// Senescence rate of green reproductive biomass on freezing days
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.001
    pub frost_senescence_rate_gr: f64,

    /// Abscission rate of dead vegetative biomass
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.001
    pub abscission_rate_dv: f64,

    /// Abscission rate of dead reproductive biomass
    /// unit: °C⁻¹ day⁻¹
    /// default: 0.0005
    pub abscission_rate_dr: f64,

    /// Fraction of senesced green vegetative biomass lost to respiration
    /// default: 0.4
    pub respiration_loss_gv: f64,

    /// Fraction of senesced green reproductive biomass lost to respiration
    /// default: 0.2
    pub respiration_loss_gr: f64,

    /// Bulk density of green vegetative biomass
    /// unit: g DM m⁻³
    /// default: 850.0
    pub bulk_density_gv: f64,

    /// Bulk density of green reproductive biomass
    /// unit: g DM m⁻³
    /// default: 300.0
    pub bulk_density_gr: f64,

    /// Bulk density of dead vegetative biomass
    /// unit: g DM m⁻³
    /// default: 500.0
    pub bulk_density_dv: f64,

    /// Bulk density of dead reproductive biomass
    /// unit: g DM m⁻³
    /// default: 150.0
    pub bulk_density_dr: f64,

    /// Digestibility of new green vegetative tissue
    /// default: 0.90
    pub max_omd_gv: f64,

    /// Digestibility of green vegetative tissue at the end of its lifespan
    /// default: 0.75
    pub min_omd_gv: f64,

    /// Digestibility of new green reproductive tissue
    /// default: 0.90
    pub max_omd_gr: f64,

    /// Digestibility of green reproductive tissue at the end of flowering
    /// default: 0.65
    pub min_omd_gr: f64,

    /// Digestibility of dead vegetative biomass
    /// default: 0.45
    pub omd_dv: f64,

    /// Digestibility of dead reproductive biomass
    /// default: 0.40
    pub omd_dr: f64,

    /// Lower bound of the combined environmental limitation factor
    /// default: 0.0
    pub environment_floor: f64,

    /// Thermal time for the reproductive fraction to recover after a grazing or cut
    /// unit: °C d
    /// default: 200.0
    pub reproductive_recovery: f64,

    /// PET below which the low-demand water stress curve applies
    /// unit: mm day⁻¹
    /// default: 3.8
    pub pet_low_threshold: f64,

    /// PET above which the high-demand water stress curve applies
    /// unit: mm day⁻¹
    /// default: 6.5
    pub pet_high_threshold: f64,
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            // Temperature response
            min_growth_temperature: 4.0,
            lower_optimum_temperature: 10.0,
            upper_optimum_temperature: 20.0,
            max_growth_temperature: 40.0,
            temperature_window_days: 10,

            // Canopy and light
            specific_leaf_area: 0.033,
            lamina_fraction: 0.68,
            max_radiation_use_efficiency: 3.0,
            light_extinction: 0.6,
            par_saturation_threshold: 5.0,
            par_decline_slope: 0.0445,

            // Phenology
            sum_temperature_base: 0.0,
            st1: 600.0,
            st2: 1200.0,
            min_seasonal_effect: 0.6,
            max_seasonal_effect: 1.2,
            leaf_lifespan: 500.0,

            // Turnover
            senescence_rate_gv: 0.002,
            senescence_rate_gr: 0.001,
            frost_senescence_rate_gv: 0.002,
            frost_senescence_rate_gr: 0.001,
            abscission_rate_dv: 0.001,
            abscission_rate_dr: 0.0005,
            respiration_loss_gv: 0.4,
            respiration_loss_gr: 0.2,

            // Structure
            bulk_density_gv: 850.0,
            bulk_density_gr: 300.0,
            bulk_density_dv: 500.0,
            bulk_density_dr: 150.0,

            // Digestibility
            max_omd_gv: 0.90,
            min_omd_gv: 0.75,
            max_omd_gr: 0.90,
            min_omd_gr: 0.65,
            omd_dv: 0.45,
            omd_dr: 0.40,

            environment_floor: 0.0,
            reproductive_recovery: 200.0,
            pet_low_threshold: 3.8,
            pet_high_threshold: 6.5,
        }
    }
}

impl ModelConstants {
    /// Length of the reproductive period in thermal time (ST2 - ST1).
    pub fn reproductive_period(&self) -> f64 {
        self.st2 - self.st1
    }

    /// Biomass left behind in each compartment when cut or grazed to `height`.
    ///
    /// Returned as `[GV, GR, DV, DR]` in kg DM ha⁻¹.
    pub fn residual_biomass(&self, height: f64) -> [f64; 4] {
        // m x g m⁻³ = g m⁻², x 10 = kg ha⁻¹
        [
            self.bulk_density_gv,
            self.bulk_density_gr,
            self.bulk_density_dv,
            self.bulk_density_dr,
        ]
        .map(|bd| height * bd * 10.0)
    }

    /// Every floating point constant with its field name.
    fn named_values(&self) -> [(&'static str, f64); 38] {
        [
            ("min_growth_temperature", self.min_growth_temperature),
            ("lower_optimum_temperature", self.lower_optimum_temperature),
            ("upper_optimum_temperature", self.upper_optimum_temperature),
            ("max_growth_temperature", self.max_growth_temperature),
            ("specific_leaf_area", self.specific_leaf_area),
            ("lamina_fraction", self.lamina_fraction),
            (
                "max_radiation_use_efficiency",
                self.max_radiation_use_efficiency,
            ),
            ("light_extinction", self.light_extinction),
            ("par_saturation_threshold", self.par_saturation_threshold),
            ("par_decline_slope", self.par_decline_slope),
            ("sum_temperature_base", self.sum_temperature_base),
            ("st1", self.st1),
            ("st2", self.st2),
            ("min_seasonal_effect", self.min_seasonal_effect),
            ("max_seasonal_effect", self.max_seasonal_effect),
            ("leaf_lifespan", self.leaf_lifespan),
            ("senescence_rate_gv", self.senescence_rate_gv),
            ("senescence_rate_gr", self.senescence_rate_gr),
            ("frost_senescence_rate_gv", self.frost_senescence_rate_gv),
            ("frost_senescence_rate_gr", self.frost_senescence_rate_gr),
            ("abscission_rate_dv", self.abscission_rate_dv),
            ("abscission_rate_dr", self.abscission_rate_dr),
            ("respiration_loss_gv", self.respiration_loss_gv),
            ("respiration_loss_gr", self.respiration_loss_gr),
            ("bulk_density_gv", self.bulk_density_gv),
            ("bulk_density_gr", self.bulk_density_gr),
            ("bulk_density_dv", self.bulk_density_dv),
            ("bulk_density_dr", self.bulk_density_dr),
            ("max_omd_gv", self.max_omd_gv),
            ("min_omd_gv", self.min_omd_gv),
            ("max_omd_gr", self.max_omd_gr),
            ("min_omd_gr", self.min_omd_gr),
            ("omd_dv", self.omd_dv),
            ("omd_dr", self.omd_dr),
            ("environment_floor", self.environment_floor),
            ("reproductive_recovery", self.reproductive_recovery),
            ("pet_low_threshold", self.pet_low_threshold),
            ("pet_high_threshold", self.pet_high_threshold),
        ]
    }

    /// Check internal consistency.
    ///
    /// Every constant must be finite; ordering checks run after that.
    pub fn validate(&self) -> ModVegeResult<()> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(invalid(name, value, "must be finite"));
            }
        }

        let temperatures = [
            self.min_growth_temperature,
            self.lower_optimum_temperature,
            self.upper_optimum_temperature,
            self.max_growth_temperature,
        ];
        if temperatures.windows(2).any(|w| !(w[0] < w[1])) {
            return Err(invalid(
                "lower_optimum_temperature",
                self.lower_optimum_temperature,
                "temperature breakpoints must be strictly increasing",
            ));
        }
        if self.temperature_window_days == 0 {
            return Err(invalid(
                "temperature_window_days",
                0.0,
                "window must contain at least one day",
            ));
        }
        if !(self.st1 > 400.0 && self.st1 < self.st2) {
            // The seasonal effect ramps between 200 and ST1 - 200 °C d
            return Err(invalid(
                "st1",
                self.st1,
                "must exceed 400 and be lower than st2",
            ));
        }
        if !(self.min_seasonal_effect <= self.max_seasonal_effect) {
            return Err(invalid(
                "min_seasonal_effect",
                self.min_seasonal_effect,
                "must not exceed max_seasonal_effect",
            ));
        }
        if !(self.pet_low_threshold <= self.pet_high_threshold) {
            return Err(invalid(
                "pet_low_threshold",
                self.pet_low_threshold,
                "must not exceed pet_high_threshold",
            ));
        }

        let fractions = [
            ("lamina_fraction", self.lamina_fraction),
            ("respiration_loss_gv", self.respiration_loss_gv),
            ("respiration_loss_gr", self.respiration_loss_gr),
            ("environment_floor", self.environment_floor),
            ("max_omd_gv", self.max_omd_gv),
            ("min_omd_gv", self.min_omd_gv),
            ("max_omd_gr", self.max_omd_gr),
            ("min_omd_gr", self.min_omd_gr),
            ("omd_dv", self.omd_dv),
            ("omd_dr", self.omd_dr),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(name, value, "must lie in [0, 1]"));
            }
        }

        let positive = [
            ("specific_leaf_area", self.specific_leaf_area),
            (
                "max_radiation_use_efficiency",
                self.max_radiation_use_efficiency,
            ),
            ("light_extinction", self.light_extinction),
            ("leaf_lifespan", self.leaf_lifespan),
            ("reproductive_recovery", self.reproductive_recovery),
            ("bulk_density_gv", self.bulk_density_gv),
            ("bulk_density_gr", self.bulk_density_gr),
            ("bulk_density_dv", self.bulk_density_dv),
            ("bulk_density_dr", self.bulk_density_dr),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(name, value, "must be positive"));
            }
        }

        let rates = [
            ("senescence_rate_gv", self.senescence_rate_gv),
            ("senescence_rate_gr", self.senescence_rate_gr),
            ("frost_senescence_rate_gv", self.frost_senescence_rate_gv),
            ("frost_senescence_rate_gr", self.frost_senescence_rate_gr),
            ("abscission_rate_dv", self.abscission_rate_dv),
            ("abscission_rate_dr", self.abscission_rate_dr),
            ("par_decline_slope", self.par_decline_slope),
        ];
        for (name, value) in rates {
            if !(value >= 0.0) {
                return Err(invalid(name, value, "must be non-negative"));
            }
        }

        Ok(())
    }
}

fn invalid(name: &'static str, value: f64, reason: &str) -> ModVegeError {
    ModVegeError::InvalidParameter {
        name,
        value,
        reason: reason.to_string(),
    }
}
