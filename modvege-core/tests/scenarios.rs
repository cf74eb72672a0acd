//! Boundary scenarios for the ModVege engine.
//!
//! Each scenario drives the full simulation with synthetic weather chosen so that one
//! process (seasonality, frost, drought, grazing, spin-up) dominates the response.

use approx::assert_relative_eq;
use chrono::{Datelike, NaiveDate};
use is_close::is_close;
use modvege_core::{
    CompartmentState, DailyOutput, Management, ModelConstants, Simulation, SiteParameters, SpinUp,
    WeatherDay, WeatherSeries,
};

fn jan1(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

fn constant_weather(
    start: NaiveDate,
    days: usize,
    t: f64,
    pp: f64,
    par: f64,
    pet: f64,
) -> WeatherSeries {
    WeatherSeries::from_columns(
        start,
        &vec![t; days],
        &vec![pp; days],
        &vec![par; days],
        &vec![pet; days],
    )
    .unwrap()
}

/// Replace the weather of the `index`th day.
fn with_day(weather: &WeatherSeries, index: usize, t: f64) -> WeatherSeries {
    let mut days = weather.days().to_vec();
    let day = days[index];
    days[index] = WeatherDay::new(day.date, t, day.precipitation, day.par, day.pet);
    WeatherSeries::new(days).unwrap()
}

fn simulation(constants: ModelConstants, site: SiteParameters) -> Simulation {
    Simulation::new(constants, site).unwrap()
}

mod steady_state {
    use super::*;

    fn rows() -> Vec<DailyOutput> {
        let weather = constant_weather(jan1(2001), 365 * 3, 15.0, 2.0, 15.0, 2.0);
        let sim = simulation(
            ModelConstants::default(),
            SiteParameters::new(120.0, 1.0, Management::None),
        );
        let output = sim.run(&weather, None, SpinUp::None).unwrap();
        output.series.rows().to_vec()
    }

    /// Under constant weather only the seasonal effect varies, so each year repeats the last.
    #[test]
    fn test_constant_weather_repeats_annually() {
        let rows = rows();
        assert_eq!(rows.len(), 365 * 3);

        for row in &rows {
            assert!(row.bm >= 0.0);
            assert!(row.bm < 20_000.0, "{}: unbounded biomass {}", row.date, row.bm);
        }

        let year = |y: usize| &rows[365 * y..365 * (y + 1)];
        let gro = |y: usize| year(y).iter().map(|r| r.gro).sum::<f64>();
        assert_relative_eq!(gro(1), gro(2), max_relative = 1e-2);

        let (end2, end3) = (&rows[365 * 2 - 1], &rows[365 * 3 - 1]);
        assert_relative_eq!(end2.bm, end3.bm, max_relative = 1e-2);
        assert_relative_eq!(end2.bm_gv, end3.bm_gv, max_relative = 1e-2);
        assert_relative_eq!(end2.age_gv, end3.age_gv, max_relative = 1e-2);
    }

    /// After the reproductive period the sward settles to a constant growth rate.
    #[test]
    fn test_growth_settles_after_reproductive_period() {
        let rows = rows();
        let late = &rows[365 * 2 + 250..365 * 2 + 364];
        let first = late[0].gro;
        assert!(first > 0.0);
        for row in late {
            assert_relative_eq!(row.gro, first, max_relative = 2e-2);
            assert_eq!(row.sea, ModelConstants::default().min_seasonal_effect);
        }
        // The spring flush lifts growth above the late-season rate
        let spring_peak = rows[365 * 2..365 * 2 + 80]
            .iter()
            .map(|r| r.gro)
            .fold(0.0, f64::max);
        assert!(spring_peak > first);
    }
}

mod frost {
    use super::*;

    fn constants() -> ModelConstants {
        ModelConstants {
            frost_senescence_rate_gv: 0.01,
            frost_senescence_rate_gr: 0.005,
            ..ModelConstants::default()
        }
    }

    /// A hard frost senesces green tissue with the frost rate and intensity.
    #[test]
    fn test_frost_day_uses_frost_rate() {
        let c = constants();
        let mild = constant_weather(jan1(2001), 60, 8.0, 2.0, 6.0, 1.0);
        let sim = simulation(c.clone(), SiteParameters::new(100.0, 0.8, Management::None));

        let frost_day = 40;
        let frosty = sim
            .run(&with_day(&mild, frost_day, -5.0), None, SpinUp::None)
            .unwrap();
        let control = sim
            .run(&with_day(&mild, frost_day, 5.0), None, SpinUp::None)
            .unwrap();
        let frosty = frosty.series.rows();
        let control = control.series.rows();

        // Identical up to the frost
        assert_eq!(frosty[frost_day - 1], control[frost_day - 1]);
        let before = &frosty[frost_day - 1];
        let (f, m) = (&frosty[frost_day], &control[frost_day]);

        assert_relative_eq!(f.sen_gv, c.frost_senescence_rate_gv * before.bm_gv * 5.0);
        assert_relative_eq!(f.sen_gr, c.frost_senescence_rate_gr * before.bm_gr * 5.0);
        // No abscission on freezing days
        assert_eq!(f.abscission(), 0.0);

        assert!(f.sen_gv > m.sen_gv);
        let dead = |r: &DailyOutput| r.bm_dv + r.bm_dr;
        let frost_increment = dead(f) - dead(before);
        let mild_increment = dead(m) - dead(before);
        assert!(
            frost_increment > mild_increment,
            "frost {} vs mild {}",
            frost_increment,
            mild_increment
        );
    }

    /// Between zero and the minimum growth temperature there is no senescence at all.
    #[test]
    fn test_cool_day_has_no_senescence() {
        let mild = constant_weather(jan1(2001), 30, 8.0, 2.0, 6.0, 1.0);
        let sim = simulation(constants(), SiteParameters::new(100.0, 0.8, Management::None));
        let output = sim
            .run(&with_day(&mild, 20, 2.0), None, SpinUp::None)
            .unwrap();
        assert_eq!(output.series.rows()[20].senescence(), 0.0);
    }
}

mod drought {
    use super::*;

    fn drought(floor: f64) -> Vec<DailyOutput> {
        let sim = simulation(
            ModelConstants {
                environment_floor: floor,
                ..ModelConstants::default()
            },
            SiteParameters::new(100.0, 0.8, Management::None),
        );
        let mut initial = CompartmentState::seed(sim.site());
        initial.gv.biomass = 1500.0;
        initial.gv.age = 150.0;
        initial.water_reserve = 5.0;

        let july = NaiveDate::from_ymd_opt(2001, 7, 1).unwrap();
        let weather = constant_weather(july, 10, 18.0, 0.0, 10.0, 7.0);
        let output = sim.run(&weather, Some(&initial), SpinUp::None).unwrap();
        output.series.rows().to_vec()
    }

    #[test]
    fn test_water_reserve_clamped_at_zero() {
        let rows = drought(0.0);
        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(row.wr, 0.0);
        }
    }

    #[test]
    fn test_growth_falls_to_floor() {
        let rows = drought(0.0);
        // An empty reserve stops growth entirely
        for row in &rows[1..] {
            assert_eq!(row.env, 0.0);
            assert_eq!(row.gro, 0.0);
        }

        let floor = 0.1;
        let rows = drought(floor);
        for row in &rows[1..] {
            assert!(is_close!(row.env, floor));
            assert!(row.gro > 0.0);
            assert_relative_eq!(row.gro, row.pgro * floor * row.sea);
        }
    }
}

mod grazing {
    use super::*;

    fn management() -> Management {
        Management::Grazing {
            residual_height: 0.05,
            stocking_rate: 2.0,
            intake_per_livestock_unit: 13.0,
            rotation_length: 20.0,
            season_start: 60,
            season_end: 300,
        }
    }

    /// Grazing fires once green biomass above residual meets the herd's demand for a rotation.
    #[test]
    fn test_grazing_removes_to_residual() {
        let weather = constant_weather(jan1(2001), 365, 15.0, 3.0, 12.0, 2.0);
        let sim = simulation(
            ModelConstants::default(),
            SiteParameters::new(120.0, 0.8, management()),
        );
        let c = sim.constants();
        let residual = c.residual_biomass(0.05);
        let demand = management().grazing_demand().unwrap();
        assert_eq!(demand, 520.0);

        let output = sim.run(&weather, None, SpinUp::None).unwrap();
        let rows = output.series.rows();
        let first = rows
            .iter()
            .position(|r| r.i_bm > 0.0)
            .expect("the sward should be grazed");
        let (before, event) = (&rows[first - 1], &rows[first]);

        assert!(event.date.ordinal() >= 60);
        assert_eq!(event.h_bm, 0.0);

        // The sward was well above residual in every compartment except possibly GR
        assert_eq!(event.bm_gv, residual[0]);
        assert_eq!(event.bm_dv, residual[2]);

        let pre = before.bm + event.gro
            - c.respiration_loss_gv * event.sen_gv
            - c.respiration_loss_gr * event.sen_gr
            - event.abscission();
        assert_relative_eq!(event.i_bm, pre - event.bm, epsilon = 1e-6);
        assert_eq!(event.c_bm, event.i_bm);

        // Regrowth must refill the demand before the next grazing
        let next = rows[first + 1..]
            .iter()
            .position(|r| r.i_bm > 0.0)
            .map(|i| i + first + 1);
        if let Some(next) = next {
            assert!(next > first + 1);
            assert!(rows[next].i_bm >= demand);
        }
    }
}

mod spin_up {
    use super::*;

    /// One year from seed biomass is enough for ages and water to stop drifting.
    #[test]
    fn test_spin_up_year_stabilises_state() {
        let weather = constant_weather(jan1(2001), 365 * 2, 15.0, 2.0, 15.0, 2.0);
        let site = SiteParameters::new(120.0, 0.9, Management::None);
        let sim = simulation(ModelConstants::default(), site);

        let output = sim.run(&weather, None, SpinUp::LeadingYear).unwrap();
        let series = &output.series;
        assert_eq!(series.spin_up_len(), 365);
        assert_eq!(series.reporting().len(), 365);

        let rows = series.rows();
        // Seed biomass is close to zero
        assert!(rows[0].bm < 100.0);

        let end_of_spin_up = &rows[364];
        let end_of_report = &rows[729];
        for (a, b) in [
            (end_of_spin_up.age_gv, end_of_report.age_gv),
            (end_of_spin_up.age_dv, end_of_report.age_dv),
            (end_of_spin_up.bm_gv, end_of_report.bm_gv),
        ] {
            assert_relative_eq!(a, b, max_relative = 1e-2);
        }

        // Last month of spin-up is flat
        let tail = &rows[335..365];
        let ages: Vec<f64> = tail.iter().map(|r| r.age_gv).collect();
        let (lo, hi) = ages
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), a| (lo.min(*a), hi.max(*a)));
        assert!((hi - lo) / hi < 2e-2, "GV age still drifting: {} to {}", lo, hi);
        assert!(tail.iter().all(|r| r.wr == 120.0));
    }

    /// Reporting discards the spin-up year in downstream columns.
    #[test]
    fn test_spin_up_rows_not_reported() {
        let weather = constant_weather(jan1(2004), 366 + 31, 10.0, 2.0, 8.0, 2.0);
        let sim = simulation(
            ModelConstants::default(),
            SiteParameters::new(100.0, 0.7, Management::None),
        );
        let output = sim.run(&weather, None, SpinUp::LeadingYear).unwrap();
        let bm = output.series.column(modvege_core::Variable::Bm, true);
        assert_eq!(bm.len(), 31);
        assert_eq!(output.series.dates(true)[0], jan1(2005));
        assert_eq!(output.series.annual_summaries().len(), 1);
    }
}

/// The same inputs give bit-identical output.
#[test]
fn test_determinism() {
    let weather = constant_weather(jan1(2001), 400, 12.0, 2.5, 9.0, 2.5);
    let weather = with_day(&weather, 100, -4.0);
    let site = SiteParameters::new(90.0, 0.6, Management::None);

    let a = simulation(ModelConstants::default(), site.clone())
        .run(&weather, None, SpinUp::LeadingYear)
        .unwrap();
    let b = simulation(ModelConstants::default(), site)
        .run(&weather, None, SpinUp::LeadingYear)
        .unwrap();
    assert_eq!(a.series, b.series);
    assert_eq!(a.final_state, b.final_state);
}
