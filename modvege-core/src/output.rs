//! Daily diagnostic records and the assembled per-cell output series.

use crate::variables::Variable;
use chrono::{Datelike, NaiveDate};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Diagnostics of one simulated day. Biomass, ages and reserve are end-of-day values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyOutput {
    pub date: NaiveDate,
    /// Whether this day belongs to the spin-up year
    pub spin_up: bool,
    pub pgro: f64,
    pub gro: f64,
    pub env: f64,
    pub sea: f64,
    pub lai: f64,
    pub aet: f64,
    pub st: f64,
    pub sen_gv: f64,
    pub sen_gr: f64,
    pub abs_dv: f64,
    pub abs_dr: f64,
    pub bm: f64,
    pub bm_gv: f64,
    pub bm_gr: f64,
    pub bm_dv: f64,
    pub bm_dr: f64,
    pub age_gv: f64,
    pub age_gr: f64,
    pub age_dv: f64,
    pub age_dr: f64,
    pub omd_gv: f64,
    pub omd_gr: f64,
    pub omd_dv: f64,
    pub omd_dr: f64,
    pub omd: f64,
    pub wr: f64,
    pub i_bm: f64,
    pub h_bm: f64,
    pub c_bm: f64,
}

impl DailyOutput {
    pub fn get(&self, variable: Variable) -> f64 {
        match variable {
            Variable::Bm => self.bm,
            Variable::Gro => self.gro,
            Variable::Pgro => self.pgro,
            Variable::IBm => self.i_bm,
            Variable::HBm => self.h_bm,
            Variable::CBm => self.c_bm,
            Variable::BmGv => self.bm_gv,
            Variable::BmGr => self.bm_gr,
            Variable::BmDv => self.bm_dv,
            Variable::BmDr => self.bm_dr,
            Variable::AgeGv => self.age_gv,
            Variable::AgeGr => self.age_gr,
            Variable::AgeDv => self.age_dv,
            Variable::AgeDr => self.age_dr,
            Variable::OmdGv => self.omd_gv,
            Variable::OmdGr => self.omd_gr,
            Variable::OmdDv => self.omd_dv,
            Variable::OmdDr => self.omd_dr,
            Variable::Omd => self.omd,
            Variable::SenGv => self.sen_gv,
            Variable::SenGr => self.sen_gr,
            Variable::AbsDv => self.abs_dv,
            Variable::AbsDr => self.abs_dr,
            Variable::Lai => self.lai,
            Variable::Env => self.env,
            Variable::Sea => self.sea,
            Variable::Aet => self.aet,
            Variable::Wr => self.wr,
            Variable::St => self.st,
        }
    }

    /// Total senescence out of the green compartments.
    pub fn senescence(&self) -> f64 {
        self.sen_gv + self.sen_gr
    }

    /// Total abscission out of the dead compartments.
    pub fn abscission(&self) -> f64 {
        self.abs_dv + self.abs_dr
    }

    /// Biomass removed by grazing or cutting today.
    pub fn offtake(&self) -> f64 {
        self.i_bm + self.h_bm
    }
}

/// Totals and extremes of one calendar year of output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualSummary {
    pub year: i32,
    pub days: usize,
    /// Accumulated growth (kg DM ha⁻¹)
    pub gro: f64,
    /// Accumulated ingestion (kg DM ha⁻¹)
    pub i_bm: f64,
    /// Accumulated harvest (kg DM ha⁻¹)
    pub h_bm: f64,
    /// Number of grazing or cutting days
    pub events: usize,
    /// Peak standing biomass (kg DM ha⁻¹)
    pub max_bm: f64,
    /// Mean biomass-weighted digestibility
    pub mean_omd: f64,
}

/// Ordered daily output of one cell, aligned 1:1 with the weather input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputSeries {
    rows: Vec<DailyOutput>,
}

impl OutputSeries {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            rows: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, row: DailyOutput) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[DailyOutput] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of leading spin-up rows.
    pub fn spin_up_len(&self) -> usize {
        self.rows.iter().take_while(|r| r.spin_up).count()
    }

    /// Rows of the reporting period (spin-up rows discarded).
    pub fn reporting(&self) -> &[DailyOutput] {
        &self.rows[self.spin_up_len()..]
    }

    fn select(&self, reporting_only: bool) -> &[DailyOutput] {
        if reporting_only {
            self.reporting()
        } else {
            &self.rows
        }
    }

    pub fn dates(&self, reporting_only: bool) -> Vec<NaiveDate> {
        self.select(reporting_only).iter().map(|r| r.date).collect()
    }

    /// Values of one variable as a 1-D array.
    pub fn column(&self, variable: Variable, reporting_only: bool) -> Array1<f64> {
        self.select(reporting_only)
            .iter()
            .map(|r| r.get(variable))
            .collect()
    }

    /// Per-calendar-year summaries of the reporting period.
    pub fn annual_summaries(&self) -> Vec<AnnualSummary> {
        let mut summaries: Vec<AnnualSummary> = Vec::new();
        let mut omd_sum = 0.0;

        for row in self.reporting() {
            let year = row.date.year();
            if summaries.last().map(|s| s.year) != Some(year) {
                if let Some(last) = summaries.last_mut() {
                    last.mean_omd = omd_sum / last.days as f64;
                }
                omd_sum = 0.0;
                summaries.push(AnnualSummary {
                    year,
                    days: 0,
                    gro: 0.0,
                    i_bm: 0.0,
                    h_bm: 0.0,
                    events: 0,
                    max_bm: 0.0,
                    mean_omd: 0.0,
                });
            }
            if let Some(summary) = summaries.last_mut() {
                summary.days += 1;
                summary.gro += row.gro;
                summary.i_bm += row.i_bm;
                summary.h_bm += row.h_bm;
                if row.offtake() > 0.0 {
                    summary.events += 1;
                }
                summary.max_bm = summary.max_bm.max(row.bm);
                omd_sum += row.omd;
            }
        }
        if let Some(last) = summaries.last_mut() {
            last.mean_omd = omd_sum / last.days as f64;
        }
        summaries
    }
}

impl FromIterator<DailyOutput> for OutputSeries {
    fn from_iter<I: IntoIterator<Item = DailyOutput>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
