//! Output variable names and units.
//!
//! Downstream gridding, statistics and plotting key on these names, so they are
//! part of the stable output contract.
//!
//! | name | unit |
//! |---|---|
//! | `bm` | kg DM ha⁻¹ |
//! | `gro`, `pgro` | kg DM ha⁻¹ day⁻¹ |
//! | `i_bm`, `h_bm` | kg DM ha⁻¹ day⁻¹ |
//! | `c_bm` | kg DM ha⁻¹ |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named column of the daily output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    Bm,
    Gro,
    Pgro,
    IBm,
    HBm,
    CBm,
    BmGv,
    BmGr,
    BmDv,
    BmDr,
    AgeGv,
    AgeGr,
    AgeDv,
    AgeDr,
    OmdGv,
    OmdGr,
    OmdDv,
    OmdDr,
    Omd,
    SenGv,
    SenGr,
    AbsDv,
    AbsDr,
    Lai,
    Env,
    Sea,
    Aet,
    Wr,
    St,
}

impl Variable {
    /// All variables in reporting order.
    pub const ALL: [Variable; 29] = [
        Variable::Bm,
        Variable::Gro,
        Variable::Pgro,
        Variable::IBm,
        Variable::HBm,
        Variable::CBm,
        Variable::BmGv,
        Variable::BmGr,
        Variable::BmDv,
        Variable::BmDr,
        Variable::AgeGv,
        Variable::AgeGr,
        Variable::AgeDv,
        Variable::AgeDr,
        Variable::OmdGv,
        Variable::OmdGr,
        Variable::OmdDv,
        Variable::OmdDr,
        Variable::Omd,
        Variable::SenGv,
        Variable::SenGr,
        Variable::AbsDv,
        Variable::AbsDr,
        Variable::Lai,
        Variable::Env,
        Variable::Sea,
        Variable::Aet,
        Variable::Wr,
        Variable::St,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variable::Bm => "bm",
            Variable::Gro => "gro",
            Variable::Pgro => "pgro",
            Variable::IBm => "i_bm",
            Variable::HBm => "h_bm",
            Variable::CBm => "c_bm",
            Variable::BmGv => "bm_gv",
            Variable::BmGr => "bm_gr",
            Variable::BmDv => "bm_dv",
            Variable::BmDr => "bm_dr",
            Variable::AgeGv => "age_gv",
            Variable::AgeGr => "age_gr",
            Variable::AgeDv => "age_dv",
            Variable::AgeDr => "age_dr",
            Variable::OmdGv => "omd_gv",
            Variable::OmdGr => "omd_gr",
            Variable::OmdDv => "omd_dv",
            Variable::OmdDr => "omd_dr",
            Variable::Omd => "omd",
            Variable::SenGv => "sen_gv",
            Variable::SenGr => "sen_gr",
            Variable::AbsDv => "abs_dv",
            Variable::AbsDr => "abs_dr",
            Variable::Lai => "lai",
            Variable::Env => "env",
            Variable::Sea => "sea",
            Variable::Aet => "aet",
            Variable::Wr => "wr",
            Variable::St => "st",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Variable::Bm
            | Variable::CBm
            | Variable::BmGv
            | Variable::BmGr
            | Variable::BmDv
            | Variable::BmDr => "kg DM ha⁻¹",
            Variable::Gro
            | Variable::Pgro
            | Variable::IBm
            | Variable::HBm
            | Variable::SenGv
            | Variable::SenGr
            | Variable::AbsDv
            | Variable::AbsDr => "kg DM ha⁻¹ day⁻¹",
            Variable::AgeGv | Variable::AgeGr | Variable::AgeDv | Variable::AgeDr => "°C d",
            Variable::St => "°C d",
            Variable::Aet => "mm day⁻¹",
            Variable::Wr => "mm",
            Variable::OmdGv
            | Variable::OmdGr
            | Variable::OmdDv
            | Variable::OmdDr
            | Variable::Omd
            | Variable::Lai
            | Variable::Env
            | Variable::Sea => "dimensionless",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Variable::Bm => "Total standing biomass",
            Variable::Gro => "Actual (environment-limited) growth",
            Variable::Pgro => "Potential growth",
            Variable::IBm => "Biomass ingested by grazing",
            Variable::HBm => "Biomass harvested by cutting",
            Variable::CBm => "Cumulative ingested and harvested biomass this year",
            Variable::BmGv => "Green vegetative biomass",
            Variable::BmGr => "Green reproductive biomass",
            Variable::BmDv => "Dead vegetative biomass",
            Variable::BmDr => "Dead reproductive biomass",
            Variable::AgeGv => "Mean age of green vegetative biomass",
            Variable::AgeGr => "Mean age of green reproductive biomass",
            Variable::AgeDv => "Mean age of dead vegetative biomass",
            Variable::AgeDr => "Mean age of dead reproductive biomass",
            Variable::OmdGv => "Organic matter digestibility of green vegetative biomass",
            Variable::OmdGr => "Organic matter digestibility of green reproductive biomass",
            Variable::OmdDv => "Organic matter digestibility of dead vegetative biomass",
            Variable::OmdDr => "Organic matter digestibility of dead reproductive biomass",
            Variable::Omd => "Biomass-weighted organic matter digestibility",
            Variable::SenGv => "Senescence of green vegetative biomass",
            Variable::SenGr => "Senescence of green reproductive biomass",
            Variable::AbsDv => "Abscission of dead vegetative biomass",
            Variable::AbsDr => "Abscission of dead reproductive biomass",
            Variable::Lai => "Leaf area index",
            Variable::Env => "Environmental limitation of growth",
            Variable::Sea => "Seasonal effect on growth",
            Variable::Aet => "Actual evapotranspiration",
            Variable::Wr => "Soil water reserve",
            Variable::St => "Sum of temperatures since 1 January",
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL
            .iter()
            .find(|v| v.name() == s)
            .copied()
            .ok_or_else(|| format!("Unknown output variable: {}", s))
    }
}
