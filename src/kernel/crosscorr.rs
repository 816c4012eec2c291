//! Cross-correlation models between two intensity measure types.

use crate::error::MrdError;
use crate::imt::Imt;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossCorrelation {
    /// Baker & Jayaram (2008) correlation of spectral accelerations.
    #[default]
    BakerJayaram2008,
    NoCrossCorrelation,
    FullCrossCorrelation,
}

impl CrossCorrelation {
    /// Correlation coefficient between the log residuals of `imt1` and `imt2`.
    pub fn correlation(&self, imt1: &Imt, imt2: &Imt) -> Result<f64, MrdError> {
        match self {
            CrossCorrelation::NoCrossCorrelation => Ok(0.0),
            CrossCorrelation::FullCrossCorrelation => Ok(1.0),
            CrossCorrelation::BakerJayaram2008 => {
                let period = |imt: &Imt| {
                    imt.period().ok_or_else(|| {
                        MrdError::config(format!(
                            "BakerJayaram2008 needs PGA or SA, got {}",
                            imt
                        ))
                    })
                };
                Ok(baker_jayaram_2008(period(imt1)?, period(imt2)?))
            }
        }
    }
}

fn baker_jayaram_2008(t1: f64, t2: f64) -> f64 {
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    if t_max == t_min {
        return 1.0;
    }
    let c1 = 1.0 - (FRAC_PI_2 - 0.366 * (t_max / t_min.max(0.109)).ln()).cos();
    let c2 = if t_max < 0.2 {
        1.0 - 0.105
            * (1.0 - 1.0 / (1.0 + (100.0 * t_max - 5.0).exp()))
            * ((t_max - t_min) / (t_max - 0.0099))
    } else {
        0.0
    };
    let c3 = if t_max < 0.109 { c2 } else { c1 };
    let c4 = c1 + 0.5 * (c3.sqrt() - c3) * (1.0 + (PI * t_min / 0.109).cos());

    if t_max < 0.109 {
        c2
    } else if t_min > 0.109 {
        c1
    } else if t_max < 0.2 {
        c2.min(c4)
    } else {
        c4
    }
}

impl FromStr for CrossCorrelation {
    type Err = MrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "BakerJayaram2008" => Ok(CrossCorrelation::BakerJayaram2008),
            "NoCrossCorrelation" => Ok(CrossCorrelation::NoCrossCorrelation),
            "FullCrossCorrelation" => Ok(CrossCorrelation::FullCrossCorrelation),
            other => Err(MrdError::config(format!(
                "Unknown cross correlation model: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for CrossCorrelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrossCorrelation::BakerJayaram2008 => "BakerJayaram2008",
            CrossCorrelation::NoCrossCorrelation => "NoCrossCorrelation",
            CrossCorrelation::FullCrossCorrelation => "FullCrossCorrelation",
        };
        f.write_str(name)
    }
}
