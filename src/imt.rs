//! Intensity measure types and their intensity levels.

use crate::error::MrdError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An intensity measure type such as `PGA` or `SA(0.3)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Imt {
    Pga,
    Sa(f64),
    Other(String),
}

impl Imt {
    /// Spectral period in seconds; PGA counts as period zero.
    pub fn period(&self) -> Option<f64> {
        match self {
            Imt::Pga => Some(0.0),
            Imt::Sa(period) => Some(*period),
            Imt::Other(_) => None,
        }
    }
}

impl FromStr for Imt {
    type Err = MrdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MrdError::config("Empty intensity measure type"));
        }
        if s == "PGA" {
            return Ok(Imt::Pga);
        }
        if let Some(inner) = s.strip_prefix("SA(").and_then(|rest| rest.strip_suffix(')')) {
            let period: f64 = inner.trim().parse().map_err(|_| {
                MrdError::config(format!("Invalid spectral period in {}", s))
            })?;
            if !period.is_finite() || period < 0.0 {
                return Err(MrdError::config(format!("Invalid spectral period in {}", s)));
            }
            return Ok(Imt::Sa(period));
        }
        Ok(Imt::Other(s.to_string()))
    }
}

impl TryFrom<String> for Imt {
    type Error = MrdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Imt> for String {
    fn from(value: Imt) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Imt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imt::Pga => write!(f, "PGA"),
            Imt::Sa(period) => write!(f, "SA({})", period),
            Imt::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Intensity levels per IMT, keyed by the IMT string as it appears in the job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImtLevels(pub BTreeMap<String, Vec<f64>>);

impl ImtLevels {
    /// Number of cells per IMT (levels - 1), shared by every IMT.
    pub fn num_cells(&self) -> Result<usize, MrdError> {
        let mut counts = self.0.values().map(Vec::len);
        let first = counts
            .next()
            .ok_or_else(|| MrdError::config("No intensity measure levels given"))?;
        if counts.any(|count| count != first) {
            return Err(MrdError::config(
                "All intensity measure types must have the same number of levels",
            ));
        }
        if first < 2 {
            return Err(MrdError::config(format!(
                "At least two intensity levels are required, got {}",
                first
            )));
        }
        Ok(first - 1)
    }

    /// Levels for one IMT, validated as positive and strictly increasing.
    pub fn levels(&self, imt: &Imt) -> Result<&[f64], MrdError> {
        let key = imt.to_string();
        let levels = self
            .0
            .iter()
            .find(|(name, _)| name.parse::<Imt>().map_or(false, |parsed| &parsed == imt))
            .map(|(_, levels)| levels)
            .ok_or_else(|| MrdError::config(format!("Unknown intensity measure type {}", key)))?;
        if levels.iter().any(|level| !(level.is_finite() && *level > 0.0)) {
            return Err(MrdError::config(format!(
                "Intensity levels for {} must be positive",
                key
            )));
        }
        if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MrdError::config(format!(
                "Intensity levels for {} must be strictly increasing",
                key
            )));
        }
        Ok(levels)
    }
}
