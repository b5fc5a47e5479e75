//! Geographic levels, distance brackets and the six distance tables derived from PD.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CONTINENTAL_THRESHOLDS, LOCAL_FACTORS, MUNDIAL_THRESHOLDS, NACIONAL_FACTORS,
    REGIONAL_FACTORS, WEIGHT_CERCANO, WEIGHT_CONTINENTAL, WEIGHT_INTERMEDIO, WEIGHT_LEJANO,
    WEIGHT_LOCAL, WEIGHT_MUNDIAL, WEIGHT_MUY_LEJANO, WEIGHT_NACIONAL, WEIGHT_REGIONAL,
    WEIGHT_ZONAL, ZONAL_FACTORS,
};
use crate::numbers::round2;

/// Geographic scale a food travelled across.
///
/// Declaration order is the classification scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Mundial,
    Continental,
    Nacional,
    Regional,
    Zonal,
    Local,
}

impl Level {
    pub const ALL: [Self; 6] = [
        Self::Mundial,
        Self::Continental,
        Self::Nacional,
        Self::Regional,
        Self::Zonal,
        Self::Local,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mundial => "Mundial",
            Self::Continental => "Continental",
            Self::Nacional => "Nacional",
            Self::Regional => "Regional",
            Self::Zonal => "Zonal",
            Self::Local => "Local",
        }
    }

    /// Score contribution: the closer the scale, the higher the weight.
    #[must_use]
    pub const fn weight(self) -> i32 {
        match self {
            Self::Mundial => WEIGHT_MUNDIAL,
            Self::Continental => WEIGHT_CONTINENTAL,
            Self::Nacional => WEIGHT_NACIONAL,
            Self::Regional => WEIGHT_REGIONAL,
            Self::Zonal => WEIGHT_ZONAL,
            Self::Local => WEIGHT_LOCAL,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Distance category within a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bracket {
    #[serde(rename = "Muy lejano")]
    MuyLejano,
    Lejano,
    Intermedio,
    Cercano,
}

impl Bracket {
    pub const ALL: [Self; 4] = [Self::MuyLejano, Self::Lejano, Self::Intermedio, Self::Cercano];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MuyLejano => "Muy lejano",
            Self::Lejano => "Lejano",
            Self::Intermedio => "Intermedio",
            Self::Cercano => "Cercano",
        }
    }

    #[must_use]
    pub const fn weight(self) -> i32 {
        match self {
            Self::MuyLejano => WEIGHT_MUY_LEJANO,
            Self::Lejano => WEIGHT_LEJANO,
            Self::Intermedio => WEIGHT_INTERMEDIO,
            Self::Cercano => WEIGHT_CERCANO,
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Four thresholds in km, one per bracket, from farthest to closest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTable {
    #[serde(rename = "Muy lejano")]
    pub muy_lejano: f64,
    #[serde(rename = "Lejano")]
    pub lejano: f64,
    #[serde(rename = "Intermedio")]
    pub intermedio: f64,
    #[serde(rename = "Cercano")]
    pub cercano: f64,
}

impl DistanceTable {
    const fn from_thresholds(thresholds: [f64; 4]) -> Self {
        Self {
            muy_lejano: thresholds[0],
            lejano: thresholds[1],
            intermedio: thresholds[2],
            cercano: thresholds[3],
        }
    }

    fn scaled(base: f64, factors: [f64; 4]) -> Self {
        Self::from_thresholds(factors.map(|factor| round2(factor * base)))
    }

    #[must_use]
    pub const fn threshold(&self, bracket: Bracket) -> f64 {
        match bracket {
            Bracket::MuyLejano => self.muy_lejano,
            Bracket::Lejano => self.lejano,
            Bracket::Intermedio => self.intermedio,
            Bracket::Cercano => self.cercano,
        }
    }

    /// Brackets paired with their thresholds, farthest first.
    pub fn entries(&self) -> impl Iterator<Item = (Bracket, f64)> + '_ {
        Bracket::ALL
            .into_iter()
            .map(move |bracket| (bracket, self.threshold(bracket)))
    }

    #[must_use]
    pub fn is_descending(&self) -> bool {
        self.muy_lejano >= self.lejano
            && self.lejano >= self.intermedio
            && self.intermedio >= self.cercano
    }
}

/// The six level tables. Field order matches [`Level::ALL`] so the
/// serialized mapping keeps the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceTables {
    #[serde(rename = "Mundial")]
    pub mundial: DistanceTable,
    #[serde(rename = "Continental")]
    pub continental: DistanceTable,
    #[serde(rename = "Nacional")]
    pub nacional: DistanceTable,
    #[serde(rename = "Regional")]
    pub regional: DistanceTable,
    #[serde(rename = "Zonal")]
    pub zonal: DistanceTable,
    #[serde(rename = "Local")]
    pub local: DistanceTable,
}

impl DistanceTables {
    /// Derive every table from the baseline distance `pd`.
    ///
    /// Returns `None` unless `pd` is finite and strictly positive.
    #[must_use]
    pub fn derive(pd: f64) -> Option<Self> {
        if !pd.is_finite() || pd <= 0.0 {
            return None;
        }

        let nacional = DistanceTable::scaled(pd, NACIONAL_FACTORS);
        let regional = DistanceTable::scaled(nacional.cercano, REGIONAL_FACTORS);
        let zonal = DistanceTable::scaled(regional.cercano, ZONAL_FACTORS);
        let local = DistanceTable::scaled(regional.cercano, LOCAL_FACTORS);

        Some(Self {
            mundial: DistanceTable::from_thresholds(MUNDIAL_THRESHOLDS),
            continental: DistanceTable::from_thresholds(CONTINENTAL_THRESHOLDS),
            nacional,
            regional,
            zonal,
            local,
        })
    }

    #[must_use]
    pub const fn table(&self, level: Level) -> &DistanceTable {
        match level {
            Level::Mundial => &self.mundial,
            Level::Continental => &self.continental,
            Level::Nacional => &self.nacional,
            Level::Regional => &self.regional,
            Level::Zonal => &self.zonal,
            Level::Local => &self.local,
        }
    }

    /// Levels paired with their tables in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Level, &DistanceTable)> + '_ {
        Level::ALL
            .into_iter()
            .map(move |level| (level, self.table(level)))
    }
}
