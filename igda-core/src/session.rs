//! The session record and the stage operations that advance it.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::classify::classify_foods;
use crate::food::{AcquisitionMode, Food, set_roster};
use crate::geography::{Dimensions, GeographyError};
use crate::index::{IndexReport, finalize};
use crate::numbers::is_valid_km;
use crate::scoring::{FoodValue, score_foods};
use crate::snapshot::lenient;
use crate::tables::DistanceTables;

/// Milestones of the wizard, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Unset,
    GeographyResolved,
    FoodsListed,
    TablesBuilt,
    FoodsClassified,
    ModesTagged,
    ValuesAggregated,
    IndexFinalized,
}

impl Stage {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unset => "unset",
            Self::GeographyResolved => "geography resolved",
            Self::FoodsListed => "foods listed",
            Self::TablesBuilt => "tables built",
            Self::FoodsClassified => "foods classified",
            Self::ModesTagged => "modes tagged",
            Self::ValuesAggregated => "values aggregated",
            Self::IndexFinalized => "index finalized",
        }
    }

    /// The stage that follows this one, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Unset => Some(Self::GeographyResolved),
            Self::GeographyResolved => Some(Self::FoodsListed),
            Self::FoodsListed => Some(Self::TablesBuilt),
            Self::TablesBuilt => Some(Self::FoodsClassified),
            Self::FoodsClassified => Some(Self::ModesTagged),
            Self::ModesTagged => Some(Self::ValuesAggregated),
            Self::ValuesAggregated => Some(Self::IndexFinalized),
            Self::IndexFinalized => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a stage refused to run. The record is left unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StageError {
    #[error("cannot reach '{stage}' before '{needs}'")]
    MissingPrerequisite { stage: Stage, needs: Stage },
    #[error("the food list must hold between {min} and {max} foods (got {count})")]
    RosterSize {
        min: usize,
        max: usize,
        count: usize,
    },
    #[error("food #{position} has a blank name")]
    BlankFoodName { position: usize },
    #[error("expected {expected} distances, one per food (got {found})")]
    DistanceCount { expected: usize, found: usize },
    #[error("distance for '{food}' must be a finite, non-negative number of km (got {km})")]
    InvalidDistance { food: String, km: f64 },
    #[error("got {found} acquisition modes for {expected} foods")]
    TooManyModes { expected: usize, found: usize },
    #[error(transparent)]
    Geography(#[from] GeographyError),
}

impl StageError {
    #[must_use]
    pub const fn is_missing_prerequisite(&self) -> bool {
        matches!(self, Self::MissingPrerequisite { .. })
    }
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, alias = "pais")]
    pub country: Option<String>,
    #[serde(default, alias = "largo")]
    pub length_km: Option<f64>,
    #[serde(default, alias = "ancho")]
    pub width_km: Option<f64>,
    /// Baseline distance unit; 0 means unset.
    #[serde(default)]
    pub pd: f64,
    #[serde(default, alias = "alimentos")]
    pub foods: Vec<Food>,
    #[serde(default, alias = "tablas", deserialize_with = "lenient")]
    pub tables: Option<DistanceTables>,
}

impl Session {
    #[must_use]
    pub fn has_pd(&self) -> bool {
        self.pd.is_finite() && self.pd > 0.0
    }

    /// Furthest stage reached without a gap.
    ///
    /// Finalizing changes no recorded field, so the walk stops at
    /// [`Stage::ValuesAggregated`]. Modes default to Buy, which makes
    /// [`Stage::ModesTagged`] follow directly from classification.
    #[must_use]
    pub fn progress(&self) -> Stage {
        if !self.has_pd() {
            return Stage::Unset;
        }
        if self.foods.is_empty() {
            return Stage::GeographyResolved;
        }
        if self.tables.is_none() {
            return Stage::FoodsListed;
        }
        if !self.foods.iter().all(Food::is_classified) {
            return Stage::TablesBuilt;
        }
        if self.foods.iter().any(|food| food.accumulated_value.is_none()) {
            return Stage::ModesTagged;
        }
        Stage::ValuesAggregated
    }

    /// Record a country's dimensions and derive PD.
    ///
    /// A `None` country keeps whatever name was stored before. Returns PD.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Geography`] if either dimension is negative or
    /// not finite.
    pub fn resolve_geography(
        &mut self,
        country: Option<&str>,
        length_km: f64,
        width_km: f64,
    ) -> Result<f64, StageError> {
        let dims = Dimensions::new(length_km, width_km)?;
        if let Some(name) = country.map(str::trim).filter(|name| !name.is_empty()) {
            self.country = Some(name.to_string());
        }
        self.length_km = Some(dims.length_km);
        self.width_km = Some(dims.width_km);
        self.pd = dims.baseline();
        if !self.has_pd() {
            log::warn!("PD {} is not a positive finite number; it stays unset", self.pd);
            self.pd = 0.0;
        }
        Ok(self.pd)
    }

    /// Replace the food list, keeping data recorded for surviving positions.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty or oversized list, or a blank name.
    pub fn set_foods<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), StageError> {
        set_roster(&mut self.foods, names)
    }

    /// Derive and store the six distance tables from PD.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::MissingPrerequisite`] while PD is unset.
    pub fn build_tables(&mut self) -> Result<DistanceTables, StageError> {
        let tables = DistanceTables::derive(self.pd).ok_or(StageError::MissingPrerequisite {
            stage: Stage::TablesBuilt,
            needs: Stage::GeographyResolved,
        })?;
        self.tables = Some(tables);
        Ok(tables)
    }

    /// Record the distance travelled by each food, in roster order, and
    /// classify every food. Returns how many foods were classified.
    ///
    /// # Errors
    ///
    /// Returns an error if the tables or roster are missing, the number of
    /// distances differs from the number of foods, or a distance is invalid.
    pub fn record_distances(&mut self, distances: &[f64]) -> Result<usize, StageError> {
        if self.foods.is_empty() {
            return Err(StageError::MissingPrerequisite {
                stage: Stage::FoodsClassified,
                needs: Stage::FoodsListed,
            });
        }
        let Some(tables) = self.tables else {
            return Err(StageError::MissingPrerequisite {
                stage: Stage::FoodsClassified,
                needs: Stage::TablesBuilt,
            });
        };
        if distances.len() != self.foods.len() {
            return Err(StageError::DistanceCount {
                expected: self.foods.len(),
                found: distances.len(),
            });
        }
        if let Some((food, &km)) = self
            .foods
            .iter()
            .zip(distances)
            .find(|&(_, &km)| !is_valid_km(km))
        {
            return Err(StageError::InvalidDistance {
                food: food.name.clone(),
                km,
            });
        }

        for (food, &km) in self.foods.iter_mut().zip(distances) {
            food.km = km;
        }
        Ok(classify_foods(&mut self.foods, &tables))
    }

    /// Assign acquisition modes in roster order. Foods past the end of
    /// `modes` keep their current mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster is empty or more modes than foods
    /// are given.
    pub fn tag_modes(&mut self, modes: &[AcquisitionMode]) -> Result<(), StageError> {
        if self.foods.is_empty() {
            return Err(StageError::MissingPrerequisite {
                stage: Stage::ModesTagged,
                needs: Stage::FoodsListed,
            });
        }
        if modes.len() > self.foods.len() {
            return Err(StageError::TooManyModes {
                expected: self.foods.len(),
                found: modes.len(),
            });
        }
        if !self.foods.iter().all(Food::is_classified) {
            log::warn!("tagging modes before every food is classified");
        }
        for (food, &mode) in self.foods.iter_mut().zip(modes) {
            food.mode = Some(mode);
        }
        Ok(())
    }

    /// Compute and store every food's accumulated value.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::MissingPrerequisite`] if the roster is empty.
    pub fn compute_values(&mut self) -> Result<Vec<FoodValue>, StageError> {
        if self.foods.is_empty() {
            return Err(StageError::MissingPrerequisite {
                stage: Stage::ValuesAggregated,
                needs: Stage::FoodsListed,
            });
        }
        Ok(score_foods(&mut self.foods))
    }

    /// Aggregate the accumulated values into the i-GDA report.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::MissingPrerequisite`] unless every food has a value.
    pub fn finalize(&self) -> Result<IndexReport, StageError> {
        finalize(&self.foods)
    }
}
