//! Final i-GDA index and food-miles category.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    CATEGORY_LOCAL_MAX, CATEGORY_NATIONAL_MAX, CATEGORY_REGIONAL_MAX, INDEX_SCALE,
};
use crate::food::{AcquisitionMode, Food};
use crate::numbers::{i64_to_f64, round2, usize_to_f64};
use crate::session::{Stage, StageError};
use crate::tables::Level;

/// Qualitative reading of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Local,
    Regional,
    National,
    Global,
}

impl Category {
    /// Closed upper bounds: `<= 2` Local, `<= 3` Regional, `<= 4` National.
    #[must_use]
    pub fn from_index(igda: f64) -> Self {
        if igda <= CATEGORY_LOCAL_MAX {
            Self::Local
        } else if igda <= CATEGORY_REGIONAL_MAX {
            Self::Regional
        } else if igda <= CATEGORY_NATIONAL_MAX {
            Self::National
        } else {
            Self::Global
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Regional => "REGIONAL",
            Self::National => "NATIONAL",
            Self::Global => "GLOBAL",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Total km travelled by foods assigned to one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelDistance {
    pub level: Level,
    pub km: f64,
}

/// Per-food line of the final summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSummary {
    pub name: String,
    pub km: f64,
    pub level: Option<Level>,
    pub mode: Option<AcquisitionMode>,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexReport {
    pub food_count: usize,
    pub total_value: i64,
    pub igda: f64,
    pub category: Category,
    /// Set when the accumulated values sum to zero and the index was
    /// coerced to 0 instead of dividing.
    pub insufficient_data: bool,
    /// Closest level first.
    pub km_by_level: Vec<LevelDistance>,
    pub foods: Vec<FoodSummary>,
}

/// `round(N * 10 / X, 2)`, or 0 when `X` is 0.
#[must_use]
pub fn igda_index(food_count: usize, total_value: i64) -> f64 {
    if total_value == 0 {
        return 0.0;
    }
    round2(usize_to_f64(food_count) * INDEX_SCALE / i64_to_f64(total_value))
}

/// Sum of `km` per level, closest level first. Foods without a level count
/// toward no level.
#[must_use]
pub fn km_by_level(foods: &[Food]) -> Vec<LevelDistance> {
    Level::ALL
        .into_iter()
        .rev()
        .map(|level| LevelDistance {
            level,
            km: foods
                .iter()
                .filter(|food| food.level == Some(level))
                .map(|food| food.km)
                .sum(),
        })
        .collect()
}

/// Aggregate every food's accumulated value into the final report.
///
/// # Errors
///
/// Returns [`StageError::MissingPrerequisite`] if the roster is empty or any
/// food has no accumulated value yet.
pub fn finalize(foods: &[Food]) -> Result<IndexReport, StageError> {
    if foods.is_empty() {
        return Err(StageError::MissingPrerequisite {
            stage: Stage::IndexFinalized,
            needs: Stage::FoodsListed,
        });
    }

    let mut summaries = Vec::with_capacity(foods.len());
    let mut total_value: i64 = 0;
    for food in foods {
        let Some(value) = food.accumulated_value else {
            return Err(StageError::MissingPrerequisite {
                stage: Stage::IndexFinalized,
                needs: Stage::ValuesAggregated,
            });
        };
        total_value += i64::from(value);
        summaries.push(FoodSummary {
            name: food.name.clone(),
            km: food.km,
            level: food.level,
            mode: food.mode,
            value,
        });
    }

    let igda = igda_index(foods.len(), total_value);
    let insufficient_data = total_value == 0;
    if insufficient_data {
        log::warn!("accumulated values sum to 0; reporting i-GDA as 0");
    }

    Ok(IndexReport {
        food_count: foods.len(),
        total_value,
        igda,
        category: Category::from_index(igda),
        insufficient_data,
        km_by_level: km_by_level(foods),
        foods: summaries,
    })
}
