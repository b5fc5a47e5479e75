//! Per-food accumulated values.
use serde::{Deserialize, Serialize};

use crate::food::{AcquisitionMode, Food};
use crate::tables::{Bracket, Level};

/// One row of the value breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodValue {
    pub name: String,
    pub level: Option<Level>,
    pub bracket: Option<Bracket>,
    pub mode: Option<AcquisitionMode>,
    pub value: i32,
}

/// `level + bracket - mode`; a missing level, bracket or mode weighs 0.
#[must_use]
pub fn accumulated_value(
    level: Option<Level>,
    bracket: Option<Bracket>,
    mode: Option<AcquisitionMode>,
) -> i32 {
    let level_weight = level.map_or(0, Level::weight);
    let bracket_weight = bracket.map_or(0, Bracket::weight);
    level_weight + bracket_weight - mode.map_or(0, AcquisitionMode::weight)
}

/// Store the accumulated value on every food and return the breakdown.
///
/// Unclassified foods are scored with zero level and bracket weight rather
/// than blocking the stage.
pub fn score_foods(foods: &mut [Food]) -> Vec<FoodValue> {
    foods
        .iter_mut()
        .map(|food| {
            if !food.is_classified() {
                log::warn!("'{}' has no distance classification; scoring it as 0", food.name);
            }
            let value = accumulated_value(food.level, food.bracket, food.mode);
            food.accumulated_value = Some(value);
            FoodValue {
                name: food.name.clone(),
                level: food.level,
                bracket: food.bracket,
                mode: food.mode,
                value,
            }
        })
        .collect()
}
