//! Distance classification against the level tables.
use crate::food::Food;
use crate::tables::{Bracket, DistanceTables, Level};

/// First `(level, bracket)` whose threshold is at or below `km`.
///
/// Levels are scanned Mundial to Local and brackets farthest to closest;
/// the scan stops at the first hit. A distance below every Local Cercano
/// threshold (or NaN) has no classification.
#[must_use]
pub fn classify(km: f64, tables: &DistanceTables) -> Option<(Level, Bracket)> {
    tables.iter().find_map(|(level, table)| {
        table
            .entries()
            .find(|&(_, threshold)| km >= threshold)
            .map(|(bracket, _)| (level, bracket))
    })
}

/// Reclassify every food from its recorded `km`, overwriting any previous
/// assignment. Returns how many foods ended up classified.
pub fn classify_foods(foods: &mut [Food], tables: &DistanceTables) -> usize {
    let mut classified = 0;
    for food in foods.iter_mut() {
        let assignment = classify(food.km, tables);
        food.level = assignment.map(|(level, _)| level);
        food.bracket = assignment.map(|(_, bracket)| bracket);
        match assignment {
            Some((level, bracket)) => {
                classified += 1;
                log::debug!("{} ({} km) -> {level} / {bracket}", food.name, food.km);
            }
            None => log::debug!("{} ({} km) is below every threshold", food.name, food.km),
        }
    }
    classified
}
