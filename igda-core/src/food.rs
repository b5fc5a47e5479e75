//! Food entries, acquisition modes and roster editing.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{MAX_FOODS, MIN_FOODS, WEIGHT_BARTER, WEIGHT_BUY, WEIGHT_PRODUCE};
use crate::session::StageError;
use crate::snapshot::lenient;
use crate::tables::{Bracket, Level};

/// How a household obtained a food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AcquisitionMode {
    #[default]
    #[serde(alias = "Compra")]
    Buy,
    #[serde(alias = "Cambia")]
    Barter,
    Produce,
}

impl AcquisitionMode {
    pub const ALL: [Self; 3] = [Self::Buy, Self::Barter, Self::Produce];

    /// Subtracted from a food's value; buying counts against locality.
    #[must_use]
    pub const fn weight(self) -> i32 {
        match self {
            Self::Buy => WEIGHT_BUY,
            Self::Barter => WEIGHT_BARTER,
            Self::Produce => WEIGHT_PRODUCE,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Barter => "Barter",
            Self::Produce => "Produce",
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn default_mode() -> Option<AcquisitionMode> {
    Some(AcquisitionMode::default())
}

/// A single food eaten during the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    #[serde(default, alias = "nombre")]
    pub name: String,
    /// Distance travelled in km.
    #[serde(default)]
    pub km: f64,
    #[serde(default, alias = "nivel", deserialize_with = "lenient")]
    pub level: Option<Level>,
    #[serde(default, alias = "categoria", deserialize_with = "lenient")]
    pub bracket: Option<Bracket>,
    /// `None` when a snapshot carries a label this build does not know;
    /// such a mode weighs 0.
    #[serde(default = "default_mode", alias = "modo", deserialize_with = "lenient")]
    pub mode: Option<AcquisitionMode>,
    #[serde(default, alias = "valor_acumulado")]
    pub accumulated_value: Option<i32>,
}

impl Default for Food {
    fn default() -> Self {
        Self {
            name: String::new(),
            km: 0.0,
            level: None,
            bracket: None,
            mode: default_mode(),
            accumulated_value: None,
        }
    }
}

impl Food {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn is_classified(&self) -> bool {
        self.level.is_some() && self.bracket.is_some()
    }

    /// Level and bracket together, when both are assigned.
    #[must_use]
    pub fn classification(&self) -> Option<(Level, Bracket)> {
        self.level.zip(self.bracket)
    }
}

/// Replace the roster names in place.
///
/// Entries that survive at the same position keep their recorded distance,
/// classification, mode and value; entries past the new length are dropped.
///
/// # Errors
///
/// Returns [`StageError::RosterSize`] if the count is outside
/// `MIN_FOODS..=MAX_FOODS` and [`StageError::BlankFoodName`] if a name is
/// blank. The roster is untouched on error.
pub fn set_roster<S: AsRef<str>>(foods: &mut Vec<Food>, names: &[S]) -> Result<(), StageError> {
    if !(MIN_FOODS..=MAX_FOODS).contains(&names.len()) {
        return Err(StageError::RosterSize {
            min: MIN_FOODS,
            max: MAX_FOODS,
            count: names.len(),
        });
    }
    let trimmed: Vec<&str> = names.iter().map(|n| n.as_ref().trim()).collect();
    if let Some(index) = trimmed.iter().position(|n| n.is_empty()) {
        return Err(StageError::BlankFoodName {
            position: index + 1,
        });
    }

    foods.truncate(trimmed.len());
    for (index, name) in trimmed.into_iter().enumerate() {
        if let Some(existing) = foods.get_mut(index) {
            existing.name = name.to_string();
        } else {
            foods.push(Food::named(name));
        }
    }
    Ok(())
}
