//! Fixed tables and tuning constants for the i-GDA pipeline.
//!
//! Everything that shapes the score lives here so a change to the index
//! can only happen through a reviewed code change, never through the
//! persisted snapshot.

// Food roster ----------------------------------------------------------------
pub const MIN_FOODS: usize = 1;
pub const MAX_FOODS: usize = 9;

// Distance tables ------------------------------------------------------------
/// World-scale thresholds in km (Muy lejano, Lejano, Intermedio, Cercano).
pub(crate) const MUNDIAL_THRESHOLDS: [f64; 4] = [12_000.0, 10_000.0, 8_000.0, 6_000.0];
/// Continent-scale thresholds in km.
pub(crate) const CONTINENTAL_THRESHOLDS: [f64; 4] = [6_000.0, 4_000.0, 3_000.0, 2_000.0];
/// Multipliers applied to PD.
pub(crate) const NACIONAL_FACTORS: [f64; 4] = [1.0, 0.6, 0.3, 0.1];
/// Multipliers applied to the Nacional Cercano threshold.
pub(crate) const REGIONAL_FACTORS: [f64; 4] = [1.0, 0.7, 0.5, 0.3];
/// Multipliers applied to the Regional Cercano threshold.
pub(crate) const ZONAL_FACTORS: [f64; 4] = [1.0, 0.8, 0.6, 0.4];
/// Multipliers applied to the Regional Cercano threshold (not Zonal's).
pub(crate) const LOCAL_FACTORS: [f64; 4] = [1.0, 0.6, 0.4, 0.2];

// Weights --------------------------------------------------------------------
pub(crate) const WEIGHT_MUNDIAL: i32 = 1;
pub(crate) const WEIGHT_CONTINENTAL: i32 = 2;
pub(crate) const WEIGHT_NACIONAL: i32 = 3;
pub(crate) const WEIGHT_REGIONAL: i32 = 4;
pub(crate) const WEIGHT_ZONAL: i32 = 5;
pub(crate) const WEIGHT_LOCAL: i32 = 6;

pub(crate) const WEIGHT_MUY_LEJANO: i32 = 1;
pub(crate) const WEIGHT_LEJANO: i32 = 2;
pub(crate) const WEIGHT_INTERMEDIO: i32 = 3;
pub(crate) const WEIGHT_CERCANO: i32 = 4;

pub(crate) const WEIGHT_BUY: i32 = 3;
pub(crate) const WEIGHT_BARTER: i32 = 1;
pub(crate) const WEIGHT_PRODUCE: i32 = 0;

// Index ----------------------------------------------------------------------
/// Numerator scale per food: `iGDA = N * INDEX_SCALE / X`.
pub(crate) const INDEX_SCALE: f64 = 10.0;
pub(crate) const CATEGORY_LOCAL_MAX: f64 = 2.0;
pub(crate) const CATEGORY_REGIONAL_MAX: f64 = 3.0;
pub(crate) const CATEGORY_NATIONAL_MAX: f64 = 4.0;

// Geography lookup -----------------------------------------------------------
pub const LOOKUP_TIMEOUT_SECS: u64 = 30;
pub const LOOKUP_SYSTEM_PROMPT: &str = "You are an assistant that provides precise geographic data. \
Reply ONLY with two numbers separated by a comma.";
