//! Country dimensions and the PD baseline.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numbers::{is_valid_km, round2};

/// Reasons a pair of dimensions is unusable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeographyError {
    #[error("{field} must be a finite, non-negative number of km (got {value})")]
    InvalidDimension { field: &'static str, value: f64 },
}

/// Reasons a lookup reply could not be read as two numbers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReplyParseError {
    #[error("expected {expected} numbers, found {found}")]
    WrongCount { expected: usize, found: usize },
    #[error("'{token}' is not a number")]
    NotANumber { token: String },
    #[error(transparent)]
    Dimension(#[from] GeographyError),
}

/// Maximum north-south length and east-west width of a country, in km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_km: f64,
    pub width_km: f64,
}

impl Dimensions {
    /// # Errors
    ///
    /// Returns [`GeographyError::InvalidDimension`] for negative or non-finite values.
    pub fn new(length_km: f64, width_km: f64) -> Result<Self, GeographyError> {
        if !is_valid_km(length_km) {
            return Err(GeographyError::InvalidDimension {
                field: "length",
                value: length_km,
            });
        }
        if !is_valid_km(width_km) {
            return Err(GeographyError::InvalidDimension {
                field: "width",
                value: width_km,
            });
        }
        Ok(Self {
            length_km,
            width_km,
        })
    }

    /// PD: the average of length and width, at full precision.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        (self.length_km + self.width_km) / 2.0
    }
}

/// PD as shown to the user; the stored value keeps full precision.
#[must_use]
pub fn display_pd(pd: f64) -> f64 {
    round2(pd)
}

/// Prompt sent to the external source for `country`.
#[must_use]
pub fn lookup_prompt(country: &str) -> String {
    format!(
        "What are the maximum length (north to south) and maximum width (east to west) \
         of {country} in kilometers?"
    )
}

/// Read a reply of the form `"<length>, <width>"`.
///
/// Whitespace is ignored and empty segments are skipped, so `"1200,,800"`
/// is accepted.
///
/// # Errors
///
/// Returns [`ReplyParseError::NotANumber`] for the first token that is not a
/// decimal number, [`ReplyParseError::WrongCount`] unless exactly two numbers
/// remain, and [`ReplyParseError::Dimension`] if either is negative or not
/// finite.
pub fn parse_dimensions_reply(reply: &str) -> Result<Dimensions, ReplyParseError> {
    let compact: String = reply.chars().filter(|c| !c.is_whitespace()).collect();
    let numbers = compact
        .split(',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| ReplyParseError::NotANumber {
                    token: token.to_string(),
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    match numbers.as_slice() {
        &[length, width] => Ok(Dimensions::new(length, width)?),
        other => Err(ReplyParseError::WrongCount {
            expected: 2,
            found: other.len(),
        }),
    }
}
