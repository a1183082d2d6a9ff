//! Quantity units and conversion to grams
//!
//! Recipes are composed in grams. Kilogram and milligram entries are converted
//! before they reach the cart.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Grams per milligram
pub const G_PER_MG: f64 = 0.001;
/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;

/// Accepted weight units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    G,
    Kg,
    Mg,
}

impl WeightUnit {
    /// Parse a unit string (case-insensitive, long forms accepted)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(WeightUnit::G),
            "kg" | "kilogram" | "kilograms" => Some(WeightUnit::Kg),
            "mg" | "milligram" | "milligrams" => Some(WeightUnit::Mg),
            _ => None,
        }
    }

    /// Conversion factor to grams
    pub fn grams_per_unit(&self) -> f64 {
        match self {
            WeightUnit::G => 1.0,
            WeightUnit::Kg => G_PER_KG,
            WeightUnit::Mg => G_PER_MG,
        }
    }
}

/// Convert a quantity in `unit` to grams.
///
/// The quantity must be a finite number. Sign is not checked here: the cart
/// ignores non-positive additions.
pub fn to_grams(quantity: f64, unit: &str) -> Result<f64, ValidationError> {
    if !quantity.is_finite() {
        return Err(ValidationError::InvalidQuantity(quantity.to_string()));
    }
    let unit = WeightUnit::from_str(unit)
        .ok_or_else(|| ValidationError::UnknownUnit(unit.trim().to_string()))?;
    Ok(quantity * unit.grams_per_unit())
}

/// Parse a user-typed quantity. Accepts a decimal comma.
pub fn parse_quantity(input: &str) -> Result<f64, ValidationError> {
    let cleaned = input.trim().replace(',', ".");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ValidationError::InvalidQuantity(input.trim().to_string()))
}
