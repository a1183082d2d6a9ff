//! Nutrition calculation module
//!
//! Handles nutrient aggregation, portion scaling and unit conversion.

pub mod aggregate;
pub mod portion;
pub mod units;

pub use aggregate::{aggregate, AggregateResult};
pub use portion::{scale, PortionResult};
pub use units::{parse_quantity, to_grams, WeightUnit};
