//! Error types shared by the cart, unit normalization and recipe persistence

use thiserror::Error;

use crate::db::DbError;

/// Malformed or missing input, detected before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name required")]
    NameRequired,

    #[error("no valid lines")]
    NoValidLines,

    #[error("ingredient code required")]
    CodeRequired,

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

/// Failure of a recipe persist
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}
