//! Data models
//!
//! Rust structs representing database entities.

mod ingredient;
mod nutrition;
mod recipe;
mod recipe_line;

pub use ingredient::{CatalogueOrder, IngredientProfile, IngredientSummary};
pub use nutrition::{round2, NutrientProfile, Nutrition};
pub use recipe::{Recipe, RecipeSummary};
pub use recipe_line::{RecipeLine, RecipeLineDetail};
