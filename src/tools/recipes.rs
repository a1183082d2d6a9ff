//! Recipe MCP Tools
//!
//! Tools for saving the session cart as a recipe and reading saved recipes.

use serde::Serialize;

use crate::cart::Cart;
use crate::catalogue::SqliteCatalogue;
use crate::db::Database;
use crate::error::{RecipeError, ValidationError};
use crate::models::{RecipeLineDetail, RecipeSummary};
use crate::nutrition::{self, AggregateResult};
use crate::recipes;

/// Response for save_recipe
#[derive(Debug, Serialize)]
pub struct SaveRecipeResponse {
    pub success: bool,
    pub recipe_id: i64,
    pub name: String,
    pub line_count: usize,
    pub message: String,
}

/// Full recipe detail with lines and nutrition
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub lines: Vec<RecipeLineDetail>,
    pub total_grams: f64,
    pub per_100g: Option<AggregateResult>,
}

/// Response for list_recipes
#[derive(Debug, Serialize)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
    pub total: usize,
}

/// Persist the current cart under `name`.
///
/// The cart is left as it is either way; on success it is marked finalized.
pub fn save_recipe(
    db: &Database,
    cart: &mut Cart,
    name: &str,
) -> Result<Result<SaveRecipeResponse, ValidationError>, String> {
    let recipe_id = match recipes::persist(db, name, cart.lines()) {
        Ok(id) => id,
        Err(RecipeError::Validation(e)) => return Ok(Err(e)),
        Err(e @ RecipeError::Storage(_)) => return Err(format!("Failed to save recipe: {}", e)),
    };
    cart.mark_finalized(recipe_id);

    let line_count = cart.lines().iter().filter(|l| l.contributes()).count();
    Ok(Ok(SaveRecipeResponse {
        success: true,
        recipe_id,
        name: name.trim().to_string(),
        line_count,
        message: format!("Recipe saved with {} line(s)", line_count),
    }))
}

/// Get a saved recipe with its nutrition
pub fn get_recipe(db: &Database, id: i64) -> Result<Option<RecipeDetail>, String> {
    let saved = recipes::load(db, id)
        .map_err(|e| format!("Failed to get recipe: {}", e))?;

    match saved {
        Some(saved) => {
            let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
            let per_100g = nutrition::aggregate(&saved.line_items(), &SqliteCatalogue::new(&conn))
                .map_err(|e| format!("Failed to aggregate nutrition: {}", e))?;
            let total_grams = crate::models::round2(saved.lines.iter().map(|l| l.grams).sum());

            Ok(Some(RecipeDetail {
                id: saved.recipe.id,
                name: saved.recipe.name,
                created_at: saved.recipe.created_at,
                lines: saved.lines,
                total_grams,
                per_100g,
            }))
        }
        None => Ok(None),
    }
}

/// List saved recipes, newest first
pub fn list_recipes(db: &Database) -> Result<ListRecipesResponse, String> {
    let recipes = recipes::list(db)
        .map_err(|e| format!("Failed to list recipes: {}", e))?;

    Ok(ListRecipesResponse {
        total: recipes.len(),
        recipes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartState;
    use crate::test_support;

    #[test]
    fn test_save_marks_cart_finalized_without_clearing() {
        let (_dir, db) = test_support::temp_database();
        test_support::seed_worked_example(&db);

        let mut cart = Cart::new();
        cart.add_or_merge("A", 200.0, "Ingredient A");
        cart.add_or_merge("B", 300.0, "Ingredient B");

        let saved = save_recipe(&db, &mut cart, " Soup ").unwrap().unwrap();
        assert_eq!(saved.name, "Soup");
        assert_eq!(saved.line_count, 2);
        assert_eq!(cart.state(), CartState::Finalized { recipe_id: saved.recipe_id });
        assert_eq!(cart.lines().len(), 2);

        let detail = get_recipe(&db, saved.recipe_id).unwrap().unwrap();
        assert_eq!(detail.total_grams, 500.0);
        assert_eq!(detail.per_100g.unwrap().per_100g.energy_kcal, 110.0);

        let listed = list_recipes(&db).unwrap();
        assert_eq!(listed.total, 1);
    }

    #[test]
    fn test_validation_leaves_cart_untouched() {
        let (_dir, db) = test_support::temp_database();
        let mut cart = Cart::new();
        cart.add_or_merge("A", 10.0, "");

        let rejected = save_recipe(&db, &mut cart, "  ").unwrap();
        assert_eq!(rejected.unwrap_err(), ValidationError::NameRequired);
        assert_eq!(cart.state(), CartState::Accumulating);

        let mut empty = Cart::new();
        let rejected = save_recipe(&db, &mut empty, "Soup").unwrap();
        assert_eq!(rejected.unwrap_err(), ValidationError::NoValidLines);
    }

    #[test]
    fn test_missing_recipe() {
        let (_dir, db) = test_support::temp_database();
        assert!(get_recipe(&db, 1).unwrap().is_none());
    }
}
