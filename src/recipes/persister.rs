//! Recipe persistence
//!
//! Validates a recipe and writes the header and its lines in one transaction.

use serde::Serialize;

use crate::cart::LineItem;
use crate::db::{Database, DbResult};
use crate::error::{RecipeError, ValidationError};
use crate::models::{round2, Recipe, RecipeLine, RecipeLineDetail, RecipeSummary};

/// A persisted recipe with its lines in insertion order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedRecipe {
    pub recipe: Recipe,
    pub lines: Vec<RecipeLineDetail>,
}

impl SavedRecipe {
    /// Lines as cart items, named from the catalogue when the code resolves
    pub fn line_items(&self) -> Vec<LineItem> {
        self.lines
            .iter()
            .map(|l| {
                LineItem::new(
                    l.ingredient_code.clone(),
                    l.grams,
                    l.ingredient_name.clone().unwrap_or_default(),
                )
            })
            .collect()
    }
}

/// Validate before any write: returns the trimmed name and the lines to store.
///
/// Codes are trimmed, and lines sharing a code merge into the first one with
/// their grams summed and rounded to 2 dp.
fn validate(name: &str, lines: &[LineItem]) -> Result<(String, Vec<(String, f64)>), ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }

    let mut merged: Vec<(String, f64)> = Vec::new();
    for line in lines.iter().filter(|l| l.contributes()) {
        let code = line.code.trim();
        if code.is_empty() {
            continue;
        }
        match merged.iter_mut().find(|(c, _)| c == code) {
            Some((_, grams)) => *grams += line.grams,
            None => merged.push((code.to_string(), line.grams)),
        }
    }

    let valid: Vec<(String, f64)> = merged
        .into_iter()
        .map(|(code, grams)| (code, round2(grams)))
        .filter(|(_, grams)| *grams > 0.0)
        .collect();
    if valid.is_empty() {
        return Err(ValidationError::NoValidLines);
    }

    Ok((name.to_string(), valid))
}

/// Persist a recipe and return its id.
///
/// Either the header and every valid line are committed, or nothing is.
pub fn persist(db: &Database, name: &str, lines: &[LineItem]) -> Result<i64, RecipeError> {
    let (name, valid) = validate(name, lines)?;

    let result = db.with_transaction(|tx| {
        let recipe_id = Recipe::insert(tx, &name)?;
        for (code, grams) in &valid {
            RecipeLine::insert(tx, recipe_id, code, *grams)?;
        }
        Ok(recipe_id)
    });

    match result {
        Ok(recipe_id) => {
            tracing::info!(recipe_id, name = %name, lines = valid.len(), "recipe saved");
            Ok(recipe_id)
        }
        Err(e) => {
            tracing::error!(name = %name, error = %e, "recipe save rolled back");
            Err(RecipeError::Storage(e))
        }
    }
}

/// Load a recipe with its lines
pub fn load(db: &Database, recipe_id: i64) -> DbResult<Option<SavedRecipe>> {
    db.with_conn(|conn| {
        let Some(recipe) = Recipe::get_by_id(conn, recipe_id)? else {
            return Ok(None);
        };
        let lines = RecipeLine::get_details_for_recipe(conn, recipe_id)?;
        Ok(Some(SavedRecipe { recipe, lines }))
    })
}

/// All recipes, newest first
pub fn list(db: &Database) -> DbResult<Vec<RecipeSummary>> {
    db.with_conn(Recipe::list)
}
