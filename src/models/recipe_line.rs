//! Recipe line model
//!
//! One ingredient quantity, in grams, within a persisted recipe.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A persisted recipe line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub id: i64,
    pub recipe_id: i64,
    pub ingredient_code: String,
    pub grams: f64,
}

/// Recipe line joined with the catalogue name, if the code still resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLineDetail {
    pub id: i64,
    pub ingredient_code: String,
    pub ingredient_name: Option<String>,
    pub grams: f64,
}

impl RecipeLine {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            ingredient_code: row.get("ingredient_code")?,
            grams: row.get("grams")?,
        })
    }

    /// Insert a line for a recipe
    pub fn insert(conn: &Connection, recipe_id: i64, ingredient_code: &str, grams: f64) -> DbResult<i64> {
        conn.execute(
            "INSERT INTO recipe_lines (recipe_id, ingredient_code, grams) VALUES (?1, ?2, ?3)",
            params![recipe_id, ingredient_code, grams],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Lines of a recipe in insertion order
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, recipe_id, ingredient_code, grams FROM recipe_lines WHERE recipe_id = ?1 ORDER BY id",
        )?;

        let lines = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }

    /// Lines of a recipe with catalogue names, in insertion order
    pub fn get_details_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<RecipeLineDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT l.id, l.ingredient_code, i.name AS ingredient_name, l.grams
            FROM recipe_lines l
            LEFT JOIN ingredients i ON i.code = l.ingredient_code
            WHERE l.recipe_id = ?1
            ORDER BY l.id
            "#,
        )?;

        let lines = stmt
            .query_map([recipe_id], |row| {
                Ok(RecipeLineDetail {
                    id: row.get("id")?,
                    ingredient_code: row.get("ingredient_code")?,
                    ingredient_name: row.get("ingredient_name")?,
                    grams: row.get("grams")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(lines)
    }
}
