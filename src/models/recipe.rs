//! Recipe model
//!
//! Header row of a finalized recipe. Lines live in `recipe_lines`.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A persisted recipe header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

/// Recipe header with line count and total mass, for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub line_count: i64,
    pub total_grams: f64,
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a recipe header and return its generated id
    pub fn insert(conn: &Connection, name: &str) -> DbResult<i64> {
        conn.execute("INSERT INTO recipes (name) VALUES (?1)", [name])?;
        Ok(conn.last_insert_rowid())
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes, newest first
    pub fn list(conn: &Connection) -> DbResult<Vec<RecipeSummary>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.name, r.created_at,
                   COUNT(l.id) AS line_count,
                   COALESCE(SUM(l.grams), 0.0) AS total_grams
            FROM recipes r
            LEFT JOIN recipe_lines l ON l.recipe_id = r.id
            GROUP BY r.id
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )?;

        let recipes = stmt
            .query_map([], |row| {
                Ok(RecipeSummary {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    created_at: row.get("created_at")?,
                    line_count: row.get("line_count")?,
                    total_grams: row.get("total_grams")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(recipes)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }
}
