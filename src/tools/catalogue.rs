//! Catalogue MCP Tools
//!
//! Read access to the ingredient catalogue and bulk import.

use std::path::Path;

use serde::Serialize;

use crate::catalogue::import::{self, ImportSummary};
use crate::catalogue::{normalize_code, IngredientRepository, SqliteCatalogue};
use crate::db::Database;
use crate::models::{CatalogueOrder, IngredientProfile, IngredientSummary};

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub items: Vec<IngredientSummary>,
    pub total: usize,
    pub order_by: &'static str,
}

/// Response for import_catalogue
#[derive(Debug, Serialize)]
pub struct ImportCatalogueResponse {
    pub success: bool,
    pub file_path: String,
    #[serde(flatten)]
    pub summary: ImportSummary,
    pub message: String,
}

/// List the catalogue ordered by code or name
pub fn list_ingredients(db: &Database, order_by: Option<&str>) -> Result<ListIngredientsResponse, String> {
    let order = order_by.map(CatalogueOrder::from_str).unwrap_or_default();

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let items = SqliteCatalogue::new(&conn)
        .list_all(order)
        .map_err(|e| format!("Failed to list ingredients: {}", e))?;

    Ok(ListIngredientsResponse {
        total: items.len(),
        items,
        order_by: order.as_str(),
    })
}

/// Get one catalogue entry by code
pub fn get_ingredient(db: &Database, code: &str) -> Result<Option<IngredientProfile>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    SqliteCatalogue::new(&conn)
        .lookup(&normalize_code(code))
        .map_err(|e| format!("Failed to get ingredient: {}", e))
}

/// Import a delimited catalogue export
pub fn import_catalogue(db: &Database, file_path: &str) -> Result<ImportCatalogueResponse, String> {
    let summary = import::import_catalogue(db, Path::new(file_path))
        .map_err(|e| format!("Catalogue import failed: {}", e))?;

    Ok(ImportCatalogueResponse {
        success: true,
        file_path: file_path.to_string(),
        summary,
        message: format!(
            "Imported {} new and {} updated ingredient(s), skipped {} row(s)",
            summary.inserted, summary.updated, summary.skipped
        ),
    })
}
