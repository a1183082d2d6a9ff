//! Ingredient catalogue
//!
//! Read-only lookup of per-100g profiles by code, plus the bulk import that
//! populates them.

pub mod import;

use rusqlite::Connection;
use serde::Serialize;

use crate::db::DbResult;
use crate::models::{CatalogueOrder, IngredientProfile, IngredientSummary};

/// Outcome of looking up one code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(IngredientProfile),
    Unresolved { code: String },
}

/// Source of ingredient profiles.
///
/// A missing code is a normal `None`, not an error. Errors mean the backing
/// store could not be read.
pub trait IngredientRepository {
    fn lookup(&self, code: &str) -> DbResult<Option<IngredientProfile>>;

    fn list_all(&self, order: CatalogueOrder) -> DbResult<Vec<IngredientSummary>>;

    fn resolve(&self, code: &str) -> DbResult<Resolution> {
        Ok(match self.lookup(code)? {
            Some(profile) => Resolution::Resolved(profile),
            None => Resolution::Unresolved {
                code: code.to_string(),
            },
        })
    }
}

/// Catalogue backed by the `ingredients` table
pub struct SqliteCatalogue<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteCatalogue<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn count(&self) -> DbResult<i64> {
        IngredientProfile::count(self.conn)
    }
}

impl IngredientRepository for SqliteCatalogue<'_> {
    fn lookup(&self, code: &str) -> DbResult<Option<IngredientProfile>> {
        IngredientProfile::get_by_code(self.conn, code)
    }

    fn list_all(&self, order: CatalogueOrder) -> DbResult<Vec<IngredientSummary>> {
        IngredientProfile::list(self.conn, order)
    }
}

/// Catalogue codes are stored trimmed and upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
impl IngredientRepository for std::collections::HashMap<String, IngredientProfile> {
    fn lookup(&self, code: &str) -> DbResult<Option<IngredientProfile>> {
        Ok(self.get(code).cloned())
    }

    fn list_all(&self, order: CatalogueOrder) -> DbResult<Vec<IngredientSummary>> {
        let mut items: Vec<IngredientSummary> = self
            .values()
            .map(|p| IngredientSummary {
                code: p.code.clone(),
                name: p.name.clone(),
                supplier: p.supplier.clone(),
                energy_kcal_100g: p.per_100g.energy_kcal,
                energy_kj_100g: p.per_100g.energy_kj,
            })
            .collect();
        match order {
            CatalogueOrder::Code => items.sort_by(|a, b| a.code.cmp(&b.code)),
            CatalogueOrder::Name => items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  far01 "), "FAR01");
        assert_eq!(normalize_code(""), "");
    }

    #[test]
    fn test_sqlite_resolution() {
        let (_dir, db) = test_support::temp_database();
        test_support::seed_worked_example(&db);

        db.with_conn(|conn| {
            let catalogue = SqliteCatalogue::new(conn);
            assert_eq!(catalogue.count()?, 2);

            let resolved = catalogue.resolve("A")?;
            assert!(matches!(resolved, Resolution::Resolved(ref p) if p.name == "Ingredient A"));

            let unresolved = catalogue.resolve("ZZZ")?;
            assert_eq!(
                unresolved,
                Resolution::Unresolved {
                    code: "ZZZ".to_string()
                }
            );

            let listed: Vec<String> = catalogue
                .list_all(CatalogueOrder::Code)?
                .into_iter()
                .map(|s| s.code)
                .collect();
            assert_eq!(listed, vec!["A", "B"]);
            Ok(())
        })
        .unwrap();
    }
}
