//! Ingredient model
//!
//! A catalogue entry: supplier code, descriptive metadata and per-100g nutrients.

use rusqlite::{named_params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use super::NutrientProfile;

/// Sort key for catalogue listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogueOrder {
    #[default]
    Code,
    Name,
}

impl CatalogueOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogueOrder::Code => "code",
            CatalogueOrder::Name => "name",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "name" => CatalogueOrder::Name,
            _ => CatalogueOrder::Code,
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            CatalogueOrder::Code => "ORDER BY code ASC",
            CatalogueOrder::Name => "ORDER BY name COLLATE NOCASE ASC, code ASC",
        }
    }
}

/// A catalogue ingredient with its per-100g nutrient profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientProfile {
    pub code: String,
    pub name: String,
    pub supplier: Option<String>,
    pub base_unit: Option<String>,
    pub datasheet_date: Option<String>,
    pub source: Option<String>,
    pub compound_ingredients: Option<String>,
    pub allergens: Option<String>,
    pub remarks: Option<String>,
    pub per_100g: NutrientProfile,
}

/// Catalogue row summary for listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientSummary {
    pub code: String,
    pub name: String,
    pub supplier: Option<String>,
    pub energy_kcal_100g: Option<f64>,
    pub energy_kj_100g: Option<f64>,
}

impl IngredientProfile {
    /// Minimal profile with only identity set; used when building catalogue rows
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            supplier: None,
            base_unit: None,
            datasheet_date: None,
            source: None,
            compound_ingredients: None,
            allergens: None,
            remarks: None,
            per_100g: NutrientProfile::default(),
        }
    }

    /// Create an IngredientProfile from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            supplier: row.get("supplier")?,
            base_unit: row.get("base_unit")?,
            datasheet_date: row.get("datasheet_date")?,
            source: row.get("source")?,
            compound_ingredients: row.get("compound_ingredients")?,
            allergens: row.get("allergens")?,
            remarks: row.get("remarks")?,
            per_100g: NutrientProfile {
                energy_kcal: row.get("energy_kcal_100g")?,
                energy_kj: row.get("energy_kj_100g")?,
                fat: row.get("fat_100g")?,
                saturated_fat: row.get("saturated_fat_100g")?,
                carbohydrate: row.get("carbohydrate_100g")?,
                sugars: row.get("sugars_100g")?,
                protein: row.get("protein_100g")?,
                fibre: row.get("fibre_100g")?,
                salt: row.get("salt_100g")?,
            },
        })
    }

    /// Get an ingredient by its catalogue code
    pub fn get_by_code(conn: &Connection, code: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE code = ?1")?;

        let result = stmt.query_row([code], Self::from_row);
        match result {
            Ok(item) => Ok(Some(item)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List the whole catalogue as summaries
    pub fn list(conn: &Connection, order: CatalogueOrder) -> DbResult<Vec<IngredientSummary>> {
        let sql = format!(
            "SELECT code, name, supplier, energy_kcal_100g, energy_kj_100g FROM ingredients {}",
            order.order_clause()
        );
        let mut stmt = conn.prepare(&sql)?;

        let items = stmt
            .query_map([], |row| {
                Ok(IngredientSummary {
                    code: row.get("code")?,
                    name: row.get("name")?,
                    supplier: row.get("supplier")?,
                    energy_kcal_100g: row.get("energy_kcal_100g")?,
                    energy_kj_100g: row.get("energy_kj_100g")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Count catalogue rows
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Whether a code is present in the catalogue
    pub fn exists(conn: &Connection, code: &str) -> DbResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM ingredients WHERE code = ?1",
            [code],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert or replace the catalogue row for this code.
    /// Returns true if the code already existed.
    pub fn upsert(conn: &Connection, item: &IngredientProfile) -> DbResult<bool> {
        let existed = Self::exists(conn, &item.code)?;

        conn.execute(
            r#"
            INSERT INTO ingredients (
                code, name, supplier, base_unit, datasheet_date, source,
                compound_ingredients, allergens, remarks,
                energy_kcal_100g, energy_kj_100g, fat_100g, saturated_fat_100g,
                carbohydrate_100g, sugars_100g, protein_100g, fibre_100g, salt_100g
            ) VALUES (
                :code, :name, :supplier, :base_unit, :datasheet_date, :source,
                :compound_ingredients, :allergens, :remarks,
                :energy_kcal, :energy_kj, :fat, :saturated_fat,
                :carbohydrate, :sugars, :protein, :fibre, :salt
            )
            ON CONFLICT(code) DO UPDATE SET
                name = excluded.name,
                supplier = excluded.supplier,
                base_unit = excluded.base_unit,
                datasheet_date = excluded.datasheet_date,
                source = excluded.source,
                compound_ingredients = excluded.compound_ingredients,
                allergens = excluded.allergens,
                remarks = excluded.remarks,
                energy_kcal_100g = excluded.energy_kcal_100g,
                energy_kj_100g = excluded.energy_kj_100g,
                fat_100g = excluded.fat_100g,
                saturated_fat_100g = excluded.saturated_fat_100g,
                carbohydrate_100g = excluded.carbohydrate_100g,
                sugars_100g = excluded.sugars_100g,
                protein_100g = excluded.protein_100g,
                fibre_100g = excluded.fibre_100g,
                salt_100g = excluded.salt_100g
            "#,
            named_params! {
                ":code": item.code,
                ":name": item.name,
                ":supplier": item.supplier,
                ":base_unit": item.base_unit,
                ":datasheet_date": item.datasheet_date,
                ":source": item.source,
                ":compound_ingredients": item.compound_ingredients,
                ":allergens": item.allergens,
                ":remarks": item.remarks,
                ":energy_kcal": item.per_100g.energy_kcal,
                ":energy_kj": item.per_100g.energy_kj,
                ":fat": item.per_100g.fat,
                ":saturated_fat": item.per_100g.saturated_fat,
                ":carbohydrate": item.per_100g.carbohydrate,
                ":sugars": item.per_100g.sugars,
                ":protein": item.per_100g.protein,
                ":fibre": item.per_100g.fibre,
                ":salt": item.per_100g.salt,
            },
        )?;

        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn catalogue() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_upsert_and_lookup() {
        let conn = catalogue();

        let mut flour = IngredientProfile::new("FAR01", "Wheat flour");
        flour.supplier = Some("Molins".to_string());
        flour.per_100g.energy_kcal = Some(364.0);

        assert!(!IngredientProfile::upsert(&conn, &flour).unwrap());

        let loaded = IngredientProfile::get_by_code(&conn, "FAR01").unwrap().unwrap();
        assert_eq!(loaded, flour);
        assert_eq!(loaded.per_100g.protein, None);

        flour.per_100g.protein = Some(10.3);
        assert!(IngredientProfile::upsert(&conn, &flour).unwrap());
        assert_eq!(IngredientProfile::count(&conn).unwrap(), 1);

        let reloaded = IngredientProfile::get_by_code(&conn, "FAR01").unwrap().unwrap();
        assert_eq!(reloaded.per_100g.protein, Some(10.3));
    }

    #[test]
    fn test_missing_code_is_none() {
        let conn = catalogue();
        assert!(IngredientProfile::get_by_code(&conn, "NOPE").unwrap().is_none());
    }

    #[test]
    fn test_list_ordering() {
        let conn = catalogue();
        IngredientProfile::upsert(&conn, &IngredientProfile::new("B1", "apple")).unwrap();
        IngredientProfile::upsert(&conn, &IngredientProfile::new("A1", "Zucchini")).unwrap();

        let by_code: Vec<String> = IngredientProfile::list(&conn, CatalogueOrder::Code)
            .unwrap()
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(by_code, vec!["A1", "B1"]);

        let by_name: Vec<String> = IngredientProfile::list(&conn, CatalogueOrder::Name)
            .unwrap()
            .into_iter()
            .map(|s| s.code)
            .collect();
        assert_eq!(by_name, vec!["B1", "A1"]);
    }

    #[test]
    fn test_order_from_str() {
        assert_eq!(CatalogueOrder::from_str("Name"), CatalogueOrder::Name);
        assert_eq!(CatalogueOrder::from_str("code"), CatalogueOrder::Code);
        assert_eq!(CatalogueOrder::from_str("whatever"), CatalogueOrder::Code);
    }
}
