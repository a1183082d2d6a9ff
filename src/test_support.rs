//! Shared fixtures for unit tests

use tempfile::TempDir;

use crate::db::Database;
use crate::models::{IngredientProfile, NutrientProfile};

/// A migrated database file inside a fresh temporary directory
pub fn temp_database() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("test.db")).unwrap();
    (dir, db)
}

/// A {kcal 200, protein 10} and B {kcal 50, protein 1}
pub fn worked_example_profiles() -> Vec<IngredientProfile> {
    let mut a = IngredientProfile::new("A", "Ingredient A");
    a.supplier = Some("Supplier A".to_string());
    a.per_100g = NutrientProfile {
        energy_kcal: Some(200.0),
        protein: Some(10.0),
        ..NutrientProfile::default()
    };

    let mut b = IngredientProfile::new("B", "Ingredient B");
    b.per_100g = NutrientProfile {
        energy_kcal: Some(50.0),
        protein: Some(1.0),
        ..NutrientProfile::default()
    };

    vec![a, b]
}

pub fn seed_worked_example(db: &Database) {
    db.with_conn(|conn| {
        for profile in worked_example_profiles() {
            IngredientProfile::upsert(conn, &profile)?;
        }
        Ok(())
    })
    .unwrap();
}
