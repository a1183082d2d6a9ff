//! Database migrations
//!
//! Versioned schema creation. Every schema change is a new numbered migration;
//! queries never inspect the live schema to decide which columns exist.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: catalogue, recipe headers and recipe lines
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENTS
        -- Catalogue of per-100g nutrient profiles, keyed by supplier code
        -- ============================================
        CREATE TABLE ingredients (
            code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            supplier TEXT,
            base_unit TEXT,
            datasheet_date TEXT,
            source TEXT,
            compound_ingredients TEXT,
            allergens TEXT,
            remarks TEXT,

            -- Nutrient values per 100 g (NULL = unknown)
            energy_kcal_100g REAL,
            energy_kj_100g REAL,
            fat_100g REAL,
            saturated_fat_100g REAL,
            carbohydrate_100g REAL,
            sugars_100g REAL,
            protein_100g REAL,
            fibre_100g REAL,
            salt_100g REAL
        );

        CREATE INDEX idx_ingredients_name ON ingredients(name);

        -- ============================================
        -- RECIPES
        -- Finalized recipe headers
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK(trim(name) <> ''),
            created_at TEXT NOT NULL DEFAULT (datetime('now', 'localtime'))
        );

        CREATE INDEX idx_recipes_name ON recipes(name);

        -- ============================================
        -- RECIPE LINES
        -- Ingredient quantities in grams, one per code per recipe.
        -- No foreign key to ingredients: a saved recipe keeps codes the
        -- catalogue has dropped or never carried.
        -- ============================================
        CREATE TABLE recipe_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_code TEXT NOT NULL CHECK(ingredient_code <> ''),
            grams REAL NOT NULL CHECK(grams > 0),

            UNIQUE(recipe_id, ingredient_code)
        );

        CREATE INDEX idx_recipe_lines_recipe ON recipe_lines(recipe_id);
        "#,
    )?;

    Ok(())
}

/// Highest applied migration, 0 if none. Requires `schema_migrations` to exist.
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }

    #[test]
    fn test_unreadable_version_table_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(get_schema_version(&conn).is_err());

        // A version table without a version column must not be read as "version 0"
        conn.execute_batch("CREATE TABLE schema_migrations (applied_at TEXT)").unwrap();
        assert!(get_schema_version(&conn).is_err());
        assert!(run_migrations(&conn).is_err());

        let ingredients: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'ingredients'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(ingredients, 0);
    }

    #[test]
    fn test_recipe_line_constraints() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute("INSERT INTO recipes (name) VALUES ('Soup')", []).unwrap();
        let recipe_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO recipe_lines (recipe_id, ingredient_code, grams) VALUES (?1, 'A', 10.0)",
            [recipe_id],
        )
        .unwrap();

        let duplicate = conn.execute(
            "INSERT INTO recipe_lines (recipe_id, ingredient_code, grams) VALUES (?1, 'A', 5.0)",
            [recipe_id],
        );
        assert!(duplicate.is_err());

        let zero = conn.execute(
            "INSERT INTO recipe_lines (recipe_id, ingredient_code, grams) VALUES (?1, 'B', 0.0)",
            [recipe_id],
        );
        assert!(zero.is_err());

        let blank_name = conn.execute("INSERT INTO recipes (name) VALUES ('   ')", []);
        assert!(blank_name.is_err());
    }
}
