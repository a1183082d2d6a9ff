//! Service status and usage instructions
//!
//! Provides runtime status information about the nutrilabel service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::catalogue::SqliteCatalogue;
use crate::db::Database;
use crate::models::Recipe;

/// Recipe composition instructions for AI assistants
pub const COMPOSER_INSTRUCTIONS: &str = r#"
# Recipe Composition Instructions

This guide explains how to build a recipe, read its nutrition facts and save it.

## Overview

1. **Catalogue** - Ingredients keyed by supplier code, with nutrients per 100 g
2. **Cart** - The working recipe for this session: one line per ingredient code
3. **Saved recipe** - A finalized cart: name plus (code, grams) lines

---

## Finding Ingredients

**Tool:** `list_ingredients`
- `order_by`: `"code"` (default) or `"name"`

**Tool:** `get_ingredient`
- `code`: catalogue code (case-insensitive)
- Returns the full datasheet: supplier, allergens, nine nutrients per 100 g

---

## Building the Cart

**Tool:** `cart_add`
- `code`: catalogue code; trimmed and upper-cased
- `quantity`: a positive number as text, e.g. `"250"` or `"0,5"`
- `unit`: `"g"` (default), `"kg"` or `"mg"`; converted to grams

Adding a code that is already in the cart adds to its grams. The line keeps
its original position. Quantities of zero or less are ignored.

A code that is not in the catalogue is still accepted. It counts toward the
total weight but adds no nutrients, so it dilutes the per-100 g values.
`cart_view` lists such codes under `unresolved_codes`.

**Tool:** `cart_remove`
- `index`: zero-based line position from `cart_view`
- An index past the end does nothing

**Tool:** `cart_set_serving`
- `grams`: serving size; omit or pass 0 to unset

**Tool:** `cart_clear`
- Empties the cart and unsets the serving size

**Tool:** `cart_view`
- Lines, total weight, per-100 g nutrition and (if a serving is set) per-serving nutrition

---

## Saving and Printing

**Tool:** `save_recipe`
- `name`: required, surrounding spaces are trimmed
- Saves every line with a code and positive grams in one transaction
- The cart is NOT cleared; call `cart_clear` to start the next recipe

**Tool:** `export_recipe_sheet`
- Writes a PDF recipe sheet for the current cart

**Tool:** `list_recipes`, `get_recipe`, `export_saved_recipe_sheet`
- Read back and re-print saved recipes

---

## Nutrition Rules

- Per-100 g values are mass-weighted over all lines, then rounded to 2 decimals once
- Unknown nutrient values in a datasheet count as 0
- Per-serving values = per-100 g values x serving grams / 100
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub ingredient_count: Option<i64>,
    pub recipe_count: Option<i64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status. Counts are omitted if the database can't be read.
    pub fn get_status(&self, db: &Database) -> ServiceStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let ingredient_count = db
            .with_conn(|conn| SqliteCatalogue::new(conn).count())
            .ok();
        let recipe_count = db.with_conn(Recipe::count).ok();

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            ingredient_count,
            recipe_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
