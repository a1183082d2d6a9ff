//! Catalogue bulk import
//!
//! Reads a delimited export of the master ingredient sheet and upserts every
//! valid row in a single transaction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{IngredientProfile, NutrientProfile};
use super::normalize_code;

/// Header columns every import file must carry
pub const REQUIRED_COLUMNS: [&str; 18] = [
    "code",
    "name",
    "supplier",
    "base_unit",
    "datasheet_date",
    "source",
    "compound_ingredients",
    "allergens",
    "remarks",
    "energy_kcal_100g",
    "energy_kj_100g",
    "fat_100g",
    "saturated_fat_100g",
    "carbohydrate_100g",
    "sugars_100g",
    "protein_100g",
    "fibre_100g",
    "salt_100g",
];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("import file has no header line")]
    Empty,

    #[error("missing columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

/// Counts reported after an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// Rows accepted from an import file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCatalogue {
    pub rows: Vec<IngredientProfile>,
    pub skipped: usize,
}

/// Read and import a catalogue file
pub fn import_catalogue(db: &Database, path: &Path) -> Result<ImportSummary, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = parse_catalogue(&text)?;
    tracing::info!(
        path = %path.display(),
        rows = parsed.rows.len(),
        skipped = parsed.skipped,
        "parsed catalogue file"
    );

    let mut summary = upsert_all(db, &parsed.rows)?;
    summary.skipped = parsed.skipped;

    tracing::info!(
        inserted = summary.inserted,
        updated = summary.updated,
        skipped = summary.skipped,
        "catalogue import complete"
    );
    Ok(summary)
}

/// Upsert rows in one transaction. Nothing is written if any row fails.
pub fn upsert_all(db: &Database, rows: &[IngredientProfile]) -> Result<ImportSummary, ImportError> {
    let summary = db.with_transaction(|tx| {
        let mut summary = ImportSummary::default();
        for row in rows {
            if IngredientProfile::upsert(tx, row)? {
                summary.updated += 1;
            } else {
                summary.inserted += 1;
            }
        }
        Ok(summary)
    })?;
    Ok(summary)
}

/// Parse the text of an import file
pub fn parse_catalogue(text: &str) -> Result<ParsedCatalogue, ImportError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text
        .lines()
        .find(|l| !l.trim().is_empty())
        .ok_or(ImportError::Empty)?;
    let delimiter = detect_delimiter(header_line);

    let mut records = split_records(text, delimiter).into_iter();
    let header: HashMap<String, usize> = records
        .next()
        .ok_or(ImportError::Empty)?
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header.contains_key(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    for fields in records {
        let text_cell = |column: &str| clean_text(cell(&header, &fields, column));
        let number_cell = |column: &str| parse_number(cell(&header, &fields, column));

        let code = text_cell("code").map(|c| normalize_code(&c));
        let name = text_cell("name");
        let (code, name) = match (code, name) {
            (Some(code), Some(name)) if !code.is_empty() => (code, name),
            _ => {
                skipped += 1;
                continue;
            }
        };

        rows.push(IngredientProfile {
            code,
            name,
            supplier: text_cell("supplier"),
            base_unit: text_cell("base_unit"),
            datasheet_date: text_cell("datasheet_date"),
            source: text_cell("source"),
            compound_ingredients: text_cell("compound_ingredients"),
            allergens: text_cell("allergens"),
            remarks: text_cell("remarks"),
            per_100g: NutrientProfile {
                energy_kcal: number_cell("energy_kcal_100g"),
                energy_kj: number_cell("energy_kj_100g"),
                fat: number_cell("fat_100g"),
                saturated_fat: number_cell("saturated_fat_100g"),
                carbohydrate: number_cell("carbohydrate_100g"),
                sugars: number_cell("sugars_100g"),
                protein: number_cell("protein_100g"),
                fibre: number_cell("fibre_100g"),
                salt: number_cell("salt_100g"),
            },
        });
    }

    Ok(ParsedCatalogue { rows, skipped })
}

fn cell<'a>(header: &HashMap<String, usize>, fields: &'a [String], column: &str) -> Option<&'a str> {
    header
        .get(column)
        .and_then(|&i| fields.get(i))
        .map(|s| s.as_str())
}

fn detect_delimiter(header: &str) -> char {
    if header.matches(';').count() >= header.matches(',').count() && header.contains(';') {
        ';'
    } else {
        ','
    }
}

/// Split text into records of fields, honouring double quotes.
///
/// `""` inside quotes is a literal quote, and a line break inside quotes stays
/// part of the cell. Blank lines produce no record.
fn split_records(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, std::mem::take(&mut fields));
            }
            c if c == delimiter && !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut records, fields);
    }
    records
}

fn push_record(records: &mut Vec<Vec<String>>, fields: Vec<String>) {
    let blank = fields.len() == 1 && fields[0].trim().is_empty();
    if !blank {
        records.push(fields);
    }
}

fn clean_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse a numeric cell. Accepts a decimal comma and embedded spaces.
fn parse_number(value: Option<&str>) -> Option<f64> {
    let cleaned: String = value?
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn header(delimiter: &str) -> String {
        REQUIRED_COLUMNS.join(delimiter)
    }

    #[test]
    fn test_parse_semicolon_with_decimal_comma() {
        let text = format!(
            "{}\n far01 ;Wheat flour;Molins;kg;2024-01-10;datasheet;;gluten;;364;1544;1,2;0,2;76,3;0,3;10,3;2,7;0,01\n",
            header(";")
        );

        let parsed = parse_catalogue(&text).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.rows.len(), 1);

        let flour = &parsed.rows[0];
        assert_eq!(flour.code, "FAR01");
        assert_eq!(flour.name, "Wheat flour");
        assert_eq!(flour.compound_ingredients, None);
        assert_eq!(flour.allergens.as_deref(), Some("gluten"));
        assert_eq!(flour.per_100g.fat, Some(1.2));
        assert_eq!(flour.per_100g.salt, Some(0.01));
    }

    #[test]
    fn test_parse_comma_with_quotes_and_bad_numbers() {
        let text = format!(
            "\u{feff}{}\nB2,\"Tomato, crushed\",,,,,,,,\"1 200\",abc,,,,,,,\n,No code,,,,,,,,,,,,,,,,\nC3,,,,,,,,,,,,,,,,,\n",
            header(",")
        );

        let parsed = parse_catalogue(&text).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped, 2);

        let tomato = &parsed.rows[0];
        assert_eq!(tomato.name, "Tomato, crushed");
        assert_eq!(tomato.per_100g.energy_kcal, Some(1200.0));
        assert_eq!(tomato.per_100g.energy_kj, None);
    }

    #[test]
    fn test_quoted_cell_spanning_lines() {
        let text = format!(
            "{}\r\nA1;Flour;Molins;kg;;;;\"gluten\r\nmay contain nuts\";\"line one\nline \"\"two\"\"\";364;;;;;;;;\r\nB2;Salt;;;;;;;;0;;;;;;;;99,5\r\n",
            header(";")
        );

        let parsed = parse_catalogue(&text).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.rows.len(), 2);

        let flour = &parsed.rows[0];
        assert_eq!(flour.allergens.as_deref(), Some("gluten\nmay contain nuts"));
        assert_eq!(flour.remarks.as_deref(), Some("line one\nline \"two\""));
        assert_eq!(flour.per_100g.energy_kcal, Some(364.0));

        assert_eq!(parsed.rows[1].code, "B2");
        assert_eq!(parsed.rows[1].per_100g.salt, Some(99.5));
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_catalogue("code;name;supplier\nA;B;C\n").unwrap_err();
        match err {
            ImportError::MissingColumns(missing) => {
                assert!(missing.contains(&"salt_100g".to_string()));
                assert!(!missing.contains(&"name".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(parse_catalogue("\n\n"), Err(ImportError::Empty)));
    }

    #[test]
    fn test_import_counts_inserted_and_updated() {
        let (dir, db) = test_support::temp_database();
        test_support::seed_worked_example(&db);

        let path = dir.path().join("ingredients.csv");
        let text = format!(
            "{}\nA;Ingredient A renamed;;;;;;;;200;;;;;;10;;\nN1;New one;;;;;;;;15;;;;;;;;\n;skipped;;;;;;;;;;;;;;;;\n",
            header(";")
        );
        std::fs::write(&path, text).unwrap();

        let summary = import_catalogue(&db, &path).unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                inserted: 1,
                updated: 1,
                skipped: 1
            }
        );

        let renamed = db
            .with_conn(|conn| IngredientProfile::get_by_code(conn, "A"))
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Ingredient A renamed");
        assert_eq!(db.with_conn(IngredientProfile::count).unwrap(), 3);
    }

    #[test]
    fn test_missing_file() {
        let (dir, db) = test_support::temp_database();
        let err = import_catalogue(&db, &dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
