//! Weighted nutrient aggregation
//!
//! Combines the per-100g profiles of a set of line items into the per-100g
//! profile of the mixture.

use serde::Serialize;

use crate::cart::LineItem;
use crate::catalogue::{IngredientRepository, Resolution};
use crate::db::DbResult;
use crate::models::{round2, Nutrition};

/// Per-100g nutrition of a mixture
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub total_grams: f64,
    pub per_100g: Nutrition,
    /// Codes that did not resolve; their mass is in `total_grams` but they add no nutrients
    pub unresolved_codes: Vec<String>,
}

/// Aggregate `lines` against `repo`.
///
/// Returns `None` when no line has positive mass or when no contributing line
/// resolves. Unresolved codes dilute the mixture: their grams count toward the
/// total while contributing zero to every nutrient. Rounding happens once, on
/// the final values.
pub fn aggregate<R>(lines: &[LineItem], repo: &R) -> DbResult<Option<AggregateResult>>
where
    R: IngredientRepository + ?Sized,
{
    let contributing: Vec<&LineItem> = lines.iter().filter(|l| l.contributes()).collect();
    let total_grams: f64 = contributing.iter().map(|l| l.grams).sum();
    if contributing.is_empty() || total_grams <= 0.0 {
        return Ok(None);
    }

    let mut totals = Nutrition::zero();
    let mut resolved = 0usize;
    let mut unresolved_codes = Vec::new();

    for line in contributing {
        if line.code.trim().is_empty() {
            continue;
        }
        match repo.resolve(&line.code)? {
            Resolution::Resolved(profile) => {
                totals = totals + profile.per_100g.or_zero() * (line.grams / 100.0);
                resolved += 1;
            }
            Resolution::Unresolved { code } => unresolved_codes.push(code),
        }
    }

    if !unresolved_codes.is_empty() {
        tracing::warn!(codes = ?unresolved_codes, "unresolved ingredient codes in aggregation");
    }
    if resolved == 0 {
        return Ok(None);
    }

    let scale = 100.0 / total_grams;
    Ok(Some(AggregateResult {
        total_grams: round2(total_grams),
        per_100g: (totals * scale).round2(),
        unresolved_codes,
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::{IngredientProfile, NutrientProfile};
    use crate::test_support::worked_example_profiles;

    fn repo() -> HashMap<String, IngredientProfile> {
        worked_example_profiles()
            .into_iter()
            .map(|p| (p.code.clone(), p))
            .collect()
    }

    fn line(code: &str, grams: f64) -> LineItem {
        LineItem::new(code, grams, "")
    }

    #[test]
    fn test_worked_example() {
        let result = aggregate(&[line("A", 200.0), line("B", 300.0)], &repo())
            .unwrap()
            .unwrap();

        assert_eq!(result.total_grams, 500.0);
        assert_eq!(result.per_100g.energy_kcal, 110.0);
        assert_eq!(result.per_100g.protein, 4.6);
        assert_eq!(result.per_100g.fat, 0.0);
        assert!(result.unresolved_codes.is_empty());
    }

    #[test]
    fn test_empty_and_non_positive() {
        let repo = repo();
        assert!(aggregate(&[], &repo).unwrap().is_none());
        assert!(aggregate(&[line("A", 0.0), line("B", -5.0)], &repo)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unresolved_code_dilutes() {
        let result = aggregate(&[line("A", 200.0), line("B", 300.0), line("ZZZ", 50.0)], &repo())
            .unwrap()
            .unwrap();

        assert_eq!(result.total_grams, 550.0);
        // 550 kcal of numerator over 550 g
        assert_eq!(result.per_100g.energy_kcal, 100.0);
        assert_eq!(result.per_100g.protein, round2(23.0 * 100.0 / 550.0));
        assert_eq!(result.unresolved_codes, vec!["ZZZ".to_string()]);
    }

    #[test]
    fn test_nothing_resolves() {
        assert!(aggregate(&[line("X", 100.0), line("Y", 50.0)], &repo())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_scale_invariance() {
        let repo = repo();
        let base = aggregate(&[line("A", 200.0), line("B", 300.0)], &repo)
            .unwrap()
            .unwrap();

        for k in [0.5, 3.0, 7.25] {
            let scaled = aggregate(&[line("A", 200.0 * k), line("B", 300.0 * k)], &repo)
                .unwrap()
                .unwrap();
            assert_eq!(scaled.per_100g, base.per_100g);
        }
    }

    #[test]
    fn test_rounding_applied_once() {
        let mut repo = HashMap::new();
        for code in ["X", "Y", "Z"] {
            let mut p = IngredientProfile::new(code, code);
            p.per_100g = NutrientProfile {
                energy_kcal: Some(1.006),
                ..NutrientProfile::default()
            };
            repo.insert(code.to_string(), p);
        }

        // Each line contributes 0.503 kcal; rounding per line would yield 1.0
        let lines = vec![line("X", 50.0), line("Y", 50.0), line("Z", 50.0)];
        let result = aggregate(&lines, &repo).unwrap().unwrap();
        assert_eq!(result.total_grams, 150.0);
        assert_eq!(result.per_100g.energy_kcal, 1.01);
    }
}
