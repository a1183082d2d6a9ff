//! Per-serving values from a per-100g aggregate

use serde::Serialize;

use super::aggregate::AggregateResult;
use crate::models::{round2, Nutrition};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortionResult {
    pub serving_grams: f64,
    pub per_serving: Nutrition,
}

/// Re-express an aggregate at `serving_grams`.
///
/// `None` when there is no aggregate or the serving is not a positive mass.
pub fn scale(aggregate: Option<&AggregateResult>, serving_grams: f64) -> Option<PortionResult> {
    let aggregate = aggregate?;
    if !serving_grams.is_finite() || serving_grams <= 0.0 {
        return None;
    }

    let factor = serving_grams / 100.0;
    Some(PortionResult {
        serving_grams: round2(serving_grams),
        per_serving: (aggregate.per_100g * factor).round2(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_aggregate() -> AggregateResult {
        AggregateResult {
            total_grams: 500.0,
            per_100g: Nutrition {
                energy_kcal: 110.0,
                protein: 4.6,
                ..Nutrition::zero()
            },
            unresolved_codes: Vec::new(),
        }
    }

    #[test]
    fn test_worked_portion() {
        let portion = scale(Some(&worked_aggregate()), 150.0).unwrap();
        assert_eq!(portion.serving_grams, 150.0);
        assert_eq!(portion.per_serving.energy_kcal, 165.0);
        assert_eq!(portion.per_serving.protein, 6.9);
    }

    #[test]
    fn test_identity_at_100g() {
        let aggregate = worked_aggregate();
        let portion = scale(Some(&aggregate), 100.0).unwrap();
        assert_eq!(portion.per_serving, aggregate.per_100g);
    }

    #[test]
    fn test_no_portion() {
        assert!(scale(None, 150.0).is_none());
        assert!(scale(Some(&worked_aggregate()), 0.0).is_none());
        assert!(scale(Some(&worked_aggregate()), -20.0).is_none());
    }
}
