//! Shared nutrition data structures
//!
//! `Nutrition` holds nine definite nutrient values and is used for aggregates
//! and portions. `NutrientProfile` is the catalogue's view, where any value may
//! be unknown.

use serde::{Deserialize, Serialize};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Nine nutrient values for a reference mass (100 g or one serving)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub energy_kcal: f64,
    pub energy_kj: f64,
    pub fat: f64,           // grams
    pub saturated_fat: f64, // grams
    pub carbohydrate: f64,  // grams
    pub sugars: f64,        // grams
    pub protein: f64,       // grams
    pub fibre: f64,         // grams
    pub salt: f64,          // grams
}

impl Nutrition {
    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Apply `f` to every field
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            energy_kcal: f(self.energy_kcal),
            energy_kj: f(self.energy_kj),
            fat: f(self.fat),
            saturated_fat: f(self.saturated_fat),
            carbohydrate: f(self.carbohydrate),
            sugars: f(self.sugars),
            protein: f(self.protein),
            fibre: f(self.fibre),
            salt: f(self.salt),
        }
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        self.map(|v| v * multiplier)
    }

    /// Every field rounded to two decimals
    pub fn round2(&self) -> Self {
        self.map(round2)
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            energy_kcal: self.energy_kcal + other.energy_kcal,
            energy_kj: self.energy_kj + other.energy_kj,
            fat: self.fat + other.fat,
            saturated_fat: self.saturated_fat + other.saturated_fat,
            carbohydrate: self.carbohydrate + other.carbohydrate,
            sugars: self.sugars + other.sugars,
            protein: self.protein + other.protein,
            fibre: self.fibre + other.fibre,
            salt: self.salt + other.salt,
        }
    }

    /// Labelled values in label order (energy first, salt last)
    pub fn labelled(&self) -> [(&'static str, f64); 9] {
        [
            ("Energy (kcal)", self.energy_kcal),
            ("Energy (kJ)", self.energy_kj),
            ("Fat (g)", self.fat),
            ("of which saturates (g)", self.saturated_fat),
            ("Carbohydrate (g)", self.carbohydrate),
            ("of which sugars (g)", self.sugars),
            ("Protein (g)", self.protein),
            ("Fibre (g)", self.fibre),
            ("Salt (g)", self.salt),
        ]
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

/// Per-100g nutrient values as recorded in the catalogue (`None` = unknown)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    pub energy_kcal: Option<f64>,
    pub energy_kj: Option<f64>,
    pub fat: Option<f64>,
    pub saturated_fat: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub sugars: Option<f64>,
    pub protein: Option<f64>,
    pub fibre: Option<f64>,
    pub salt: Option<f64>,
}

impl NutrientProfile {
    /// Definite values, counting unknown nutrients as zero
    pub fn or_zero(&self) -> Nutrition {
        Nutrition {
            energy_kcal: self.energy_kcal.unwrap_or(0.0),
            energy_kj: self.energy_kj.unwrap_or(0.0),
            fat: self.fat.unwrap_or(0.0),
            saturated_fat: self.saturated_fat.unwrap_or(0.0),
            carbohydrate: self.carbohydrate.unwrap_or(0.0),
            sugars: self.sugars.unwrap_or(0.0),
            protein: self.protein.unwrap_or(0.0),
            fibre: self.fibre.unwrap_or(0.0),
            salt: self.salt.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.6000000000000005), 4.6);
        assert_eq!(round2(6.8999999999999995), 6.9);
        assert_eq!(round2(110.00000000000001), 110.0);
        assert_eq!(round2(-0.004), -0.0);
    }

    #[test]
    fn test_sum_and_scale() {
        let a = Nutrition { energy_kcal: 100.0, protein: 2.0, ..Nutrition::zero() };
        let b = Nutrition { energy_kcal: 50.0, salt: 0.5, ..Nutrition::zero() };

        let total: Nutrition = vec![a, b].into_iter().sum();
        assert_eq!(total.energy_kcal, 150.0);
        assert_eq!(total.protein, 2.0);
        assert_eq!(total.salt, 0.5);

        let doubled = total * 2.0;
        assert_eq!(doubled.energy_kcal, 300.0);
        assert_eq!(doubled.salt, 1.0);
    }

    #[test]
    fn test_unknown_nutrients_count_as_zero() {
        let profile = NutrientProfile {
            energy_kcal: Some(200.0),
            protein: Some(10.0),
            ..NutrientProfile::default()
        };
        let definite = profile.or_zero();
        assert_eq!(definite.energy_kcal, 200.0);
        assert_eq!(definite.protein, 10.0);
        assert_eq!(definite.fat, 0.0);
        assert_eq!(definite.salt, 0.0);
    }

    #[test]
    fn test_labelled_order() {
        let labels: Vec<&str> = Nutrition::zero().labelled().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels.first(), Some(&"Energy (kcal)"));
        assert_eq!(labels.last(), Some(&"Salt (g)"));
        assert_eq!(labels.len(), 9);
    }
}
