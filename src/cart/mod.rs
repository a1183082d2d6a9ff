//! Line item cart
//!
//! The session's working set of (code, grams) entries. Lines merge by code and
//! keep the position of their first insertion.

use serde::{Deserialize, Serialize};

use crate::models::round2;

/// One ingredient quantity in a cart or recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub code: String,
    pub grams: f64,
    pub display_name: String,
}

impl LineItem {
    pub fn new(code: impl Into<String>, grams: f64, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            grams,
            display_name: display_name.into(),
        }
    }

    /// Lines with zero, negative or non-finite mass are treated as absent
    pub fn contributes(&self) -> bool {
        self.grams.is_finite() && self.grams > 0.0
    }
}

/// Lifecycle of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartState {
    Empty,
    Accumulating,
    Finalized { recipe_id: i64 },
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<LineItem>,
    serving_grams: Option<f64>,
    finalized: Option<i64>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add grams of an ingredient, merging into an existing line with the same code.
    ///
    /// Non-positive or non-finite grams leave the cart unchanged.
    pub fn add_or_merge(&mut self, code: &str, grams: f64, display_name: &str) {
        if !grams.is_finite() || grams <= 0.0 {
            return;
        }

        match self.lines.iter_mut().find(|l| l.code == code) {
            Some(line) => line.grams = round2(line.grams + grams),
            None => self.lines.push(LineItem::new(code, round2(grams), display_name)),
        }
        self.finalized = None;
    }

    /// Remove the line at `index`. Out-of-range indices are ignored.
    /// Returns the removed line, if any.
    pub fn remove_at(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.lines.len() {
            return None;
        }
        self.finalized = None;
        Some(self.lines.remove(index))
    }

    /// Empty the cart and forget the serving size
    pub fn clear(&mut self) {
        self.lines.clear();
        self.serving_grams = None;
        self.finalized = None;
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_grams(&self) -> f64 {
        round2(self.lines.iter().filter(|l| l.contributes()).map(|l| l.grams).sum())
    }

    pub fn serving_grams(&self) -> Option<f64> {
        self.serving_grams
    }

    /// Set or unset the serving size. Non-positive values unset it.
    pub fn set_serving(&mut self, grams: Option<f64>) {
        self.serving_grams = grams.filter(|g| g.is_finite() && *g > 0.0);
    }

    /// Record a successful persist of the current lines
    pub fn mark_finalized(&mut self, recipe_id: i64) {
        self.finalized = Some(recipe_id);
    }

    pub fn state(&self) -> CartState {
        match (self.lines.is_empty(), self.finalized) {
            (true, _) => CartState::Empty,
            (false, Some(recipe_id)) => CartState::Finalized { recipe_id },
            (false, None) => CartState::Accumulating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_by_code() {
        let mut cart = Cart::new();
        cart.add_or_merge("A", 100.333, "Flour");
        cart.add_or_merge("A", 0.337, "Flour (renamed)");

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].grams, 100.67);
        assert_eq!(cart.lines()[0].display_name, "Flour");
    }

    #[test]
    fn test_merge_keeps_first_position() {
        let mut cart = Cart::new();
        cart.add_or_merge("A", 10.0, "a");
        cart.add_or_merge("B", 20.0, "b");
        cart.add_or_merge("C", 30.0, "c");
        cart.add_or_merge("A", 5.0, "a");

        let codes: Vec<&str> = cart.lines().iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert_eq!(cart.lines()[0].grams, 15.0);
        assert_eq!(cart.total_grams(), 65.0);
    }

    #[test]
    fn test_non_positive_grams_are_ignored() {
        let mut cart = Cart::new();
        cart.add_or_merge("A", 0.0, "a");
        cart.add_or_merge("A", -5.0, "a");
        cart.add_or_merge("A", f64::NAN, "a");
        cart.add_or_merge("A", f64::INFINITY, "a");
        assert!(cart.is_empty());
        assert_eq!(cart.state(), CartState::Empty);

        cart.add_or_merge("A", 10.0, "a");
        cart.add_or_merge("A", -3.0, "a");
        assert_eq!(cart.lines()[0].grams, 10.0);
    }

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut cart = Cart::new();
        cart.add_or_merge("A", 10.0, "a");
        cart.add_or_merge("B", 20.0, "b");

        assert!(cart.remove_at(5).is_none());
        assert_eq!(cart.lines().len(), 2);

        let removed = cart.remove_at(0).unwrap();
        assert_eq!(removed.code, "A");
        assert_eq!(cart.lines()[0].code, "B");
    }

    #[test]
    fn test_clear_resets_serving() {
        let mut cart = Cart::new();
        cart.add_or_merge("A", 10.0, "a");
        cart.set_serving(Some(150.0));
        assert_eq!(cart.serving_grams(), Some(150.0));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.serving_grams(), None);
    }

    #[test]
    fn test_set_serving_rejects_non_positive() {
        let mut cart = Cart::new();
        cart.set_serving(Some(0.0));
        assert_eq!(cart.serving_grams(), None);
        cart.set_serving(Some(-10.0));
        assert_eq!(cart.serving_grams(), None);
        cart.set_serving(Some(80.0));
        cart.set_serving(None);
        assert_eq!(cart.serving_grams(), None);
    }

    #[test]
    fn test_lifecycle() {
        let mut cart = Cart::new();
        assert_eq!(cart.state(), CartState::Empty);

        cart.add_or_merge("A", 10.0, "a");
        assert_eq!(cart.state(), CartState::Accumulating);

        cart.mark_finalized(7);
        assert_eq!(cart.state(), CartState::Finalized { recipe_id: 7 });

        cart.add_or_merge("B", 1.0, "b");
        assert_eq!(cart.state(), CartState::Accumulating);

        cart.mark_finalized(8);
        cart.clear();
        assert_eq!(cart.state(), CartState::Empty);
    }
}
