//! Cart MCP Tools
//!
//! Session cart mutation and the nutrition view derived from it.

use serde::Serialize;

use crate::cart::{Cart, CartState};
use crate::catalogue::{normalize_code, IngredientRepository, SqliteCatalogue};
use crate::db::Database;
use crate::error::ValidationError;
use crate::nutrition::{self, AggregateResult, PortionResult};

/// A cart line with its position
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub index: usize,
    pub code: String,
    pub display_name: String,
    pub grams: f64,
}

/// Response for every cart tool: the cart after the operation
#[derive(Debug, Serialize)]
pub struct CartView {
    pub state: CartState,
    pub lines: Vec<CartLineView>,
    pub total_grams: f64,
    pub serving_grams: Option<f64>,
    pub per_100g: Option<AggregateResult>,
    pub per_serving: Option<PortionResult>,
}

/// Build the view of `cart`, aggregating against the catalogue
pub fn cart_view(db: &Database, cart: &Cart) -> Result<CartView, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let per_100g = nutrition::aggregate(cart.lines(), &SqliteCatalogue::new(&conn))
        .map_err(|e| format!("Failed to aggregate nutrition: {}", e))?;
    let per_serving = cart
        .serving_grams()
        .and_then(|g| nutrition::scale(per_100g.as_ref(), g));

    Ok(CartView {
        state: cart.state(),
        lines: cart
            .lines()
            .iter()
            .enumerate()
            .map(|(index, line)| CartLineView {
                index,
                code: line.code.clone(),
                display_name: line.display_name.clone(),
                grams: line.grams,
            })
            .collect(),
        total_grams: cart.total_grams(),
        serving_grams: cart.serving_grams(),
        per_100g,
        per_serving,
    })
}

/// Add a quantity of an ingredient to the cart.
///
/// `quantity` is the text as typed; a decimal comma is accepted.
/// The display name is taken from the catalogue; unknown codes get an empty name.
pub fn cart_add(
    db: &Database,
    cart: &mut Cart,
    code: &str,
    quantity: &str,
    unit: Option<&str>,
) -> Result<Result<CartView, ValidationError>, String> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Ok(Err(ValidationError::CodeRequired));
    }

    let grams = match nutrition::parse_quantity(quantity)
        .and_then(|q| nutrition::to_grams(q, unit.unwrap_or("g")))
    {
        Ok(grams) => grams,
        Err(e) => return Ok(Err(e)),
    };

    let display_name = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        SqliteCatalogue::new(&conn)
            .lookup(&code)
            .map_err(|e| format!("Failed to look up ingredient: {}", e))?
            .map(|p| p.name)
            .unwrap_or_default()
    };

    if display_name.is_empty() {
        tracing::warn!(code = %code, "adding code not present in catalogue");
    }
    cart.add_or_merge(&code, grams, &display_name);

    cart_view(db, cart).map(Ok)
}

/// Remove a line by position. Stale indices leave the cart unchanged.
pub fn cart_remove(db: &Database, cart: &mut Cart, index: usize) -> Result<CartView, String> {
    if let Some(removed) = cart.remove_at(index) {
        tracing::debug!(index, code = %removed.code, "removed cart line");
    }
    cart_view(db, cart)
}

/// Empty the cart and unset the serving size
pub fn cart_clear(db: &Database, cart: &mut Cart) -> Result<CartView, String> {
    cart.clear();
    cart_view(db, cart)
}

/// Set or unset the serving size
pub fn cart_set_serving(db: &Database, cart: &mut Cart, grams: Option<f64>) -> Result<CartView, String> {
    cart.set_serving(grams);
    cart_view(db, cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn test_worked_example_through_tools() {
        let (_dir, db) = test_support::temp_database();
        test_support::seed_worked_example(&db);
        let mut cart = Cart::new();

        cart_add(&db, &mut cart, "a", "0,2", Some("kg")).unwrap().unwrap();
        cart_add(&db, &mut cart, "B", "300", None).unwrap().unwrap();
        let view = cart_set_serving(&db, &mut cart, Some(150.0)).unwrap();

        assert_eq!(view.state, CartState::Accumulating);
        assert_eq!(view.lines[0].display_name, "Ingredient A");
        assert_eq!(view.lines[0].grams, 200.0);
        assert_eq!(view.total_grams, 500.0);

        let per_100g = view.per_100g.unwrap();
        assert_eq!(per_100g.per_100g.energy_kcal, 110.0);
        assert_eq!(per_100g.per_100g.protein, 4.6);

        let per_serving = view.per_serving.unwrap();
        assert_eq!(per_serving.per_serving.energy_kcal, 165.0);
        assert_eq!(per_serving.per_serving.protein, 6.9);
    }

    #[test]
    fn test_rejected_inputs_leave_cart_alone() {
        let (_dir, db) = test_support::temp_database();
        let mut cart = Cart::new();

        assert_eq!(
            cart_add(&db, &mut cart, "  ", "10", None).unwrap().unwrap_err(),
            ValidationError::CodeRequired
        );
        assert_eq!(
            cart_add(&db, &mut cart, "A", "10", Some("cup")).unwrap().unwrap_err(),
            ValidationError::UnknownUnit("cup".to_string())
        );
        assert_eq!(
            cart_add(&db, &mut cart, "A", "a handful", None).unwrap().unwrap_err(),
            ValidationError::InvalidQuantity("a handful".to_string())
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn test_unknown_code_is_kept_and_reported() {
        let (_dir, db) = test_support::temp_database();
        test_support::seed_worked_example(&db);
        let mut cart = Cart::new();

        cart_add(&db, &mut cart, "A", "50", None).unwrap().unwrap();
        let view = cart_add(&db, &mut cart, "zzz", "50", None).unwrap().unwrap();

        assert_eq!(view.lines[1].display_name, "");
        let aggregate = view.per_100g.unwrap();
        assert_eq!(aggregate.total_grams, 100.0);
        assert_eq!(aggregate.per_100g.energy_kcal, 100.0);
        assert_eq!(aggregate.unresolved_codes, vec!["ZZZ".to_string()]);
    }

    #[test]
    fn test_remove_and_clear() {
        let (_dir, db) = test_support::temp_database();
        let mut cart = Cart::new();
        cart_add(&db, &mut cart, "A", "10", None).unwrap().unwrap();
        cart_set_serving(&db, &mut cart, Some(30.0)).unwrap();

        let view = cart_remove(&db, &mut cart, 3).unwrap();
        assert_eq!(view.lines.len(), 1);

        let view = cart_clear(&db, &mut cart).unwrap();
        assert_eq!(view.state, CartState::Empty);
        assert!(view.lines.is_empty());
        assert_eq!(view.serving_grams, None);
        assert!(view.per_100g.is_none());
    }
}
