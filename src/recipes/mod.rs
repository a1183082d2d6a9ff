//! Finalized recipes
//!
//! Atomic persistence of a cart's lines and read-back of saved recipes.

pub mod persister;

pub use persister::{list, load, persist, SavedRecipe};
