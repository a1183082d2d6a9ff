//! nutrilabel Tools module
//!
//! MCP tool implementations for recipe composition.

pub mod cart;
pub mod catalogue;
pub mod recipes;
pub mod reports;
pub mod status;
