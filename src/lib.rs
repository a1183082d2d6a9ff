//! nutrilabel Library
//!
//! Recipe composition over a per-100 g ingredient catalogue, with nutrition
//! aggregation, portion scaling and recipe persistence.

pub mod build_info;
pub mod cart;
pub mod catalogue;
pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod recipes;
pub mod tools;

#[cfg(test)]
mod test_support;
