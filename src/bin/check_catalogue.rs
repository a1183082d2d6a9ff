//! Print a quick summary of the ingredient catalogue

use nutrilabel::catalogue::{IngredientRepository, SqliteCatalogue};
use nutrilabel::config::Config;
use nutrilabel::db::Database;
use nutrilabel::models::CatalogueOrder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());

    let database = Database::open(&config.database_path)?;
    database.with_conn(|conn| {
        let catalogue = SqliteCatalogue::new(conn);
        println!("Ingredients: {}", catalogue.count()?);

        for item in catalogue.list_all(CatalogueOrder::Code)?.iter().take(20) {
            println!(
                "  {} | {} | {}",
                item.code,
                item.name,
                item.supplier.as_deref().unwrap_or("-")
            );
        }
        Ok(())
    })?;

    Ok(())
}
