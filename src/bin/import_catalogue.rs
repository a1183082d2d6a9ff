//! Load a catalogue export into the database from the command line

use std::path::PathBuf;

use nutrilabel::catalogue::import;
use nutrilabel::config::Config;
use nutrilabel::db::Database;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Some(file) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: import_catalogue <catalogue.csv>");
        std::process::exit(2);
    };

    let config = Config::from_env();
    println!("Database path: {}", config.database_path.display());
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::open(&config.database_path)?;
    let summary = import::import_catalogue(&database, &file)?;

    println!("Imported {}", file.display());
    println!("  Inserted: {}", summary.inserted);
    println!("  Updated:  {}", summary.updated);
    println!("  Skipped:  {}", summary.skipped);

    Ok(())
}
