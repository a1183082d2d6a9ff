//! nutrilabel
//!
//! An MCP server for composing recipes and deriving their nutrition facts.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use nutrilabel::build_info;
use nutrilabel::config::Config;
use nutrilabel::db::{self, Database};
use nutrilabel::mcp::NutrilabelService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr, stdout carries the MCP stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nutrilabel=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("Reports directory: {}", config.reports_dir.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    eprintln!("Initializing database...");
    let database = Database::open(&config.database_path)?;
    database.with_conn(|conn| {
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let service = NutrilabelService::new(config, database);

    let server = service.serve((stdin(), stdout())).await?;
    server.waiting().await?;

    Ok(())
}
