//! Runtime configuration
//!
//! Everything is read from environment variables. Unset paths fall back to a
//! `data/` directory next to the project root.

use std::path::{Path, PathBuf};

/// SQLite database file
pub const DATABASE_PATH_VAR: &str = "NUTRILABEL_DATABASE_PATH";
/// Output directory for recipe sheets
pub const REPORTS_DIR_VAR: &str = "NUTRILABEL_REPORTS_DIR";
/// Optional logo stamped on recipe sheets
pub const LOGO_PATH_VAR: &str = "NUTRILABEL_LOGO_PATH";

const DEFAULT_DATABASE_FILE: &str = "nutricio.db";

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    pub logo_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Self {
        let database_path = non_empty_var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let reports_dir = non_empty_var(REPORTS_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_reports_dir(&database_path));

        let logo_path = non_empty_var(LOGO_PATH_VAR).map(PathBuf::from);

        Self {
            database_path,
            reports_dir,
            logo_path,
        }
    }

    /// Configuration rooted at an explicit database file
    pub fn with_database(database_path: impl Into<PathBuf>) -> Self {
        let database_path = database_path.into();
        let reports_dir = default_reports_dir(&database_path);
        Self {
            database_path,
            reports_dir,
            logo_path: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Directory containing the executable, walked up out of `target/{debug,release}`
fn project_root() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path
}

fn default_database_path() -> PathBuf {
    let mut path = project_root();
    path.push("data");
    path.push(DEFAULT_DATABASE_FILE);
    path
}

fn default_reports_dir(database_path: &Path) -> PathBuf {
    database_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("reports")
}
