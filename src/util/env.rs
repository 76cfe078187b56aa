//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in the binary (or rely on lazy Once).
use std::path::PathBuf;
use std::sync::Once;
use tracing::{debug, info};

static INIT: Once = Once::new();

/// Environment variable consulted when no database path is given on the command line.
pub const DB_PATH_VAR: &str = "PSO2_TRANS_DB";

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            debug!(target = "env", "loaded .env");
        }
    });
}

/// Common bootstrap for the CLI: load dotenv and note where the catalog path comes from.
pub fn bootstrap_cli(bin_name: &str) {
    init_env();

    if env_opt(DB_PATH_VAR).is_some() {
        info!(
            target = "bootstrap",
            bin = bin_name,
            "{DB_PATH_VAR} set; used when no database argument is given"
        );
    }
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Catalog database path: explicit override first, then `PSO2_TRANS_DB`.
pub fn db_path(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    env_opt(DB_PATH_VAR)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("no database provided; pass DATABASE or set {DB_PATH_VAR}"))
}
