use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pso2_trans::cli::import::{self, ImportConfig};
use pso2_trans::util::{env, tracing::init_tracing};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "pso2-trans", version, about = "Merge PSO2 text archives and translations into a catalog")]
struct Cli {
    /// Import version tag for base strings (non-zero)
    #[arg(short = 'i', long = "import", value_name = "VERSION")]
    version: i64,
    /// Import as translation set NAME instead of base text
    #[arg(short = 't', long = "trans", value_name = "NAME")]
    translation: Option<String>,
    /// Archive label list (`hash header group label` per line) for CSV import
    #[arg(long = "aidaskits", value_name = "FILE")]
    skits: Option<PathBuf>,
    /// Translation CSV (`path,type,zeroUnk,identifier,value`) for CSV import
    #[arg(long = "aidastrings", value_name = "FILE")]
    strings: Option<PathBuf>,
    /// Catalog database; falls back to PSO2_TRANS_DB
    database: Option<PathBuf>,
    /// Archive files named by their 32-digit hash
    archives: Vec<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env before the subscriber reads RUST_LOG.
    env::init_env();
    init_tracing("info")?;
    env::bootstrap_cli("pso2-trans");

    let cli = Cli::parse();
    let summary = import::run(ImportConfig {
        database: cli.database,
        version: cli.version,
        translation: cli.translation,
        skits: cli.skits,
        strings: cli.strings,
        archives: cli.archives,
    })
    .inspect_err(|err| error!(error = %format!("{err:#}"), "import failed"))?;

    let out = serde_json::to_string_pretty(&summary).context("serialize summary")?;
    println!("{out}");
    Ok(())
}
