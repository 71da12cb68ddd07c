mod catalog;
mod csv_reader;
mod import;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "prodimport")]
#[command(about = "Bulk-import products from CSV into the store admin API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import products from a CSV file (default when no command is given)
    Import {
        /// CSV file to import; defaults to PRODIMPORT_PRODUCTS_PATH or ./products.csv
        #[arg(long)]
        file: Option<PathBuf>,

        /// Check existence and categories for every row without creating anything
        #[arg(long)]
        dry_run: bool,

        /// Number of rows processed concurrently; overrides PRODIMPORT_MAX_CONCURRENT_ROWS
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        concurrency: Option<u16>,
    },
    /// Print every category path the importer can resolve, with its id
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = prodimport_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let result = match cli.command {
        Some(Commands::Import {
            file,
            dry_run,
            concurrency,
        }) => {
            let options = import::ImportOptions {
                file: file.unwrap_or_else(|| config.products_path.clone()),
                dry_run,
                max_concurrent_rows: concurrency.map_or(config.max_concurrent_rows, usize::from),
            };
            import::run_import(&config, &options).await
        }
        None => {
            let options = import::ImportOptions {
                file: config.products_path.clone(),
                dry_run: false,
                max_concurrent_rows: config.max_concurrent_rows,
            };
            import::run_import(&config, &options).await
        }
        Some(Commands::Categories) => catalog::run_list_categories(&config).await,
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "import failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
