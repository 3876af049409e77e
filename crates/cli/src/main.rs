//! Diwan CLI - Database migrations and catalog tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! diwan migrate
//!
//! # Query the bundled sample catalog
//! diwan catalog --query "category=Chairs&sort=price-asc"
//!
//! # Query a catalog file in Arabic
//! diwan catalog --file products.json --lang ar --query "search=دمشق"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run storefront database migrations
//! - `catalog` - Filter and sort a catalog offline, printing JSON lines

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "diwan")]
#[command(author, version, about = "Diwan storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Filter and sort a product catalog
    Catalog {
        /// Catalog JSON file (defaults to the bundled sample catalog)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Language for category matching (`en` or `ar`)
        #[arg(short, long, default_value = "en")]
        lang: String,

        /// Listing query string, e.g. `category=Chairs&new=true&sort=newest`
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing (stderr, so catalog output on stdout stays clean)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Catalog { file, lang, query } => {
            let language = lang.parse()?;
            let mut stdout = std::io::stdout().lock();
            commands::catalog::run(file.as_deref(), language, &query, &mut stdout)?;
        }
    }
    Ok(())
}
