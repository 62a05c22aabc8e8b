//! Command-line entry point of the marketplace scraper.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, warn};

use marketplace_scraper::db::{establish_connection_pool, run_migrations};
use marketplace_scraper::domain::types::{ProductCode, SellerName};
use marketplace_scraper::models::config::{AppConfig, OutputMode};
use marketplace_scraper::repository::{
    DieselRepository, ListingHistoryQuery, ListingReader, ProductReader, RepositoryError,
    SellerReader, SupplierReader,
};
use marketplace_scraper::services::errors::InitError;
use marketplace_scraper::services::export::ExportFormat;
use marketplace_scraper::services::fetcher::ChromeLauncher;
use marketplace_scraper::services::marketplace::MarketplaceRegistry;
use marketplace_scraper::services::pipeline::Pipeline;
use marketplace_scraper::services::sink::{Sink, SqlSink, TableSink};
use marketplace_scraper::services::targets::load_targets;

#[derive(Parser)]
#[command(name = "marketplace-scraper")]
#[command(about = "Scrape marketplace product pages into CSV, XLSX or SQLite")]
struct Cli {
    /// YAML configuration file; skipped when missing
    #[arg(long, default_value = "scraper.yaml")]
    config: PathBuf,

    /// Override the configured output mode
    #[arg(long, value_enum)]
    output: Option<OutputMode>,

    /// Spreadsheet of targets (csv or xlsx)
    #[arg(long)]
    targets: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stored price history of a product
    History {
        product_code: String,
        #[arg(long)]
        seller: Option<String>,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = Cli::parse();
    let result = load_config(&cli).and_then(|config| match &cli.command {
        Some(Command::History {
            product_code,
            seller,
        }) => history(&config, product_code, seller.as_deref()),
        None => scrape(&config),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, InitError> {
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(mode) = cli.output {
        config.output.mode = mode;
    }
    if let Some(path) = &cli.targets {
        config.targets_file = Some(path.clone());
    }
    Ok(config)
}

fn scrape(config: &AppConfig) -> Result<(), InitError> {
    let mut targets = config.targets.clone();
    if let Some(path) = &config.targets_file {
        targets.extend(load_targets(path)?);
    }
    if targets.is_empty() {
        warn!("No targets configured");
    }

    let registry = MarketplaceRegistry::new(&config.marketplaces)?;
    let path = config.output.path.clone();
    let mut sink: Box<dyn Sink> = match config.output.mode {
        OutputMode::Csv => Box::new(TableSink::new(ExportFormat::Csv, path)),
        OutputMode::Xlsx => Box::new(TableSink::new(ExportFormat::Xlsx, path)),
        OutputMode::Sql => Box::new(SqlSink::open(
            &config.output.database_url,
            config.brands.clone(),
        )?),
    };

    let pipeline = Pipeline::new(
        ChromeLauncher::new(config.browser.clone()),
        registry,
        config.browser.clone(),
    );
    let summary = pipeline.run(&targets, sink.as_mut())?;
    if let Some(path) = sink.finish()? {
        println!("Output written to {}", path.display());
    }
    println!("{summary}");
    Ok(())
}

fn history(config: &AppConfig, product_code: &str, seller: Option<&str>) -> Result<(), InitError> {
    let pool = establish_connection_pool(&config.output.database_url)?;
    run_migrations(&pool)?;
    let repo = DieselRepository::new(pool);

    let code = ProductCode::new(product_code).map_err(RepositoryError::from)?;
    let Some(product) = repo.get_product_by_code(&code)? else {
        println!("No product with code {product_code}");
        return Ok(());
    };

    let mut query = ListingHistoryQuery::new(product.id);
    if let Some(seller) = seller {
        let name = SellerName::new(seller).map_err(RepositoryError::from)?;
        let mut found = None;
        for supplier in repo.list_suppliers()? {
            found = repo.get_seller(supplier.id, &name)?;
            if found.is_some() {
                break;
            }
        }
        let Some(found) = found else {
            println!("No seller named {seller}");
            return Ok(());
        };
        query = query.seller(found.id);
    }

    println!(
        "{} {} {}",
        product.brand,
        product.model,
        product.variant.as_ref().map(|v| v.as_str()).unwrap_or("")
    );
    println!("created_at\tprice\trating\tshipping_price\tshipping_eta\turl");
    for listing in repo.list_price_history(query)? {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            listing.created_at.format("%Y-%m-%d %H:%M:%S"),
            listing.price,
            listing.rating,
            listing.shipping_price,
            listing.shipping_eta.as_ref().map(|e| e.as_str()).unwrap_or(""),
            listing.url
        );
    }
    Ok(())
}
