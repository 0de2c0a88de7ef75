use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::error;

use kosmetik_scraper::config::{Config, RunConfig};
use kosmetik_scraper::constants;
use kosmetik_scraper::crawler::OverviewCrawler;
use kosmetik_scraper::logging;
use kosmetik_scraper::pipeline::Pipeline;
use kosmetik_scraper::storage::{FeedSink, InMemorySink, JsonlFeed};

#[derive(Parser)]
#[command(name = "kosmetik_scraper")]
#[command(about = "Beauty parlour listing scraper for kosmetikportal.net")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the search overview pages for one country
    Crawl {
        /// 2-letter country code driving the search form, postal pattern and phone region
        #[arg(long)]
        country_code: Option<String>,
        /// Directory the JSONL feed is written to
        #[arg(long, default_value = "exports")]
        output_dir: String,
        /// Stop after this many result pages
        #[arg(long)]
        max_pages: Option<u32>,
        /// Process records without writing a feed file
        #[arg(long)]
        dry_run: bool,
    },
    /// List the countries the portal's search form supports
    Countries,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            country_code,
            output_dir,
            max_pages,
            dry_run,
        } => {
            // Fail closed on an unknown country before anything is fetched
            let run = RunConfig::resolve(country_code.as_deref())?;
            let config = Config::load_or_default("config.toml");
            let crawler = OverviewCrawler::new(&config.crawler, max_pages)?;

            println!(
                "🔄 Crawling {} listings for {}...",
                constants::PORTAL,
                run.country_code
            );

            let sink: Arc<dyn FeedSink> = if dry_run {
                Arc::new(InMemorySink::new())
            } else {
                Arc::new(JsonlFeed::create(&output_dir, &run)?)
            };

            match Pipeline::run(&crawler, &run, sink.as_ref()).await {
                Ok(summary) => {
                    println!("\n📊 Crawl results for {}:", summary.country_code);
                    println!("   Pages fetched: {}", summary.pages);
                    println!("   Listings: {}", summary.total_listings);
                    println!("   With phone: {}", summary.with_phone);
                    println!("   With postal code: {}", summary.with_postalcode);
                    if let Some(file) = &summary.output_file {
                        println!("   Output file: {}", file);
                    }
                }
                Err(e) => {
                    error!("Crawl failed: {}", e);
                    println!("❌ Crawl failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Countries => {
            println!("Supported countries:");
            for (code, label) in constants::COUNTRY_LABELS {
                println!("   {code}  {label}");
            }
        }
    }
    Ok(())
}
