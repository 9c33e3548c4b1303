use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

use imdb_indexer::config::Config;
use imdb_indexer::logging;
use imdb_indexer::pipeline::{Pipeline, RunSummary};
use imdb_indexer::sink::{BulkSink, EsBulkSink};

#[derive(Parser)]
#[command(name = "imdb_indexer")]
#[command(about = "IMDb dataset dump indexer for Elasticsearch-compatible search services")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the configuration file (config.toml is picked up when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory containing the dataset dumps (overrides configuration)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Maximum documents per bulk submission (overrides configuration)
    #[arg(long)]
    batch_size: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the name cache, then index both datasets in order
    Run,
    /// Index only the title-basics dataset
    Titles,
    /// Index only the principal-cast dataset (title references resolve to null)
    Principals,
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Run summary:");
    for stage in &summary.stages {
        println!(
            "   {} → {}: {} indexed, {} skipped, {} batches submitted, {} failed",
            stage.dataset,
            stage.collection,
            stage.records_processed,
            stage.records_skipped,
            stage.batches_submitted,
            stage.batches_failed
        );
    }

    if summary.batches_failed() > 0 {
        warn!(
            "{} bulk submissions failed during this run",
            summary.batches_failed()
        );
        println!(
            "⚠️  {} bulk submissions failed; see logs for the affected batch ranges",
            summary.batches_failed()
        );
    } else {
        println!("✅ Indexing completed");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.ingest.data_dir = data_dir;
    }
    if let Some(batch_size) = cli.batch_size {
        config.ingest.batch_size = batch_size;
    }

    let sink: Arc<dyn BulkSink> = Arc::new(EsBulkSink::new(&config.destination));
    let destination = config.destination.base_url();
    let pipeline = Pipeline::new(config, sink);

    let summary = match cli.command {
        Commands::Run => {
            println!("🚀 Running full indexing pipeline against {destination}...");
            pipeline.run().await?
        }
        Commands::Titles => {
            println!("🎬 Indexing title basics against {destination}...");
            pipeline.run_titles_only().await?
        }
        Commands::Principals => {
            println!("🎭 Indexing principal cast against {destination}...");
            pipeline.run_principals_only().await?
        }
    };

    print_summary(&summary);
    Ok(())
}
