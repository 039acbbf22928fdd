//! RCIP job board scraper CLI
//!
//! Runs the crawler against every registered community, or one of them, and
//! prints the result as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use rcip_crawler::{
    CachedClassifier, Classifier, CrawlerConfig, FetcherExt, HttpFetcher, JobStore, MemoryStore,
    OpenAIClassifier, Orchestrator, TimeoutClassifier,
};

#[derive(Parser)]
#[command(name = "rcip-scrape")]
#[command(about = "Scrape RCIP community job boards into the job store")]
struct Cli {
    /// Write to an in-memory store instead of the database
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every registered community
    All,

    /// Scrape a single community (name is case-insensitive)
    Community { name: String },

    /// List registered communities
    Targets,
}

#[derive(Serialize)]
struct TargetInfo {
    community: &'static str,
    province: &'static str,
    url: &'static str,
}

fn output<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn build_classifier(config: &CrawlerConfig) -> Option<Arc<dyn Classifier>> {
    let api_key = config.openai_api_key.as_ref()?;

    let mut openai = OpenAIClassifier::new(api_key.clone())
        .with_model(&config.classifier_model)
        .with_request_timeout(config.classify_timeout);
    if let Some(base_url) = &config.openai_base_url {
        openai = openai.with_base_url(base_url);
    }

    let classifier: Arc<dyn Classifier> = Arc::new(TimeoutClassifier::new(
        CachedClassifier::new(openai),
        config.classify_timeout,
    ));
    Some(classifier)
}

async fn build_store(config: &CrawlerConfig, dry_run: bool) -> Result<Arc<dyn JobStore>> {
    if dry_run {
        tracing::info!("Dry run: using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    match &config.database_url {
        #[cfg(feature = "postgres")]
        Some(url) => {
            let store = rcip_crawler::PostgresStore::new(url)
                .await
                .context("Failed to connect to job store")?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        Some(_) => {
            tracing::warn!("DATABASE_URL set but postgres support not compiled in; using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Targets = cli.command {
        let targets: Vec<TargetInfo> = rcip_crawler::sites::targets()
            .into_iter()
            .map(|t| TargetInfo {
                community: t.community,
                province: t.province,
                url: t.base_url,
            })
            .collect();
        return output(&targets);
    }

    let config = CrawlerConfig::from_env().context("Invalid configuration")?;

    let fetcher = HttpFetcher::new(config.fetch_timeout, &config.user_agent)
        .context("Failed to create HTTP client")?
        .rate_limited(config.fetch_delay);
    let store = build_store(&config, cli.dry_run).await?;

    let mut orchestrator = Orchestrator::new(Arc::new(fetcher), store).with_config(&config);
    match build_classifier(&config) {
        Some(classifier) => orchestrator = orchestrator.with_classifier(classifier),
        None => tracing::warn!("OPENAI_API_KEY not set; postings will be unclassified"),
    }

    match cli.command {
        Commands::All => {
            let report = orchestrator.run_all().await.context("Scrape run failed")?;
            output(&report)
        }
        Commands::Community { name } => {
            let postings = orchestrator
                .run_one(&name)
                .await
                .with_context(|| format!("Scrape of {} failed", name))?;
            output(&postings)
        }
        Commands::Targets => Ok(()),
    }
}
