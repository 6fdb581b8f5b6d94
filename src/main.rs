//! # sitesift CLI Application
//!
//! This module implements the command-line interface for sitesift.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `crawl`: Crawl a site, summarize its pages and write the corpus
//!   - `tag`: Tag a written corpus with the services it describes
//!
//! ## Features
//!
//! - Progress tracking while crawling
//! - Ctrl-C stops the crawl and keeps the pages summarized so far
//! - Token and cost estimates for the corpus
//! - Optional file logging

mod telemetry;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use sitesift::crawler::{CrawlEvent, Crawler, CrawlerConfig};
use sitesift::model::{Client, DEFAULT_GEMINI_MODEL, DEFAULT_REQUESTS_PER_MINUTE};
use sitesift::processor::{
    DEFAULT_PRICE_PER_1K_TOKENS, DEFAULT_RATIO, SummaryOptions, SummaryOrder, aggregate,
    write_records,
};
use sitesift::tagging::{
    CompletionTagger, ServiceTagger, ServiceTags, load_known_services, write_tags,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about = "Crawl a website and tag the services it offers", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a website and save the summarized content
    Crawl(CrawlArgs),

    /// Tag a saved corpus with known services
    Tag(TagArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    /// Keep sentences in the order they appear on the page
    Document,
    /// Order sentences by descending score
    Score,
}

impl From<OrderArg> for SummaryOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Document => SummaryOrder::Document,
            OrderArg::Score => SummaryOrder::Score,
        }
    }
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// URL to start crawling from
    #[arg(required = true)]
    url: String,

    /// Maximum number of pages to visit
    #[arg(short = 'p', long, default_value = "50")]
    max_pages: usize,

    /// Number of concurrent fetches
    #[arg(short, long, default_value = "1")]
    workers: usize,

    /// Per-page fetch timeout in milliseconds
    #[arg(short, long, default_value = "30000")]
    timeout: u64,

    /// Minimum delay between fetches in milliseconds
    #[arg(short, long, default_value = "0")]
    rate: u64,

    /// Only crawl URLs containing this pattern
    #[arg(short, long = "match")]
    match_pattern: Option<String>,

    /// Never crawl URLs containing this pattern
    #[arg(short, long = "exclude")]
    exclude_pattern: Option<String>,

    /// CSS selector limiting text extraction
    #[arg(short, long)]
    selector: Option<String>,

    /// Fraction of sentences kept per page summary
    #[arg(long, default_value_t = DEFAULT_RATIO)]
    ratio: f64,

    /// Order of the sentences in a summary
    #[arg(long, value_enum, default_value = "document")]
    order: OrderArg,

    /// File for the combined corpus
    #[arg(short, long, default_value = "crawled_content.txt")]
    output: PathBuf,

    /// Also save every page record as JSON
    #[arg(long)]
    records: Option<PathBuf>,

    /// Tag the corpus against this known services file after crawling
    #[arg(long)]
    services: Option<PathBuf>,

    /// File for the tagging result
    #[arg(long, default_value = "output.json")]
    tags_output: PathBuf,
}

#[derive(Args, Debug)]
struct TagArgs {
    /// Corpus file written by `crawl`
    #[arg(required = true)]
    corpus: PathBuf,

    /// Known services as a JSON array of {name, description}
    #[arg(short, long, required = true)]
    services: PathBuf,

    /// File for the tagging result
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Gemini model to use
    #[arg(short, long, default_value = DEFAULT_GEMINI_MODEL)]
    model: String,

    /// Completion requests allowed per minute
    #[arg(long, default_value_t = DEFAULT_REQUESTS_PER_MINUTE)]
    requests_per_minute: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing_subscriber(cli.log_file.as_deref())?;

    match cli.command {
        Some(Commands::Crawl(args)) => {
            crawl_command(args).await?;
        }
        Some(Commands::Tag(args)) => {
            tag_command(args).await?;
        }
        None => {
            let _ = Cli::parse_from(["sitesift", "--help"]);
        }
    }

    Ok(())
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    println!("Crawling {}...", args.url);

    let config = CrawlerConfig::builder()
        .max_pages(args.max_pages)
        .workers(args.workers)
        .fetch_timeout_ms(args.timeout)
        .rate_limit_ms(args.rate)
        .match_pattern(args.match_pattern)
        .exclude_pattern(args.exclude_pattern)
        .content_selector(args.selector)
        .summary(SummaryOptions {
            ratio: args.ratio,
            order: args.order.into(),
        })
        .build();

    let progress_bar = ProgressBar::new(args.max_pages as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")?
            .progress_chars("##-"),
    );

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let progress = {
        let progress_bar = progress_bar.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                match event {
                    CrawlEvent::Fetched { url } => progress_bar.set_message(url),
                    CrawlEvent::Skipped { url } => progress_bar.set_message(format!("skipped {}", url)),
                    CrawlEvent::Failed { url, error } => {
                        progress_bar.println(format!("Failed {}: {}", url, error))
                    }
                }
                progress_bar.inc(1);
            }
        })
    };

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing with the pages crawled so far");
                cancel.cancel();
            }
        })
    };

    let crawler = Crawler::http(config)?.with_events(events_tx);
    let result = crawler.crawl_until_cancelled(&args.url, cancel).await;
    interrupt.abort();
    drop(crawler);
    progress.await?;
    progress_bar.finish_and_clear();
    let result = result?;

    println!(
        "Crawled {} pages ({} visited, {} skipped, {} failed){}",
        result.len(),
        result.visited,
        result.skipped,
        result.failures.len(),
        if result.cancelled { ", cancelled" } else { "" }
    );

    let corpus = aggregate(&result);
    corpus.write_to(&args.output).await?;
    println!("Saved combined content to {}", args.output.display());
    println!(
        "Estimated tokens: {} (estimated cost ${:.4})",
        corpus.token_estimate,
        corpus.estimated_cost(DEFAULT_PRICE_PER_1K_TOKENS)
    );

    if let Some(records) = args.records {
        write_records(&result, &records).await?;
        println!("Saved page records to {}", records.display());
    }

    if let Some(services) = args.services {
        tag_corpus(
            &corpus.text,
            &services,
            &args.tags_output,
            DEFAULT_GEMINI_MODEL,
            DEFAULT_REQUESTS_PER_MINUTE,
        )
        .await?;
    }

    Ok(())
}

#[instrument]
async fn tag_command(args: TagArgs) -> anyhow::Result<()> {
    let corpus = tokio::fs::read_to_string(&args.corpus).await?;
    tag_corpus(
        &corpus,
        &args.services,
        &args.output,
        &args.model,
        args.requests_per_minute,
    )
    .await
}

async fn tag_corpus(
    corpus: &str,
    services: &Path,
    output: &Path,
    model: &str,
    requests_per_minute: u32,
) -> anyhow::Result<()> {
    if corpus.trim().is_empty() {
        anyhow::bail!("corpus is empty, nothing to tag");
    }

    let known_services = load_known_services(services).await?;
    let client = Client::new_gemini_from_env(model, requests_per_minute)?;
    let tagger = CompletionTagger::new(client.completion().clone());

    info!("Tagging {} characters with {}", corpus.len(), model);
    let tags = tagger.tag(corpus, &known_services).await?;
    write_tags(&tags, output).await?;

    print_tags(&tags);
    println!("Saved tagging result to {}", output.display());
    Ok(())
}

fn print_tags(tags: &ServiceTags) {
    println!("Provided services:");
    for service in &tags.provided_services {
        match tags.confidence_scores.get(service) {
            Some(score) => println!("  {} ({:.0})", service, score),
            None => println!("  {}", service),
        }
    }
    println!("Additional services:");
    for service in &tags.additional_services {
        match tags.confidence_scores.get(service) {
            Some(score) => println!("  {} ({:.0})", service, score),
            None => println!("  {}", service),
        }
    }
}
