//! resilient-site CLI
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────┐   set_online   ┌──────────────┐ transitions ┌────────────────┐
//!   │ connectivity │───────────────▶│ Connectivity │────────────▶│ NetworkMonitor │
//!   │    probe     │                │  (watch tx)  │             │  + indicator   │
//!   └──────────────┘                └──────┬───────┘             └───────┬────────┘
//!                                          │ is_online()                 │ reconnect
//!                                          ▼                             ▼
//!   ┌──────────────┐   fetch()      ┌──────────────┐   enqueue   ┌────────────────┐
//!   │     CLI      │───────────────▶│  SiteClient  │────────────▶│ FailedOperation│
//!   │  subcommand  │                │ retry+timeout│◀────────────│     Queue      │
//!   └──────────────┘                └──────────────┘   replay    └────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Method;

use resilient_site::config::{load_config, SiteConfig};
use resilient_site::content::{reading_time, search, PostCard, PostFilter};
use resilient_site::errors::install_panic_hook;
use resilient_site::fetch::{FetchError, RequestBody};
use resilient_site::lifecycle::{bootstrap, signals, Shutdown};
use resilient_site::network::{Connectivity, ConnectivityProbe, LogIndicator};
use resilient_site::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "resilient-site")]
#[command(about = "Resilient fetch, offline replay and content filters for a static site", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a resource with timeout, retries and offline replay
    Fetch {
        url: String,
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,
        /// Request header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Request body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long)]
        timeout_ms: Option<u64>,
        #[arg(long)]
        max_attempts: Option<u32>,
        #[arg(long)]
        retry_delay_ms: Option<u64>,
        /// If the request was queued while offline, wait until it is replayed
        #[arg(long)]
        wait_for_replay: bool,
    },
    /// Estimate reading time of an HTML or text file
    ReadingTime { path: PathBuf },
    /// Filter a JSON list of post cards
    Search {
        posts: PathBuf,
        #[arg(long, default_value = "")]
        term: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        tag: String,
    },
    /// Watch connectivity and log transitions until Ctrl+C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SiteConfig::default(),
    };

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::ReadingTime { path } => {
            let content = std::fs::read_to_string(&path)?;
            println!("{}", reading_time(&content));
        }
        Commands::Search {
            posts,
            term,
            category,
            tag,
        } => {
            let content = std::fs::read_to_string(&posts)?;
            let cards: Vec<PostCard> = serde_json::from_str(&content)?;
            let outcome = PostFilter::new(&term, &category, &tag).apply(&cards);

            if outcome.show_no_results {
                println!("{}", search::NO_RESULTS_TITLE);
                println!("{}", search::NO_RESULTS_HINT);
            }
            for index in outcome.visible {
                println!("{}", cards[index].title);
            }
        }
        Commands::Fetch {
            url,
            method,
            headers,
            data,
            timeout_ms,
            max_attempts,
            retry_delay_ms,
            wait_for_replay,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut header_pairs = Vec::new();
            for header in &headers {
                let (name, value) = header
                    .split_once(':')
                    .ok_or_else(|| format!("Invalid header '{}', expected 'Name: value'", header))?;
                header_pairs.push((name.trim().to_string(), value.trim().to_string()));
            }

            run_fetch(
                &config,
                url,
                method,
                header_pairs,
                data,
                (timeout_ms, max_attempts, retry_delay_ms),
                wait_for_replay,
            )
            .await?;
        }
        Commands::Watch => run_watch(&config).await?,
    }

    Ok(())
}

type Overrides = (Option<u64>, Option<u32>, Option<u64>);

async fn run_fetch(
    config: &SiteConfig,
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    data: Option<String>,
    (timeout_ms, max_attempts, retry_delay_ms): Overrides,
    wait_for_replay: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let probe = ConnectivityProbe::new(Connectivity::new(true), &config.network)?;
    probe.check().await;

    let services = bootstrap(config, probe.connectivity(), Arc::new(LogIndicator))?;
    install_panic_hook(services.hooks.clone());

    let shutdown = Shutdown::new();
    let probe_task = tokio::spawn(probe.run(shutdown.subscribe()));
    let monitor_task = tokio::spawn(services.monitor.run(shutdown.subscribe()));

    let mut options = services.client.options().method(method);
    for (name, value) in headers {
        options = options.header(name, value);
    }
    if let Some(data) = data {
        options = options.body(RequestBody::Text(data));
    }
    if let Some(ms) = timeout_ms {
        options = options.timeout(Duration::from_millis(ms));
    }
    if let Some(n) = max_attempts {
        options = options.max_attempts(n);
    }
    if let Some(ms) = retry_delay_ms {
        options = options.retry_delay(Duration::from_millis(ms));
    }

    let outcome = match services.client.fetch(&url, options).await {
        Ok(response) => {
            println!("{}", response.status());
            match response.text().await {
                Ok(body) => {
                    println!("{}", body);
                    Ok(())
                }
                Err(e) => Err(FetchError::from(e)),
            }
        }
        Err(e) => {
            let info = services.client.handle_api_error(&e, &format!("Fetch: {}", url), true);
            if let Ok(json) = serde_json::to_string_pretty(&info) {
                eprintln!("{}", json);
            }
            if let Some(alert) = services.banner.current() {
                eprintln!("{}", alert.message);
            }

            if wait_for_replay && !services.queue.is_empty() {
                tracing::info!("Request queued, waiting for connectivity (Ctrl+C to give up)");
                loop {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => break,
                        _ = tokio::time::sleep(Duration::from_secs(1)) => {
                            if services.queue.is_empty() {
                                tracing::info!("Queued request replayed");
                                break;
                            }
                        }
                    }
                }
            }
            Err(e)
        }
    };

    shutdown.trigger();
    for task in [probe_task, monitor_task] {
        if let Err(e) = task.await {
            services.hooks.on_unhandled_rejection(&e);
        }
    }

    outcome.map_err(Into::into)
}

async fn run_watch(config: &SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    let probe = ConnectivityProbe::new(Connectivity::new(true), &config.network)?;
    probe.check().await;

    let services = bootstrap(config, probe.connectivity(), Arc::new(LogIndicator))?;
    install_panic_hook(services.hooks.clone());

    let shutdown = Shutdown::new();
    let probe_task = tokio::spawn(probe.run(shutdown.subscribe()));
    let monitor_task = tokio::spawn(services.monitor.run(shutdown.subscribe()));

    signals::shutdown_on_ctrl_c(&shutdown).await?;

    for task in [probe_task, monitor_task] {
        if let Err(e) = task.await {
            services.hooks.on_unhandled_rejection(&e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
