use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use zond_core::{
    FilePrefStore, HostEnvironment, HttpTransport, Tracker, TrackerConfig, Transport,
};

#[derive(Parser)]
#[command(name = "zond")]
#[command(about = "Send Universal Analytics hits from the command line")]
struct Cli {
    /// Property id, e.g. "UA-12345-6". Falls back to the ZOND_TID
    /// environment variable.
    #[arg(long)]
    tid: Option<String>,

    /// Reporting domain
    #[arg(long)]
    domain: Option<String>,

    /// Application name attached to every hit
    #[arg(long)]
    app_name: Option<String>,

    /// Application version attached to every hit
    #[arg(long)]
    app_version: Option<String>,

    /// Explicit client id (skips the persisted one)
    #[arg(long)]
    client_id: Option<String>,

    /// Load tracker configuration from a JSON file; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the collect URL instead of sending it
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send an interaction event.
    Event {
        category: String,
        action: String,
        /// Event label
        #[arg(short, long)]
        label: Option<String>,
        /// Event value (integer)
        #[arg(short, long)]
        value: Option<i64>,
    },
    /// Send a pageview.
    Pageview {
        /// Page path, e.g. "/home"
        #[arg(short, long)]
        path: Option<String>,
        /// Page title
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Send an exception hit.
    Exception {
        /// Exception description
        #[arg(short, long)]
        description: Option<String>,
        /// Mark the exception fatal
        #[arg(short, long)]
        fatal: bool,
    },
    /// Send a social interaction.
    Social {
        /// Social action, e.g. "like"
        #[arg(short, long)]
        action: Option<String>,
        /// Social network name
        #[arg(short, long)]
        network: Option<String>,
        /// Target path of the interaction
        #[arg(short, long)]
        target: Option<String>,
    },
    /// Send a generic hit of the given type.
    Hit {
        hit_type: String,
        /// Flag the hit as non-interactive
        #[arg(long)]
        non_interactive: bool,
    },
}

/// Transport for --dry-run: prints the collect URL and sends nothing.
struct PrintTransport;

#[async_trait]
impl Transport for PrintTransport {
    async fn send(&self, url: String) {
        println!("{url}");
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn load_config(cli: &Cli) -> Result<TrackerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<TrackerConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => TrackerConfig::default(),
    };

    if let Some(tid) = &cli.tid {
        config.tracking_id = tid.clone();
    }
    if config.tracking_id.is_empty() {
        if let Ok(tid) = std::env::var("ZOND_TID") {
            config.tracking_id = tid;
        }
    }
    if cli.domain.is_some() {
        config.domain = cli.domain.clone();
    }
    if cli.app_name.is_some() {
        config.app_name = cli.app_name.clone();
    }
    if cli.app_version.is_some() {
        config.app_version = cli.app_version.clone();
    }
    if cli.client_id.is_some() {
        config.client_id = cli.client_id.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if config.tracking_id.is_empty() {
        eprintln!(
            "{} no tracking id: pass --tid or set ZOND_TID",
            style("Error:").red().bold()
        );
        std::process::exit(1);
    }

    let store = FilePrefStore::open()?;
    let transport: Arc<dyn Transport> = if cli.dry_run {
        Arc::new(PrintTransport)
    } else {
        Arc::new(HttpTransport::new())
    };
    let tracker = Tracker::new(
        config,
        &store,
        Arc::new(HostEnvironment::default()),
        transport,
    )?;

    let hit_name = match &cli.command {
        Commands::Event { .. } => "event",
        Commands::Pageview { .. } => "pageview",
        Commands::Exception { .. } => "exception",
        Commands::Social { .. } => "social",
        Commands::Hit { .. } => "hit",
    };

    match &cli.command {
        Commands::Event {
            category,
            action,
            label,
            value,
        } => tracker.event(category, action, label.as_deref(), *value),
        Commands::Pageview { path, title } => {
            tracker.pageview(path.as_deref(), title.as_deref());
        }
        Commands::Exception { description, fatal } => {
            tracker.exception(description.as_deref(), *fatal);
        }
        Commands::Social {
            action,
            network,
            target,
        } => tracker.social(action.as_deref(), network.as_deref(), target.as_deref()),
        Commands::Hit {
            hit_type,
            non_interactive,
        } => tracker.hit(hit_type, *non_interactive),
    }

    if cli.dry_run {
        tracker.flush().await;
    } else {
        let spinner = create_spinner("Dispatching hit...");
        tracker.flush().await;
        spinner.finish_with_message(format!(
            "{} {} dispatched (cid {})",
            style("✓").green().bold(),
            hit_name,
            style(tracker.client_id()).dim()
        ));
    }

    Ok(())
}
