//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror crawler.

use clap::Parser;
use site_mirror::config::{load_config_with_hash, validate, Config, Protocol};
use site_mirror::crawler::mirror;
use site_mirror::output::{print_statistics, stats_to_json};
use site_mirror::ConfigError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a single-host website mirroring crawler
///
/// Site-Mirror starts from a site's root page, follows same-host links,
/// stylesheets, scripts and images, and saves each resource once under a
/// local directory tree.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a single website to disk", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Host to mirror (overrides the config file)
    #[arg(long, required_unless_present = "config")]
    host: Option<String>,

    /// Protocol used to reach the host: http or https
    #[arg(long)]
    protocol: Option<Protocol>,

    /// Directory the site is mirrored into
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Maximum number of fetches in flight at once
    #[arg(short = 'c', long)]
    max_connections: Option<u32>,

    /// Print the final statistics as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Mirroring {} (javascript: {}, css: {}, images: {})",
        config.base_url(),
        config.download.javascript,
        config.download.css,
        config.download.images
    );

    let stats = match mirror(config).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if cli.json {
        println!("{}", stats_to_json(&stats)?);
    } else {
        print_statistics(&stats);
    }

    Ok(())
}

/// Loads the config file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> site_mirror::Result<Config> {
    let mut config = match (&cli.config, &cli.host) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        (None, Some(host)) => Config::for_host(host.clone()),
        (None, None) => {
            return Err(ConfigError::Validation(
                "either a config file or --host is required".to_string(),
            )
            .into())
        }
    };

    if let Some(host) = &cli.host {
        config.site.host = host.clone();
    }
    if let Some(protocol) = cli.protocol {
        config.site.protocol = protocol;
    }
    if let Some(output) = &cli.output {
        config.output.root = output.clone();
    }
    if let Some(max_connections) = cli.max_connections {
        config.crawler.max_connections = max_connections;
    }

    validate(&config)?;
    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}
