//! BlobGate - HTTP Gateway for Azure Blob Storage Containers
//!
//! Loads configuration, builds the storage client and serves the container
//! management routes.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blobgate::api::HttpServer;
use blobgate::config::{GatewayConfig, StorageBackend, CONNECTION_STRING_ENV, PORT_ENV};
use blobgate::error::Result;
use blobgate::storage;

/// BlobGate - HTTP Gateway for Azure Blob Storage Containers
#[derive(Parser)]
#[command(name = "blobgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (optional; environment variables apply on top)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway
    Start {
        /// Use the in-memory backend instead of Azure
        #[arg(long)]
        memory: bool,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "blobgate.toml")]
        output: PathBuf,
    },

    /// Validate configuration
    Validate,

    /// Show effective configuration
    Info,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Start { memory } => run_start(cli.config.as_deref(), cli.log_level, memory).await,
        Commands::Init { output } => run_init(&output),
        Commands::Validate => run_validate(cli.config.as_deref()),
        Commands::Info => run_info(cli.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if format == "compact" {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Start the gateway
async fn run_start(config_path: Option<&Path>, log_level: Option<String>, memory: bool) -> Result<()> {
    let mut config = GatewayConfig::load(config_path)?;
    if memory {
        config.storage.backend = StorageBackend::Memory;
    }

    let level = log_level.unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, &config.logging.format);

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        if config.storage.backend == StorageBackend::Azure {
            tracing::error!("Set {} or choose the memory backend with --memory", CONNECTION_STRING_ENV);
        }
        return Err(e);
    }

    let storage = match storage::connect(&config.storage) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create storage client: {}", e);
            return Err(e);
        }
    };
    tracing::info!("Blob Service Client created - {}", storage.account().name);

    let server = HttpServer::new(
        config.api.clone(),
        storage,
        config.storage.connection_string.clone(),
    );

    server
        .start(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Received shutdown signal"),
                Err(e) => {
                    tracing::error!("Failed to listen for shutdown signal: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
}

/// Initialize configuration file
fn run_init(output: &Path) -> Result<()> {
    let config_content = format!(
        r#"# BlobGate Configuration
# Generated configuration file

[storage]
backend = "azure"
# Prefer the {conn_env} environment variable over storing secrets here.
# connection_string = "DefaultEndpointsProtocol=https;AccountName=...;AccountKey=...;EndpointSuffix=core.windows.net"

[api]
# The {port_env} environment variable replaces the port.
bind_address = "0.0.0.0:3000"
cors_enabled = true
expose_connection_string = true

[logging]
level = "info"
format = "pretty"
"#,
        conn_env = CONNECTION_STRING_ENV,
        port_env = PORT_ENV,
    );

    std::fs::write(output, config_content)?;
    println!("Configuration file created: {}", output.display());
    println!("\nSet {} in the environment, then start with:", CONNECTION_STRING_ENV);
    println!("  blobgate --config {} start", output.display());

    Ok(())
}

/// Validate configuration
fn run_validate(config_path: Option<&Path>) -> Result<()> {
    match GatewayConfig::load(config_path).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!("  Backend: {:?}", config.storage.backend);
            println!("  Bind Address: {}", config.api.bind_address);
            println!("  CORS: {}", config.api.cors_enabled);
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            Err(e)
        }
    }
}

/// Show effective configuration
fn run_info(config_path: Option<&Path>) -> Result<()> {
    let config = GatewayConfig::load(config_path)?;

    println!("BlobGate Configuration");
    println!("======================");
    println!();
    println!("Storage:");
    println!("  Backend:           {:?}", config.storage.backend);
    println!("  Connection String: {}", config.redacted_connection_string());
    println!();
    println!("API:");
    println!("  Bind Address:      {}", config.api.bind_address);
    println!("  CORS Enabled:      {}", config.api.cors_enabled);
    println!("  Expose Config:     {}", config.api.expose_connection_string);
    println!();
    println!("Logging:");
    println!("  Level:             {}", config.logging.level);
    println!("  Format:            {}", config.logging.format);

    Ok(())
}
