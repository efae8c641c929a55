//! BlobCtl - Command line client for a running BlobGate
//!
//! Usage:
//!   blobctl list             - List containers
//!   blobctl create <name>    - Create a container
//!   blobctl delete <name>    - Delete a container
//!   blobctl account          - Show account metadata page
//!   blobctl config           - Show the gateway's connection configuration

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

/// BlobGate Control Tool
#[derive(Parser)]
#[command(name = "blobctl")]
#[command(about = "Manage storage containers through a BlobGate server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "blobgate.toml")]
    config: PathBuf,

    /// API endpoint to connect to (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List containers in the account
    List,
    /// Create a container
    Create {
        /// Container name (lowercase letters, digits and hyphens, 3-63 chars)
        name: String,
    },
    /// Delete a container
    Delete {
        /// Container name
        name: String,
    },
    /// Show account name, endpoint and containers
    Account,
    /// Show the connection configuration served by the gateway
    Config,
}

// ============ Config ============

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default)]
    api: ApiConfig,
}

#[derive(Debug, Deserialize)]
struct ApiConfig {
    #[serde(default = "default_api_bind")]
    bind_address: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { bind_address: default_api_bind() }
    }
}

fn default_api_bind() -> String {
    "0.0.0.0:3000".to_string()
}

/// Turn a server bind address into a URL a local client can reach
fn endpoint_from_bind(addr: &str) -> String {
    match addr.rsplit_once(':') {
        Some(("0.0.0.0", port)) | Some(("", port)) => format!("http://127.0.0.1:{}", port),
        _ => format!("http://{}", addr),
    }
}

fn resolve_endpoint(cli: &Cli) -> String {
    if let Some(e) = &cli.endpoint {
        return e.trim_end_matches('/').to_string();
    }

    if let Some(port) = std::env::var("PORT").ok().filter(|p| !p.trim().is_empty()) {
        return format!("http://127.0.0.1:{}", port.trim());
    }

    std::fs::read_to_string(&cli.config)
        .ok()
        .and_then(|content| toml::from_str::<Config>(&content).ok())
        .map(|config| endpoint_from_bind(&config.api.bind_address))
        .unwrap_or_else(|| endpoint_from_bind(&default_api_bind()))
}

// ============ Main ============

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let endpoint = resolve_endpoint(&cli);
    let client = reqwest::Client::new();

    let result = match &cli.command {
        Commands::List => list_containers(&client, &endpoint).await,
        Commands::Create { name } => create_container(&client, &endpoint, name).await,
        Commands::Delete { name } => delete_container(&client, &endpoint, name).await,
        Commands::Account => show_account(&client, &endpoint).await,
        Commands::Config => show_config(&client, &endpoint).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

// ============ Commands ============

async fn list_containers(client: &reqwest::Client, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/listContainers", endpoint);
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(format!("API error: {}", response.status()).into());
    }

    let names: Vec<String> = response.json().await?;

    println!();
    println!("Containers (blobctl v{})", env!("CARGO_PKG_VERSION"));
    println!("========================");
    println!();
    if names.is_empty() {
        println!("(none)");
    }
    for (i, name) in names.iter().enumerate() {
        println!("{:>4}  {}", i + 1, name);
    }
    println!();
    println!("Total: {}", names.len());

    Ok(())
}

async fn create_container(
    client: &reqwest::Client,
    endpoint: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/createContainer/{}", endpoint, name);
    send_text(client, &url).await
}

async fn delete_container(
    client: &reqwest::Client,
    endpoint: &str,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/deleteContainer/{}", endpoint, name);
    send_text(client, &url).await
}

async fn show_account(client: &reqwest::Client, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/", endpoint);
    let response = client.get(&url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(format!("API error: {}: {}", status, body).into());
    }

    for line in body.split("<br>").filter(|l| !l.is_empty()) {
        println!("{}", line);
    }

    Ok(())
}

async fn show_config(client: &reqwest::Client, endpoint: &str) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{}/api/config", endpoint);
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(format!("API error: {}", response.status()).into());
    }

    let config: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

/// Issue a GET whose body is a plain message and print it
async fn send_text(client: &reqwest::Client, url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(format!("{} ({})", body, status).into());
    }

    println!("{}", body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_bind() {
        assert_eq!(endpoint_from_bind("0.0.0.0:3000"), "http://127.0.0.1:3000");
        assert_eq!(endpoint_from_bind(":8080"), "http://127.0.0.1:8080");
        assert_eq!(endpoint_from_bind("10.0.0.5:9000"), "http://10.0.0.5:9000");
    }

    #[test]
    fn test_config_default_bind() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.bind_address, "0.0.0.0:3000");

        let config: Config = toml::from_str("[api]\n").unwrap();
        assert_eq!(config.api.bind_address, "0.0.0.0:3000");
    }
}
