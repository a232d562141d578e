//! gemini-proxy: HTTP proxy for the Gemini generateContent API
//!
//! Accepts `POST /generate` with `{"prompt": "..."}`, forwards it to Gemini
//! using the key from `GEMINI_API_KEY`, and returns the upstream JSON as-is.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

use gemini_proxy::{config::API_KEY_ENV, run_server, ApiKey, AppConfig, GeminiClient};

#[derive(Parser)]
#[command(name = "gemini-proxy")]
#[command(version = "0.1.0")]
#[command(about = "HTTP proxy for the Gemini generateContent API")]
#[command(long_about = "
gemini-proxy exposes POST /generate, wraps the caller's prompt into a Gemini
generateContent request and relays the upstream JSON response unchanged.

The API key is read once from the GEMINI_API_KEY environment variable.

Example usage:
  GEMINI_API_KEY=... gemini-proxy run --port 8000
  gemini-proxy check-config --config config.yaml
")]
struct Cli {
    /// Path to config file (optional; defaults are used when absent)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server
    Run {
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
        /// Override listen host
        #[arg(long)]
        host: Option<String>,
        /// Override upstream base URL (e.g., "http://127.0.0.1:18080/v1beta")
        #[arg(long)]
        upstream_url: Option<String>,
        /// Override upstream model
        #[arg(long)]
        model: Option<String>,
    },

    /// Validate configuration file
    CheckConfig,

    /// Test connection and credentials against the upstream API
    TestUpstream,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter));
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    match cli.command {
        Commands::Run {
            port,
            host,
            upstream_url,
            model,
        } => {
            run_proxy(cli.config.as_deref(), port, host, upstream_url, model).await?;
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref());
        }
        Commands::TestUpstream => {
            test_upstream(cli.config.as_deref()).await?;
        }
    }

    Ok(())
}

/// Run the proxy server
async fn run_proxy(
    config_path: Option<&Path>,
    port_override: Option<u16>,
    host_override: Option<String>,
    upstream_url_override: Option<String>,
    model_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config_or_exit(config_path);

    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(host) = host_override {
        config.server.host = host;
    }
    if let Some(url) = upstream_url_override {
        config.upstream.base_url = url;
    }
    if let Some(model) = model_override {
        config.upstream.model = model;
    }
    config.validate()?;

    tracing::info!(
        model = %config.upstream.model,
        timeout_seconds = ?config.upstream.timeout_seconds,
        forward_status = config.upstream.forward_status,
        stats = config.stats.enabled,
        "Configuration loaded"
    );

    run_server(config).await?;

    Ok(())
}

/// Validate configuration file
fn check_config(config_path: Option<&Path>) {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => {
            let api_key = ApiKey::from_env();
            println!("✓ Configuration is valid\n");
            println!("Server:");
            println!("  Listen: {}:{}", config.server.host, config.server.port);
            println!("\nUpstream:");
            println!("  Base URL: {}", config.upstream.base_url());
            println!("  Model: {}", config.upstream.model);
            match config.upstream.timeout_seconds {
                Some(secs) => println!("  Timeout: {}s", secs),
                None => println!("  Timeout: client default"),
            }
            println!("  Forward status: {}", config.upstream.forward_status);
            println!(
                "  {}: {}",
                API_KEY_ENV,
                if api_key.is_empty() { "not set" } else { "set" }
            );
            println!("\nStats:");
            println!("  Enabled: {}", config.stats.enabled);
            println!("  Format: {:?}", config.stats.format);
        }
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Test connection to the upstream API
async fn test_upstream(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_or_exit(config_path);
    let client = GeminiClient::from_config(&config.upstream)?;

    if config.upstream.api_key.is_empty() {
        println!("! {} is not set, expect an authentication error", API_KEY_ENV);
    }

    println!(
        "Testing upstream: {}/models/{}",
        config.upstream.base_url(),
        client.model()
    );

    match client.model_info().await {
        Ok(resp) => {
            if resp.status.is_success() {
                println!("✓ Upstream is reachable and the key was accepted");
                if let Ok(json) = serde_json::from_slice::<serde_json::Value>(&resp.body) {
                    if let Some(name) = json.get("displayName").and_then(|n| n.as_str()) {
                        println!("  Model: {}", name);
                    }
                    if let Some(limit) = json.get("inputTokenLimit").and_then(|n| n.as_u64()) {
                        println!("  Input token limit: {}", limit);
                    }
                }
            } else {
                println!("✗ Upstream returned error status: {}", resp.status);
                println!("  Response: {}", String::from_utf8_lossy(&resp.body).trim());
            }
        }
        Err(e) => {
            println!("✗ Failed to connect to upstream: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Load configuration (plus the API key from the environment) or exit with error
fn load_config_or_exit(config_path: Option<&Path>) -> AppConfig {
    match AppConfig::load_or_default(config_path) {
        Ok(config) => config.with_api_key(ApiKey::from_env()),
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            if config_path.is_some() {
                eprintln!("\nCheck the path given with --config.");
            }
            std::process::exit(1);
        }
    }
}
