//! End-to-end tests for gemini-proxy
//!
//! Starts a mock Gemini API, spawns the real proxy binary against it (once
//! with `GEMINI_API_KEY` set and once without), and drives it over HTTP.
//!
//!   cargo run                      # build output from ../target, all tests
//!   cargo run -- --filter errors/  # subset
//!   cargo run -- --list

mod client;
mod launch;
mod runner;
mod tests;
mod upstream;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "e2e", about = "End-to-end tests for gemini-proxy")]
struct Cli {
    /// gemini-proxy binary (default: ../target/release, then ../target/debug)
    #[arg(long)]
    proxy_bin: Option<PathBuf>,

    /// Proxy config; its upstream.base_url must point at the mock Gemini
    #[arg(long, default_value = "test_configs/proxy.yaml")]
    proxy_config: PathBuf,

    /// Only run tests whose name contains this string
    #[arg(long, short)]
    filter: Option<String>,

    /// Print the registered tests and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cases = tests::all_tests();

    if cli.list {
        runner::list(&cases);
        return Ok(());
    }

    let proxy_bin = launch::find_proxy_bin(cli.proxy_bin)?;
    let gemini = upstream::start(launch::UPSTREAM_PORT).await?;

    let report = runner::run_suite(
        &cases,
        gemini,
        &proxy_bin,
        &cli.proxy_config,
        cli.filter.as_deref(),
    )
    .await?;

    if !report.ok() {
        std::process::exit(1);
    }
    Ok(())
}
