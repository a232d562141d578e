//! Spawning the real gemini-proxy binary
//!
//! The proxy reads `GEMINI_API_KEY` once at start-up, so key-dependent
//! behaviour needs its own process. Each `Launch` is one such process.

use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Port the mock Gemini listens on; must match `upstream.base_url` in the config
pub const UPSTREAM_PORT: u16 = 18080;

/// Key handed to the proxy in the `WithKey` launch
pub const E2E_API_KEY: &str = "e2e-test-key";

const PROXY_BIN_CANDIDATES: &[&str] = &[
    "../target/release/gemini-proxy",
    "../target/debug/gemini-proxy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    /// `GEMINI_API_KEY` set to `E2E_API_KEY`
    WithKey,
    /// `GEMINI_API_KEY` removed from the environment
    WithoutKey,
}

impl Launch {
    pub const ALL: [Launch; 2] = [Launch::WithKey, Launch::WithoutKey];

    /// The key the proxy is expected to send upstream
    pub fn api_key(self) -> &'static str {
        match self {
            Launch::WithKey => E2E_API_KEY,
            Launch::WithoutKey => "",
        }
    }

    pub fn port(self) -> u16 {
        match self {
            Launch::WithKey => 18066,
            Launch::WithoutKey => 18067,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Launch::WithKey => "GEMINI_API_KEY set",
            Launch::WithoutKey => "GEMINI_API_KEY unset",
        }
    }
}

/// A running proxy process, killed on drop
pub struct ProxyProcess {
    child: Child,
    pub addr: String,
}

impl ProxyProcess {
    pub async fn spawn(bin: &Path, config: &Path, launch: Launch) -> anyhow::Result<Self> {
        let mut cmd = Command::new(bin);
        cmd.arg("run")
            .arg("--config")
            .arg(config)
            .arg("--port")
            .arg(launch.port().to_string())
            .kill_on_drop(true);
        match launch {
            Launch::WithKey => cmd.env("GEMINI_API_KEY", E2E_API_KEY),
            Launch::WithoutKey => cmd.env_remove("GEMINI_API_KEY"),
        };

        let child = cmd
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", bin.display(), e))?;
        let process = Self {
            child,
            addr: format!("127.0.0.1:{}", launch.port()),
        };
        process.wait_ready().await?;
        Ok(process)
    }

    /// Poll /health until the proxy answers
    async fn wait_ready(&self) -> anyhow::Result<()> {
        let client = reqwest::Client::new();
        let url = format!("http://{}/health", self.addr);
        for attempt in 0..30u64 {
            tokio::time::sleep(Duration::from_millis(200 + attempt * 100)).await;
            if client.get(&url).send().await.is_ok() {
                return Ok(());
            }
        }
        Err(anyhow::anyhow!("Proxy did not come up on {}", self.addr))
    }

    pub async fn stop(mut self) {
        let _ = self.child.kill().await;
    }
}

/// Resolve the proxy binary, preferring a release build
pub fn find_proxy_bin(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    PROXY_BIN_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No proxy binary found (tried {}). Build with: cd .. && cargo build --release",
                PROXY_BIN_CANDIDATES.join(", ")
            )
        })
}
