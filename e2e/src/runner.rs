//! Runs the registered cases, one proxy launch at a time

use colored::Colorize;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Instant;

use crate::client::ProxyClient;
use crate::launch::{Launch, ProxyProcess};
use crate::upstream::MockGemini;

pub type CaseFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

pub struct TestCase {
    /// `group/name`
    pub name: &'static str,
    pub about: &'static str,
    /// Which proxy process the case runs against
    pub launch: Launch,
    pub run: fn(TestContext) -> CaseFuture,
}

/// Everything a case can touch
#[derive(Clone)]
pub struct TestContext {
    pub proxy: ProxyClient,
    pub gemini: MockGemini,
    /// Key the proxy should be sending upstream (empty when unset)
    pub api_key: &'static str,
}

#[derive(Debug, Default)]
pub struct Report {
    pub passed: usize,
    pub failures: Vec<(&'static str, String)>,
}

impl Report {
    pub fn ok(&self) -> bool {
        self.failures.is_empty()
    }

    fn print(&self) {
        let rule = "─".repeat(51);
        println!("\n{}", rule.bright_blue());
        for (name, error) in &self.failures {
            println!("  {} {}: {}", "✗".bright_red(), name.bright_white(), error);
        }
        let summary = format!(
            "  {} passed, {} failed",
            self.passed,
            self.failures.len()
        );
        if self.ok() {
            println!("{}", summary.bright_green().bold());
        } else {
            println!("{}", summary.bright_red().bold());
        }
    }
}

/// Spawn the proxy for every launch that has selected cases and run them
pub async fn run_suite(
    cases: &[TestCase],
    gemini: MockGemini,
    proxy_bin: &Path,
    proxy_config: &Path,
    filter: Option<&str>,
) -> anyhow::Result<Report> {
    let mut report = Report::default();

    println!("{}", "gemini-proxy end-to-end tests".bright_white().bold());
    println!("  binary: {}", proxy_bin.display().to_string().bright_cyan());

    for launch in Launch::ALL {
        let selected: Vec<&TestCase> = cases
            .iter()
            .filter(|c| c.launch == launch)
            .filter(|c| filter.map_or(true, |f| c.name.contains(f)))
            .collect();
        if selected.is_empty() {
            continue;
        }

        let process = ProxyProcess::spawn(proxy_bin, proxy_config, launch).await?;
        println!(
            "\n{} {} ({})",
            "▶".bright_blue(),
            launch.label().bright_white().bold(),
            process.addr
        );

        let ctx = TestContext {
            proxy: ProxyClient::new(&process.addr)?,
            gemini: gemini.clone(),
            api_key: launch.api_key(),
        };

        for case in selected {
            gemini.reset();
            let start = Instant::now();
            let result = (case.run)(ctx.clone()).await;
            let ms = start.elapsed().as_millis();

            match result {
                Ok(()) => {
                    println!("  {} {} ({ms}ms)", "PASS".bright_green(), case.name);
                    report.passed += 1;
                }
                Err(e) => {
                    println!("  {} {} ({ms}ms)", "FAIL".bright_red().bold(), case.name);
                    for cause in e.chain() {
                        println!("      {}", cause.to_string().yellow());
                    }
                    report.failures.push((case.name, e.to_string()));
                }
            }
        }

        process.stop().await;
    }

    report.print();
    Ok(report)
}

pub fn list(cases: &[TestCase]) {
    for launch in Launch::ALL {
        println!("{}", launch.label().bright_white().bold());
        for case in cases.iter().filter(|c| c.launch == launch) {
            println!("  {:<40} {}", case.name.bright_cyan(), case.about);
        }
    }
}
