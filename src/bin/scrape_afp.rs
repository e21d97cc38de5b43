//! Batch dataset builder: crawls the AFP Verificat listing and writes the
//! labeled fact-check CSVs. Configuration via environment:
//!
//!   SCRAPE_BASE_URL       (default https://verificat.afp.com)
//!   SCRAPE_LISTING_PATH   (default /list/Romania)
//!   SCRAPE_OUT_DIR        (default out_afp_verificat)
//!   SCRAPE_MAX_PAGES      (default 40)
//!   SCRAPE_DELAY_MS       (default 1000)

use std::path::PathBuf;
use std::time::Duration;

use claim_veracity_analyzer::scrape::{run, ScrapeConfig};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let defaults = ScrapeConfig::default();
    let cfg = ScrapeConfig {
        base_url: env_or("SCRAPE_BASE_URL", &defaults.base_url),
        listing_path: env_or("SCRAPE_LISTING_PATH", &defaults.listing_path),
        out_dir: PathBuf::from(env_or(
            "SCRAPE_OUT_DIR",
            &defaults.out_dir.to_string_lossy(),
        )),
        max_listing_pages: env_or("SCRAPE_MAX_PAGES", "40").parse().unwrap_or(40),
        request_delay: Duration::from_millis(
            env_or("SCRAPE_DELAY_MS", "1000").parse().unwrap_or(1000),
        ),
    };

    run(&cfg).await?;
    println!("datasets written to {}", cfg.out_dir.display());
    Ok(())
}
