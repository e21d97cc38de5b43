//! Fact-check dataset construction.
//!
//! Independent batch job with no runtime relationship to the prediction
//! service: crawls a fact-check site's listing, pulls the ClaimReview
//! structured data out of each article, and writes labeled CSV datasets for
//! the training jobs. See `src/bin/scrape_afp.rs` for the entrypoint.

pub mod claimreview;

use anyhow::Context;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::scrape::claimreview::extract_from_html;

/// Article permalinks on the AFP fact-check site.
static DOC_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://verificat\.afp\.com/doc\.afp\.com\.\w+$").expect("regex"));

/// Romanian verdict labels that map onto the binary groups. Everything else
/// non-empty is OTHER.
const FALSE_SET: &[&str] = &[
    "FALS",
    "ÎNȘELĂTOR",
    "LIPSA CONTEXTULUI",
    "FOTOGRAFIE ALTERATĂ",
    "VIDEOCLIP ALTERAT",
    "SATIRĂ",
    "FARSĂ",
    "DEEPFAKE",
];
const TRUE_SET: &[&str] = &["ADEVĂRAT"];

const MIN_CLAIM_LEN: usize = 20;

/// Uppercase with collapsed internal whitespace; the sites are not
/// consistent about casing or spacing.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Binary group for a raw verdict label, if it carries one.
pub fn label_group(label: Option<&str>) -> Option<&'static str> {
    let norm = normalize_label(label?);
    if norm.is_empty() {
        return None;
    }
    if TRUE_SET.contains(&norm.as_str()) {
        Some("TRUE")
    } else if FALSE_SET.contains(&norm.as_str()) {
        Some("FALSE")
    } else {
        Some("OTHER")
    }
}

pub fn sha256_hex(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// One scraped article. `error` is set instead of the content fields when
/// the fetch or parse failed; the raw output keeps those rows for audit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactCheckRecord {
    pub id: String,
    pub url: String,
    pub record_type: &'static str,
    pub language: &'static str,
    pub claim: Option<String>,
    pub label: Option<String>,
    pub date_verified: Option<String>,
    pub speaker: Option<String>,
    pub source_url: Option<String>,
    pub title: Option<String>,
    pub scraped_at: String,
    pub error: Option<String>,
}

impl FactCheckRecord {
    fn empty(url: &str) -> Self {
        Self {
            id: sha256_hex(url),
            url: url.to_string(),
            record_type: "afp_factcheck",
            language: "ro",
            scraped_at: Utc::now().to_rfc3339(),
            ..Default::default()
        }
    }

    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(url)
        }
    }

    pub fn label_norm(&self) -> Option<String> {
        self.label.as_deref().map(normalize_label)
    }

    pub fn label_group(&self) -> Option<&'static str> {
        label_group(self.label.as_deref())
    }
}

/// Parse one article page into a record. Articles without a ClaimReview
/// block still produce a row (all content fields empty) so the raw output
/// reflects everything that was crawled.
pub fn parse_article(html: &str, url: &str) -> FactCheckRecord {
    let mut rec = FactCheckRecord::empty(url);
    if let Some(cr) = extract_from_html(html) {
        rec.claim = cr.claim;
        rec.label = cr.label;
        rec.date_verified = cr.date_verified;
        rec.speaker = cr.speaker;
        rec.source_url = cr.source_url;
        rec.title = cr.title;
    }
    rec
}

/// Collect article permalinks from a listing page, sorted and deduplicated.
pub fn discover_article_urls(listing_html: &str) -> Vec<String> {
    let doc = Html::parse_document(listing_html);
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut urls: Vec<String> = doc
        .select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| DOC_URL_RE.is_match(href))
        .map(str::to_string)
        .collect();
    urls.sort();
    urls.dedup();
    urls
}

/// Keep rows usable for training: a claim of useful length with a mappable
/// label, one row per distinct claim text.
pub fn build_dataset(records: &[FactCheckRecord]) -> Vec<FactCheckRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| r.error.is_none())
        .filter(|r| r.label_group().is_some())
        .filter(|r| {
            r.claim
                .as_deref()
                .map(|c| c.chars().count() >= MIN_CLAIM_LEN)
                .unwrap_or(false)
        })
        .filter(|r| {
            let digest = sha256_hex(r.claim.as_deref().unwrap_or(""));
            seen.insert(digest)
        })
        .cloned()
        .collect()
}

// ------------------------------------------------------------
// CSV output
// ------------------------------------------------------------

/// RFC 4180 quoting: wrap when the field contains a comma, quote, or
/// newline; double embedded quotes.
pub fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_row(fields: &[&str]) -> String {
    fields.iter().map(|f| csv_escape(f)).collect::<Vec<_>>().join(",")
}

const RAW_COLUMNS: &[&str] = &[
    "id",
    "url",
    "type",
    "language",
    "claim",
    "label",
    "label_norm",
    "label_group",
    "date_verified",
    "speaker",
    "source_url",
    "title",
    "scraped_at",
    "error",
];

const FACTUAL_LIKE_COLUMNS: &[&str] = &[
    "url",
    "type",
    "label",
    "label_group",
    "date_verified",
    "speaker",
    "claim",
    "source_url",
];

fn full_row(r: &FactCheckRecord) -> String {
    let label_norm = r.label_norm().unwrap_or_default();
    csv_row(&[
        &r.id,
        &r.url,
        r.record_type,
        r.language,
        r.claim.as_deref().unwrap_or(""),
        r.label.as_deref().unwrap_or(""),
        &label_norm,
        r.label_group().unwrap_or(""),
        r.date_verified.as_deref().unwrap_or(""),
        r.speaker.as_deref().unwrap_or(""),
        r.source_url.as_deref().unwrap_or(""),
        r.title.as_deref().unwrap_or(""),
        &r.scraped_at,
        r.error.as_deref().unwrap_or(""),
    ])
}

fn factual_like_row(r: &FactCheckRecord) -> String {
    csv_row(&[
        &r.url,
        r.record_type,
        r.label.as_deref().unwrap_or(""),
        r.label_group().unwrap_or(""),
        r.date_verified.as_deref().unwrap_or(""),
        r.speaker.as_deref().unwrap_or(""),
        r.claim.as_deref().unwrap_or(""),
        r.source_url.as_deref().unwrap_or(""),
    ])
}

fn write_csv(
    path: &Path,
    columns: &[&str],
    rows: impl Iterator<Item = String>,
) -> anyhow::Result<()> {
    let mut out = String::new();
    out.push_str(&csv_row(columns));
    out.push('\n');
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

/// Write the three outputs: every crawled row, the filtered dataset, and the
/// factual-like column subset.
pub fn write_outputs(
    out_dir: &Path,
    all: &[FactCheckRecord],
    dataset: &[FactCheckRecord],
) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    write_csv(
        &out_dir.join("afp_verificat_raw.csv"),
        RAW_COLUMNS,
        all.iter().map(full_row),
    )?;
    write_csv(
        &out_dir.join("afp_verificat_dataset.csv"),
        RAW_COLUMNS,
        dataset.iter().map(full_row),
    )?;
    write_csv(
        &out_dir.join("afp_verificat_dataset_factual_like.csv"),
        FACTUAL_LIKE_COLUMNS,
        dataset.iter().map(factual_like_row),
    )?;
    Ok(())
}

// ------------------------------------------------------------
// Crawl
// ------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub listing_path: String,
    pub out_dir: PathBuf,
    pub max_listing_pages: usize,
    pub request_delay: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://verificat.afp.com".to_string(),
            listing_path: "/list/Romania".to_string(),
            out_dir: PathBuf::from("out_afp_verificat"),
            max_listing_pages: 40,
            request_delay: Duration::from_secs(1),
        }
    }
}

/// Crawl listing pages, then every discovered article, and write the CSVs.
/// Per-article failures become error rows; only listing-level failures and
/// I/O errors abort the run.
pub async fn run(cfg: &ScrapeConfig) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .user_agent("claim-veracity-analyzer/0.1 (dataset builder)")
        .timeout(Duration::from_secs(30))
        .build()
        .context("building http client")?;

    let mut urls: Vec<String> = Vec::new();
    for page in 0..cfg.max_listing_pages {
        let listing_url = if page == 0 {
            format!("{}{}", cfg.base_url, cfg.listing_path)
        } else {
            format!("{}{}?page={page}", cfg.base_url, cfg.listing_path)
        };
        let html = http
            .get(&listing_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("fetching listing {listing_url}"))?
            .text()
            .await
            .context("reading listing body")?;

        let found = discover_article_urls(&html);
        if found.iter().all(|u| urls.contains(u)) {
            // Page brought nothing new; listing is exhausted.
            break;
        }
        for u in found {
            if !urls.contains(&u) {
                urls.push(u);
            }
        }
        tokio::time::sleep(cfg.request_delay).await;
    }
    urls.sort();
    info!(articles = urls.len(), "listing crawl finished");

    let mut records = Vec::with_capacity(urls.len());
    for url in &urls {
        let rec = match fetch_article(&http, url).await {
            Ok(html) => parse_article(&html, url),
            Err(e) => {
                warn!(%url, error = %e, "article fetch failed");
                FactCheckRecord::failed(url, e.to_string())
            }
        };
        records.push(rec);
        tokio::time::sleep(cfg.request_delay).await;
    }

    let dataset = build_dataset(&records);
    info!(
        raw = records.len(),
        dataset = dataset.len(),
        out_dir = %cfg.out_dir.display(),
        "writing datasets"
    );
    write_outputs(&cfg.out_dir, &records, &dataset)
}

async fn fetch_article(http: &reqwest::Client, url: &str) -> anyhow::Result<String> {
    let html = http
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())?
        .text()
        .await?;
    Ok(html)
}
