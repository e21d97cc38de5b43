//! Source reputation prior: domain → (score, p_true, evidence), backed by a
//! CSV table written by the offline aggregation job.
//!
//! Platform domains are intentionally neutral even when a table row exists:
//! social platforms host arbitrary third-party content and carry no
//! source-level reputation signal.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::domains::{get_domain, is_platform_domain};
use crate::error::LoadError;

pub const DEFAULT_SCORE: f64 = 0.0;
pub const DEFAULT_P_TRUE: f64 = 0.5;

pub const EVIDENCE_NO_SOURCE: &str = "no-source";
pub const EVIDENCE_PLATFORM_NEUTRAL: &str = "platform-neutral";
pub const EVIDENCE_DEFAULT: &str = "default";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePriorResult {
    pub source_domain: String,
    pub source_score: f64,
    pub p_true: f64,
    pub evidence: String,
}

#[derive(Debug)]
pub struct SourcePrior {
    platform_domains: HashSet<String>,
    platform_neutral: bool,
    default_score: f64,
    default_p_true: f64,
    score: HashMap<String, f64>,
    p_true: HashMap<String, f64>,
    evidence: HashMap<String, String>,
}

impl SourcePrior {
    /// Load the reputation table. A missing file yields an empty table (all
    /// lookups fall back to defaults); a present file with missing required
    /// columns is a fatal load error.
    pub fn load(
        table_csv: &Path,
        platform_domains: HashSet<String>,
        platform_neutral: bool,
    ) -> Result<Self, LoadError> {
        let mut prior = Self {
            platform_domains,
            platform_neutral,
            default_score: DEFAULT_SCORE,
            default_p_true: DEFAULT_P_TRUE,
            score: HashMap::new(),
            p_true: HashMap::new(),
            evidence: HashMap::new(),
        };

        if !table_csv.exists() {
            return Ok(prior);
        }

        let raw = fs::read_to_string(table_csv).map_err(|source| LoadError::Io {
            path: table_csv.to_path_buf(),
            source,
        })?;
        prior.parse_table(&raw, table_csv)?;
        Ok(prior)
    }

    // The table is machine-written: header row, comma-separated, no quoting.
    fn parse_table(&mut self, raw: &str, path: &Path) -> Result<(), LoadError> {
        let mut lines = raw.lines();
        let header = lines.next().unwrap_or("");
        let cols: Vec<&str> = header.split(',').map(str::trim).collect();
        let col = |name: &str| cols.iter().position(|c| *c == name);

        let domain_idx = col("source_domain").ok_or(LoadError::MissingTableColumn {
            column: "source_domain",
        })?;
        let score_idx = col("source_score_final").ok_or(LoadError::MissingTableColumn {
            column: "source_score_final",
        })?;
        let p_true_idx = col("p_true_final").ok_or(LoadError::MissingTableColumn {
            column: "p_true_final",
        })?;
        let evidence_idx = col("evidence");

        for (lineno, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();

            let domain =
                crate::domains::normalize_domain(fields.get(domain_idx).copied().unwrap_or(""));
            if domain.is_empty() {
                continue;
            }

            let parse_num = |idx: usize, name: &str| -> Result<f64, LoadError> {
                fields
                    .get(idx)
                    .and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(|| LoadError::Parse {
                        path: path.to_path_buf(),
                        message: format!("row {}: bad {name} value", lineno + 2),
                    })
            };

            let score = parse_num(score_idx, "source_score_final")?;
            let p_true = parse_num(p_true_idx, "p_true_final")?;
            let evidence = evidence_idx
                .and_then(|i| fields.get(i))
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
                .unwrap_or_else(|| "unknown".to_string());

            self.score.insert(domain.clone(), score);
            self.p_true.insert(domain.clone(), p_true);
            self.evidence.insert(domain, evidence);
        }
        Ok(())
    }

    /// Resolve a source URL to its reputation prior.
    pub fn lookup(&self, source_url: &str) -> SourcePriorResult {
        let domain = get_domain(source_url);
        if domain.is_empty() {
            return SourcePriorResult {
                source_domain: String::new(),
                source_score: self.default_score,
                p_true: self.default_p_true,
                evidence: EVIDENCE_NO_SOURCE.to_string(),
            };
        }

        // Overrides any table entry on purpose.
        if self.platform_neutral && is_platform_domain(&domain, &self.platform_domains) {
            return SourcePriorResult {
                source_domain: domain,
                source_score: 0.0,
                p_true: 0.5,
                evidence: EVIDENCE_PLATFORM_NEUTRAL.to_string(),
            };
        }

        let source_score = self.score.get(&domain).copied().unwrap_or(self.default_score);
        let p_true = self.p_true.get(&domain).copied().unwrap_or(self.default_p_true);
        let evidence = self
            .evidence
            .get(&domain)
            .cloned()
            .unwrap_or_else(|| EVIDENCE_DEFAULT.to_string());

        SourcePriorResult {
            source_domain: domain,
            source_score,
            p_true,
            evidence,
        }
    }

    pub fn known_domains(&self) -> usize {
        self.score.len()
    }
}
