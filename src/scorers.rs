//! Black-box scorer contracts for the transformer models, plus the remote
//! and mock implementations.
//!
//! The models themselves live out-of-process behind HTTP inference
//! endpoints; this module only defines the capability seams so test doubles
//! can stand in without touching the decision engine. Truncation of the
//! input text is each scorer's own concern, invisible to callers.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ScorerConfig, ScorerMode};
use crate::verdict::Fine6Label;

/// Upper bound on characters forwarded to a remote scorer.
const REMOTE_INPUT_MAX_CHARS: usize = 4000;

/// Inference-time failure of one scorer. The decision engine never
/// substitutes a default probability for this.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ScorerError {
    pub scorer: &'static str,
    pub message: String,
}

/// Single-probability scorer: clickbait and binary veracity.
#[async_trait]
pub trait ProbabilityScorer: Send + Sync {
    /// Probability of the positive class for `text`, in [0, 1].
    async fn predict(&self, text: &str) -> Result<f64, ScorerError>;
    fn name(&self) -> &'static str;
}

/// Distribution scorer: the 6-way fine-grained classifier.
#[async_trait]
pub trait DistributionScorer: Send + Sync {
    async fn predict(&self, text: &str) -> Result<Fine6Distribution, ScorerError>;
    fn name(&self) -> &'static str;
}

pub type DynProbabilityScorer = Arc<dyn ProbabilityScorer>;
pub type DynDistributionScorer = Arc<dyn DistributionScorer>;

/// Normalized distribution over the fine-grained labels, with its arg-max.
#[derive(Debug, Clone, PartialEq)]
pub struct Fine6Distribution {
    pub label: Fine6Label,
    pub top_prob: f64,
    pub probs: BTreeMap<Fine6Label, f64>,
}

impl Fine6Distribution {
    /// Arg-max over the fixed label order; ties keep the first-listed label.
    pub fn from_probs(probs: BTreeMap<Fine6Label, f64>) -> Self {
        let mut label = Fine6Label::True;
        let mut top = -1.0_f64;
        for l in Fine6Label::ALL {
            let p = probs.get(&l).copied().unwrap_or(0.0);
            if p > top {
                top = p;
                label = l;
            }
        }
        Self {
            label,
            top_prob: top.max(0.0),
            probs,
        }
    }

    pub fn prob(&self, label: Fine6Label) -> f64 {
        self.probs.get(&label).copied().unwrap_or(0.0)
    }
}

/// The three scorers the pipeline consumes.
pub struct ScorerSet {
    pub clickbait: DynProbabilityScorer,
    pub veracity: DynProbabilityScorer,
    pub fine6: DynDistributionScorer,
}

/// Build the scorer set from config. Remote mode requires all three
/// endpoint URLs; mock mode returns deterministic stubs.
pub fn build_scorers(cfg: &ScorerConfig) -> anyhow::Result<ScorerSet> {
    match cfg.mode {
        ScorerMode::Mock => {
            tracing::warn!("SCORER_MODE=mock: serving deterministic stub scorers");
            Ok(mock_scorers())
        }
        ScorerMode::Remote => {
            let url = |opt: &Option<String>, env: &str| -> anyhow::Result<String> {
                opt.clone()
                    .ok_or_else(|| anyhow::anyhow!("missing {env} (or set SCORER_MODE=mock)"))
            };
            Ok(ScorerSet {
                clickbait: Arc::new(RemoteProbabilityScorer::new(
                    url(&cfg.clickbait_url, "CLICKBAIT_SCORER_URL")?,
                    "clickbait",
                )),
                veracity: Arc::new(RemoteProbabilityScorer::new(
                    url(&cfg.veracity_url, "VERACITY_SCORER_URL")?,
                    "veracity",
                )),
                fine6: Arc::new(RemoteDistributionScorer::new(
                    url(&cfg.fine6_url, "FINE6_SCORER_URL")?,
                    "fine6",
                )),
            })
        }
    }
}

/// Deterministic stubs: mildly truthful, non-clickbait content.
pub fn mock_scorers() -> ScorerSet {
    let probs: BTreeMap<Fine6Label, f64> = [
        (Fine6Label::True, 0.55),
        (Fine6Label::False, 0.10),
        (Fine6Label::PartialTrue, 0.20),
        (Fine6Label::Misleading, 0.05),
        (Fine6Label::Propaganda, 0.05),
        (Fine6Label::Satire, 0.05),
    ]
    .into_iter()
    .collect();

    ScorerSet {
        clickbait: Arc::new(FixedProbabilityScorer::new("clickbait", 0.20)),
        veracity: Arc::new(FixedProbabilityScorer::new("veracity", 0.70)),
        fine6: Arc::new(FixedDistributionScorer::new(
            "fine6",
            Fine6Distribution::from_probs(probs),
        )),
    }
}

// ------------------------------------------------------------
// Remote scorers (HTTP inference endpoints)
// ------------------------------------------------------------

fn inference_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("claim-veracity-analyzer/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(15))
        .build()
        .expect("reqwest client")
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct RemoteProbabilityScorer {
    http: reqwest::Client,
    endpoint: String,
    name: &'static str,
}

impl RemoteProbabilityScorer {
    pub fn new(endpoint: String, name: &'static str) -> Self {
        Self {
            http: inference_client(),
            endpoint,
            name,
        }
    }

    fn err(&self, message: impl Into<String>) -> ScorerError {
        ScorerError {
            scorer: self.name,
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
struct ProbResponse {
    p: f64,
}

#[async_trait]
impl ProbabilityScorer for RemoteProbabilityScorer {
    async fn predict(&self, text: &str) -> Result<f64, ScorerError> {
        let payload =
            serde_json::json!({ "text": truncate_chars(text, REMOTE_INPUT_MAX_CHARS) });
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(self.err(format!("endpoint returned {}", resp.status())));
        }

        let body: ProbResponse = resp.json().await.map_err(|e| self.err(e.to_string()))?;
        if !(0.0..=1.0).contains(&body.p) || !body.p.is_finite() {
            return Err(self.err(format!("probability out of range: {}", body.p)));
        }
        Ok(body.p)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct RemoteDistributionScorer {
    http: reqwest::Client,
    endpoint: String,
    name: &'static str,
}

impl RemoteDistributionScorer {
    pub fn new(endpoint: String, name: &'static str) -> Self {
        Self {
            http: inference_client(),
            endpoint,
            name,
        }
    }

    fn err(&self, message: impl Into<String>) -> ScorerError {
        ScorerError {
            scorer: self.name,
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
struct DistResponse {
    probs: BTreeMap<Fine6Label, f64>,
}

#[async_trait]
impl DistributionScorer for RemoteDistributionScorer {
    async fn predict(&self, text: &str) -> Result<Fine6Distribution, ScorerError> {
        let payload =
            serde_json::json!({ "text": truncate_chars(text, REMOTE_INPUT_MAX_CHARS) });
        let resp = self
            .http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.err(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(self.err(format!("endpoint returned {}", resp.status())));
        }

        let body: DistResponse = resp.json().await.map_err(|e| self.err(e.to_string()))?;
        if body.probs.is_empty() {
            return Err(self.err("empty distribution"));
        }
        if body.probs.values().any(|p| *p < 0.0 || !p.is_finite()) {
            return Err(self.err("negative or non-finite probability"));
        }
        Ok(Fine6Distribution::from_probs(body.probs))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

// ------------------------------------------------------------
// Fixed scorers (mock mode and test doubles)
// ------------------------------------------------------------

pub struct FixedProbabilityScorer {
    name: &'static str,
    p: f64,
}

impl FixedProbabilityScorer {
    pub fn new(name: &'static str, p: f64) -> Self {
        Self { name, p }
    }
}

#[async_trait]
impl ProbabilityScorer for FixedProbabilityScorer {
    async fn predict(&self, _text: &str) -> Result<f64, ScorerError> {
        Ok(self.p)
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct FixedDistributionScorer {
    name: &'static str,
    dist: Fine6Distribution,
}

impl FixedDistributionScorer {
    pub fn new(name: &'static str, dist: Fine6Distribution) -> Self {
        Self { name, dist }
    }
}

#[async_trait]
impl DistributionScorer for FixedDistributionScorer {
    async fn predict(&self, _text: &str) -> Result<Fine6Distribution, ScorerError> {
        Ok(self.dist.clone())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

/// A scorer that always fails; used to test the unavailable path.
pub struct FailingScorer {
    pub name: &'static str,
}

#[async_trait]
impl ProbabilityScorer for FailingScorer {
    async fn predict(&self, _text: &str) -> Result<f64, ScorerError> {
        Err(ScorerError {
            scorer: self.name,
            message: "model runtime error".into(),
        })
    }
    fn name(&self) -> &'static str {
        self.name
    }
}
