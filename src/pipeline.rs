//! # Decision Engine
//! Fuses the component signals into a final gated verdict with full
//! provenance. The gating cascade itself is pure and I/O-free so it can be
//! unit tested with stub distributions.
//!
//! Policy: the fusion binary decision is the primary, trusted signal; the
//! fine-grained classifier only refines which flavor of true/false applies,
//! and is distrusted outright when its own confidence is low or when the
//! satire/propaganda domain lists provide stronger independent evidence.

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::info;

use crate::config::{DomainLists, PipelineConfig};
use crate::error::{LoadError, PipelineError};
use crate::fusion::{FusionInputs, FusionScorer};
use crate::scorers::{Fine6Distribution, ScorerError, ScorerSet};
use crate::source_prior::{SourcePrior, SourcePriorResult};
use crate::text::{build_text_input, normalize_ws, text_len, PREFER_BODY_MIN_LEN};
use crate::verdict::{
    BinaryLabel, ComponentOutputs, Fine6Label, Fine6Report, FusionReport, GatedLabel, GatedReport,
    InputEcho, PredictionReport,
};

/// One claim to evaluate. All fields optional; a fully empty request is
/// rejected per-request rather than scored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineInput {
    pub title: Option<String>,
    pub claim: Option<String>,
    pub body: Option<String>,
    pub source_url: Option<String>,
}

/// Artifacts that require a load step. Kept behind a `OnceCell` so the first
/// caller loads and concurrent callers observe the result without racing.
struct LoadedArtifacts {
    fusion: FusionScorer,
    source_prior: SourcePrior,
}

pub struct VeracityPipeline {
    config: PipelineConfig,
    scorers: ScorerSet,
    artifacts: OnceCell<LoadedArtifacts>,
}

impl VeracityPipeline {
    pub fn new(config: PipelineConfig, scorers: ScorerSet) -> Self {
        Self {
            config,
            scorers,
            artifacts: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load fusion and source-prior artifacts. Idempotent.
    pub fn load(&self) -> Result<(), LoadError> {
        self.artifacts
            .get_or_try_init(|| {
                let fusion = FusionScorer::load(
                    &self.config.fusion_model_path(),
                    &self.config.fusion_threshold_path(),
                    &self.config.fusion_feature_schema_path(),
                )?;
                let source_prior = SourcePrior::load(
                    &self.config.source_table_path(),
                    self.config.domains.platform.clone(),
                    self.config.platform_neutral,
                )?;
                info!(
                    threshold = fusion.threshold,
                    known_domains = source_prior.known_domains(),
                    "pipeline artifacts loaded"
                );
                Ok(LoadedArtifacts {
                    fusion,
                    source_prior,
                })
            })
            .map(|_| ())
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Resolve a source URL to its reputation prior (debug endpoint).
    pub fn source_prior(&self, url: &str) -> Result<SourcePriorResult, PipelineError> {
        let loaded = self.artifacts.get().ok_or(PipelineError::NotLoaded)?;
        Ok(loaded.source_prior.lookup(url))
    }

    pub async fn predict(&self, inp: &PipelineInput) -> Result<PredictionReport, PipelineError> {
        let loaded = self.artifacts.get().ok_or(PipelineError::NotLoaded)?;
        if is_empty_input(inp) {
            return Err(PipelineError::EmptyInput);
        }

        counter!("predict_requests_total").increment(1);
        let started = Instant::now();

        let text = build_text_input(
            inp.title.as_deref(),
            inp.claim.as_deref(),
            inp.body.as_deref(),
            PREFER_BODY_MIN_LEN,
        );
        let tl = text_len(&text);

        // The clickbait model is title-trained; fall back to the composed
        // text only when no title exists.
        let clickbait_text = {
            let t = normalize_ws(inp.title.as_deref().unwrap_or(""));
            if t.is_empty() {
                text.clone()
            } else {
                t
            }
        };

        // Independent scorers, no ordering dependency.
        let (p_clickbait, p_true_content) = tokio::try_join!(
            self.scorers.clickbait.predict(&clickbait_text),
            self.scorers.veracity.predict(&text),
        )
        .map_err(scorer_unavailable)?;

        let source_url = inp.source_url.as_deref().unwrap_or("");
        let sp = loaded.source_prior.lookup(source_url);

        let input_echo = InputEcho {
            text_len: tl,
            source_url: source_url.to_string(),
            source_domain: sp.source_domain.clone(),
        };
        let components = ComponentOutputs {
            p_clickbait,
            p_true_content,
            source_score: sp.source_score,
            p_true_source: sp.p_true,
            source_evidence: sp.evidence.clone(),
        };

        // Neutral-override short-circuit: very short, content-ambiguous text
        // from a highly trusted source is attributed entirely to source
        // trust. The content model was trained on longer claims and would
        // otherwise penalize e.g. an official one-line brief.
        if tl < self.config.neutral_max_text_len
            && p_true_content < self.config.neutral_content_max_p_true
            && sp.p_true >= self.config.high_trust_min_p_true
        {
            counter!("predict_neutral_override_total").increment(1);
            counter!("gated_label_total", "label" => GatedLabel::True.as_str()).increment(1);
            histogram!("predict_ms").record(started.elapsed().as_millis() as f64);

            return Ok(PredictionReport {
                input: input_echo,
                component_outputs: components,
                fusion: FusionReport {
                    final_p_true: sp.p_true,
                    threshold: loaded.fusion.threshold,
                    binary_label: BinaryLabel::True,
                    features: json!({ "neutral_override": true }),
                },
                fine6: Fine6Report {
                    fine6_label: GatedLabel::True,
                    raw_fine6_label: Fine6Label::True,
                    top_prob: 1.0,
                    probs: BTreeMap::from([(Fine6Label::True, 1.0)]),
                },
                gated: GatedReport {
                    gated_label: GatedLabel::True,
                },
            });
        }

        let fusion_out = loaded.fusion.predict(&FusionInputs {
            p_true_content,
            p_clickbait,
            source_score: sp.source_score,
            text_len: tl,
            has_source: !sp.source_domain.is_empty(),
        });

        let fine = self
            .scorers
            .fine6
            .predict(&text)
            .await
            .map_err(scorer_unavailable)?;

        // Low-confidence arg-max is not trustworthy enough to report as-is;
        // the raw label stays available for audit.
        let fine6_label = if fine.top_prob < self.config.inconclusive_min_top_prob {
            GatedLabel::Inconclusive
        } else {
            fine.label.into()
        };

        let gated_label = gated_fine_label(
            fusion_out.binary_label,
            &fine,
            &sp.source_domain,
            &self.config.domains,
            self.config.inconclusive_min_top_prob,
        );

        counter!("gated_label_total", "label" => gated_label.as_str()).increment(1);
        histogram!("predict_ms").record(started.elapsed().as_millis() as f64);

        Ok(PredictionReport {
            input: input_echo,
            component_outputs: components,
            fusion: FusionReport {
                final_p_true: fusion_out.final_p_true,
                threshold: fusion_out.threshold,
                binary_label: fusion_out.binary_label,
                features: serde_json::to_value(&fusion_out.features)
                    .unwrap_or_else(|_| json!({})),
            },
            fine6: Fine6Report {
                fine6_label,
                raw_fine6_label: fine.label,
                top_prob: fine.top_prob,
                probs: fine.probs,
            },
            gated: GatedReport { gated_label },
        })
    }
}

fn scorer_unavailable(e: ScorerError) -> PipelineError {
    counter!("scorer_errors_total", "scorer" => e.scorer).increment(1);
    PipelineError::ScorerUnavailable {
        scorer: e.scorer,
        message: e.message,
    }
}

fn is_empty_input(inp: &PipelineInput) -> bool {
    fn blank(s: &Option<String>) -> bool {
        s.as_deref().map_or(true, |v| v.trim().is_empty())
    }
    blank(&inp.title) && blank(&inp.claim) && blank(&inp.body) && blank(&inp.source_url)
}

/// The gating cascade, first match wins:
///
/// a. fusion FALSE + satire domain                       → SATIRE
/// b. fusion FALSE + propaganda domain + mass ≥ 0.05     → PROPAGANDA
/// c. fine-grained top prob below the confidence floor   → INCONCLUSIVE
/// d. fusion FALSE but PARTIAL TRUE mass > 0.6           → INCONCLUSIVE
/// e. arg-max over the candidates of the fusion side; no positive mass
///    on any candidate                                   → INCONCLUSIVE
///
/// The propaganda bar is deliberately low: domain membership carries most of
/// the evidentiary weight, the mass check only vetoes a fine-grained model
/// that is confidently contradicting the propaganda hypothesis.
pub fn gated_fine_label(
    fusion_binary: BinaryLabel,
    fine: &Fine6Distribution,
    source_domain: &str,
    domains: &DomainLists,
    inconclusive_min_top_prob: f64,
) -> GatedLabel {
    let fusion_false = fusion_binary == BinaryLabel::False;

    if fusion_false && domains.satire.contains(source_domain) {
        return GatedLabel::Satire;
    }

    if fusion_false
        && domains.propaganda.contains(source_domain)
        && fine.prob(Fine6Label::Propaganda) >= 0.05
    {
        return GatedLabel::Propaganda;
    }

    if fine.top_prob < inconclusive_min_top_prob {
        return GatedLabel::Inconclusive;
    }

    // Content signal and fine-grained signal disagree strongly; trust neither.
    if fusion_false && fine.prob(Fine6Label::PartialTrue) > 0.6 {
        return GatedLabel::Inconclusive;
    }

    let candidates: &[Fine6Label] = if fusion_binary == BinaryLabel::True {
        &[Fine6Label::True, Fine6Label::PartialTrue]
    } else {
        &[
            Fine6Label::False,
            Fine6Label::Misleading,
            Fine6Label::Propaganda,
            Fine6Label::Satire,
        ]
    };

    // Strict `>` keeps the first-listed candidate on ties.
    let mut best: Option<Fine6Label> = None;
    let mut best_p = -1.0_f64;
    for &c in candidates {
        let p = fine.prob(c);
        if p > best_p {
            best_p = p;
            best = Some(c);
        }
    }

    match best {
        Some(label) if best_p > 0.0 => label.into(),
        _ => GatedLabel::Inconclusive,
    }
}
